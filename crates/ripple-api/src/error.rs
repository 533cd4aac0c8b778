//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure crossing the API boundary is translated here; nothing
//! propagates as an unhandled crash.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Bad or missing token, or an authenticated user acting on a feed that
  /// is not theirs. Both collapse to 401 — the API does not reveal which.
  #[error("unauthorized")]
  Unauthorized,

  /// The payload's `type` tag named no postable item variant.
  #[error("unknown item type: {0:?}")]
  UnknownType(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A field-level validation failure; the message is surfaced verbatim.
  #[error("{0}")]
  Invalid(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::UnknownType(_) => (StatusCode::BAD_REQUEST, self.to_string()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Invalid(m) => (StatusCode::NOT_ACCEPTABLE, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
