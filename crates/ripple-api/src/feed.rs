//! Handler for the `/api/users/{user_id}/feed` endpoint.
//!
//! Delegates to the core aggregator and always answers 200 for a known
//! user — an empty feed (or a page past the end) is a valid, non-error
//! state with an empty `most_recent` array.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use ripple_core::store::FeedStore;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError, serialize};

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  /// 1-indexed page number; defaults to the first page.
  pub page: Option<u64>,
}

/// `GET /api/users/:user_id/feed?token=[&page=N]`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<Uuid>,
  Caller(_caller): Caller,
  Query(params): Query<FeedParams>,
) -> Result<Json<serialize::FeedJson>, ApiError>
where
  S: FeedStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let owner = state
    .store
    .get_user(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))?;

  let page = ripple_core::feed::page(
    state.store.as_ref(),
    &owner,
    params.page.unwrap_or(1),
  )
  .await
  .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(serialize::feed_page(&page, &state.urls)))
}
