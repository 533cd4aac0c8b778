//! Handlers for `/api/users/{user_id}/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/users/:user_id/items` | Body: `{"type":"TextItem", ...}`; 201 on success |
//! | `GET`  | `/api/users/:user_id/items/:entry_id` | Single serialised item; 404 if not found |
//!
//! The write path runs the full pipeline: authenticate (extractor),
//! authorize (caller must own the target feed), dispatch on the `type` tag,
//! respond. Validation failures come back as 406 with the message verbatim;
//! an unknown `type` is 400.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ripple_core::{
  item::{ItemBody, ItemKind, NewItem},
  store::FeedStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Caller,
  error::ApiError,
  serialize,
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// Variant fields as they appear on the wire. Absent fields default to
/// empty and are caught by domain validation, which produces the
/// user-facing message.
#[derive(Debug, Default, Deserialize)]
struct TextFields {
  #[serde(default)]
  body: String,
}

#[derive(Debug, Default, Deserialize)]
struct LinkFields {
  #[serde(default)]
  link_url: String,
  comment:  Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageFields {
  #[serde(default)]
  image_url: String,
  comment:   Option<String>,
}

/// Decode the creation payload: read the `type` tag, reject unknown or
/// non-postable kinds, then pull the variant fields.
fn decode_payload(payload: serde_json::Value) -> Result<ItemBody, ApiError> {
  let tag = payload
    .get("type")
    .and_then(serde_json::Value::as_str)
    .ok_or_else(|| ApiError::BadRequest("missing `type` field".to_string()))?
    .to_string();

  let kind = match tag.parse::<ItemKind>() {
    Ok(kind) if kind.is_postable() => kind,
    _ => return Err(ApiError::UnknownType(tag)),
  };

  let bad_fields = |e: serde_json::Error| ApiError::BadRequest(e.to_string());

  let body = match kind {
    ItemKind::TextItem => {
      let fields: TextFields =
        serde_json::from_value(payload).map_err(bad_fields)?;
      ItemBody::TextItem { body: fields.body }
    }
    ItemKind::LinkItem => {
      let fields: LinkFields =
        serde_json::from_value(payload).map_err(bad_fields)?;
      ItemBody::LinkItem {
        link_url: fields.link_url,
        comment:  fields.comment,
      }
    }
    ItemKind::ImageItem => {
      let fields: ImageFields =
        serde_json::from_value(payload).map_err(bad_fields)?;
      ItemBody::ImageItem {
        image_url: fields.image_url,
        comment:   fields.comment,
      }
    }
    ItemKind::GithubEvent => unreachable!("rejected by is_postable above"),
  };

  Ok(body)
}

/// `POST /api/users/:user_id/items?token=` — returns 201 + the serialised
/// item.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<Uuid>,
  Caller(caller): Caller,
  Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Own feed only. A valid token for the wrong feed is still a 401.
  if caller.user_id != user_id {
    return Err(ApiError::Unauthorized);
  }

  let body = decode_payload(payload)?;
  body.validate().map_err(|e| match e {
    ripple_core::Error::Validation(msg) => ApiError::Invalid(msg),
    other => ApiError::Store(Box::new(other)),
  })?;

  let (item, entry) = state
    .store
    .create_item(NewItem::new(caller.user_id, body))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((
    StatusCode::CREATED,
    Json(serialize::item(&entry, &item, &state.urls)),
  ))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /api/users/:user_id/items/:entry_id?token=`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path((user_id, entry_id)): Path<(Uuid, Uuid)>,
  Caller(_caller): Caller,
) -> Result<Json<serialize::ItemJson>, ApiError>
where
  S: FeedStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = state
    .store
    .entry(user_id, entry_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("item {entry_id} not found")))?;

  // A dangling reference on the single-item path is a 404, unlike the feed
  // page where it is silently skipped.
  let item = state
    .store
    .item(entry.kind, entry.item_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("item {entry_id} not found")))?;

  Ok(Json(serialize::item(&entry, &item, &state.urls)))
}
