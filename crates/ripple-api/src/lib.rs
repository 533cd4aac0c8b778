//! JSON REST API for Ripple.
//!
//! Exposes an axum [`Router`] backed by any [`ripple_core::store::FeedStore`].
//! Requests authenticate with a `token` query parameter; TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = ripple_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod error;
pub mod feed;
pub mod items;
pub mod serialize;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use ripple_core::store::FeedStore;
use serde::Deserialize;

pub use error::ApiError;
pub use serialize::Urls;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Public base URL used to build canonical item/feed links.
  pub base_url:   String,
  pub store_path: PathBuf,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: FeedStore> {
  pub store: Arc<S>,
  pub urls:  Arc<Urls>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FeedStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/api/users/{user_id}/items", post(items::create::<S>))
    .route(
      "/api/users/{user_id}/items/{entry_id}",
      get(items::get_one::<S>),
    )
    .route("/api/users/{user_id}/feed", get(feed::show::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ripple_core::{
    item::{ItemBody, ItemKind, NewItem, IMAGE_URL_MESSAGE},
    store::FeedStore,
    user::{NewUser, User},
  };
  use ripple_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  const BASE: &str = "http://api.example.com";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store: Arc::new(store),
      urls:  Arc::new(Urls::new(BASE)),
    }
  }

  async fn seed_user(state: &AppState<SqliteStore>, name: &str) -> User {
    state.store.add_user(NewUser::new(name)).await.unwrap()
  }

  async fn seed_text(
    state: &AppState<SqliteStore>,
    user: &User,
    body: &str,
  ) -> (ripple_core::item::ContentItem, ripple_core::stream::StreamEntry) {
    state
      .store
      .create_item(NewItem::new(
        user.user_id,
        ItemBody::TextItem { body: body.to_string() },
      ))
      .await
      .unwrap()
  }

  async fn request(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<&str>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let req = builder
      .body(Body::from(body.unwrap_or("").to_string()))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn items_uri(user: &User) -> String {
    format!("/api/users/{}/items?token={}", user.user_id, user.token)
  }

  fn feed_uri(user: &User) -> String {
    format!("/api/users/{}/feed?token={}", user.user_id, user.token)
  }

  // ── Creating items ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn creates_a_text_item() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state.clone(),
      "POST",
      &items_uri(&user),
      Some(r#"{"type":"TextItem","body":"New text post via the api."}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["type"], "TextItem");
    assert_eq!(body["body"], "New text post via the api.");
    assert_eq!(body["feed"], user.user_id.to_string());

    // The item heads the user's feed.
    let feed = json_body(request(state, "GET", &feed_uri(&user), None).await).await;
    assert_eq!(
      feed["items"]["most_recent"][0]["body"],
      "New text post via the api."
    );
  }

  #[tokio::test]
  async fn creates_a_link_item() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state,
      "POST",
      &items_uri(&user),
      Some(
        r#"{"type":"LinkItem","comment":"I love Flash games","link_url":"http://www.games.com/awesome.swf"}"#,
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["type"], "LinkItem");
    assert_eq!(body["link_url"], "http://www.games.com/awesome.swf");
    assert_eq!(body["comment"], "I love Flash games");
  }

  #[tokio::test]
  async fn creates_an_image_item() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state,
      "POST",
      &items_uri(&user),
      Some(
        r#"{"type":"ImageItem","comment":"This image is cool.","image_url":"http://foo.com/cat.jpg"}"#,
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["type"], "ImageItem");
    assert_eq!(body["image_url"], "http://foo.com/cat.jpg");
  }

  #[tokio::test]
  async fn rejects_an_invalid_image_url_with_406() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state.clone(),
      "POST",
      &items_uri(&user),
      Some(
        r#"{"type":"ImageItem","comment":"This image is cool.","image_url":"http://foo.com/cat.html"}"#,
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);

    let body = json_body(resp).await;
    assert!(
      body["error"].as_str().unwrap().contains(IMAGE_URL_MESSAGE),
      "error body: {body}"
    );

    // Nothing was persisted.
    assert_eq!(state.store.entry_count(user.user_id).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn rejects_an_unknown_type_with_400() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state,
      "POST",
      &items_uri(&user),
      Some(r#"{"type":"PodcastItem","body":"nope"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn github_events_are_not_postable() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state,
      "POST",
      &items_uri(&user),
      Some(r#"{"type":"GithubEvent","event":{}}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn rejects_a_missing_type_with_400() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state,
      "POST",
      &items_uri(&user),
      Some(r#"{"body":"untyped"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn blank_body_is_a_validation_failure() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(
      state,
      "POST",
      &items_uri(&user),
      Some(r#"{"type":"TextItem"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
  }

  // ── Auth and ownership ──────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_or_bogus_token_returns_401() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let no_token = format!("/api/users/{}/items", user.user_id);
    let resp = request(
      state.clone(),
      "POST",
      &no_token,
      Some(r#"{"type":"TextItem","body":"hi"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let bogus = format!("/api/users/{}/feed?token=bogus", user.user_id);
    let resp = request(state, "GET", &bogus, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn prevents_posting_to_another_users_feed() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;
    let user2 = seed_user(&state, "user2").await;

    let uri = format!("/api/users/{}/items?token={}", user.user_id, user2.token);
    let resp = request(
      state.clone(),
      "POST",
      &uri,
      Some(
        r#"{"type":"ImageItem","comment":"An insidious evil post.","image_url":"http://troll.com/cat.jpg"}"#,
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The target feed is untouched.
    assert_eq!(state.store.entry_count(user.user_id).await.unwrap(), 0);
  }

  // ── Single item ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn returns_a_json_representation_of_a_text_item() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;
    let (item, entry) = seed_text(&state, &user, "hello stream").await;

    let uri = format!(
      "/api/users/{}/items/{}?token={}",
      user.user_id, entry.entry_id, user.token
    );
    let resp = request(state.clone(), "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["id"], item.item_id.to_string());
    assert_eq!(body["type"], "TextItem");
    assert_eq!(body["created_at"], item.created_at.to_rfc3339());
    assert_eq!(body["body"], "hello stream");
    assert_eq!(
      body["link"],
      state.urls.item(user.user_id, entry.entry_id)
    );
  }

  #[tokio::test]
  async fn unknown_item_returns_404() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let uri = format!(
      "/api/users/{}/items/{}?token={}",
      user.user_id,
      Uuid::new_v4(),
      user.token
    );
    let resp = request(state, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Feed ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn feed_includes_owner_details_and_page_links() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;
    seed_text(&state, &user, "only post").await;

    let feed = json_body(request(state.clone(), "GET", &feed_uri(&user), None).await).await;
    assert_eq!(feed["name"], "worace");
    assert_eq!(feed["id"], user.user_id.to_string());
    assert_eq!(feed["private"], false);
    assert_eq!(feed["link"], state.urls.feed(user.user_id));
    assert_eq!(
      feed["items"]["first_page"],
      state.urls.feed_page(user.user_id, 1)
    );
    assert_eq!(
      feed["items"]["last_page"],
      state.urls.feed_page(user.user_id, 1)
    );
  }

  #[tokio::test]
  async fn feed_paginates_fifteen_items_as_twelve_then_three() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;
    for i in 0..15 {
      seed_text(&state, &user, &format!("post {i}")).await;
    }

    let page1 = json_body(request(state.clone(), "GET", &feed_uri(&user), None).await).await;
    let most_recent = page1["items"]["most_recent"].as_array().unwrap();
    assert_eq!(most_recent.len(), 12);
    assert_eq!(most_recent[0]["body"], "post 14");
    assert_eq!(
      page1["items"]["last_page"],
      state.urls.feed_page(user.user_id, 2)
    );

    let page2_uri = format!("{}&page=2", feed_uri(&user));
    let page2 = json_body(request(state.clone(), "GET", &page2_uri, None).await).await;
    assert_eq!(page2["items"]["most_recent"].as_array().unwrap().len(), 3);

    // Past the end: still 200, empty list.
    let page9_uri = format!("{}&page=9", feed_uri(&user));
    let resp = request(state, "GET", &page9_uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page9 = json_body(resp).await;
    assert!(page9["items"]["most_recent"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn feed_with_huge_page_number_is_empty_not_page_one() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;
    seed_text(&state, &user, "only post").await;

    let uri = format!("{}&page={}", feed_uri(&user), u64::MAX);
    let resp = request(state, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert!(body["items"]["most_recent"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn empty_feed_is_a_valid_response() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let resp = request(state, "GET", &feed_uri(&user), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let feed = json_body(resp).await;
    assert!(feed["items"]["most_recent"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn feed_of_unknown_user_returns_404() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let uri = format!("/api/users/{}/feed?token={}", Uuid::new_v4(), user.token);
    let resp = request(state, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn feed_items_carry_refeed_keys() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;
    seed_text(&state, &user, "mine").await;

    let feed = json_body(request(state, "GET", &feed_uri(&user), None).await).await;
    let item = &feed["items"]["most_recent"][0];

    for key in ["type", "created_at", "id", "feed", "link", "refeed", "refeed_link"] {
      assert!(item.get(key).is_some(), "missing key {key:?}: {item}");
    }
    assert!(item["refeed"].is_null());
    assert!(item["refeed_link"].is_null());
  }

  #[tokio::test]
  async fn refeeds_point_back_at_the_original_author() {
    let state = make_state().await;
    let author = seed_user(&state, "author").await;
    let reader = seed_user(&state, "reader").await;
    let (item, _) = seed_text(&state, &author, "original").await;

    state
      .store
      .ingest_refeed(reader.user_id, ItemKind::TextItem, item.item_id)
      .await
      .unwrap();

    let feed = json_body(request(state.clone(), "GET", &feed_uri(&reader), None).await).await;
    let first = &feed["items"]["most_recent"][0];
    assert_eq!(first["refeed"], author.user_id.to_string());
    assert_eq!(first["refeed_link"], state.urls.feed(author.user_id));
    assert_eq!(first["feed"], reader.user_id.to_string());
  }

  #[tokio::test]
  async fn ingested_github_events_appear_in_the_feed() {
    let state = make_state().await;
    let user = seed_user(&state, "worace").await;

    let payload = serde_json::json!({"type": "PushEvent", "repo": "worace/feed"});
    state
      .store
      .create_item(NewItem::new(
        user.user_id,
        ItemBody::GithubEvent { event: payload.clone() },
      ))
      .await
      .unwrap();

    let feed = json_body(request(state, "GET", &feed_uri(&user), None).await).await;
    let first = &feed["items"]["most_recent"][0];
    assert_eq!(first["type"], "GithubEvent");
    assert_eq!(first["event"], payload);
  }
}
