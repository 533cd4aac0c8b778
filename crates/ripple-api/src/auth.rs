//! Token-auth extractor.
//!
//! API requests carry a `token` query parameter; the store is the
//! authentication collaborator that resolves it to a user. The extractor
//! rejects with 401 before any handler logic runs, and the authenticated
//! user is passed explicitly from there — no ambient current-user state.

use axum::{extract::FromRequestParts, http::request::Parts};
use ripple_core::{store::FeedStore, user::User};

use crate::{AppState, error::ApiError};

/// The authenticated caller. Present in a handler's signature means the
/// request carried a valid token; ownership checks are still the handler's
/// job.
pub struct Caller(pub User);

/// Pull the `token` parameter out of a raw query string.
pub fn token_from_query(query: Option<&str>) -> Option<String> {
  let query = query?;
  url::form_urlencoded::parse(query.as_bytes())
    .find(|(key, _)| key == "token")
    .map(|(_, value)| value.into_owned())
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: FeedStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token =
      token_from_query(parts.uri.query()).ok_or(ApiError::Unauthorized)?;

    let user = state
      .store
      .user_by_token(&token)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthorized)?;

    Ok(Caller(user))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_is_extracted_from_query() {
    assert_eq!(
      token_from_query(Some("token=abc123")),
      Some("abc123".to_string())
    );
    assert_eq!(
      token_from_query(Some("page=2&token=abc123")),
      Some("abc123".to_string())
    );
  }

  #[test]
  fn missing_token_yields_none() {
    assert_eq!(token_from_query(Some("page=2")), None);
    assert_eq!(token_from_query(None), None);
  }

  #[test]
  fn token_value_is_percent_decoded() {
    assert_eq!(
      token_from_query(Some("token=a%2Bb")),
      Some("a+b".to_string())
    );
  }
}
