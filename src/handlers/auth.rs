//! Authentication filters for admin endpoints
//!
//! `with_admin` is the authentication middleware, `with_role` adds the
//! authorization gate on top of it.

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::http::header::AUTHORIZATION;
use warp::http::{HeaderMap, HeaderValue};
use warp::{Filter, Rejection};

use crate::app::AppState;
use crate::auth::admin::AdminRole;
use crate::auth::gate::{authenticate_request, require_role};
use crate::auth::token::Claims;
use crate::constants::MAX_JSON_BODY_BYTES;
use crate::error::LaunchpadError;

/// Include the application state in a request
pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Verified claims from the `Authorization: Bearer` header, or a 401 rejection
pub fn with_admin(state: AppState) -> impl Filter<Extract = (Claims,), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and(with_state(state))
        .and_then(|headers: HeaderMap, state: AppState| async move {
            // Non-visible-ASCII bytes are a bad credential, not a bad request
            let result = match headers.get(AUTHORIZATION).map(HeaderValue::to_str).transpose() {
                Ok(header) => authenticate_request(header, state.auth.tokens()).await,
                Err(_) => Err(LaunchpadError::Unauthenticated),
            };
            result.map_err(warp::reject::custom)
        })
}

/// Verified claims carrying exactly `role`, or a 401/403 rejection
pub fn with_role(
    state: AppState,
    role: AdminRole,
) -> impl Filter<Extract = (Claims,), Error = Rejection> + Clone {
    with_admin(state).and_then(move |claims: Claims| async move {
        require_role(claims, role).map_err(warp::reject::custom)
    })
}

/// Size-limited JSON request body
pub fn json_body<T: DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_JSON_BODY_BYTES).and(warp::body::json())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn rejection_of(
        filter: impl Filter<Extract = (Claims,), Error = Rejection> + Clone + 'static,
        header: Option<String>,
    ) -> Option<u16> {
        let mut request = warp::test::request();
        if let Some(value) = header {
            request = request.header("authorization", value);
        }
        match request.filter(&filter).await {
            Ok(_) => None,
            Err(rejection) => rejection
                .find::<LaunchpadError>()
                .map(|e| e.status_code().as_u16()),
        }
    }

    #[tokio::test]
    async fn test_missing_and_garbage_tokens() {
        let state = AppState::for_testing().unwrap();
        assert_eq!(rejection_of(with_admin(state.clone()), None).await, Some(401));
        assert_eq!(
            rejection_of(with_admin(state), Some("Bearer not.a.jwt".to_string())).await,
            Some(401)
        );
    }

    #[tokio::test]
    async fn test_non_ascii_authorization_header() {
        let state = AppState::for_testing().unwrap();
        let value = HeaderValue::from_bytes(b"Bearer \xffgarbage").unwrap();
        let rejection = warp::test::request()
            .header("authorization", value)
            .filter(&with_admin(state))
            .await
            .unwrap_err();
        assert_eq!(
            rejection.find::<LaunchpadError>().map(|e| e.status_code().as_u16()),
            Some(401)
        );
    }

    #[tokio::test]
    async fn test_role_gate() {
        let state = AppState::for_testing().unwrap();
        let tokens = state.auth.tokens().clone();
        let admin = tokens.issue("a1", "a@example.com", AdminRole::Admin).unwrap();
        let root = tokens.issue("s1", "s@example.com", AdminRole::SuperAdmin).unwrap();

        let gate = with_role(state, AdminRole::SuperAdmin);
        assert_eq!(
            rejection_of(gate.clone(), Some(format!("Bearer {}", admin))).await,
            Some(403)
        );
        assert_eq!(rejection_of(gate, Some(format!("Bearer {}", root))).await, None);
    }
}
