//! Turns every rejection into a JSON `{"detail": ...}` response

use serde_json::json;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use super::json_response;
use crate::error::LaunchpadError;

pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, detail) = if let Some(error) = err.find::<LaunchpadError>() {
        let status = error.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", error);
        } else {
            log::debug!("Request rejected: {}", error);
        }
        (status, error.public_message())
    } else if let Some(error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        log::debug!("Malformed request body: {}", error);
        (StatusCode::UNPROCESSABLE_ENTITY, "Malformed request body".to_string())
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::UNPROCESSABLE_ENTITY, "Malformed query string".to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "Origin not allowed".to_string())
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    let mut response = json_response(&json!({ "detail": detail }), status);
    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            warp::http::header::WWW_AUTHENTICATE,
            warp::http::HeaderValue::from_static("Bearer"),
        );
    }
    Ok(response.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = warp::hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_domain_error_mapping() {
        let response = handle_rejection(warp::reject::custom(LaunchpadError::InvalidCredentials))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
        assert_eq!(body_of(response).await["detail"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_storage_error_not_leaked() {
        let error = LaunchpadError::StorageError("connection refused to 10.0.0.5".to_string());
        let response = handle_rejection(warp::reject::custom(error)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["detail"], "Internal server error");
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = handle_rejection(warp::reject::not_found()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
