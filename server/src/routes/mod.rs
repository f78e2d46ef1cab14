//! HTTP route handlers

pub mod health;
pub mod labels;
pub mod predict;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use signlang::SignLangError;

/// Body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can return
#[derive(Debug)]
pub enum ApiError {
    /// Anything wrong with the request body
    InvalidInput,
    /// Failure on the server side
    Internal(String),
}

impl From<SignLangError> for ApiError {
    fn from(err: SignLangError) -> Self {
        match err {
            SignLangError::InvalidInput(_) => ApiError::InvalidInput,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::InvalidInput => (StatusCode::BAD_REQUEST, "Invalid input".to_string()),
            ApiError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_maps_to_400() {
        let err = ApiError::from(SignLangError::InvalidInput("expected 63 values, got 2".to_string()));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, serde_json::json!({ "error": "Invalid input" }));
    }

    #[tokio::test]
    async fn test_other_errors_map_to_500() {
        let err = ApiError::from(SignLangError::Inference("forward pass failed".to_string()));
        assert!(matches!(err, ApiError::Internal(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("forward pass failed"));
    }
}
