use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reviewcrab_db::DbError;
use reviewcrab_github::GithubError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Database error
    Database(DbError),

    /// Rule store or PR source unreachable
    Upstream(GithubError),

    /// Unknown review id (404)
    NotFound(String),

    /// Decision on a review that is no longer pending (400)
    InvalidState { review_id: i64, status: String },

    /// Decision string outside {approve, reject} (400)
    InvalidDecision(String),

    /// External comment post failed; the review stays pending (502)
    PostFailed(String),

    /// Invalid request payload or query value (400)
    InvalidPayload(String),

    /// Internal server error
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::Upstream(e) => write!(f, "Upstream error: {}", e),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidState { review_id, status } => write!(
                f,
                "Review {} is not pending (current status: {})",
                review_id, status
            ),
            ApiError::InvalidDecision(decision) => write!(f, "Invalid decision: {}", decision),
            ApiError::PostFailed(msg) => write!(f, "Failed to post review comment: {}", msg),
            ApiError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::InvalidState { .. } => (StatusCode::BAD_REQUEST, "invalid_state"),
            ApiError::InvalidDecision(_) => (StatusCode::BAD_REQUEST, "invalid_decision"),
            ApiError::PostFailed(_) => (StatusCode::BAD_GATEWAY, "post_failed"),
            ApiError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "invalid_payload"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

// Conversions from domain errors to ApiError
impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        ApiError::Database(e)
    }
}

impl From<GithubError> for ApiError {
    fn from(e: GithubError) -> Self {
        ApiError::Upstream(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::InvalidPayload(format!("JSON parsing error: {}", e))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::InvalidState {
            review_id: 3,
            status: "posted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Review 3 is not pending (current status: posted)"
        );
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("Review not found: 9".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_decision_status() {
        let response = ApiError::InvalidDecision("maybe".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_post_failed_status() {
        let response = ApiError::PostFailed("comment rejected".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let api_err: ApiError = json_err.into();
        match api_err {
            ApiError::InvalidPayload(msg) => assert!(msg.contains("JSON parsing error")),
            _ => panic!("Expected InvalidPayload error"),
        }
    }
}
