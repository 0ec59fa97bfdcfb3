use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Root banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "reviewcrab API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
