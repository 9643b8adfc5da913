//! API route definitions.

use axum::{Json, Router, http::StatusCode, response::Response};
use serde_json::json;

use crate::AppState;
use payflow_shared::error::AppError;

pub mod health;
pub mod interest;
pub mod transfers;
pub mod wallets;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transfers::routes())
        .merge(interest::routes())
        .merge(wallets::routes())
}

/// Builds the JSON error response for an `AppError`.
pub fn error_response(err: &AppError) -> Response {
    use axum::response::IntoResponse;

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}
