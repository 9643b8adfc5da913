//! Wallet-to-wallet transfer route.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{AppState, routes::error_response};
use payflow_core::transfer::TransferInput;
use payflow_db::repositories::transfer::{TransferError, TransferRepository};
use payflow_shared::error::AppError;
use payflow_shared::types::amount::parse_amount;

/// Default currency for transfers that omit one.
const DEFAULT_CURRENCY: &str = "USD";

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(create_transfer))
}

/// Request body for creating a transfer.
///
/// `amount` is a string so arbitrary-precision integers survive JSON
/// transport without a float path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    /// Source wallet id.
    pub from_wallet_id: i32,
    /// Destination wallet id.
    pub to_wallet_id: i32,
    /// Transfer amount in minor units, as a base-10 integer string.
    pub amount: String,
    /// ISO 4217 currency code (defaults to USD).
    pub currency: Option<String>,
    /// Optional caller reference.
    pub reference: Option<String>,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Idempotency key; the `Idempotency-Key` header takes precedence.
    pub idempotency_key: Option<String>,
}

/// Resolves the idempotency key from the header or request body.
///
/// The `Idempotency-Key` header wins over the body field. The key is
/// required and must be a UUID.
fn resolve_idempotency_key(
    headers: &HeaderMap,
    body_key: Option<&str>,
) -> Result<String, AppError> {
    let key = headers
        .get("idempotency-key")
        .and_then(|value| value.to_str().ok())
        .or(body_key)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::Validation("Idempotency key is required".to_string()))?;

    Uuid::parse_str(key)
        .map_err(|_| AppError::Validation("Idempotency key must be a UUID".to_string()))?;
    Ok(key.to_string())
}

/// POST `/transfers` - Execute an idempotent wallet-to-wallet transfer.
///
/// Replays of a completed key return the stored receipt with 200.
async fn create_transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateTransferRequest>,
) -> impl IntoResponse {
    let idempotency_key =
        match resolve_idempotency_key(&headers, request.idempotency_key.as_deref()) {
            Ok(key) => key,
            Err(err) => return error_response(&err),
        };

    let amount = match parse_amount(&request.amount) {
        Ok(amount) => amount,
        Err(err) => return error_response(&AppError::Validation(err.to_string())),
    };

    let input = TransferInput {
        idempotency_key,
        from_wallet_id: request.from_wallet_id,
        to_wallet_id: request.to_wallet_id,
        amount,
        currency: request
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        reference: request.reference,
        description: request.description,
    };

    let repo = TransferRepository::new((*state.db).clone());
    match repo.execute(input).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => {
            match &err {
                TransferError::IdempotencyConflict | TransferError::KeyAlreadyFailed => {
                    warn!(error = %err, "Transfer rejected on idempotency");
                }
                TransferError::Rule(_) | TransferError::WalletNotFound => {}
                _ => error!(error = %err, "Transfer failed"),
            }
            error_response(&err.into())
        }
    }
}
