//! Wallet lookup route.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::error;

use crate::{AppState, routes::error_response};
use payflow_db::repositories::wallet::{WalletError, WalletRepository, WalletSnapshot};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/wallets/{wallet_id}", get(get_wallet))
}

/// Response for a wallet snapshot.
///
/// `balance` and `ledgerBalance` are minor-unit integer strings; the two
/// are equal whenever the store is consistent, so the endpoint doubles as
/// a reconciliation view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    /// Wallet id.
    pub id: i32,
    /// Stored balance in minor units.
    pub balance: String,
    /// Signed sum of all ledger entries, in minor units.
    pub ledger_balance: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Row creation timestamp.
    pub created_at: String,
    /// Row update timestamp.
    pub updated_at: String,
}

impl From<WalletSnapshot> for WalletResponse {
    fn from(snapshot: WalletSnapshot) -> Self {
        Self {
            id: snapshot.wallet.id,
            balance: snapshot.wallet.balance.to_string(),
            ledger_balance: snapshot.ledger_balance.to_string(),
            currency: snapshot.wallet.currency,
            created_at: snapshot.wallet.created_at.to_rfc3339(),
            updated_at: snapshot.wallet.updated_at.to_rfc3339(),
        }
    }
}

/// GET `/wallets/{wallet_id}` - Wallet snapshot with both balances.
async fn get_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<i32>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.snapshot(wallet_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(WalletResponse::from(snapshot))).into_response(),
        Err(err) => {
            if !matches!(err, WalletError::NotFound(_)) {
                error!(error = %err, wallet_id, "Wallet snapshot failed");
            }
            error_response(&err.into())
        }
    }
}
