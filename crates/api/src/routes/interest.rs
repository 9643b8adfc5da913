//! Interest accrual route.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{AppState, routes::error_response};
use payflow_db::repositories::interest::{AccrualError, InterestRepository};

/// Creates the interest accrual routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/interest/accruals", post(accrue_interest))
}

/// Request body for running an accrual over a date range.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrueInterestRequest {
    /// Wallet to accrue interest for.
    pub wallet_id: i32,
    /// First day of the range (inclusive, YYYY-MM-DD).
    pub from_date: NaiveDate,
    /// Last day of the range (inclusive, YYYY-MM-DD).
    pub to_date: NaiveDate,
}

/// Response for a completed accrual run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrualResponse {
    /// Wallet the accrual ran against.
    pub wallet_id: i32,
    /// First day of the range.
    pub from_date: NaiveDate,
    /// Last day of the range.
    pub to_date: NaiveDate,
    /// Total posted interest in major units, as a decimal string.
    pub total_interest: String,
    /// Number of calendar days processed.
    pub days_processed: u32,
}

/// POST `/interest/accruals` - Accrue daily compound interest.
async fn accrue_interest(
    State(state): State<AppState>,
    Json(request): Json<AccrueInterestRequest>,
) -> impl IntoResponse {
    let repo = InterestRepository::new((*state.db).clone(), state.interest.annual_rate);

    match repo
        .accrue(request.wallet_id, request.from_date, request.to_date)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(AccrualResponse {
                wallet_id: request.wallet_id,
                from_date: request.from_date,
                to_date: request.to_date,
                total_interest: outcome.total_interest.to_string(),
                days_processed: outcome.days_processed,
            }),
        )
            .into_response(),
        Err(err) => {
            if !matches!(err, AccrualError::Rule(_) | AccrualError::WalletNotFound(_)) {
                error!(error = %err, wallet_id = request.wallet_id, "Interest accrual failed");
            }
            error_response(&err.into())
        }
    }
}
