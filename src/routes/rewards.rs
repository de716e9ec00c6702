//! Early-attestor reward endpoints
//!
//! - `GET /api/v1/rewards/{wallet}` - staked totals and bonus entitlements
//! - `POST /api/v1/rewards/{wallet}/claim` - claim outstanding entitlements
//!
//! Bonus amounts are reported in hundredths of the smallest token unit so
//! the decay curve stays exact in integers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use crate::routes::{error_response, json_response};
use crate::server::AppState;
use crate::types::TrustgateError;

fn validate_wallet(wallet: &str) -> Result<(), TrustgateError> {
    if wallet.trim().is_empty() {
        return Err(TrustgateError::BadRequest("Wallet address is required".into()));
    }
    Ok(())
}

/// Handle GET /api/v1/rewards/{wallet}
pub async fn handle_rewards_summary(
    state: Arc<AppState>,
    wallet: &str,
) -> Response<Full<Bytes>> {
    if let Err(e) = validate_wallet(wallet) {
        return error_response(&e);
    }

    match state.service.rewards_summary(wallet).await {
        Ok(summary) => json_response(StatusCode::OK, &summary),
        Err(e) => error_response(&e),
    }
}

/// Handle POST /api/v1/rewards/{wallet}/claim
pub async fn handle_claim_rewards(state: Arc<AppState>, wallet: &str) -> Response<Full<Bytes>> {
    if let Err(e) = validate_wallet(wallet) {
        return error_response(&e);
    }

    match state.service.claim_rewards(wallet).await {
        Ok(outcome) => json_response(StatusCode::OK, &outcome),
        Err(e) => error_response(&e),
    }
}
