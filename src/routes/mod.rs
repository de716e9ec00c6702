//! HTTP routes for Trustgate

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;

use crate::types::TrustgateError;

pub mod attestations;
pub mod health;
pub mod rewards;
pub mod scores;
pub mod seed;

pub use attestations::{
    handle_create_attestation, handle_list_attestations, handle_withdraw_attestation,
};
pub use health::{health_check, readiness_check, version_info};
pub use rewards::{handle_claim_rewards, handle_rewards_summary};
pub use scores::handle_trust_score;
pub use seed::handle_seed_predicates;

/// Error body sent to API clients
#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    code: &'static str,
    /// Whether the caller may retry the whole operation
    retryable: bool,
    /// Seconds until a cooldown-rejected re-stake becomes possible
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<i64>,
    /// Ledger transaction hash for stakes that were placed but not recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_hash: Option<String>,
}

/// Build a JSON response with the given status
pub fn json_response<T: Serialize>(status: StatusCode, data: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(data).unwrap_or_default();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| fallback_response())
}

/// Translate a workflow error into its HTTP shape.
///
/// Cooldown rejections carry the remaining wait, and unrecorded stakes carry
/// the transaction hash so the caller can show it instead of retrying.
pub fn error_response(err: &TrustgateError) -> Response<Full<Bytes>> {
    let retry_after_secs = match err {
        TrustgateError::CooldownActive { remaining_secs } => Some(*remaining_secs),
        _ => None,
    };
    let transaction_hash = match err {
        TrustgateError::Unrecorded {
            transaction_hash, ..
        } => Some(transaction_hash.clone()),
        _ => None,
    };

    let body = ApiError {
        error: err.to_string(),
        code: err.code(),
        retryable: err.safe_to_retry(),
        retry_after_secs,
        transaction_hash,
    };

    let mut builder = Response::builder()
        .status(err.status_code())
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*");
    if let Some(secs) = retry_after_secs {
        builder = builder.header("Retry-After", secs.to_string());
    }

    builder
        .body(Full::new(Bytes::from(
            serde_json::to_vec(&body).unwrap_or_default(),
        )))
        .unwrap_or_else(|_| fallback_response())
}

/// CORS preflight response
pub fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header(
            "Access-Control-Allow-Headers",
            "Content-Type, X-Wallet-Address",
        )
        .header("Access-Control-Max-Age", "86400")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| fallback_response())
}

/// 404 for unmatched routes
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    error_response(&TrustgateError::NotFound(format!(
        "No route for {}",
        path
    )))
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(r#"{"error":"Internal error"}"#)));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Parse a query string into a key-value map
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    if query.is_empty() {
        return HashMap::new();
    }

    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("atom_id=atom-1&limit=5");
        assert_eq!(params.get("atom_id").map(String::as_str), Some("atom-1"));
        assert_eq!(params.get("limit").map(String::as_str), Some("5"));
        assert!(parse_query_params("").is_empty());
    }

    #[test]
    fn test_cooldown_error_carries_retry_after() {
        let response = error_response(&TrustgateError::CooldownActive {
            remaining_secs: 120,
        });
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok()),
            Some("120")
        );
    }
}
