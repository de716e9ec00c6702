//! Error types for Trustgate

use hyper::StatusCode;

/// Main error type for Trustgate operations
///
/// Every failure a caller can see distinguishes "nothing happened, safe to
/// retry" from "something happened, do not blindly retry". The latter is
/// exactly [`TrustgateError::Unrecorded`]: the ledger accepted the stake but
/// the local claim row could not be written.
#[derive(Debug, thiserror::Error)]
pub enum TrustgateError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A natural-key insert collided with a concurrent creator. The workflow
    /// recovers from this by re-resolving; it should never reach a caller.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Re-stake attempted while the withdrawal cooldown for this
    /// (rater, subject) pair is still running.
    #[error("Cooldown active: {remaining_secs}s remaining before re-staking")]
    CooldownActive { remaining_secs: i64 },

    /// The stake was placed on the ledger but the local claim row was not
    /// written. The stake is real; a reconciliation sweep must pick it up.
    #[error("Stake placed on ledger (tx {transaction_hash}) but not recorded locally: {reason}")]
    Unrecorded {
        transaction_hash: String,
        reason: String,
    },

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrustgateError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::CooldownActive { .. } => StatusCode::CONFLICT,
            Self::Unrecorded { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ledger(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Duplicate(_) => "duplicate",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::Unrecorded { .. } => "unrecorded_stake",
            Self::Ledger(_) => "ledger_error",
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_error",
            Self::Http(_) => "http_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Whether retrying the whole workflow is safe for the caller.
    ///
    /// False specifically for the ledger-succeeded/persist-failed case where
    /// a blind retry would double-stake.
    pub fn safe_to_retry(&self) -> bool {
        !matches!(self, Self::Unrecorded { .. })
    }
}

// Implement From conversions for common error types

impl From<std::io::Error> for TrustgateError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for TrustgateError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for TrustgateError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for TrustgateError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<reqwest::Error> for TrustgateError {
    fn from(err: reqwest::Error) -> Self {
        Self::Ledger(err.to_string())
    }
}

/// Result type alias for Trustgate operations
pub type Result<T> = std::result::Result<T, TrustgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TrustgateError::CooldownActive { remaining_secs: 60 }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TrustgateError::Ledger("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TrustgateError::Database("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_unrecorded_is_not_retryable() {
        let err = TrustgateError::Unrecorded {
            transaction_hash: "0xabc".into(),
            reason: "store offline".into(),
        };
        assert!(!err.safe_to_retry());
        assert!(TrustgateError::Ledger("timeout".into()).safe_to_retry());
    }
}
