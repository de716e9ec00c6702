//! Configuration for Trustgate
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Chain id of the Intuition testnet, used when no explicit MultiVault
/// contract address is configured.
pub const INTUITION_TESTNET_CHAIN_ID: u64 = 13579;

/// MultiVault contract address on the Intuition testnet (fallback).
pub const INTUITION_TESTNET_MULTIVAULT: &str = "0xd51e5a3Cc9a1B8d84c3763e04cD48F14bb95DE68";

/// Trustgate - trust-score and attestation gateway for Urban Mayhem
#[derive(Parser, Debug, Clone)]
#[command(name = "trustgate")]
#[command(about = "Trust-score and attestation gateway for the Urban Mayhem storefront")]
pub struct Args {
    /// Unique node identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "trustgate")]
    pub mongodb_db: String,

    /// Base URL of the Intuition attestation node
    #[arg(long, env = "LEDGER_URL", default_value = "http://localhost:9500")]
    pub ledger_url: String,

    /// Chain id the ledger operates on
    #[arg(long, env = "CHAIN_ID", default_value_t = INTUITION_TESTNET_CHAIN_ID)]
    pub chain_id: u64,

    /// MultiVault contract address (required for chains other than the
    /// Intuition testnet, which has a built-in fallback)
    #[arg(long, env = "MULTIVAULT_ADDRESS")]
    pub multivault_address: Option<String>,

    /// Node signing key as a 32-byte hex seed. Used as the creator identity
    /// when seeding predicate atoms. Required in production; dev mode
    /// generates an ephemeral key when absent.
    #[arg(long, env = "SIGNER_KEY")]
    pub signer_key: Option<String>,

    /// Enable development mode (ephemeral signer key allowed)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Ledger request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Hours a rater must wait after withdrawing before re-staking on the
    /// same subject
    #[arg(long, env = "COOLDOWN_HOURS", default_value = "24")]
    pub cooldown_hours: i64,

    /// Maximum length of a review comment attached to an attestation
    #[arg(long, env = "MAX_COMMENT_LEN", default_value = "1000")]
    pub max_comment_len: usize,
}

impl Args {
    /// Validate configuration consistency before startup
    pub fn validate(&self) -> Result<(), String> {
        if self.multivault_address.is_none() && self.chain_id != INTUITION_TESTNET_CHAIN_ID {
            return Err(format!(
                "MULTIVAULT_ADDRESS is required for chain id {} (only the testnet {} has a fallback)",
                self.chain_id, INTUITION_TESTNET_CHAIN_ID
            ));
        }

        if let Some(key) = &self.signer_key {
            let bytes = hex::decode(key.trim_start_matches("0x"))
                .map_err(|e| format!("SIGNER_KEY is not valid hex: {}", e))?;
            if bytes.len() != 32 {
                return Err(format!(
                    "SIGNER_KEY must be a 32-byte hex seed, got {} bytes",
                    bytes.len()
                ));
            }
        } else if !self.dev_mode {
            return Err("SIGNER_KEY is required outside dev mode".to_string());
        }

        if self.cooldown_hours < 0 {
            return Err("COOLDOWN_HOURS must be non-negative".to_string());
        }

        Ok(())
    }

    /// The MultiVault address for the configured chain
    pub fn multivault(&self) -> String {
        self.multivault_address
            .clone()
            .unwrap_or_else(|| INTUITION_TESTNET_MULTIVAULT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["trustgate", "--dev-mode"])
    }

    #[test]
    fn test_testnet_fallback_multivault() {
        let args = base_args();
        assert_eq!(args.chain_id, INTUITION_TESTNET_CHAIN_ID);
        assert_eq!(args.multivault(), INTUITION_TESTNET_MULTIVAULT);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_other_chain_requires_multivault() {
        let mut args = base_args();
        args.chain_id = 1;
        assert!(args.validate().is_err());

        args.multivault_address = Some("0x0000000000000000000000000000000000000001".into());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_signer_key_required_outside_dev_mode() {
        let mut args = base_args();
        args.dev_mode = false;
        assert!(args.validate().is_err());

        args.signer_key = Some("00".repeat(32));
        assert!(args.validate().is_ok());

        args.signer_key = Some("abcd".into());
        assert!(args.validate().is_err());
    }
}
