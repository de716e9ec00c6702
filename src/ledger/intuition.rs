//! HTTP client for an Intuition attestation node
//!
//! Speaks to the node's REST surface: `POST /v1/atoms` to mint an atom and
//! `POST /v1/triples` to place a staked triple against the MultiVault
//! contract. The triple submission uses the contract's four-array calldata
//! shape (subject ids, predicate ids, object ids, assets), one entry each.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::ledger::{AtomReceipt, AtomSpec, ClaimReceipt, ClaimSubmission, Ledger};
use crate::types::{Result, TrustgateError};

/// Configuration for the Intuition node client
#[derive(Debug, Clone)]
pub struct IntuitionConfig {
    /// Base URL of the attestation node
    pub base_url: String,
    /// Chain id the node operates on
    pub chain_id: u64,
    /// MultiVault contract address for that chain
    pub multivault_address: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Ledger implementation backed by an Intuition node
pub struct IntuitionLedger {
    config: IntuitionConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CreateAtomRequest<'a> {
    chain_id: u64,
    multivault_address: &'a str,
    creator: &'a str,
    #[serde(flatten)]
    spec: &'a AtomSpec,
}

#[derive(Serialize)]
struct CreateTripleRequest<'a> {
    chain_id: u64,
    multivault_address: &'a str,
    creator: &'a str,
    subject_ids: [&'a str; 1],
    predicate_ids: [&'a str; 1],
    object_ids: [&'a str; 1],
    /// Stakes in the smallest unit, as decimal strings
    assets: [String; 1],
    /// Transaction value, equal to the total staked
    value: String,
}

#[derive(Deserialize)]
struct NodeError {
    error: String,
}

impl IntuitionLedger {
    pub fn new(config: IntuitionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrustgateError::Config(format!("Ledger client init failed: {}", e)))?;

        info!(
            base_url = %config.base_url,
            chain_id = config.chain_id,
            multivault = %config.multivault_address,
            "Intuition ledger client created"
        );

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Read an error body if the node sent one, else use the status line
    async fn decode_failure(response: reqwest::Response) -> TrustgateError {
        let status = response.status();
        match response.json::<NodeError>().await {
            Ok(body) => TrustgateError::Ledger(format!("{}: {}", status, body.error)),
            Err(_) => TrustgateError::Ledger(format!("Ledger rejected request: {}", status)),
        }
    }
}

#[async_trait]
impl Ledger for IntuitionLedger {
    async fn create_atom(&self, spec: &AtomSpec, creator: &str) -> Result<AtomReceipt> {
        debug!(?spec, creator, "Minting atom on ledger");

        let request = CreateAtomRequest {
            chain_id: self.config.chain_id,
            multivault_address: &self.config.multivault_address,
            creator,
            spec,
        };

        let response = self
            .client
            .post(self.url("/v1/atoms"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::decode_failure(response).await);
        }

        let receipt: AtomReceipt = response.json().await?;
        info!(atom_id = %receipt.atom_id, tx = %receipt.transaction_hash, "Atom minted");
        Ok(receipt)
    }

    async fn submit_claim(
        &self,
        submission: &ClaimSubmission,
        creator: &str,
    ) -> Result<ClaimReceipt> {
        debug!(
            subject = %submission.subject_atom_id,
            predicate = %submission.predicate_atom_id,
            object = %submission.object_atom_id,
            stake = submission.stake_amount,
            "Submitting staked claim to ledger"
        );

        let stake = submission.stake_amount.to_string();
        let request = CreateTripleRequest {
            chain_id: self.config.chain_id,
            multivault_address: &self.config.multivault_address,
            creator,
            subject_ids: [&submission.subject_atom_id],
            predicate_ids: [&submission.predicate_atom_id],
            object_ids: [&submission.object_atom_id],
            assets: [stake.clone()],
            value: stake,
        };

        let response = self
            .client
            .post(self.url("/v1/triples"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::decode_failure(response).await);
        }

        let receipt: ClaimReceipt = response.json().await?;
        info!(
            triple_id = %receipt.triple_id,
            tx = %receipt.transaction_hash,
            "Claim placed on ledger"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let ledger = IntuitionLedger::new(IntuitionConfig {
            base_url: "http://localhost:9500/".into(),
            chain_id: 13579,
            multivault_address: "0xd51e".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(ledger.url("/v1/atoms"), "http://localhost:9500/v1/atoms");
    }
}
