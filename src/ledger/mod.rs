//! Ledger collaborator
//!
//! The attestation ledger is authoritative for whether a stake was actually
//! placed; the local claim rows are a cache/index of it. Trustgate only ever
//! talks to it through the [`Ledger`] trait: create atoms for subjects and
//! predicates, submit staked triples, receive receipts.

pub mod intuition;
#[cfg(any(test, feature = "mocks"))]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Result;

pub use intuition::IntuitionLedger;
#[cfg(any(test, feature = "mocks"))]
pub use mock::MockLedger;

/// What kind of atom to mint, mirroring the ledger SDK's three creators
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AtomSpec {
    /// A rich "thing" atom for a catalog item
    Thing {
        name: String,
        description: String,
        image: String,
        url: String,
    },
    /// An account atom for a player wallet
    Account { address: String },
    /// A plain string atom for a predicate
    Text { value: String },
}

/// Receipt for a minted atom
#[derive(Debug, Clone, Deserialize)]
pub struct AtomReceipt {
    /// Canonical atom id (term id) on the ledger
    pub atom_id: String,
    /// URI of the atom's off-chain data
    #[serde(default)]
    pub atom_uri: String,
    /// Transaction hash of the mint
    pub transaction_hash: String,
    /// Wallet that created the atom
    #[serde(default)]
    pub creator: String,
}

/// A staked triple ready for submission
#[derive(Debug, Clone, Serialize)]
pub struct ClaimSubmission {
    pub subject_atom_id: String,
    pub predicate_atom_id: String,
    pub object_atom_id: String,
    /// Stake in the token's smallest unit
    pub stake_amount: u128,
}

/// Receipt for a submitted claim
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimReceipt {
    /// Canonical triple id on the ledger
    pub triple_id: String,
    /// Transaction hash of the stake
    pub transaction_hash: String,
    /// Wallet the stake was placed from
    #[serde(default)]
    pub creator: String,
}

/// External attestation ledger
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Mint an atom. Side-effecting: costs a transaction.
    async fn create_atom(&self, spec: &AtomSpec, creator: &str) -> Result<AtomReceipt>;

    /// Place a staked claim. Success means the stake is real, whatever
    /// happens to the local record afterwards.
    async fn submit_claim(&self, submission: &ClaimSubmission, creator: &str)
        -> Result<ClaimReceipt>;
}
