//! Claim (attestation) document schema
//!
//! A claim is a staked assertion that a subject satisfies a predicate,
//! recorded after the ledger accepted the stake. Stake amounts are stored
//! as decimal strings because they are token amounts in the smallest unit
//! (wei scale, beyond i64 and beyond f64's exact range).

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for claims
pub const CLAIM_COLLECTION: &str = "claims";

/// Claim lifecycle status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Stake is live and counts toward the subject's trust score
    #[default]
    Active,
    /// Stake was withdrawn; excluded from scoring, kept for the audit trail
    Withdrawn,
}

/// Claim document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ClaimDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Ledger triple id (canonical claim identifier)
    pub triple_id: String,

    /// Atom id of the subject being attested about
    pub subject_atom_id: String,

    /// Atom id of the predicate
    pub predicate_atom_id: String,

    /// Predicate text, denormalized so aggregation is a single query
    pub predicate_text: String,

    /// Atom id of the object (same as subject for simple ratings)
    pub object_atom_id: String,

    /// Stake amount in the token's smallest unit, as a decimal string
    pub stake_amount: String,

    /// Wallet of the rater who placed the stake
    pub creator_wallet: String,

    /// Ledger transaction hash for the stake
    pub transaction_hash: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: ClaimStatus,

    /// Optional review text (bounded length, validated upstream)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// After withdrawal: when the same rater may re-stake on this subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_until: Option<DateTime>,
}

impl ClaimDoc {
    /// Parse the stake amount. A row with an unparseable amount is treated
    /// as zero stake and logged; it still counts toward the claim count.
    pub fn stake(&self) -> u128 {
        match self.stake_amount.parse::<u128>() {
            Ok(v) => v,
            Err(_) => {
                warn!(
                    triple_id = %self.triple_id,
                    stake_amount = %self.stake_amount,
                    "Claim has unparseable stake amount, counting as zero"
                );
                0
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ClaimStatus::Active
    }
}

impl IntoIndexes for ClaimDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Triple id is the canonical claim identity
            (
                doc! { "triple_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("triple_id_unique".to_string())
                        .build(),
                ),
            ),
            // Score aggregation: active claims for a subject in time order
            (
                doc! { "subject_atom_id": 1, "status": 1, "metadata.created_at": 1 },
                Some(
                    IndexOptions::builder()
                        .name("subject_status_time_index".to_string())
                        .build(),
                ),
            ),
            // Rewards: claims by rater
            (
                doc! { "creator_wallet": 1, "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("creator_status_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ClaimDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
