//! Reward document schema
//!
//! An early-attestor bonus entitlement, materialized when the rater claims
//! it. Keyed by the originating claim's triple id, so re-claiming the same
//! entitlement is a no-op.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for rewards
pub const REWARD_COLLECTION: &str = "rewards";

/// Reward document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RewardDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Wallet entitled to the bonus
    pub recipient_wallet: String,

    /// Triple id of the originating claim (natural key)
    pub claim_triple_id: String,

    /// Subject the early rating was placed on
    pub subject_atom_id: String,

    /// 1-based position among the subject's first raters (1-10)
    pub rank: i32,

    /// Bonus amount in hundredths of the smallest token unit (decimal string)
    pub amount_hundredths: String,

    /// Whether the bonus has been claimed (false -> true exactly once)
    #[serde(default)]
    pub claimed: bool,
}

impl IntoIndexes for RewardDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One entitlement per originating claim
            (
                doc! { "claim_triple_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("claim_triple_id_unique".to_string())
                        .build(),
                ),
            ),
            // Per-rater reward listing
            (
                doc! { "recipient_wallet": 1, "claimed": 1 },
                Some(
                    IndexOptions::builder()
                        .name("recipient_claimed_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for RewardDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
