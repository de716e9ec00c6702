//! Trust score document schema
//!
//! A cached view per subject, recomputed from the active claim set whenever
//! that set changes. Never authored directly.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::trust::TrustScoreBreakdown;

/// Collection name for trust scores
pub const TRUST_SCORE_COLLECTION: &str = "trust_scores";

/// Trust score document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TrustScoreDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Atom id of the scored subject
    pub atom_id: String,

    /// Derived percentage in [0, 100]
    pub score: f64,

    /// Aggregate stake behind positive predicates (decimal string)
    pub positive_stake: String,

    /// Aggregate stake behind negative predicates (decimal string)
    pub negative_stake: String,

    /// Number of active claims considered (neutral ones included)
    pub attestation_count: i64,
}

impl TrustScoreDoc {
    /// Build a score document from an aggregation result
    pub fn from_breakdown(atom_id: String, breakdown: &TrustScoreBreakdown) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            atom_id,
            score: breakdown.score,
            positive_stake: breakdown.positive_stake.to_string(),
            negative_stake: breakdown.negative_stake.to_string(),
            attestation_count: breakdown.count as i64,
        }
    }
}

impl IntoIndexes for TrustScoreDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "atom_id": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("atom_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for TrustScoreDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
