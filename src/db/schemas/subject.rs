//! Subject document schema
//!
//! A subject is anything that can carry staked claims: a catalog item, a
//! player account, or a predicate (claim template). All three are atoms on
//! the ledger; this collection caches them under their natural key
//! (kind, external key) so resolution is a lookup instead of a chain query.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for subjects
pub const SUBJECT_COLLECTION: &str = "subjects";

/// Kind of entity a subject record describes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A catalog item (point package or cosmetic skin), keyed by SKU
    #[default]
    Item,
    /// A player account, keyed by wallet address
    Player,
    /// A claim template ("is great", "is overpriced", ...), keyed by its text
    Predicate,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Player => "player",
            Self::Predicate => "predicate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item" => Some(Self::Item),
            "player" => Some(Self::Player),
            "predicate" => Some(Self::Predicate),
            _ => None,
        }
    }
}

/// Subject document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SubjectDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Ledger atom id (canonical identifier for claims)
    pub atom_id: String,

    /// Entity kind (item, player, predicate)
    pub entity_kind: SubjectKind,

    /// Stable external key: item SKU, wallet address, or predicate text
    pub entity_key: String,

    /// URI of the atom's off-chain data
    #[serde(default)]
    pub atom_uri: String,

    /// Wallet that created the atom
    #[serde(default)]
    pub creator_wallet: String,

    /// Display name, when known (items)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SubjectDoc {
    /// Create a new subject document
    pub fn new(atom_id: String, entity_kind: SubjectKind, entity_key: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            atom_id,
            entity_kind,
            entity_key,
            atom_uri: String::new(),
            creator_wallet: String::new(),
            display_name: None,
        }
    }
}

impl IntoIndexes for SubjectDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // At most one subject per (kind, external key). The uniqueness of
            // this index is what makes concurrent find-or-create converge.
            (
                doc! { "entity_kind": 1, "entity_key": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("entity_natural_key_unique".to_string())
                        .build(),
                ),
            ),
            // Claims reference subjects by atom id
            (
                doc! { "atom_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("atom_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SubjectDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
