//! Shared document envelope
//!
//! Every cached row carries the same stamps: created, last updated, and a
//! soft-delete flag. Claims are never hard-deleted (withdrawal is a status
//! flip), so the flag exists for rows tombstoned operationally; all reads
//! filter it.

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Timestamps and soft-delete flag carried by every collection row
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Metadata {
    /// Soft-delete flag; finds exclude rows where this is set
    #[serde(default)]
    pub is_deleted: bool,

    /// When the row was soft-deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    /// Last mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    /// First insert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Metadata {
    /// Fresh metadata stamped with the current time
    pub fn new() -> Self {
        let now = DateTime::now();
        Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: Some(now),
            created_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_both_timestamps() {
        let metadata = Metadata::new();
        assert!(!metadata.is_deleted);
        assert!(metadata.deleted_at.is_none());
        assert_eq!(metadata.created_at, metadata.updated_at);
        assert!(metadata.created_at.is_some());
    }
}
