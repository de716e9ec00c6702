//! Persistent store collaborator
//!
//! The workflow talks to persistence only through [`TrustStore`]. The
//! contract deliberately assumes no cross-call transactions: idempotent
//! creation rests on natural-key uniqueness (duplicate inserts come back as
//! `TrustgateError::Duplicate`), and the reward claim transition is a
//! single atomic compare-and-set.

pub mod mongo_store;

#[cfg(any(test, feature = "mocks"))]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::schemas::{ClaimDoc, RewardDoc, SubjectDoc, SubjectKind, TrustScoreDoc};
use crate::types::Result;

pub use mongo_store::MongoStore;

#[cfg(any(test, feature = "mocks"))]
pub use memory::MemoryStore;

/// Persistence operations the workflow depends on
#[async_trait]
pub trait TrustStore: Send + Sync {
    /// Exact-match lookup by natural key
    async fn find_subject(&self, kind: SubjectKind, key: &str) -> Result<Option<SubjectDoc>>;

    /// Insert a subject; a concurrent creator surfaces as `Duplicate`
    async fn insert_subject(&self, doc: SubjectDoc) -> Result<()>;

    /// Record a claim row (post-ledger)
    async fn insert_claim(&self, doc: ClaimDoc) -> Result<()>;

    /// Lookup a claim by its ledger triple id
    async fn find_claim(&self, triple_id: &str) -> Result<Option<ClaimDoc>>;

    /// Flip a claim to withdrawn and stamp its cooldown
    async fn withdraw_claim(&self, triple_id: &str, cooldown_until: DateTime<Utc>) -> Result<()>;

    /// All active claims for a subject, creation time ascending
    async fn active_claims_for_subject(&self, atom_id: &str) -> Result<Vec<ClaimDoc>>;

    /// Most recent active claims for a subject, newest first
    async fn recent_claims_for_subject(&self, atom_id: &str, limit: i64) -> Result<Vec<ClaimDoc>>;

    /// The subject's earliest claims regardless of status, creation time
    /// ascending, bounded by `limit`. This is the early-bonus ranking query.
    async fn first_claims_for_subject(&self, atom_id: &str, limit: i64) -> Result<Vec<ClaimDoc>>;

    /// All active claims placed by a rater
    async fn active_claims_by_rater(&self, wallet: &str) -> Result<Vec<ClaimDoc>>;

    /// Latest re-stake cooldown for a (rater, subject) pair, if any
    async fn cooldown_until(
        &self,
        wallet: &str,
        subject_atom_id: &str,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Write the cached trust score for a subject
    async fn upsert_trust_score(&self, doc: TrustScoreDoc) -> Result<()>;

    /// Read the cached trust score for a subject
    async fn trust_score(&self, atom_id: &str) -> Result<Option<TrustScoreDoc>>;

    /// Insert a reward entitlement unless one already exists for the
    /// originating claim. Returns whether a row was inserted.
    async fn insert_reward_if_absent(&self, doc: RewardDoc) -> Result<bool>;

    /// Atomically transition a reward from unclaimed to claimed. Returns
    /// whether this call performed the transition.
    async fn mark_reward_claimed(&self, claim_triple_id: &str) -> Result<bool>;

    /// All reward rows for a rater, claimed or not
    async fn rewards_for(&self, wallet: &str) -> Result<Vec<RewardDoc>>;
}
