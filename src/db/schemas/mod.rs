//! Document schemas for the attestation cache
//!
//! These collections mirror ledger state (atoms and triples) plus the
//! derived views (trust scores, rewards) computed from them. Claims are
//! never deleted; withdrawal only flips their status, so the collection
//! doubles as the audit trail.

pub mod claim;
pub mod metadata;
pub mod reward;
pub mod subject;
pub mod trust_score;

pub use claim::{ClaimDoc, ClaimStatus, CLAIM_COLLECTION};
pub use metadata::Metadata;
pub use reward::{RewardDoc, REWARD_COLLECTION};
pub use subject::{SubjectDoc, SubjectKind, SUBJECT_COLLECTION};
pub use trust_score::{TrustScoreDoc, TRUST_SCORE_COLLECTION};
