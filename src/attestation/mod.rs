//! Attestation workflow
//!
//! Coordinates one rating submission end to end: resolve the subject and
//! predicate atoms, place the stake on the ledger, record the claim, and
//! recompute the subject's cached trust score. Withdrawal and reward
//! accounting live here too.

pub mod events;
pub mod workflow;

pub use events::{ScoreEvent, ScoreEvents};
pub use workflow::{
    AttestOutcome, AttestRequest, AttestationService, ClaimRewardsOutcome, RewardEntry,
    RewardsSummary, SubjectSpec, WorkflowConfig,
};
