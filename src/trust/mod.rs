//! Trust score core
//!
//! Pure functions over claim snapshots: predicate polarity classification,
//! trust-score aggregation, and the early-attestor bonus curve. Nothing in
//! this module touches the store or the ledger; callers feed it claim rows
//! and persist what it returns.

pub mod predicates;
pub mod rewards;
pub mod score;

pub use predicates::{polarity_of, Polarity, PREDICATE_CATALOG};
pub use rewards::{
    bonus_hundredths, claim_rank, compute_early_bonus, hundredths_to_units, EARLY_WINDOW,
};
pub use score::{compute_trust_score, TrustScoreBreakdown};
