//! Trust score aggregation
//!
//! Reduces the set of claims on a subject to a single percentage:
//! `100 * positive_stake / (positive_stake + negative_stake)`, with zero
//! total stake scoring 0. Stake sums are exact u128 arithmetic; stakes are
//! token amounts in the smallest unit and routinely exceed 2^53.

use serde::Serialize;

use crate::db::schemas::ClaimDoc;
use crate::trust::predicates::{polarity_of, Polarity};

/// Result of aggregating the claims on a subject
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrustScoreBreakdown {
    /// Percentage in [0, 100]
    pub score: f64,
    /// Sum of stakes behind positive predicates
    pub positive_stake: u128,
    /// Sum of stakes behind negative predicates
    pub negative_stake: u128,
    /// Number of active claims considered, neutral ones included
    pub count: u64,
}

impl TrustScoreBreakdown {
    pub fn zero() -> Self {
        Self {
            score: 0.0,
            positive_stake: 0,
            negative_stake: 0,
            count: 0,
        }
    }

    pub fn total_stake(&self) -> u128 {
        self.positive_stake + self.negative_stake
    }
}

/// Aggregate claims into a trust score.
///
/// Withdrawn claims are excluded entirely regardless of what the caller
/// passes in. Neutral-predicate claims count toward `count` only. An empty
/// or all-neutral set scores 0, not NaN.
pub fn compute_trust_score<'a, I>(claims: I) -> TrustScoreBreakdown
where
    I: IntoIterator<Item = &'a ClaimDoc>,
{
    let mut positive_stake: u128 = 0;
    let mut negative_stake: u128 = 0;
    let mut count: u64 = 0;

    for claim in claims {
        if !claim.is_active() {
            continue;
        }
        count += 1;

        let stake = claim.stake();
        match polarity_of(&claim.predicate_text) {
            Polarity::Positive => positive_stake += stake,
            Polarity::Negative => negative_stake += stake,
            Polarity::Neutral => {}
        }
    }

    let total = positive_stake + negative_stake;
    let score = if total > 0 {
        100.0 * positive_stake as f64 / total as f64
    } else {
        0.0
    };

    TrustScoreBreakdown {
        score,
        positive_stake,
        negative_stake,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::ClaimStatus;
    use crate::trust::predicates;

    fn claim(predicate: &str, stake: u128, status: ClaimStatus) -> ClaimDoc {
        ClaimDoc {
            triple_id: format!("triple-{}-{}", predicate, stake),
            subject_atom_id: "atom-x".into(),
            predicate_text: predicate.into(),
            object_atom_id: "atom-x".into(),
            stake_amount: stake.to_string(),
            status,
            ..Default::default()
        }
    }

    fn active(predicate: &str, stake: u128) -> ClaimDoc {
        claim(predicate, stake, ClaimStatus::Active)
    }

    #[test]
    fn test_all_positive_scores_100() {
        let claims = vec![
            active(predicates::IS_GREAT, 50),
            active(predicates::IS_HIGH_QUALITY, 25),
            active(predicates::IS_FAIR_PRICE, 1),
        ];
        let result = compute_trust_score(&claims);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.positive_stake, 76);
        assert_eq!(result.negative_stake, 0);
        assert_eq!(result.count, 3);
    }

    #[test]
    fn test_all_negative_scores_0() {
        let claims = vec![
            active(predicates::IS_BAD, 10),
            active(predicates::IS_OVERPRICED, 90),
        ];
        let result = compute_trust_score(&claims);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.negative_stake, 100);
    }

    #[test]
    fn test_empty_set_scores_0_not_nan() {
        let result = compute_trust_score(&[]);
        assert_eq!(result.score, 0.0);
        assert!(!result.score.is_nan());
        assert_eq!(result, TrustScoreBreakdown::zero());
    }

    #[test]
    fn test_all_neutral_scores_0_but_counts() {
        let claims = vec![
            active(predicates::IS_SKILLED, 500),
            active("some future predicate", 500),
        ];
        let result = compute_trust_score(&claims);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.total_stake(), 0);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_withdrawn_claims_are_excluded_entirely() {
        let claims = vec![
            active(predicates::IS_GREAT, 100),
            claim(predicates::IS_BAD, 1_000_000, ClaimStatus::Withdrawn),
        ];
        let result = compute_trust_score(&claims);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.negative_stake, 0);
        assert_eq!(result.count, 1);
    }

    #[test]
    fn test_buckets_sum_to_non_neutral_stakes() {
        let claims = vec![
            active(predicates::IS_GREAT, 30),
            active(predicates::IS_BAD, 20),
            active(predicates::IS_TOXIC, 999),
        ];
        let result = compute_trust_score(&claims);
        assert_eq!(result.positive_stake + result.negative_stake, 50);
        assert_eq!(result.score, 60.0);
    }

    #[test]
    fn test_stakes_beyond_f64_exact_range() {
        // 10^20 wei on each side; u128 sums stay exact
        let big = 100_000_000_000_000_000_000u128;
        let claims = vec![
            active(predicates::IS_GREAT, big),
            active(predicates::IS_BAD, big),
        ];
        let result = compute_trust_score(&claims);
        assert_eq!(result.positive_stake, big);
        assert_eq!(result.negative_stake, big);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_monotonicity_in_positive_stake() {
        let mut last = 0.0;
        for pos in [0u128, 10, 50, 200, 1000] {
            let claims = vec![
                active(predicates::IS_GREAT, pos),
                active(predicates::IS_BAD, 100),
            ];
            let score = compute_trust_score(&claims).score;
            assert!(score >= last, "score must not decrease as positive stake grows");
            last = score;
        }
    }

    #[test]
    fn test_monotonicity_in_negative_stake() {
        let mut last = 100.0;
        for neg in [0u128, 10, 50, 200, 1000] {
            let claims = vec![
                active(predicates::IS_GREAT, 100),
                active(predicates::IS_BAD, neg),
            ];
            let score = compute_trust_score(&claims).score;
            assert!(score <= last, "score must not increase as negative stake grows");
            last = score;
        }
    }
}
