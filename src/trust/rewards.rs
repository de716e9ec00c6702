//! Early-attestor bonus computation
//!
//! The first 10 raters of a subject earn a decaying bonus: 10% of their
//! stake for the first, down to 1% for the 10th, nothing after. Amounts are
//! carried in hundredths of the smallest token unit so the curve is exact
//! integer arithmetic (10% of stake S is `S * 10` hundredths).

use std::collections::HashMap;

use crate::db::schemas::ClaimDoc;

/// How many claims per subject qualify for the bonus
pub const EARLY_WINDOW: usize = 10;

/// Zero-based rank of a claim among a subject's earliest claims.
///
/// `first_claims` must be the subject's claims ordered by creation time
/// ascending, truncated to [`EARLY_WINDOW`]. Ranking runs over all claims
/// ever made (withdrawn included): a withdrawn early stake still occupied
/// its slot.
pub fn claim_rank(first_claims: &[ClaimDoc], triple_id: &str) -> Option<usize> {
    first_claims
        .iter()
        .take(EARLY_WINDOW)
        .position(|c| c.triple_id == triple_id)
}

/// Bonus for a stake at the given zero-based rank, in hundredths.
///
/// Rank 0 earns `stake * 10` (10%), rank 9 earns `stake * 1` (1%),
/// rank >= 10 earns 0.
pub fn bonus_hundredths(stake: u128, rank: usize) -> u128 {
    if rank >= EARLY_WINDOW {
        return 0;
    }
    stake * (EARLY_WINDOW - rank) as u128
}

/// Total early-attestor bonus for a rater, in hundredths.
///
/// `first_claims_by_subject` maps subject atom id to that subject's first
/// [`EARLY_WINDOW`] claims in creation order. Only the rater's active claims
/// contribute; a claim whose subject is missing from the map contributes
/// nothing. Additive across subjects.
pub fn compute_early_bonus(
    first_claims_by_subject: &HashMap<String, Vec<ClaimDoc>>,
    rater_claims: &[ClaimDoc],
) -> u128 {
    let mut total: u128 = 0;

    for claim in rater_claims {
        if !claim.is_active() {
            continue;
        }
        let Some(first_claims) = first_claims_by_subject.get(&claim.subject_atom_id) else {
            continue;
        };
        if let Some(rank) = claim_rank(first_claims, &claim.triple_id) {
            total += bonus_hundredths(claim.stake(), rank);
        }
    }

    total
}

/// Convert a hundredths amount to whole token units for display
pub fn hundredths_to_units(hundredths: u128) -> f64 {
    hundredths as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{ClaimDoc, ClaimStatus};

    fn claim(triple_id: &str, subject: &str, creator: &str, stake: u128) -> ClaimDoc {
        ClaimDoc {
            triple_id: triple_id.into(),
            subject_atom_id: subject.into(),
            predicate_text: "is great".into(),
            object_atom_id: subject.into(),
            stake_amount: stake.to_string(),
            creator_wallet: creator.into(),
            status: ClaimStatus::Active,
            ..Default::default()
        }
    }

    fn subject_history(subject: &str, claims: Vec<ClaimDoc>) -> HashMap<String, Vec<ClaimDoc>> {
        let mut map = HashMap::new();
        map.insert(subject.to_string(), claims);
        map
    }

    #[test]
    fn test_first_rater_earns_ten_percent() {
        let first = vec![claim("t1", "item-x", "alice", 100)];
        let history = subject_history("item-x", first.clone());
        let bonus = compute_early_bonus(&history, &first);
        // 0.10 x 100 = 10 units = 1000 hundredths
        assert_eq!(bonus, 1000);
        assert_eq!(hundredths_to_units(bonus), 10.0);
    }

    #[test]
    fn test_second_rater_earns_nine_percent() {
        let all: Vec<ClaimDoc> = vec![
            claim("t1", "item-x", "alice", 100),
            claim("t2", "item-x", "bob", 100),
        ];
        let history = subject_history("item-x", all.clone());
        let bobs: Vec<ClaimDoc> = vec![all[1].clone()];
        // rank index 1 -> multiplier 9/100 -> 9 units
        assert_eq!(compute_early_bonus(&history, &bobs), 900);
    }

    #[test]
    fn test_tenth_earns_one_percent_eleventh_earns_nothing() {
        let all: Vec<ClaimDoc> = (0..11)
            .map(|i| claim(&format!("t{}", i), "item-y", &format!("rater{}", i), 100))
            .collect();
        let history = subject_history("item-y", all[..EARLY_WINDOW].to_vec());

        let tenth = vec![all[9].clone()];
        assert_eq!(compute_early_bonus(&history, &tenth), 100); // 0.01 x 100

        let eleventh = vec![all[10].clone()];
        assert_eq!(compute_early_bonus(&history, &eleventh), 0);
    }

    #[test]
    fn test_eleven_raters_total_five_and_a_half_units() {
        // 11 raters each stake 10 units; paid bonuses sum to
        // 10 x (0.10 + 0.09 + ... + 0.01) = 5.5 units
        let all: Vec<ClaimDoc> = (0..11)
            .map(|i| claim(&format!("t{}", i), "item-z", &format!("rater{}", i), 10))
            .collect();
        let history = subject_history("item-z", all[..EARLY_WINDOW].to_vec());

        let total: u128 = all
            .iter()
            .map(|c| compute_early_bonus(&history, std::slice::from_ref(c)))
            .sum();
        assert_eq!(total, 550);
        assert_eq!(hundredths_to_units(total), 5.5);
    }

    #[test]
    fn test_fewer_than_ten_claims_still_rank_positionally() {
        let all: Vec<ClaimDoc> = vec![
            claim("t1", "item-x", "alice", 200),
            claim("t2", "item-x", "bob", 200),
            claim("t3", "item-x", "carol", 200),
        ];
        let history = subject_history("item-x", all.clone());
        let carols = vec![all[2].clone()];
        // rank index 2 -> 8% of 200 = 16 units
        assert_eq!(compute_early_bonus(&history, &carols), 1600);
    }

    #[test]
    fn test_additive_across_subjects() {
        let x = vec![claim("t1", "item-x", "alice", 100)];
        let y = vec![
            claim("t2", "item-y", "bob", 50),
            claim("t3", "item-y", "alice", 100),
        ];
        let mut history = HashMap::new();
        history.insert("item-x".to_string(), x.clone());
        history.insert("item-y".to_string(), y.clone());

        let alices = vec![x[0].clone(), y[1].clone()];
        // 10% of 100 on item-x + 9% of 100 on item-y = 10 + 9 units
        assert_eq!(compute_early_bonus(&history, &alices), 1900);
    }

    #[test]
    fn test_withdrawn_rater_claim_earns_nothing_but_holds_its_slot() {
        let mut first = claim("t1", "item-x", "alice", 100);
        first.status = ClaimStatus::Withdrawn;
        let second = claim("t2", "item-x", "bob", 100);
        let history = subject_history("item-x", vec![first.clone(), second.clone()]);

        // Alice withdrew: no bonus for her
        assert_eq!(compute_early_bonus(&history, &[first]), 0);
        // Bob is still rank 1, not rank 0
        assert_eq!(compute_early_bonus(&history, &[second]), 900);
    }

    #[test]
    fn test_rank_bounds() {
        assert_eq!(bonus_hundredths(100, 0), 1000);
        assert_eq!(bonus_hundredths(100, 9), 100);
        assert_eq!(bonus_hundredths(100, 10), 0);
        assert_eq!(bonus_hundredths(100, usize::MAX), 0);
    }
}
