//! Predicate catalog and polarity classification
//!
//! Predicate text is the natural key; polarity is a static lookup, never
//! stored per claim. Text outside the catalog classifies as neutral.

/// How a predicate weighs into a subject's trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Stake counts toward the positive bucket
    Positive,
    /// Stake counts toward the negative bucket
    Negative,
    /// Counted, but contributes to neither bucket
    Neutral,
}

pub const IS_GREAT: &str = "is great";
pub const IS_BAD: &str = "is bad";
pub const IS_OVERPRICED: &str = "is overpriced";
pub const IS_FAIR_PRICE: &str = "is fair price";
pub const IS_HIGH_QUALITY: &str = "is high quality";
pub const IS_TOXIC: &str = "is toxic";
pub const IS_TRUSTWORTHY: &str = "is trustworthy";
pub const IS_SKILLED: &str = "is skilled";
pub const HAS_GOOD_SPORTSMANSHIP: &str = "has good sportsmanship";

/// Every predicate the storefront offers, for catalog seeding
pub const PREDICATE_CATALOG: &[&str] = &[
    IS_GREAT,
    IS_BAD,
    IS_OVERPRICED,
    IS_FAIR_PRICE,
    IS_HIGH_QUALITY,
    IS_TOXIC,
    IS_TRUSTWORTHY,
    IS_SKILLED,
    HAS_GOOD_SPORTSMANSHIP,
];

/// Classify a predicate by its text.
///
/// Only the item-rating predicates carry score weight. The player-conduct
/// predicates (toxic, trustworthy, skilled, sportsmanship) and any text not
/// in the catalog are neutral: visible in claim counts, absent from both
/// stake buckets.
pub fn polarity_of(predicate_text: &str) -> Polarity {
    match predicate_text {
        IS_GREAT | IS_HIGH_QUALITY | IS_FAIR_PRICE => Polarity::Positive,
        IS_BAD | IS_OVERPRICED => Polarity::Negative,
        _ => Polarity::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_predicates_are_classified() {
        assert_eq!(polarity_of(IS_GREAT), Polarity::Positive);
        assert_eq!(polarity_of(IS_HIGH_QUALITY), Polarity::Positive);
        assert_eq!(polarity_of(IS_FAIR_PRICE), Polarity::Positive);
        assert_eq!(polarity_of(IS_BAD), Polarity::Negative);
        assert_eq!(polarity_of(IS_OVERPRICED), Polarity::Negative);
    }

    #[test]
    fn test_player_predicates_are_neutral() {
        assert_eq!(polarity_of(IS_TOXIC), Polarity::Neutral);
        assert_eq!(polarity_of(IS_TRUSTWORTHY), Polarity::Neutral);
        assert_eq!(polarity_of(IS_SKILLED), Polarity::Neutral);
        assert_eq!(polarity_of(HAS_GOOD_SPORTSMANSHIP), Polarity::Neutral);
    }

    #[test]
    fn test_unknown_text_defaults_to_neutral() {
        assert_eq!(polarity_of("is mediocre"), Polarity::Neutral);
        assert_eq!(polarity_of(""), Polarity::Neutral);
        // Classification is exact-match, not fuzzy
        assert_eq!(polarity_of("IS GREAT"), Polarity::Neutral);
    }
}
