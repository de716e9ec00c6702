//! Attestation workflow coordinator
//!
//! One submission runs the sequence: resolve subject -> resolve predicate
//! -> submit claim -> record -> recompute score. Each resolution is
//! idempotent find-or-create: the store's natural-key uniqueness detects a
//! concurrent creator and the loser re-resolves instead of erroring. There
//! is no transaction across the ledger call and the local record; a store
//! failure after a successful ledger submission is surfaced as the distinct
//! `Unrecorded` error because the stake is real and must not be retried
//! blindly.

use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::attestation::events::{ScoreEvent, ScoreEvents};
use crate::config::Args;
use crate::db::schemas::{ClaimDoc, RewardDoc, SubjectDoc, SubjectKind, TrustScoreDoc};
use crate::identity::{IdentityProvider, LocalIdentity};
use crate::ledger::{AtomSpec, ClaimSubmission, Ledger};
use crate::store::TrustStore;
use crate::trust::{
    bonus_hundredths, claim_rank, compute_trust_score, TrustScoreBreakdown, EARLY_WINDOW,
    PREDICATE_CATALOG,
};
use crate::types::{Result, TrustgateError};

/// Tunables for the workflow
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Wait after withdrawal before the same rater may re-stake on the
    /// same subject
    pub cooldown: Duration,
    /// Maximum review comment length
    pub max_comment_len: usize,
    /// How many claims per subject qualify for the early bonus
    pub early_window: usize,
    /// Default page size for recent-attestation listings
    pub recent_limit: i64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::hours(24),
            max_comment_len: 1000,
            early_window: EARLY_WINDOW,
            recent_limit: 10,
        }
    }
}

impl WorkflowConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            cooldown: Duration::hours(args.cooldown_hours),
            max_comment_len: args.max_comment_len,
            ..Default::default()
        }
    }
}

/// The subject a rating targets
#[derive(Debug, Clone)]
pub struct SubjectSpec {
    pub kind: SubjectKind,
    /// Item SKU or player wallet address
    pub key: String,
    /// Item display name, used when the atom has to be minted
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl SubjectSpec {
    pub fn item(key: &str) -> Self {
        Self {
            kind: SubjectKind::Item,
            key: key.to_string(),
            display_name: None,
            description: None,
            image_url: None,
        }
    }

    pub fn player(wallet: &str) -> Self {
        Self {
            kind: SubjectKind::Player,
            key: wallet.to_lowercase(),
            display_name: None,
            description: None,
            image_url: None,
        }
    }

    fn atom_spec(&self) -> AtomSpec {
        match self.kind {
            SubjectKind::Item => AtomSpec::Thing {
                name: self.display_name.clone().unwrap_or_else(|| self.key.clone()),
                description: self.description.clone().unwrap_or_default(),
                image: self.image_url.clone().unwrap_or_default(),
                url: format!("https://store.urbanmayhem.com/items/{}", self.key),
            },
            SubjectKind::Player => AtomSpec::Account {
                address: self.key.clone(),
            },
            SubjectKind::Predicate => AtomSpec::Text {
                value: self.key.clone(),
            },
        }
    }
}

/// One rating submission
#[derive(Debug, Clone)]
pub struct AttestRequest {
    pub subject: SubjectSpec,
    pub predicate: String,
    /// Stake in the token's smallest unit
    pub stake_amount: u128,
    pub comment: Option<String>,
}

/// Result of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct AttestOutcome {
    pub triple_id: String,
    pub transaction_hash: String,
    pub subject_atom_id: String,
    pub score: TrustScoreBreakdown,
}

/// One early-attestor entitlement
#[derive(Debug, Clone, Serialize)]
pub struct RewardEntry {
    pub claim_triple_id: String,
    pub subject_atom_id: String,
    /// 1-based position among the subject's first raters
    pub rank: u32,
    pub stake_amount: String,
    /// Bonus in hundredths of the smallest unit
    pub bonus_hundredths: String,
}

/// Per-rater reward accounting
#[derive(Debug, Clone, Serialize)]
pub struct RewardsSummary {
    pub wallet: String,
    pub total_staked: String,
    /// Early-attestor bonus in hundredths of the smallest unit
    pub early_bonus_hundredths: String,
    /// Portion of the bonus already claimed, in hundredths
    pub claimed_hundredths: String,
    pub active_attestations: u64,
    pub entries: Vec<RewardEntry>,
}

/// Result of materializing and claiming entitlements
#[derive(Debug, Clone, Serialize)]
pub struct ClaimRewardsOutcome {
    pub newly_claimed: u64,
    pub amount_hundredths: String,
}

/// The workflow coordinator
pub struct AttestationService {
    store: Arc<dyn TrustStore>,
    ledger: Arc<dyn Ledger>,
    node_identity: Arc<LocalIdentity>,
    events: ScoreEvents,
    config: WorkflowConfig,
}

impl AttestationService {
    pub fn new(
        store: Arc<dyn TrustStore>,
        ledger: Arc<dyn Ledger>,
        node_identity: Arc<LocalIdentity>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            node_identity,
            events: ScoreEvents::new(),
            config,
        }
    }

    /// The score change hub sessions subscribe to
    pub fn events(&self) -> &ScoreEvents {
        &self.events
    }

    /// Run one rating submission end to end.
    ///
    /// Failure before the ledger call leaves nothing behind and is safe to
    /// retry. Failure of the ledger call records nothing. A store failure
    /// after the ledger accepted the stake returns `Unrecorded`.
    pub async fn attest(
        &self,
        rater: &dyn IdentityProvider,
        request: AttestRequest,
    ) -> Result<AttestOutcome> {
        let rater = rater.current()?;
        self.validate(&request)?;

        let subject = self.resolve_subject(&request.subject, &rater.address).await?;

        // Withdrawal cooldown binds the (rater, subject) pair
        if let Some(until) = self
            .store
            .cooldown_until(&rater.address, &subject.atom_id)
            .await?
        {
            let now = Utc::now();
            if until > now {
                let remaining = until - now;
                debug!(
                    wallet = %rater.address,
                    subject = %subject.atom_id,
                    remaining_secs = remaining.num_seconds(),
                    "Re-stake rejected: cooldown active"
                );
                return Err(TrustgateError::CooldownActive {
                    remaining_secs: remaining.num_seconds().max(1),
                });
            }
        }

        let predicate = self
            .resolve_predicate(&request.predicate, &rater.address)
            .await?;

        // All three ids must exist before submission. Empty ids at this
        // point are a bug in resolution, not a retryable condition.
        if subject.atom_id.is_empty() || predicate.atom_id.is_empty() {
            return Err(TrustgateError::Internal(format!(
                "Missing atom ids before submission: subject='{}', predicate='{}'",
                subject.atom_id, predicate.atom_id
            )));
        }

        // Object is the subject itself by convention for simple ratings
        let submission = ClaimSubmission {
            subject_atom_id: subject.atom_id.clone(),
            predicate_atom_id: predicate.atom_id.clone(),
            object_atom_id: subject.atom_id.clone(),
            stake_amount: request.stake_amount,
        };

        let receipt = self.ledger.submit_claim(&submission, &rater.address).await?;

        let claim = ClaimDoc {
            _id: None,
            metadata: crate::db::schemas::Metadata::new(),
            triple_id: receipt.triple_id.clone(),
            subject_atom_id: subject.atom_id.clone(),
            predicate_atom_id: predicate.atom_id.clone(),
            predicate_text: request.predicate.clone(),
            object_atom_id: subject.atom_id.clone(),
            stake_amount: request.stake_amount.to_string(),
            creator_wallet: rater.address.clone(),
            transaction_hash: receipt.transaction_hash.clone(),
            status: crate::db::schemas::ClaimStatus::Active,
            comment: request.comment.clone(),
            cooldown_until: None,
        };

        if let Err(e) = self.store.insert_claim(claim).await {
            // The stake is on the ledger but not in the cache. Distinct from
            // a clean failure: retrying would double-stake.
            error!(
                triple_id = %receipt.triple_id,
                tx = %receipt.transaction_hash,
                error = %e,
                "Stake placed on ledger but claim row not recorded"
            );
            return Err(TrustgateError::Unrecorded {
                transaction_hash: receipt.transaction_hash,
                reason: e.to_string(),
            });
        }

        let score = self.recompute_score(&subject.atom_id).await?;

        info!(
            triple_id = %receipt.triple_id,
            subject = %subject.atom_id,
            predicate = %request.predicate,
            stake = request.stake_amount,
            score = score.score,
            "Attestation recorded"
        );

        Ok(AttestOutcome {
            triple_id: receipt.triple_id,
            transaction_hash: receipt.transaction_hash,
            subject_atom_id: subject.atom_id,
            score,
        })
    }

    /// Withdraw a stake. Only the claim's creator may withdraw; the rater
    /// then sits out the cooldown before re-staking on the same subject.
    pub async fn withdraw(
        &self,
        rater: &dyn IdentityProvider,
        triple_id: &str,
    ) -> Result<TrustScoreBreakdown> {
        let rater = rater.current()?;

        let claim = self
            .store
            .find_claim(triple_id)
            .await?
            .ok_or_else(|| TrustgateError::NotFound(format!("Claim {} not found", triple_id)))?;

        if claim.creator_wallet != rater.address {
            return Err(TrustgateError::Forbidden(
                "Only the claim's creator may withdraw its stake".into(),
            ));
        }
        if !claim.is_active() {
            return Err(TrustgateError::BadRequest(format!(
                "Claim {} is already withdrawn",
                triple_id
            )));
        }

        let cooldown_until = Utc::now() + self.config.cooldown;
        self.store.withdraw_claim(triple_id, cooldown_until).await?;

        let score = self.recompute_score(&claim.subject_atom_id).await?;

        info!(
            triple_id = %triple_id,
            subject = %claim.subject_atom_id,
            cooldown_until = %cooldown_until,
            "Stake withdrawn"
        );

        Ok(score)
    }

    /// Cached trust score for a subject, recomputed on a cache miss
    pub async fn trust_score(&self, atom_id: &str) -> Result<TrustScoreDoc> {
        if let Some(cached) = self.store.trust_score(atom_id).await? {
            return Ok(cached);
        }
        let breakdown = self.recompute_score(atom_id).await?;
        Ok(TrustScoreDoc::from_breakdown(atom_id.to_string(), &breakdown))
    }

    /// Find a subject by natural key
    pub async fn find_subject(
        &self,
        kind: SubjectKind,
        key: &str,
    ) -> Result<Option<SubjectDoc>> {
        self.store.find_subject(kind, key).await
    }

    /// Most recent active attestations on a subject
    pub async fn recent_attestations(
        &self,
        atom_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ClaimDoc>> {
        let limit = limit.unwrap_or(self.config.recent_limit).clamp(1, 100);
        self.store.recent_claims_for_subject(atom_id, limit).await
    }

    /// Reward accounting for a rater: total staked, early-attestor bonus,
    /// and the per-claim entitlements behind it. Derived lazily from claim
    /// history; nothing is persisted here.
    pub async fn rewards_summary(&self, wallet: &str) -> Result<RewardsSummary> {
        let wallet = wallet.to_lowercase();
        let rater_claims = self.store.active_claims_by_rater(&wallet).await?;

        // One bounded first-N query per distinct subject, not a rescan of
        // full claim history
        let mut first_by_subject: HashMap<String, Vec<ClaimDoc>> = HashMap::new();
        for claim in &rater_claims {
            if !first_by_subject.contains_key(&claim.subject_atom_id) {
                let first = self
                    .store
                    .first_claims_for_subject(
                        &claim.subject_atom_id,
                        self.config.early_window as i64,
                    )
                    .await?;
                first_by_subject.insert(claim.subject_atom_id.clone(), first);
            }
        }

        let mut total_staked: u128 = 0;
        let mut total_bonus: u128 = 0;
        let mut entries = Vec::new();

        for claim in &rater_claims {
            total_staked += claim.stake();

            let Some(first) = first_by_subject.get(&claim.subject_atom_id) else {
                continue;
            };
            if let Some(rank) = claim_rank(first, &claim.triple_id) {
                let bonus = bonus_hundredths(claim.stake(), rank);
                total_bonus += bonus;
                entries.push(RewardEntry {
                    claim_triple_id: claim.triple_id.clone(),
                    subject_atom_id: claim.subject_atom_id.clone(),
                    rank: (rank + 1) as u32,
                    stake_amount: claim.stake_amount.clone(),
                    bonus_hundredths: bonus.to_string(),
                });
            }
        }

        // Entitlements already materialized and claimed
        let claimed: u128 = self
            .store
            .rewards_for(&wallet)
            .await?
            .iter()
            .filter(|r| r.claimed)
            .filter_map(|r| r.amount_hundredths.parse::<u128>().ok())
            .sum();

        Ok(RewardsSummary {
            wallet: wallet.clone(),
            total_staked: total_staked.to_string(),
            early_bonus_hundredths: total_bonus.to_string(),
            claimed_hundredths: claimed.to_string(),
            active_attestations: rater_claims.len() as u64,
            entries,
        })
    }

    /// Materialize the rater's entitlements and claim each exactly once.
    /// Entitlements already claimed are skipped; re-running is a no-op.
    pub async fn claim_rewards(&self, wallet: &str) -> Result<ClaimRewardsOutcome> {
        let summary = self.rewards_summary(wallet).await?;

        let mut newly_claimed: u64 = 0;
        let mut amount: u128 = 0;

        for entry in &summary.entries {
            let reward = RewardDoc {
                _id: None,
                metadata: crate::db::schemas::Metadata::new(),
                recipient_wallet: summary.wallet.clone(),
                claim_triple_id: entry.claim_triple_id.clone(),
                subject_atom_id: entry.subject_atom_id.clone(),
                rank: entry.rank as i32,
                amount_hundredths: entry.bonus_hundredths.clone(),
                claimed: false,
            };
            self.store.insert_reward_if_absent(reward).await?;

            if self
                .store
                .mark_reward_claimed(&entry.claim_triple_id)
                .await?
            {
                newly_claimed += 1;
                amount += entry.bonus_hundredths.parse::<u128>().unwrap_or(0);
            }
        }

        info!(
            wallet = %summary.wallet,
            newly_claimed,
            amount_hundredths = amount,
            "Rewards claimed"
        );

        Ok(ClaimRewardsOutcome {
            newly_claimed,
            amount_hundredths: amount.to_string(),
        })
    }

    /// Find-or-create the atom for every predicate in the catalog, under
    /// the gateway's own identity. Idempotent.
    pub async fn seed_predicates(&self) -> Result<Vec<SubjectDoc>> {
        let creator = self.node_identity.current()?;
        let mut seeded = Vec::with_capacity(PREDICATE_CATALOG.len());
        for predicate in PREDICATE_CATALOG {
            seeded.push(self.resolve_predicate(predicate, &creator.address).await?);
        }
        info!(count = seeded.len(), "Predicate catalog seeded");
        Ok(seeded)
    }

    /// Idempotent find-or-create for a subject atom.
    ///
    /// The losing side of a creation race gets a duplicate from the store
    /// and recovers by re-resolving; the caller never sees the race.
    async fn resolve_subject(&self, spec: &SubjectSpec, creator: &str) -> Result<SubjectDoc> {
        if let Some(existing) = self.store.find_subject(spec.kind, &spec.key).await? {
            return Ok(existing);
        }

        debug!(kind = spec.kind.as_str(), key = %spec.key, "Subject not cached, minting atom");
        let receipt = self.ledger.create_atom(&spec.atom_spec(), creator).await?;

        let mut doc = SubjectDoc::new(receipt.atom_id, spec.kind, spec.key.clone());
        doc.atom_uri = receipt.atom_uri;
        doc.creator_wallet = receipt.creator;
        doc.display_name = spec.display_name.clone();

        match self.store.insert_subject(doc).await {
            Ok(()) => {}
            Err(TrustgateError::Duplicate(_)) => {
                warn!(
                    kind = spec.kind.as_str(),
                    key = %spec.key,
                    "Concurrent subject creation detected, re-resolving"
                );
            }
            Err(e) => return Err(e),
        }

        // Re-read so every racer converges on the canonical record
        self.store
            .find_subject(spec.kind, &spec.key)
            .await?
            .ok_or_else(|| {
                TrustgateError::Internal(format!(
                    "Subject ({}, {}) missing after insert",
                    spec.kind.as_str(),
                    spec.key
                ))
            })
    }

    async fn resolve_predicate(&self, text: &str, creator: &str) -> Result<SubjectDoc> {
        let spec = SubjectSpec {
            kind: SubjectKind::Predicate,
            key: text.to_string(),
            display_name: None,
            description: None,
            image_url: None,
        };
        self.resolve_subject(&spec, creator).await
    }

    /// Aggregate the subject's active claims, cache the result, publish the
    /// change
    async fn recompute_score(&self, atom_id: &str) -> Result<TrustScoreBreakdown> {
        let claims = self.store.active_claims_for_subject(atom_id).await?;
        let breakdown = compute_trust_score(&claims);

        self.store
            .upsert_trust_score(TrustScoreDoc::from_breakdown(
                atom_id.to_string(),
                &breakdown,
            ))
            .await?;

        self.events.publish(ScoreEvent::new(atom_id, &breakdown));
        Ok(breakdown)
    }

    fn validate(&self, request: &AttestRequest) -> Result<()> {
        if request.subject.key.trim().is_empty() {
            return Err(TrustgateError::BadRequest("Subject key is required".into()));
        }
        if request.subject.kind == SubjectKind::Predicate {
            return Err(TrustgateError::BadRequest(
                "Cannot attest about a predicate".into(),
            ));
        }
        if request.predicate.trim().is_empty() {
            return Err(TrustgateError::BadRequest("Predicate is required".into()));
        }
        if request.stake_amount == 0 {
            return Err(TrustgateError::BadRequest(
                "Stake amount must be positive".into(),
            ));
        }
        if let Some(comment) = &request.comment {
            if comment.len() > self.config.max_comment_len {
                return Err(TrustgateError::BadRequest(format!(
                    "Comment exceeds {} characters",
                    self.config.max_comment_len
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::WalletIdentity;
    use crate::ledger::MockLedger;
    use crate::store::MemoryStore;
    use crate::trust::predicates;

    struct Harness {
        service: AttestationService,
        store: Arc<MemoryStore>,
        ledger: Arc<MockLedger>,
    }

    fn harness() -> Harness {
        harness_with(WorkflowConfig::default())
    }

    fn harness_with(config: WorkflowConfig) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(MockLedger::new());
        let service = AttestationService::new(
            store.clone(),
            ledger.clone(),
            Arc::new(LocalIdentity::generate()),
            config,
        );
        Harness {
            service,
            store,
            ledger,
        }
    }

    fn rater(wallet: &str) -> WalletIdentity {
        WalletIdentity::new(Some(wallet.to_string()))
    }

    fn request(sku: &str, predicate: &str, stake: u128) -> AttestRequest {
        AttestRequest {
            subject: SubjectSpec::item(sku),
            predicate: predicate.to_string(),
            stake_amount: stake,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_first_positive_rating_scores_100_and_earns_10_percent() {
        let h = harness();
        let alice = rater("0xAlice");

        let outcome = h
            .service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();

        assert_eq!(outcome.score.score, 100.0);
        assert_eq!(outcome.score.positive_stake, 100);

        let rewards = h.service.rewards_summary("0xalice").await.unwrap();
        // First-ever rater: 10% of 100 = 10 units = 1000 hundredths
        assert_eq!(rewards.early_bonus_hundredths, "1000");
        assert_eq!(rewards.entries[0].rank, 1);
    }

    #[tokio::test]
    async fn test_counter_rating_halves_score_and_earns_9_percent() {
        let h = harness();
        let alice = rater("0xAlice");
        let bob = rater("0xBob");

        h.service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();
        let outcome = h
            .service
            .attest(&bob, request("pkg_1", predicates::IS_BAD, 100))
            .await
            .unwrap();

        assert_eq!(outcome.score.score, 50.0);
        assert_eq!(outcome.score.positive_stake, 100);
        assert_eq!(outcome.score.negative_stake, 100);

        // Alice's bonus is unaffected; Bob is second, 9% of 100
        let alice_rewards = h.service.rewards_summary("0xalice").await.unwrap();
        assert_eq!(alice_rewards.early_bonus_hundredths, "1000");
        let bob_rewards = h.service.rewards_summary("0xbob").await.unwrap();
        assert_eq!(bob_rewards.early_bonus_hundredths, "900");
    }

    #[tokio::test]
    async fn test_eleven_raters_score_stays_100_and_bonuses_total_5_5_units() {
        let h = harness();

        for i in 0..11 {
            let outcome = h
                .service
                .attest(
                    &rater(&format!("0xrater{}", i)),
                    request("pkg_y", predicates::IS_GREAT, 10),
                )
                .await
                .unwrap();
            assert_eq!(outcome.score.score, 100.0);
        }

        let mut total: u128 = 0;
        for i in 0..11 {
            let claimed = h
                .service
                .claim_rewards(&format!("0xrater{}", i))
                .await
                .unwrap();
            total += claimed.amount_hundredths.parse::<u128>().unwrap();
        }
        // 10 x (0.10 + ... + 0.01) = 5.5 units
        assert_eq!(total, 550);

        // Claiming again pays nothing
        let again = h.service.claim_rewards("0xrater0").await.unwrap();
        assert_eq!(again.newly_claimed, 0);
        assert_eq!(again.amount_hundredths, "0");
    }

    #[tokio::test]
    async fn test_subject_and_predicate_atoms_minted_once() {
        let h = harness();

        h.service
            .attest(&rater("0xAlice"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap();
        let minted_after_first = h.ledger.atoms_minted();
        assert_eq!(minted_after_first, 2); // item atom + predicate atom

        h.service
            .attest(&rater("0xBob"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap();
        assert_eq!(h.ledger.atoms_minted(), minted_after_first);
        assert_eq!(h.store.subject_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_converges_on_one_subject() {
        let h = harness();
        let service = &h.service;

        let alice = rater("0xAlice");
        let bob = rater("0xBob");
        let (a, b) = tokio::join!(
            service.attest(&alice, request("pkg_race", predicates::IS_GREAT, 10)),
            service.attest(&bob, request("pkg_race", predicates::IS_GREAT, 10)),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a.subject_atom_id, b.subject_atom_id);
        let items: usize = h.store.subject_count();
        // pkg_race + one predicate
        assert_eq!(items, 2);
    }

    #[tokio::test]
    async fn test_missing_identity_is_precondition_failure() {
        let h = harness();
        let nobody = WalletIdentity::new(None);

        let err = h
            .service
            .attest(&nobody, request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, TrustgateError::Unauthorized(_)));
        // Rejected before any external call
        assert_eq!(h.ledger.atoms_minted(), 0);
        assert_eq!(h.ledger.claims_submitted(), 0);
    }

    #[tokio::test]
    async fn test_zero_stake_and_oversize_comment_are_rejected() {
        let h = harness();
        let alice = rater("0xAlice");

        let err = h
            .service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, TrustgateError::BadRequest(_)));

        let mut oversized = request("pkg_1", predicates::IS_GREAT, 10);
        oversized.comment = Some("x".repeat(1001));
        let err = h.service.attest(&alice, oversized).await.unwrap_err();
        assert!(matches!(err, TrustgateError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_atom_mint_failure_leaves_no_subject_row() {
        let h = harness();
        h.ledger.fail_atoms(true);

        let err = h
            .service
            .attest(&rater("0xAlice"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, TrustgateError::Ledger(_)));
        assert!(err.safe_to_retry());
        assert_eq!(h.store.subject_count(), 0);
        assert_eq!(h.store.claim_count(), 0);
        assert_eq!(h.ledger.claims_submitted(), 0);

        // Retry succeeds once the ledger recovers
        h.ledger.fail_atoms(false);
        h.service
            .attest(&rater("0xAlice"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap();
        assert_eq!(h.store.subject_count(), 2);
    }

    #[tokio::test]
    async fn test_summary_reports_already_claimed_bonus() {
        let h = harness();
        let alice = rater("0xAlice");

        h.service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();

        let before = h.service.rewards_summary("0xalice").await.unwrap();
        assert_eq!(before.claimed_hundredths, "0");
        assert_eq!(before.early_bonus_hundredths, "1000");

        let claimed = h.service.claim_rewards("0xalice").await.unwrap();
        assert_eq!(claimed.amount_hundredths, "1000");

        // The entitlement stays visible; the claimed portion now matches it
        let after = h.service.rewards_summary("0xalice").await.unwrap();
        assert_eq!(after.claimed_hundredths, "1000");
        assert_eq!(after.early_bonus_hundredths, "1000");
    }

    #[tokio::test]
    async fn test_ledger_failure_records_nothing() {
        let h = harness();
        h.ledger.fail_submissions(true);

        let err = h
            .service
            .attest(&rater("0xAlice"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, TrustgateError::Ledger(_)));
        assert!(err.safe_to_retry());
        assert_eq!(h.store.claim_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_after_ledger_success_is_unrecorded() {
        let h = harness();
        h.store.fail_claim_inserts(true);

        let err = h
            .service
            .attest(&rater("0xAlice"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap_err();

        match &err {
            TrustgateError::Unrecorded {
                transaction_hash, ..
            } => assert!(!transaction_hash.is_empty()),
            other => panic!("expected Unrecorded, got {:?}", other),
        }
        assert!(!err.safe_to_retry());
        // The stake went through on the ledger
        assert_eq!(h.ledger.claims_submitted(), 1);
        assert_eq!(h.store.claim_count(), 0);
    }

    #[tokio::test]
    async fn test_withdraw_requires_creator() {
        let h = harness();
        let alice = rater("0xAlice");

        let outcome = h
            .service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();

        let err = h
            .service
            .withdraw(&rater("0xBob"), &outcome.triple_id)
            .await
            .unwrap_err();
        assert!(matches!(err, TrustgateError::Forbidden(_)));

        // Creator can withdraw; score drops to zero with no claims left
        let score = h.service.withdraw(&alice, &outcome.triple_id).await.unwrap();
        assert_eq!(score.score, 0.0);
        assert_eq!(score.count, 0);
    }

    #[tokio::test]
    async fn test_withdrawal_excludes_stake_from_score() {
        let h = harness();
        let alice = rater("0xAlice");
        let bob = rater("0xBob");

        h.service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();
        let bobs = h
            .service
            .attest(&bob, request("pkg_1", predicates::IS_BAD, 100))
            .await
            .unwrap();
        assert_eq!(bobs.score.score, 50.0);

        let score = h.service.withdraw(&bob, &bobs.triple_id).await.unwrap();
        assert_eq!(score.score, 100.0);
    }

    #[tokio::test]
    async fn test_restake_during_cooldown_is_rejected_with_remaining() {
        let h = harness();
        let alice = rater("0xAlice");

        let outcome = h
            .service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();
        h.service.withdraw(&alice, &outcome.triple_id).await.unwrap();

        let err = h
            .service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap_err();
        match err {
            TrustgateError::CooldownActive { remaining_secs } => {
                assert!(remaining_secs > 0);
                assert!(remaining_secs <= 24 * 3600);
            }
            other => panic!("expected CooldownActive, got {:?}", other),
        }

        // Another rater is unaffected by Alice's cooldown
        h.service
            .attest(&rater("0xBob"), request("pkg_1", predicates::IS_GREAT, 10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_restake_after_cooldown_elapses_succeeds() {
        let h = harness_with(WorkflowConfig {
            cooldown: Duration::zero(),
            ..Default::default()
        });
        let alice = rater("0xAlice");

        let outcome = h
            .service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();
        h.service.withdraw(&alice, &outcome.triple_id).await.unwrap();

        // Cooldown stamp is already in the past
        h.service
            .attest(&alice, request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_score_events_are_published_on_recompute() {
        let h = harness();
        let mut rx = h.service.events().subscribe();

        h.service
            .attest(&rater("0xAlice"), request("pkg_1", predicates::IS_GREAT, 100))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.score, 100.0);
        assert_eq!(event.positive_stake, "100");
    }

    #[tokio::test]
    async fn test_seed_predicates_is_idempotent() {
        let h = harness();

        let first = h.service.seed_predicates().await.unwrap();
        assert_eq!(first.len(), PREDICATE_CATALOG.len());
        let minted = h.ledger.atoms_minted();
        assert_eq!(minted, PREDICATE_CATALOG.len() as u64);

        let second = h.service.seed_predicates().await.unwrap();
        assert_eq!(second.len(), first.len());
        assert_eq!(h.ledger.atoms_minted(), minted);
    }

    #[tokio::test]
    async fn test_trust_score_read_through_on_cache_miss() {
        let h = harness();

        // Unknown subject: zero score, not an error
        let score = h.service.trust_score("atom-unknown").await.unwrap();
        assert_eq!(score.score, 0.0);
        assert_eq!(score.attestation_count, 0);
    }
}
