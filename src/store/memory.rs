//! In-memory store for tests
//!
//! Mirrors the MongoDB store's contract, including duplicate detection on
//! the subject natural key, so workflow tests can exercise the idempotent
//! find-or-create race without a database. Claim order is insertion order,
//! which stands in for the created_at sort.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::db::schemas::{ClaimDoc, RewardDoc, SubjectDoc, SubjectKind, TrustScoreDoc};
use crate::store::TrustStore;
use crate::types::{Result, TrustgateError};

#[derive(Default)]
pub struct MemoryStore {
    subjects: DashMap<(SubjectKind, String), SubjectDoc>,
    claims: RwLock<Vec<ClaimDoc>>,
    scores: DashMap<String, TrustScoreDoc>,
    rewards: DashMap<String, RewardDoc>,
    fail_claim_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent claim inserts fail, to exercise the
    /// ledger-succeeded/persist-failed gap
    pub fn fail_claim_inserts(&self, fail: bool) {
        self.fail_claim_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.read().expect("claims lock").len()
    }

    fn read_claims(&self) -> Vec<ClaimDoc> {
        self.claims.read().expect("claims lock").clone()
    }
}

#[async_trait]
impl TrustStore for MemoryStore {
    async fn find_subject(&self, kind: SubjectKind, key: &str) -> Result<Option<SubjectDoc>> {
        Ok(self
            .subjects
            .get(&(kind, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn insert_subject(&self, doc: SubjectDoc) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        match self
            .subjects
            .entry((doc.entity_kind, doc.entity_key.clone()))
        {
            Entry::Occupied(_) => Err(TrustgateError::Duplicate(format!(
                "subject ({}, {}) already exists",
                doc.entity_kind.as_str(),
                doc.entity_key
            ))),
            Entry::Vacant(slot) => {
                slot.insert(doc);
                Ok(())
            }
        }
    }

    async fn insert_claim(&self, mut doc: ClaimDoc) -> Result<()> {
        if self.fail_claim_inserts.load(Ordering::SeqCst) {
            return Err(TrustgateError::Database("memory store offline".into()));
        }
        let mut claims = self.claims.write().expect("claims lock");
        if claims.iter().any(|c| c.triple_id == doc.triple_id) {
            return Err(TrustgateError::Duplicate(format!(
                "claim {} already exists",
                doc.triple_id
            )));
        }
        if doc.metadata.created_at.is_none() {
            doc.metadata.created_at = Some(bson::DateTime::now());
        }
        claims.push(doc);
        Ok(())
    }

    async fn find_claim(&self, triple_id: &str) -> Result<Option<ClaimDoc>> {
        Ok(self
            .read_claims()
            .into_iter()
            .find(|c| c.triple_id == triple_id))
    }

    async fn withdraw_claim(&self, triple_id: &str, cooldown_until: DateTime<Utc>) -> Result<()> {
        let mut claims = self.claims.write().expect("claims lock");
        let claim = claims
            .iter_mut()
            .find(|c| c.triple_id == triple_id)
            .ok_or_else(|| TrustgateError::NotFound(format!("Claim {} not found", triple_id)))?;
        claim.status = crate::db::schemas::ClaimStatus::Withdrawn;
        claim.cooldown_until = Some(bson::DateTime::from_chrono(cooldown_until));
        claim.metadata.updated_at = Some(bson::DateTime::now());
        Ok(())
    }

    async fn active_claims_for_subject(&self, atom_id: &str) -> Result<Vec<ClaimDoc>> {
        Ok(self
            .read_claims()
            .into_iter()
            .filter(|c| c.subject_atom_id == atom_id && c.is_active())
            .collect())
    }

    async fn recent_claims_for_subject(&self, atom_id: &str, limit: i64) -> Result<Vec<ClaimDoc>> {
        let mut claims = self.active_claims_for_subject(atom_id).await?;
        claims.reverse();
        claims.truncate(limit.max(0) as usize);
        Ok(claims)
    }

    async fn first_claims_for_subject(&self, atom_id: &str, limit: i64) -> Result<Vec<ClaimDoc>> {
        Ok(self
            .read_claims()
            .into_iter()
            .filter(|c| c.subject_atom_id == atom_id)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn active_claims_by_rater(&self, wallet: &str) -> Result<Vec<ClaimDoc>> {
        Ok(self
            .read_claims()
            .into_iter()
            .filter(|c| c.creator_wallet == wallet && c.is_active())
            .collect())
    }

    async fn cooldown_until(
        &self,
        wallet: &str,
        subject_atom_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .read_claims()
            .into_iter()
            .filter(|c| {
                c.creator_wallet == wallet
                    && c.subject_atom_id == subject_atom_id
                    && !c.is_active()
            })
            .filter_map(|c| c.cooldown_until)
            .map(|dt| dt.to_chrono())
            .max())
    }

    async fn upsert_trust_score(&self, doc: TrustScoreDoc) -> Result<()> {
        self.scores.insert(doc.atom_id.clone(), doc);
        Ok(())
    }

    async fn trust_score(&self, atom_id: &str) -> Result<Option<TrustScoreDoc>> {
        Ok(self.scores.get(atom_id).map(|entry| entry.value().clone()))
    }

    async fn insert_reward_if_absent(&self, doc: RewardDoc) -> Result<bool> {
        use dashmap::mapref::entry::Entry;

        match self.rewards.entry(doc.claim_triple_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(doc);
                Ok(true)
            }
        }
    }

    async fn mark_reward_claimed(&self, claim_triple_id: &str) -> Result<bool> {
        match self.rewards.get_mut(claim_triple_id) {
            Some(mut entry) if !entry.claimed => {
                entry.claimed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn rewards_for(&self, wallet: &str) -> Result<Vec<RewardDoc>> {
        Ok(self
            .rewards
            .iter()
            .filter(|entry| entry.recipient_wallet == wallet)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_subject_insert_is_detected() {
        let store = MemoryStore::new();
        let doc = SubjectDoc::new("atom-1".into(), SubjectKind::Item, "pkg_1".into());
        store.insert_subject(doc.clone()).await.unwrap();

        let err = store.insert_subject(doc).await.unwrap_err();
        assert!(matches!(err, TrustgateError::Duplicate(_)));
        assert_eq!(store.subject_count(), 1);
    }

    #[tokio::test]
    async fn test_reward_claim_transitions_exactly_once() {
        let store = MemoryStore::new();
        let reward = RewardDoc {
            recipient_wallet: "0xabc".into(),
            claim_triple_id: "triple-1".into(),
            subject_atom_id: "atom-1".into(),
            rank: 1,
            amount_hundredths: "1000".into(),
            ..Default::default()
        };
        assert!(store.insert_reward_if_absent(reward.clone()).await.unwrap());
        assert!(!store.insert_reward_if_absent(reward).await.unwrap());

        assert!(store.mark_reward_claimed("triple-1").await.unwrap());
        assert!(!store.mark_reward_claimed("triple-1").await.unwrap());
    }
}
