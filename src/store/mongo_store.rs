//! MongoDB-backed store implementation

use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};

use crate::db::schemas::{
    ClaimDoc, RewardDoc, SubjectDoc, SubjectKind, TrustScoreDoc, CLAIM_COLLECTION,
    REWARD_COLLECTION, SUBJECT_COLLECTION, TRUST_SCORE_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::store::TrustStore;
use crate::types::{Result, TrustgateError};

/// Store backed by the MongoDB attestation cache
pub struct MongoStore {
    subjects: MongoCollection<SubjectDoc>,
    claims: MongoCollection<ClaimDoc>,
    scores: MongoCollection<TrustScoreDoc>,
    rewards: MongoCollection<RewardDoc>,
}

impl MongoStore {
    /// Open the collections and apply their indexes
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            subjects: client.collection(SUBJECT_COLLECTION).await?,
            claims: client.collection(CLAIM_COLLECTION).await?,
            scores: client.collection(TRUST_SCORE_COLLECTION).await?,
            rewards: client.collection(REWARD_COLLECTION).await?,
        })
    }
}

#[async_trait]
impl TrustStore for MongoStore {
    async fn find_subject(&self, kind: SubjectKind, key: &str) -> Result<Option<SubjectDoc>> {
        self.subjects
            .find_one(doc! { "entity_kind": kind.as_str(), "entity_key": key })
            .await
    }

    async fn insert_subject(&self, doc: SubjectDoc) -> Result<()> {
        self.subjects.insert_one(doc).await.map(|_| ())
    }

    async fn insert_claim(&self, doc: ClaimDoc) -> Result<()> {
        self.claims.insert_one(doc).await.map(|_| ())
    }

    async fn find_claim(&self, triple_id: &str) -> Result<Option<ClaimDoc>> {
        self.claims.find_one(doc! { "triple_id": triple_id }).await
    }

    async fn withdraw_claim(&self, triple_id: &str, cooldown_until: DateTime<Utc>) -> Result<()> {
        let result = self
            .claims
            .update_one(
                doc! { "triple_id": triple_id },
                doc! {
                    "$set": {
                        "status": "withdrawn",
                        "cooldown_until": bson::DateTime::from_chrono(cooldown_until),
                        "metadata.updated_at": bson::DateTime::now(),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(TrustgateError::NotFound(format!(
                "Claim {} not found",
                triple_id
            )));
        }
        Ok(())
    }

    async fn active_claims_for_subject(&self, atom_id: &str) -> Result<Vec<ClaimDoc>> {
        self.claims
            .find_sorted(
                doc! { "subject_atom_id": atom_id, "status": "active" },
                Some(doc! { "metadata.created_at": 1 }),
                None,
            )
            .await
    }

    async fn recent_claims_for_subject(&self, atom_id: &str, limit: i64) -> Result<Vec<ClaimDoc>> {
        self.claims
            .find_sorted(
                doc! { "subject_atom_id": atom_id, "status": "active" },
                Some(doc! { "metadata.created_at": -1 }),
                Some(limit),
            )
            .await
    }

    async fn first_claims_for_subject(&self, atom_id: &str, limit: i64) -> Result<Vec<ClaimDoc>> {
        self.claims
            .find_sorted(
                doc! { "subject_atom_id": atom_id },
                Some(doc! { "metadata.created_at": 1 }),
                Some(limit),
            )
            .await
    }

    async fn active_claims_by_rater(&self, wallet: &str) -> Result<Vec<ClaimDoc>> {
        self.claims
            .find_sorted(
                doc! { "creator_wallet": wallet, "status": "active" },
                Some(doc! { "metadata.created_at": 1 }),
                None,
            )
            .await
    }

    async fn cooldown_until(
        &self,
        wallet: &str,
        subject_atom_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let withdrawn = self
            .claims
            .find_sorted(
                doc! {
                    "creator_wallet": wallet,
                    "subject_atom_id": subject_atom_id,
                    "status": "withdrawn",
                    "cooldown_until": { "$exists": true },
                },
                Some(doc! { "cooldown_until": -1 }),
                Some(1),
            )
            .await?;

        Ok(withdrawn
            .into_iter()
            .next()
            .and_then(|c| c.cooldown_until)
            .map(|dt| dt.to_chrono()))
    }

    async fn upsert_trust_score(&self, score: TrustScoreDoc) -> Result<()> {
        self.scores
            .upsert_one(
                doc! { "atom_id": &score.atom_id },
                doc! {
                    "$set": {
                        "score": score.score,
                        "positive_stake": &score.positive_stake,
                        "negative_stake": &score.negative_stake,
                        "attestation_count": score.attestation_count,
                        "metadata.updated_at": bson::DateTime::now(),
                        "metadata.is_deleted": false,
                    },
                    "$setOnInsert": {
                        "metadata.created_at": bson::DateTime::now(),
                    }
                },
            )
            .await
            .map(|_| ())
    }

    async fn trust_score(&self, atom_id: &str) -> Result<Option<TrustScoreDoc>> {
        self.scores.find_one(doc! { "atom_id": atom_id }).await
    }

    async fn insert_reward_if_absent(&self, doc: RewardDoc) -> Result<bool> {
        match self.rewards.insert_one(doc).await {
            Ok(_) => Ok(true),
            Err(TrustgateError::Duplicate(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn mark_reward_claimed(&self, claim_triple_id: &str) -> Result<bool> {
        let previous = self
            .rewards
            .find_one_and_update(
                doc! { "claim_triple_id": claim_triple_id, "claimed": false },
                doc! {
                    "$set": {
                        "claimed": true,
                        "metadata.updated_at": bson::DateTime::now(),
                    }
                },
            )
            .await?;
        Ok(previous.is_some())
    }

    async fn rewards_for(&self, wallet: &str) -> Result<Vec<RewardDoc>> {
        self.rewards
            .find_many(doc! { "recipient_wallet": wallet })
            .await
    }
}
