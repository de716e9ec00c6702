//! Attestation endpoints
//!
//! - `POST /api/v1/attestations` - place a staked rating
//! - `POST /api/v1/attestations/{triple_id}/withdraw` - withdraw a stake
//! - `GET /api/v1/attestations?subject_atom_id=...&limit=...` - recent ratings
//!
//! The rater's wallet arrives in the `X-Wallet-Address` header; a missing
//! wallet is rejected by the workflow before anything touches the ledger.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::attestation::{AttestRequest, SubjectSpec};
use crate::db::schemas::{ClaimDoc, SubjectKind};
use crate::identity::WalletIdentity;
use crate::routes::{error_response, json_response};
use crate::server::AppState;
use crate::types::TrustgateError;

#[derive(Deserialize)]
struct SubjectBody {
    /// "item" or "player"
    kind: String,
    /// Item SKU or player wallet address
    key: String,
    display_name: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct AttestBody {
    subject: SubjectBody,
    predicate: String,
    /// Stake in the token's smallest unit, as a decimal string
    stake_amount: String,
    comment: Option<String>,
}

/// API view of a claim row
#[derive(Serialize)]
pub struct AttestationView {
    pub triple_id: String,
    pub subject_atom_id: String,
    pub predicate: String,
    pub stake_amount: String,
    pub creator_wallet: String,
    pub transaction_hash: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&ClaimDoc> for AttestationView {
    fn from(claim: &ClaimDoc) -> Self {
        Self {
            triple_id: claim.triple_id.clone(),
            subject_atom_id: claim.subject_atom_id.clone(),
            predicate: claim.predicate_text.clone(),
            stake_amount: claim.stake_amount.clone(),
            creator_wallet: claim.creator_wallet.clone(),
            transaction_hash: claim.transaction_hash.clone(),
            status: if claim.is_active() {
                "active"
            } else {
                "withdrawn"
            },
            comment: claim.comment.clone(),
            created_at: claim
                .metadata
                .created_at
                .map(|dt| dt.to_chrono().to_rfc3339()),
        }
    }
}

fn parse_body(body: &Bytes, wallet: Option<String>) -> Result<(WalletIdentity, AttestRequest), TrustgateError> {
    let body: AttestBody = serde_json::from_slice(body)?;

    let kind = SubjectKind::parse(&body.subject.kind).ok_or_else(|| {
        TrustgateError::BadRequest(format!(
            "Unknown subject kind '{}', expected 'item' or 'player'",
            body.subject.kind
        ))
    })?;

    let stake_amount = body.stake_amount.parse::<u128>().map_err(|_| {
        TrustgateError::BadRequest(format!(
            "stake_amount must be a decimal integer in the smallest unit, got '{}'",
            body.stake_amount
        ))
    })?;

    let request = AttestRequest {
        subject: SubjectSpec {
            kind,
            key: body.subject.key,
            display_name: body.subject.display_name,
            description: body.subject.description,
            image_url: body.subject.image_url,
        },
        predicate: body.predicate,
        stake_amount,
        comment: body.comment,
    };

    Ok((WalletIdentity::new(wallet), request))
}

/// Handle POST /api/v1/attestations
pub async fn handle_create_attestation(
    state: Arc<AppState>,
    wallet: Option<String>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let (rater, request) = match parse_body(&body, wallet) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    match state.service.attest(&rater, request).await {
        Ok(outcome) => json_response(StatusCode::CREATED, &outcome),
        Err(e) => error_response(&e),
    }
}

/// Handle POST /api/v1/attestations/{triple_id}/withdraw
pub async fn handle_withdraw_attestation(
    state: Arc<AppState>,
    wallet: Option<String>,
    triple_id: &str,
) -> Response<Full<Bytes>> {
    let rater = WalletIdentity::new(wallet);

    match state.service.withdraw(&rater, triple_id).await {
        Ok(score) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "triple_id": triple_id,
                "status": "withdrawn",
                "score": score,
            }),
        ),
        Err(e) => error_response(&e),
    }
}

/// Handle GET /api/v1/attestations
pub async fn handle_list_attestations(
    state: Arc<AppState>,
    params: &HashMap<String, String>,
) -> Response<Full<Bytes>> {
    let Some(atom_id) = params.get("subject_atom_id") else {
        return error_response(&TrustgateError::BadRequest(
            "subject_atom_id query parameter is required".into(),
        ));
    };
    let limit = params.get("limit").and_then(|l| l.parse::<i64>().ok());

    debug!(subject = %atom_id, ?limit, "Listing recent attestations");

    match state.service.recent_attestations(atom_id, limit).await {
        Ok(claims) => {
            let views: Vec<AttestationView> = claims.iter().map(AttestationView::from).collect();
            json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "subject_atom_id": atom_id,
                    "count": views.len(),
                    "attestations": views,
                }),
            )
        }
        Err(e) => error_response(&e),
    }
}
