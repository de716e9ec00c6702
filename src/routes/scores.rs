//! Trust score endpoint
//!
//! `GET /api/v1/trust-score?atom_id=...` or
//! `GET /api/v1/trust-score?entity_kind=item&entity_key=pkg_1`
//!
//! A subject nobody has attested about yet is not an error: it scores zero
//! with zero attestations, which is what the storefront renders for fresh
//! catalog items.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::schemas::SubjectKind;
use crate::routes::attestations::AttestationView;
use crate::routes::{error_response, json_response};
use crate::server::AppState;
use crate::types::TrustgateError;

#[derive(Serialize)]
struct TrustScoreResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    atom_id: Option<String>,
    score: f64,
    positive_stake: String,
    negative_stake: String,
    attestation_count: i64,
    recent_attestations: Vec<AttestationView>,
}

impl TrustScoreResponse {
    fn unattested() -> Self {
        Self {
            atom_id: None,
            score: 0.0,
            positive_stake: "0".into(),
            negative_stake: "0".into(),
            attestation_count: 0,
            recent_attestations: Vec::new(),
        }
    }
}

/// Handle GET /api/v1/trust-score
pub async fn handle_trust_score(
    state: Arc<AppState>,
    params: &HashMap<String, String>,
) -> Response<Full<Bytes>> {
    let atom_id = match resolve_atom_id(&state, params).await {
        Ok(Some(id)) => id,
        // Known route, unknown subject: zero score
        Ok(None) => return json_response(StatusCode::OK, &TrustScoreResponse::unattested()),
        Err(e) => return error_response(&e),
    };

    let score = match state.service.trust_score(&atom_id).await {
        Ok(score) => score,
        Err(e) => return error_response(&e),
    };

    let limit = params.get("limit").and_then(|l| l.parse::<i64>().ok());
    let recent = match state.service.recent_attestations(&atom_id, limit).await {
        Ok(claims) => claims.iter().map(AttestationView::from).collect(),
        Err(e) => return error_response(&e),
    };

    json_response(
        StatusCode::OK,
        &TrustScoreResponse {
            atom_id: Some(atom_id),
            score: score.score,
            positive_stake: score.positive_stake,
            negative_stake: score.negative_stake,
            attestation_count: score.attestation_count,
            recent_attestations: recent,
        },
    )
}

/// Accept either a direct atom id or an (entity_kind, entity_key) pair
async fn resolve_atom_id(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<Option<String>, TrustgateError> {
    if let Some(atom_id) = params.get("atom_id") {
        return Ok(Some(atom_id.clone()));
    }

    let (Some(kind), Some(key)) = (params.get("entity_kind"), params.get("entity_key")) else {
        return Err(TrustgateError::BadRequest(
            "Provide atom_id, or entity_kind and entity_key".into(),
        ));
    };

    let kind = SubjectKind::parse(kind).ok_or_else(|| {
        TrustgateError::BadRequest(format!("Unknown entity_kind '{}'", kind))
    })?;

    Ok(state
        .service
        .find_subject(kind, key)
        .await?
        .map(|subject| subject.atom_id))
}
