//! Predicate catalog seeding
//!
//! `POST /api/v1/seed/predicates` mints the atom for every catalog predicate
//! under the gateway's own identity. Idempotent: predicates that already
//! have atoms are returned as-is.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::{error_response, json_response};
use crate::server::AppState;

#[derive(Serialize)]
struct SeededPredicate {
    text: String,
    atom_id: String,
}

/// Handle POST /api/v1/seed/predicates
pub async fn handle_seed_predicates(state: Arc<AppState>) -> Response<Full<Bytes>> {
    match state.service.seed_predicates().await {
        Ok(subjects) => {
            let predicates: Vec<SeededPredicate> = subjects
                .into_iter()
                .map(|s| SeededPredicate {
                    text: s.entity_key,
                    atom_id: s.atom_id,
                })
                .collect();
            json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "seeded": predicates.len(),
                    "predicates": predicates,
                }),
            )
        }
        Err(e) => error_response(&e),
    }
}
