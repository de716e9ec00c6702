//! Health check endpoints
//!
//! Kubernetes-style probes:
//! - /health, /healthz - liveness (is the gateway running?)
//! - /ready, /readyz - readiness (can it serve traffic? requires MongoDB)
//!
//! The ledger is deliberately not part of readiness: reads are served from
//! the local cache, so a ledger outage degrades writes without taking the
//! gateway out of rotation.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::json_response;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if the service is running)
    pub healthy: bool,
    /// 'online' or 'degraded' for status dashboards
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Current timestamp
    pub timestamp: String,
    /// Operating mode
    pub mode: &'static str,
    /// Node identifier
    pub node_id: String,
    /// Attestation cache (MongoDB) status
    pub database: DatabaseHealth,
    /// Ledger collaborator configuration
    pub ledger: LedgerHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub name: String,
}

#[derive(Serialize)]
pub struct LedgerHealth {
    pub url: String,
    pub chain_id: u64,
}

async fn build_health_response(state: &AppState) -> HealthResponse {
    let args = &state.args;
    let database_connected = state.mongo.ping().await.is_ok();

    HealthResponse {
        healthy: true,
        status: if database_connected {
            "online"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: args.node_id.to_string(),
        database: DatabaseHealth {
            connected: database_connected,
            name: state.mongo.db_name().to_string(),
        },
        ledger: LedgerHealth {
            url: args.ledger_url.clone(),
            chain_id: args.chain_id,
        },
    }
}

/// Handle liveness probe (/health, /healthz)
///
/// Always 200 while the process is up; the body carries database status for
/// callers that want it.
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state).await;
    json_response(StatusCode::OK, &response)
}

/// Handle readiness probe (/ready, /readyz)
///
/// 200 only when the attestation cache is reachable. Use this for load
/// balancer checks.
pub async fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state).await;
    let status = if response.database.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "trustgate",
    };
    json_response(StatusCode::OK, &response)
}
