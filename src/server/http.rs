//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one spawned task per connection. All responses
//! are small JSON bodies, so everything is a `Full<Bytes>`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::attestation::AttestationService;
use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::types::TrustgateError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Process start, for the uptime reported by health checks
    pub started_at: Instant,
    /// Attestation cache connection
    pub mongo: MongoClient,
    /// The workflow coordinator behind every API route
    pub service: Arc<AttestationService>,
}

impl AppState {
    pub fn new(args: Args, mongo: MongoClient, service: Arc<AttestationService>) -> Self {
        Self {
            args,
            started_at: Instant::now(),
            mongo,
            service,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), TrustgateError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Trustgate listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - ephemeral signer key allowed");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let params = routes::parse_query_params(req.uri().query().unwrap_or(""));
    let wallet = req
        .headers()
        .get("x-wallet-address")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }

        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(Arc::clone(&state)).await
        }

        (Method::GET, "/version") => routes::version_info(),

        (Method::OPTIONS, _) => routes::preflight_response(),

        (Method::POST, "/api/v1/attestations") => {
            let body = req.into_body().collect().await?.to_bytes();
            routes::handle_create_attestation(state, wallet, body).await
        }

        (Method::POST, p) if p.starts_with("/api/v1/attestations/") && p.ends_with("/withdraw") => {
            match p
                .strip_prefix("/api/v1/attestations/")
                .and_then(|rest| rest.strip_suffix("/withdraw"))
                .filter(|id| !id.is_empty() && !id.contains('/'))
            {
                Some(triple_id) => {
                    routes::handle_withdraw_attestation(state, wallet, triple_id).await
                }
                None => routes::not_found_response(&path),
            }
        }

        (Method::GET, "/api/v1/attestations") => {
            routes::handle_list_attestations(state, &params).await
        }

        (Method::GET, "/api/v1/trust-score") => {
            routes::handle_trust_score(state, &params).await
        }

        (Method::POST, p) if p.starts_with("/api/v1/rewards/") && p.ends_with("/claim") => {
            match p
                .strip_prefix("/api/v1/rewards/")
                .and_then(|rest| rest.strip_suffix("/claim"))
                .filter(|w| !w.is_empty() && !w.contains('/'))
            {
                Some(wallet) => routes::handle_claim_rewards(state, wallet).await,
                None => routes::not_found_response(&path),
            }
        }

        (Method::GET, p) if p.starts_with("/api/v1/rewards/") => {
            match p
                .strip_prefix("/api/v1/rewards/")
                .filter(|w| !w.is_empty() && !w.contains('/'))
            {
                Some(wallet) => routes::handle_rewards_summary(state, wallet).await,
                None => routes::not_found_response(&path),
            }
        }

        (Method::POST, "/api/v1/seed/predicates") => {
            routes::handle_seed_predicates(state).await
        }

        _ => routes::not_found_response(&path),
    };

    Ok(response)
}
