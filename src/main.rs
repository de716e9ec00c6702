//! Trustgate - trust-score and attestation gateway for Urban Mayhem

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trustgate::{
    attestation::{AttestationService, WorkflowConfig},
    config::Args,
    db::MongoClient,
    identity::LocalIdentity,
    ledger::{intuition::IntuitionConfig, IntuitionLedger},
    server,
    store::MongoStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("trustgate={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Trustgate - Urban Mayhem Gateway");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode {
            "DEVELOPMENT"
        } else {
            "PRODUCTION"
        }
    );
    info!("Ledger: {} (chain {})", args.ledger_url, args.chain_id);
    info!("MultiVault: {}", args.multivault());
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Cooldown: {}h", args.cooldown_hours);
    info!("======================================");

    // Connect to MongoDB. The attestation cache is not optional: every read
    // path serves from it.
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            client
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Node signing identity for predicate catalog seeding
    let node_identity = match &args.signer_key {
        Some(seed) => match LocalIdentity::from_hex_seed(seed) {
            Ok(identity) => identity,
            Err(e) => {
                error!("Failed to load signer key: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            // validate() already guarantees dev mode here
            warn!("No SIGNER_KEY configured, generating an ephemeral node key");
            LocalIdentity::generate()
        }
    };
    info!("Node identity: {}", node_identity.address());

    // Ledger client
    let ledger = match IntuitionLedger::new(IntuitionConfig {
        base_url: args.ledger_url.clone(),
        chain_id: args.chain_id,
        multivault_address: args.multivault(),
        timeout: Duration::from_millis(args.request_timeout_ms),
    }) {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("Failed to create ledger client: {}", e);
            std::process::exit(1);
        }
    };

    // Store and workflow
    let store = match MongoStore::new(&mongo).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize attestation cache collections: {}", e);
            std::process::exit(1);
        }
    };

    let service = Arc::new(AttestationService::new(
        Arc::new(store),
        Arc::new(ledger),
        Arc::new(node_identity),
        WorkflowConfig::from_args(&args),
    ));

    // Log score changes so operators can follow them without a subscriber
    let mut score_events = service.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = score_events.recv().await {
            info!(
                atom_id = %event.atom_id,
                score = event.score,
                attestations = event.attestation_count,
                "Trust score updated"
            );
        }
    });

    let state = Arc::new(server::AppState::new(args, mongo, service));

    // Run the server
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
