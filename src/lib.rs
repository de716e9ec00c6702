//! Trustgate - trust-score and attestation gateway for the Urban Mayhem storefront
//!
//! Trustgate sits between the storefront and the Intuition attestation
//! ledger. It coordinates staked ratings ("attestations") on catalog items
//! and players, caches the resulting claims in MongoDB, and derives
//! crowd-sourced trust scores and early-attestor rewards from them.
//!
//! ## Services
//!
//! - **Attestation workflow**: resolve subject and predicate atoms
//!   (find-or-create), submit the staked claim to the ledger, record it
//!   locally, recompute the subject's trust score
//! - **Trust scores**: pure aggregation of active claims into a 0-100
//!   percentage, cached per subject with read-through recompute
//! - **Rewards**: decaying early-attestor bonus for the first 10 raters of
//!   a subject, claimable exactly once
//! - **HTTP API**: thin hyper server exposing the above to the storefront

pub mod attestation;
pub mod config;
pub mod db;
pub mod identity;
pub mod ledger;
pub mod routes;
pub mod server;
pub mod store;
pub mod trust;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, TrustgateError};
