//! Shared types for Trustgate

pub mod error;

pub use error::{Result, TrustgateError};
