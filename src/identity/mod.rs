//! Rater and node identity
//!
//! The workflow never invents an identity: it asks an [`IdentityProvider`]
//! and treats absence as a precondition failure, not something to retry.
//! HTTP requests carry the rater's wallet ([`WalletIdentity`]); the gateway
//! itself signs catalog seeding with its own Ed25519 key
//! ([`LocalIdentity`]).

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::types::{Result, TrustgateError};

/// The identity a claim is created under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaterIdentity {
    /// Wallet-style address, 0x-prefixed lowercase hex
    pub address: String,
}

/// Supplies the current rater's identity.
///
/// Absence of an identity is a precondition failure surfaced as
/// `Unauthorized`; callers must not retry it.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Result<RaterIdentity>;
}

/// Per-request identity carrying the wallet address from the caller
#[derive(Debug, Clone)]
pub struct WalletIdentity {
    wallet: Option<String>,
}

impl WalletIdentity {
    pub fn new(wallet: Option<String>) -> Self {
        Self {
            wallet: wallet.filter(|w| !w.trim().is_empty()),
        }
    }
}

impl IdentityProvider for WalletIdentity {
    fn current(&self) -> Result<RaterIdentity> {
        match &self.wallet {
            Some(wallet) => Ok(RaterIdentity {
                address: wallet.to_lowercase(),
            }),
            None => Err(TrustgateError::Unauthorized(
                "No wallet connected; connect a wallet to create attestations".into(),
            )),
        }
    }
}

/// Node identity backed by an Ed25519 keypair
pub struct LocalIdentity {
    signing_key: SigningKey,
    address: String,
}

impl LocalIdentity {
    /// Load from a 32-byte hex seed (the SIGNER_KEY config value)
    pub fn from_hex_seed(seed: &str) -> Result<Self> {
        let bytes = hex::decode(seed.trim_start_matches("0x"))
            .map_err(|e| TrustgateError::Config(format!("Invalid signer key hex: {}", e)))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TrustgateError::Config("Signer key must be 32 bytes".into()))?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&seed)))
    }

    /// Generate an ephemeral key (dev mode only)
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = derive_address(&signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl IdentityProvider for LocalIdentity {
    fn current(&self) -> Result<RaterIdentity> {
        Ok(RaterIdentity {
            address: self.address.clone(),
        })
    }
}

/// Derive a wallet-style address from a verifying key: last 20 bytes of the
/// SHA-256 of the public key, 0x-prefixed hex.
fn derive_address(key: &VerifyingKey) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("0x{}", hex::encode(&digest[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_identity_lowercases() {
        let identity = WalletIdentity::new(Some("0xABCDEF0123".into()));
        assert_eq!(identity.current().unwrap().address, "0xabcdef0123");
    }

    #[test]
    fn test_missing_wallet_is_unauthorized() {
        for wallet in [None, Some(String::new()), Some("   ".to_string())] {
            let identity = WalletIdentity::new(wallet);
            assert!(matches!(
                identity.current(),
                Err(TrustgateError::Unauthorized(_))
            ));
        }
    }

    #[test]
    fn test_seed_derives_stable_address() {
        let seed = "11".repeat(32);
        let a = LocalIdentity::from_hex_seed(&seed).unwrap();
        let b = LocalIdentity::from_hex_seed(&format!("0x{}", seed)).unwrap();
        assert_eq!(a.address(), b.address());
        assert!(a.address().starts_with("0x"));
        assert_eq!(a.address().len(), 42);
    }

    #[test]
    fn test_generated_identities_differ() {
        let a = LocalIdentity::generate();
        let b = LocalIdentity::generate();
        assert_ne!(a.address(), b.address());
    }
}
