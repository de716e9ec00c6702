//! Scriptable in-memory ledger for tests
//!
//! Mints deterministic atom/triple ids and can be told to fail the next
//! operations, which is how the workflow tests exercise ledger rejection
//! and the ledger-succeeded/persist-failed gap.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::ledger::{AtomReceipt, AtomSpec, ClaimReceipt, ClaimSubmission, Ledger};
use crate::types::{Result, TrustgateError};

#[derive(Default)]
pub struct MockLedger {
    atom_counter: AtomicU64,
    triple_counter: AtomicU64,
    fail_atoms: AtomicBool,
    fail_submissions: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent atom mint fail
    pub fn fail_atoms(&self, fail: bool) {
        self.fail_atoms.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent claim submission fail
    pub fn fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    /// How many atoms have been minted
    pub fn atoms_minted(&self) -> u64 {
        self.atom_counter.load(Ordering::SeqCst)
    }

    /// How many claims have been submitted
    pub fn claims_submitted(&self) -> u64 {
        self.triple_counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn create_atom(&self, _spec: &AtomSpec, creator: &str) -> Result<AtomReceipt> {
        if self.fail_atoms.load(Ordering::SeqCst) {
            return Err(TrustgateError::Ledger("mock atom mint failure".into()));
        }
        let n = self.atom_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AtomReceipt {
            atom_id: format!("atom-{}", n),
            atom_uri: format!("ipfs://mock/{}", n),
            transaction_hash: format!("0xatomtx{:04}", n),
            creator: creator.to_string(),
        })
    }

    async fn submit_claim(
        &self,
        submission: &ClaimSubmission,
        creator: &str,
    ) -> Result<ClaimReceipt> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(TrustgateError::Ledger("mock submission failure".into()));
        }
        if submission.subject_atom_id.is_empty()
            || submission.predicate_atom_id.is_empty()
            || submission.object_atom_id.is_empty()
        {
            return Err(TrustgateError::Ledger("mock: empty atom id".into()));
        }
        let n = self.triple_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ClaimReceipt {
            triple_id: format!("triple-{}", n),
            transaction_hash: format!("0xtripletx{:04}", n),
            creator: creator.to_string(),
        })
    }
}
