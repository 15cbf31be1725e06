// mock.rs — Attestor that never leaves the process.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::attestor::Attestor;
use crate::error::AttestError;
use crate::record::{Attestation, AttestationRecord};

/// Returns deterministic mocked attestations for every record.
#[derive(Default)]
pub struct MockAttestor {
    published: AtomicU32,
}

impl MockAttestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records published so far.
    pub fn published(&self) -> u32 {
        self.published.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Attestor for MockAttestor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, record: &AttestationRecord) -> Result<Attestation, AttestError> {
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(record.mocked())
    }
}
