// attestor.rs — The Attestor trait.

use async_trait::async_trait;

use crate::error::AttestError;
use crate::record::{Attestation, AttestationRecord};

/// Publishes finalized goal outcomes to an attestation ledger.
///
/// Missing credentials or an unreachable ledger must degrade to a mocked
/// attestation (`mocked = true`) rather than an error.
#[async_trait]
pub trait Attestor: Send + Sync {
    /// Adapter display name (for logs and health output).
    fn name(&self) -> &str;

    /// Publish one record and return its attestation reference.
    async fn publish(&self, record: &AttestationRecord) -> Result<Attestation, AttestError>;
}
