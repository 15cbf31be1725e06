// error.rs — Error types for attestors.

use thiserror::Error;

/// Errors that survive the mock fallback and reach the caller.
#[derive(Debug, Error)]
pub enum AttestError {
    /// The ledger answered but refused the attestation.
    #[error("ledger rejected attestation ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The ledger's reply could not be interpreted.
    #[error("ledger response unparseable: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("attestor client setup failed: {0}")]
    Client(String),
}
