//! # pod-attest
//!
//! The attestor collaborator: publishes a finalized goal outcome to an
//! external attestation ledger and returns an opaque attestation id.
//!
//! Attestation degrades instead of failing when the ledger is not configured
//! or not reachable: a deterministic mock id is returned and flagged with
//! `mocked = true`, so the lifecycle can run in a disconnected demo mode
//! without ever hiding that fact from the caller.
//!
//! - [`Attestor`] — the async trait
//! - [`AttestationRecord`] / [`Attestation`] — what is published and what comes back
//! - [`LedgerAttestor`] — HTTP ledger gateway client with mock fallback
//! - [`MockAttestor`] — always-mocked attestor

pub mod attestor;
pub mod error;
pub mod ledger;
pub mod mock;
pub mod record;

pub use attestor::Attestor;
pub use error::AttestError;
pub use ledger::LedgerAttestor;
pub use mock::MockAttestor;
pub use record::{Attestation, AttestationRecord, APP_NAME, SCHEMA};
