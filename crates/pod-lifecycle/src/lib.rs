//! # pod-lifecycle
//!
//! The goal lifecycle controller. It drives a [`pod_goal::Goal`] through
//!
//! ```text
//! PENDING ──questions──▶ PENDING+questions ──answers──▶ PASSED | FAILED
//!                                                          │
//!                                   FAILED ──start dispute──▶ dispute pending
//!                                                          │
//!                                       verify ──▶ PASSED+disputed | FAILED+disputed
//! ```
//!
//! and keeps the stored record, the judge's verdict and the attestation
//! ledger consistent. Every collaborator is injected as a trait object, so
//! the same controller runs against the real services or fully offline.
//!
//! Concurrent transitions on one goal are not serialized; the store is
//! last-write-wins.

pub mod config;
pub mod controller;
pub mod error;
pub mod outcome;
pub mod transcript;

pub use config::{DisputeConfig, JudgeFailurePolicy, LifecycleConfig, TerminalPolicy};
pub use controller::{Controller, NewGoal};
pub use error::{ErrorKind, LifecycleError};
pub use outcome::{AttestOutcome, AttestRequest, DisputeOutcome, DisputeStart, GradeOutcome, QuestionsIssued};
