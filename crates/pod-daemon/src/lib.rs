//! # pod-daemon
//!
//! HTTP boundary for the Proof of Day goal lifecycle.
//!
//! - [`config`] — `pod.toml` loading with environment overrides for secrets
//! - [`services`] — builds the [`pod_lifecycle::Controller`] and its collaborators
//! - [`api`] — axum router exposing every lifecycle transition
//! - [`error`] — maps lifecycle errors onto HTTP statuses and JSON bodies
//! - [`extract`] — JSON body extractors that reject with the same error body

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod services;

pub use api::{create_router, AppState};
pub use config::DaemonConfig;

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
