//! # pod-dispute
//!
//! Everything the dispute sub-flow needs besides the goal store:
//!
//! - [`post`] — parse a social-post URL into a post id; [`PostContent`]
//! - [`marker`] — dispute markers (single-use token or profile URL), the
//!   pre-filled intent URL, and the case-insensitive marker match
//! - [`PostVerifier`] — the async fetch trait, with [`fetch_with_retry`]
//!   applying the bounded fixed-delay [`RetryPolicy`]
//! - [`SyndicationVerifier`] — public syndication JSON fetcher
//! - [`StaticPostVerifier`] — in-memory posts for demos and tests

pub mod error;
pub mod marker;
pub mod post;
pub mod syndication;
pub mod verifier;

pub use error::VerifyError;
pub use marker::{generate_token, profile_path, profile_url, DisputeMarker, MarkerStrategy};
pub use post::{parse_post_id, PostContent};
pub use syndication::SyndicationVerifier;
pub use verifier::{fetch_with_retry, PostVerifier, RetryPolicy, StaticPostVerifier};
