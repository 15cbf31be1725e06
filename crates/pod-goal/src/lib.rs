//! # pod-goal
//!
//! Goal records and goal storage for Proof of Day.
//!
//! A [`Goal`] is a user-declared daily task. It starts `PENDING`, receives a
//! pair of verification questions, is graded `PASSED` or `FAILED`, may be
//! disputed once after a failure, and is finally recorded on an external
//! attestation ledger. This crate owns the data model and the storage layer;
//! the transition rules that drive a goal through that lifecycle live in
//! `pod-lifecycle`.
//!
//! ## Key components
//!
//! - [`Goal`] — the canonical record, with [`GoalStatus`] and [`LifecycleState`]
//! - [`GoalPatch`] — partial update merged into a stored record
//! - [`GoalStore`] — storage abstraction, implemented by [`MemoryGoalStore`]
//!   (tests, demo mode) and [`FileGoalStore`] (one JSON file per goal)
//! - [`PublicGoal`] / [`FeedEntry`] — the public projection and the
//!   recent-attestation feed index
//! - [`PodEvent`] / [`EventDispatcher`] — lifecycle events for notification sinks

pub mod error;
pub mod events;
pub mod feed;
pub mod goal;
pub mod memory;
pub mod store;

pub use error::GoalError;
pub use events::{EventDispatcher, LogSink, NotificationSink, PodEvent};
pub use feed::{FeedEntry, PublicGoal, DEFAULT_FEED_LIMIT, FEED_CAPACITY};
pub use goal::{
    AnswerPair, AttestationRef, Goal, GoalId, GoalPatch, GoalStatus, LifecycleState, QuestionPair,
    Verdict,
};
pub use memory::MemoryGoalStore;
pub use store::{FileGoalStore, GoalStore};
