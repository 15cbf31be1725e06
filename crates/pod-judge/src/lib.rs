//! # pod-judge
//!
//! The judge collaborator: it writes exactly two verification questions for
//! a goal and grades one submitted answer at a time.
//!
//! - [`Judge`] — the async trait the lifecycle controller depends on
//! - [`OpenAiJudge`] — OpenAI-compatible chat-completions backend
//! - [`MockJudge`] — deterministic offline judge for demos and tests
//! - [`normalize`] — turns whatever shape the model returned into a
//!   [`pod_goal::QuestionPair`] or [`pod_goal::Verdict`] before it reaches the core

pub mod error;
pub mod judge;
pub mod mock;
pub mod normalize;
pub mod openai;

pub use error::JudgeError;
pub use judge::Judge;
pub use mock::MockJudge;
pub use openai::OpenAiJudge;
