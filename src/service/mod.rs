//! Client side of the external score service
//!
//! Submission is best-effort: failures are typed, logged, and handed back to
//! the UI for display, never to the engine.

pub mod client;
pub mod error;

pub use client::{
    HttpScoreService, LeaderboardEntry, ScoreService, ScoreSubmission, SubmitReceipt,
};
pub use error::{ServiceError, ServiceResult};
