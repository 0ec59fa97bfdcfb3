//! reviewcrab: automated GitHub PR review with branch-based expectations
//! and instructor approval.
//!
//! This umbrella crate re-exports the workspace members for embedding the
//! review pipeline in other tooling; the runnable service lives in
//! `reviewcrab-server`.

pub use reviewcrab_api;
pub use reviewcrab_core;
pub use reviewcrab_db;
pub use reviewcrab_github;
