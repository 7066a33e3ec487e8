//! Storage Module
//!
//! SQLite-backed persistence for progress records:
//! - upsert keyed on (user_id, item_id), last-write-wins
//! - due-queue and introduced-count queries
//! - daily review-activity counters
//!
//! The scheduling core never touches this module; only the
//! [`crate::tracker`] adapter does.

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{ProgressStore, Result, StoreError};
