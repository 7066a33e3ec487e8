//! # Repaso Core
//!
//! Scheduling engine for a Spanish-vocabulary learning app. Two
//! cooperating models decide when each item (lemma, phrase, or read-mode
//! fragment) comes back and how its memory estimate evolves:
//!
//! - **FSRS scheduler**: a continuous memory model (stability,
//!   difficulty, retrievability) on a power-law forgetting curve. Drives
//!   the actual due dates. One scheduling function, parametrized per item
//!   class - fragments run a lower target retention and therefore longer
//!   intervals.
//! - **Time-gated mastery**: a discrete 0-100 progress score with an
//!   enforced minimum wait between mastery gains, scaled by how well the
//!   item is already known. Drives the progress display and deliberately
//!   resists rapid-fire inflation.
//!
//! Both are pure functions of `(prior state, grade, now)` - no I/O, no
//! clock reads, no randomness. Persistence is an external collaborator:
//! [`storage::ProgressStore`] holds one row per (user, item) and the
//! [`tracker::ReviewService`] adapter wires the pure core to it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use repaso_core::{Grade, ItemKind, ProgressStore, ReviewService};
//!
//! let store = ProgressStore::new(None)?;
//! let service = ReviewService::new(store);
//!
//! // Record a review
//! let outcome = service.record_review("user-1", "lemma:hablar", ItemKind::Lemma, Grade::Medium)?;
//! println!("next review {}", outcome.due_human);
//!
//! // Build today's queue
//! let due = service.due_queue("user-1", chrono::Utc::now(), 50)?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod fsrs;
pub mod grade;
pub mod mastery;
pub mod progress;
pub mod session;
pub mod storage;
pub mod tracker;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Review signal
pub use grade::Grade;

// FSRS scheduler
pub use fsrs::{
    FsrsProgress,
    FsrsScheduler,
    FsrsState,
    GradePreview,
    ScheduleError,
    SchedulerParameters,
    next_difficulty,
    next_interval,
    next_stability,
    // Core functions for advanced usage
    retrievability,
};

// Mastery model
pub use mastery::{
    MasteryOutcome, MasteryParameters, MasteryProgress, TimeGateInfo, calculate_mastery_change,
    decayed_health,
};

// Progress records
pub use progress::{ItemKind, ProgressRecord};

// Session assembly
pub use session::{
    CHAPTER_UNLOCK_THRESHOLD, LearnCandidate, SessionQueue, build_learn_queue, build_review_queue,
    chapter_unlocks, filter_unseen, humanize_due,
};

// Storage layer
pub use storage::{ProgressStore, StoreError};

// Review tracking
pub use tracker::{ReviewOutcome, ReviewService, TrackError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        FsrsProgress, FsrsScheduler, FsrsState, Grade, ItemKind, MasteryProgress, ProgressRecord,
        ProgressStore, ReviewOutcome, ReviewService, ScheduleError, SchedulerParameters,
        SessionQueue, StoreError,
    };
}
