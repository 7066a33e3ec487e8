//! FSRS (Free Spaced Repetition Scheduler) Module
//!
//! The continuous memory model behind due-date scheduling: stability,
//! difficulty, and retrievability per card, with a power-law forgetting
//! curve.
//!
//! ## Core formulas
//!
//! - Retrievability: `R = (1 + FACTOR * t / S)^(-DECAY)`
//! - Interval: `t = S / FACTOR * (r^(-1/DECAY) - 1)`
//!
//! One scheduling function serves every item class; the fragment profile
//! simply runs it with a lower target-retention constant, which stretches
//! every interval. The parallel, coarser progress number lives in
//! [`crate::mastery`] and shares nothing with this module but the
//! [`crate::grade::Grade`] input.

mod algorithm;
mod scheduler;

pub use algorithm::{
    DECAY,
    DEFAULT_DIFFICULTY,
    FACTOR,
    MAX_DIFFICULTY,
    MAX_STABILITY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
    next_difficulty,
    next_forget_stability,
    next_interval,
    next_recall_stability,
    next_stability,
    // Core functions
    retrievability,
};

pub use scheduler::{
    DEFAULT_RETENTION, FRAGMENT_RETENTION, FsrsProgress, FsrsScheduler, FsrsState, GradePreview,
    Result, ScheduleError, SchedulerParameters,
};
