//! FSRS scheduler - card state machine
//!
//! Transitions a card's progress record in response to a review grade and
//! derives the next due time by inverting the forgetting curve at the
//! profile's target retention. The scheduler is a pure function of
//! `(prior record, grade, now)`: no clock reads, no randomness, no I/O.
//! Persistence belongs to the callers in [`crate::storage`] and
//! [`crate::tracker`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{
    MAX_DIFFICULTY, MIN_DIFFICULTY, next_difficulty, next_forget_stability, next_interval,
    next_recall_stability, retrievability,
};
use crate::grade::Grade;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Scheduling error type.
///
/// Both variants indicate a caller bug, not a retryable condition: an
/// unrecognized grade escaped UI validation, or a corrupted record was
/// read from storage. The scheduler refuses to produce a successor state
/// from bad input rather than silently repairing it.
#[non_exhaustive]
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScheduleError {
    /// Grade value outside 1-4.
    #[error("invalid grade value: {0} (expected 1-4)")]
    InvalidGrade(i32),
    /// Progress record with an out-of-range state or field.
    #[error("invalid progress state: {0}")]
    InvalidState(String),
}

/// Scheduling result type.
pub type Result<T> = std::result::Result<T, ScheduleError>;

// ============================================================================
// LIFECYCLE STATE
// ============================================================================

/// Coarse lifecycle stage of a card.
///
/// Mostly monotonic (`New -> Learning -> Review`) but a lapse regresses a
/// `Review` card to `Relearning` until it re-graduates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FsrsState {
    /// Never reviewed.
    #[default]
    New = 0,
    /// Inside the short-interval step schedule after first exposure.
    Learning = 1,
    /// Graduated; intervals come from the forgetting curve.
    Review = 2,
    /// Lapsed out of Review; repeating the step schedule.
    Relearning = 3,
}

impl FsrsState {
    /// Convert to the integer stored in the progress table.
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Parse from the stored integer. Returns `None` out of range.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(FsrsState::New),
            1 => Some(FsrsState::Learning),
            2 => Some(FsrsState::Review),
            3 => Some(FsrsState::Relearning),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FsrsState::New => "new",
            FsrsState::Learning => "learning",
            FsrsState::Review => "review",
            FsrsState::Relearning => "relearning",
        }
    }

    /// True while the card is on the minutes-scale step schedule.
    #[inline]
    pub fn is_stepping(&self) -> bool {
        matches!(self, FsrsState::Learning | FsrsState::Relearning)
    }
}

impl std::fmt::Display for FsrsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PROGRESS VALUE OBJECT
// ============================================================================

/// FSRS scheduling state for one (user, item) pair.
///
/// Strictly derived: every review produces a fresh record from the prior
/// one; no field is mutated outside a scheduling transition. The legacy
/// mastery fields live in [`crate::mastery::MasteryProgress`] - the two
/// models share item identity and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsrsProgress {
    /// Memory stability in days (time to decay to 90% recall).
    pub stability: f64,
    /// Intrinsic hardness estimate, 1.0-10.0.
    pub difficulty: f64,
    /// Lifecycle stage.
    pub state: FsrsState,
    /// Position in the learning/relearning step schedule.
    pub learning_step: u8,
    /// Total reviews, successful or not.
    pub reps: i32,
    /// Failed reviews from the Review state.
    pub lapses: i32,
    /// Most recent review time.
    pub last_review_at: Option<DateTime<Utc>>,
    /// When the card next becomes eligible for review.
    pub due_at: Option<DateTime<Utc>>,
}

impl Default for FsrsProgress {
    fn default() -> Self {
        Self {
            stability: 0.0,
            difficulty: 0.0,
            state: FsrsState::New,
            learning_step: 0,
            reps: 0,
            lapses: 0,
            last_review_at: None,
            due_at: None,
        }
    }
}

impl FsrsProgress {
    /// A never-reviewed card.
    pub fn new_card() -> Self {
        Self::default()
    }

    /// Check whether the card is due at `now`. New cards are always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at.map(|due| due <= now).unwrap_or(true)
    }

    /// Reject records that could not have been produced by a scheduling
    /// transition. Defensive check on read, not silent repair.
    fn validate(&self) -> Result<()> {
        if self.reps < 0 || self.lapses < 0 {
            return Err(ScheduleError::InvalidState(format!(
                "negative counters: reps={} lapses={}",
                self.reps, self.lapses
            )));
        }
        if self.state == FsrsState::New {
            return Ok(());
        }
        if self.stability <= 0.0 || !self.stability.is_finite() {
            return Err(ScheduleError::InvalidState(format!(
                "non-positive stability {} in state {}",
                self.stability, self.state
            )));
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(ScheduleError::InvalidState(format!(
                "difficulty {} outside [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}]",
                self.difficulty
            )));
        }
        if self.last_review_at.is_none() {
            return Err(ScheduleError::InvalidState(format!(
                "state {} with no last review timestamp",
                self.state
            )));
        }
        Ok(())
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Target retention for ordinary items (lemmas, phrases).
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Target retention for fragment items. Lower on purpose: the same recall
/// threshold is crossed later, so sub-sentence fragments are reviewed less
/// often than the full lemmas they overlap with.
pub const FRAGMENT_RETENTION: f64 = 0.8;

/// Scheduler configuration, injected rather than read from module globals
/// so tests and the fragment profile can swap tables freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerParameters {
    /// Recall probability the schedule aims to maintain at review time.
    pub target_retention: f64,
    /// Floor for Review-state intervals, days.
    pub min_interval_days: f64,
    /// Ceiling for Review-state intervals, days.
    pub max_interval_days: f64,
    /// First-review stability by grade (again, hard, medium, easy), days.
    pub initial_stability: [f64; 4],
    /// First-review difficulty by grade (again, hard, medium, easy).
    pub initial_difficulty: [f64; 4],
    /// Learning step intervals, minutes. Graduation to Review happens when
    /// a success advances past the last step.
    pub learning_steps_minutes: [i64; 2],
    /// Step interval after a lapse drops a card into Relearning, minutes.
    pub relearning_step_minutes: i64,
}

impl Default for SchedulerParameters {
    fn default() -> Self {
        Self {
            target_retention: DEFAULT_RETENTION,
            min_interval_days: 1.0,
            max_interval_days: 365.0,
            initial_stability: [0.4, 0.6, 2.4, 5.8],
            initial_difficulty: [7.0, 6.0, 5.0, 4.0],
            learning_steps_minutes: [10, 60],
            relearning_step_minutes: 10,
        }
    }
}

impl SchedulerParameters {
    /// The fragment scheduling profile: identical tables, lower target
    /// retention, therefore strictly longer intervals.
    pub fn fragment() -> Self {
        Self {
            target_retention: FRAGMENT_RETENTION,
            ..Self::default()
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Would-be due times per grade, for UI interval hints under the answer
/// buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePreview {
    pub again: DateTime<Utc>,
    pub hard: DateTime<Utc>,
    pub medium: DateTime<Utc>,
    pub easy: DateTime<Utc>,
}

/// The spaced-repetition scheduler.
///
/// Construct one per item class ([`FsrsScheduler::standard`] for lemmas
/// and phrases, [`FsrsScheduler::fragment`] for read-mode fragments) and
/// call [`FsrsScheduler::review`] once per review event.
#[derive(Debug, Clone, Default)]
pub struct FsrsScheduler {
    params: SchedulerParameters,
}

impl FsrsScheduler {
    /// Scheduler with explicit parameters.
    pub fn new(params: SchedulerParameters) -> Self {
        Self { params }
    }

    /// The ordinary-item profile (target retention 0.9).
    pub fn standard() -> Self {
        Self::new(SchedulerParameters::default())
    }

    /// The fragment profile (target retention 0.8, longer intervals).
    pub fn fragment() -> Self {
        Self::new(SchedulerParameters::fragment())
    }

    /// Borrow the active parameters.
    pub fn params(&self) -> &SchedulerParameters {
        &self.params
    }

    /// Apply one review and return the fully-updated successor record.
    ///
    /// `prior = None` means a first-ever review. Deterministic given
    /// identical inputs and the same `now`.
    pub fn review(
        &self,
        prior: Option<&FsrsProgress>,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<FsrsProgress> {
        let mut next = match prior {
            None => self.first_review(grade, now),
            Some(record) => {
                record.validate()?;
                match record.state {
                    FsrsState::New => self.first_review(grade, now),
                    FsrsState::Learning | FsrsState::Relearning => {
                        self.step_review(record, grade, now)
                    }
                    FsrsState::Review => self.graduated_review(record, grade, now),
                }
            }
        };

        next.reps = prior.map(|r| r.reps).unwrap_or(0) + 1;
        next.last_review_at = Some(now);
        Ok(next)
    }

    /// Due times each grade would produce, without committing anything.
    pub fn preview(&self, prior: Option<&FsrsProgress>, now: DateTime<Utc>) -> Result<GradePreview> {
        let due = |grade: Grade| -> Result<DateTime<Utc>> {
            let record = self.review(prior, grade, now)?;
            record.due_at.ok_or_else(|| {
                ScheduleError::InvalidState("scheduled record without due date".into())
            })
        };
        Ok(GradePreview {
            again: due(Grade::Again)?,
            hard: due(Grade::Hard)?,
            medium: due(Grade::Medium)?,
            easy: due(Grade::Easy)?,
        })
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// First-ever review: stability/difficulty come from the grade-indexed
    /// tables, not the update formulas. `Easy` graduates immediately;
    /// everything else enters the step schedule.
    fn first_review(&self, grade: Grade, now: DateTime<Utc>) -> FsrsProgress {
        let stability = self.params.initial_stability[grade.index()];
        let difficulty = self.params.initial_difficulty[grade.index()];

        let (state, step, interval) = match grade {
            Grade::Easy => (
                FsrsState::Review,
                0,
                self.review_interval(stability),
            ),
            Grade::Medium => (
                FsrsState::Learning,
                1,
                minutes(self.params.learning_steps_minutes[1]),
            ),
            Grade::Again | Grade::Hard => (
                FsrsState::Learning,
                0,
                minutes(self.params.learning_steps_minutes[0]),
            ),
        };

        FsrsProgress {
            stability,
            difficulty,
            state,
            learning_step: step,
            due_at: Some(now + interval),
            ..FsrsProgress::default()
        }
    }

    /// Learning/Relearning step schedule. Success walks the steps and
    /// graduates past the last one; failure restarts the schedule without
    /// counting a lapse.
    fn step_review(&self, prior: &FsrsProgress, grade: Grade, now: DateTime<Utc>) -> FsrsProgress {
        let steps = &self.params.learning_steps_minutes;
        let difficulty = next_difficulty(prior.difficulty, grade);

        let (state, step, interval) = match grade {
            Grade::Again => (prior.state, 0, minutes(steps[0])),
            Grade::Hard => {
                // Repeat the current step.
                let step = prior.learning_step.min((steps.len() - 1) as u8);
                (prior.state, step, minutes(steps[step as usize]))
            }
            Grade::Medium => {
                let next_step = prior.learning_step as usize + 1;
                if next_step >= steps.len() {
                    (FsrsState::Review, 0, self.review_interval(prior.stability))
                } else {
                    (prior.state, next_step as u8, minutes(steps[next_step]))
                }
            }
            Grade::Easy => (FsrsState::Review, 0, self.review_interval(prior.stability)),
        };

        FsrsProgress {
            difficulty,
            state,
            learning_step: step,
            due_at: Some(now + interval),
            ..prior.clone()
        }
    }

    /// Review-state transition: the full forgetting-curve update.
    fn graduated_review(
        &self,
        prior: &FsrsProgress,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> FsrsProgress {
        // validate() guarantees last_review_at is present here.
        let elapsed_days = prior
            .last_review_at
            .map(|last| (now - last).num_seconds().max(0) as f64 / 86_400.0)
            .unwrap_or(0.0);
        let recall = retrievability(elapsed_days, prior.stability);
        let difficulty = next_difficulty(prior.difficulty, grade);

        match grade {
            Grade::Again => FsrsProgress {
                stability: next_forget_stability(prior.stability),
                difficulty,
                state: FsrsState::Relearning,
                learning_step: 0,
                lapses: prior.lapses + 1,
                due_at: Some(now + minutes(self.params.relearning_step_minutes)),
                ..prior.clone()
            },
            _ => {
                let stability =
                    next_recall_stability(prior.stability, prior.difficulty, recall, grade);
                FsrsProgress {
                    stability,
                    difficulty,
                    state: FsrsState::Review,
                    learning_step: 0,
                    due_at: Some(now + self.review_interval(stability)),
                    ..prior.clone()
                }
            }
        }
    }

    /// Interval for a graduated card: invert the curve at the profile's
    /// target retention, clamp to the configured bounds.
    fn review_interval(&self, stability: f64) -> Duration {
        let days = next_interval(stability, self.params.target_retention)
            .clamp(self.params.min_interval_days, self.params.max_interval_days);
        Duration::seconds((days * 86_400.0).round() as i64)
    }
}

#[inline]
fn minutes(m: i64) -> Duration {
    Duration::minutes(m)
}

// ============================================================================
// TESTS
// ============================================================================
