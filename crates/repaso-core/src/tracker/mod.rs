//! Progress-Tracking Adapter
//!
//! The one component that touches both the pure scheduling core and the
//! progress store. Per review event it reads prior state, runs both
//! models, persists the joined record in a single upsert, and bumps the
//! daily-activity counter.
//!
//! Failure contract: a persistence failure propagates to the caller
//! *before* any reviewed-cursor could advance - the UI keeps the card and
//! offers a retry, so no review is silently lost. The scheduler itself is
//! pure, so a failed write leaves nothing to roll back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fsrs::{FsrsScheduler, GradePreview, ScheduleError, SchedulerParameters};
use crate::grade::Grade;
use crate::mastery::{MasteryOutcome, MasteryParameters, calculate_mastery_change};
use crate::progress::{ItemKind, ProgressRecord};
use crate::session::{chapter_unlocks, humanize_due};
use crate::storage::{ProgressStore, StoreError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Review-tracking error type.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The pure scheduling core rejected the input (caller bug).
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    /// Persistence failed; the review was not recorded and should be
    /// retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Review-tracking result type.
pub type Result<T> = std::result::Result<T, TrackError>;

// ============================================================================
// OUTCOME
// ============================================================================

/// Everything the UI needs back from one review event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// The persisted successor record.
    pub record: ProgressRecord,
    /// Mastery-model details (gate evaluation, deltas).
    pub mastery: MasteryOutcome,
    /// Humanized next-due string, e.g. "in 3 days".
    pub due_human: String,
}

// ============================================================================
// SERVICE
// ============================================================================

/// The review-tracking service.
pub struct ReviewService {
    store: ProgressStore,
    standard: FsrsScheduler,
    fragment: FsrsScheduler,
    mastery_params: MasteryParameters,
}

impl ReviewService {
    /// Service with the default scheduling profiles.
    pub fn new(store: ProgressStore) -> Self {
        Self::with_parameters(
            store,
            SchedulerParameters::default(),
            SchedulerParameters::fragment(),
            MasteryParameters::default(),
        )
    }

    /// Service with injected parameter sets (tests, tuning experiments).
    pub fn with_parameters(
        store: ProgressStore,
        standard: SchedulerParameters,
        fragment: SchedulerParameters,
        mastery_params: MasteryParameters,
    ) -> Self {
        Self {
            store,
            standard: FsrsScheduler::new(standard),
            fragment: FsrsScheduler::new(fragment),
            mastery_params,
        }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    fn scheduler_for(&self, kind: ItemKind) -> &FsrsScheduler {
        if kind.is_fragment() {
            &self.fragment
        } else {
            &self.standard
        }
    }

    /// Record a review at the current wall-clock time.
    pub fn record_review(
        &self,
        user_id: &str,
        item_id: &str,
        kind: ItemKind,
        grade: Grade,
    ) -> Result<ReviewOutcome> {
        self.record_review_at(user_id, item_id, kind, grade, Utc::now())
    }

    /// Record a review at an explicit timestamp.
    ///
    /// Split out so tests and backfills control the clock; everything
    /// downstream is deterministic in `now`.
    pub fn record_review_at(
        &self,
        user_id: &str,
        item_id: &str,
        kind: ItemKind,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        let prior = self.store.get(user_id, item_id)?;

        let fsrs = self
            .scheduler_for(kind)
            .review(prior.as_ref().map(|r| &r.fsrs), grade, now)?;
        let mastery_prior = prior
            .as_ref()
            .map(|r| r.mastery.clone())
            .unwrap_or_default();
        let mastery = calculate_mastery_change(&mastery_prior, grade, now, &self.mastery_params);

        let record = ProgressRecord {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            kind,
            fsrs,
            mastery: mastery.progress.clone(),
            created_at: prior.as_ref().map(|r| r.created_at).unwrap_or(now),
            updated_at: now,
        };

        // The write must land before the caller may advance past this
        // card; an Err here means "retry the same card".
        self.store.upsert(&record)?;

        // Activity counters are best-effort display data; a failed bump
        // must not un-record a persisted review.
        if let Err(error) = self.store.record_activity(user_id, now.date_naive()) {
            tracing::warn!(user = user_id, %error, "daily activity bump failed");
        }

        let due_human = record
            .fsrs
            .due_at
            .map(|due| humanize_due(due, now))
            .unwrap_or_else(|| "now".to_string());

        tracing::debug!(
            user = user_id,
            item = item_id,
            grade = %grade,
            state = %record.fsrs.state,
            stability = record.fsrs.stability,
            due = %due_human,
            "review recorded"
        );

        Ok(ReviewOutcome {
            record,
            mastery,
            due_human,
        })
    }

    /// Per-grade due-time preview for an item, without recording anything.
    pub fn preview(
        &self,
        user_id: &str,
        item_id: &str,
        kind: ItemKind,
        now: DateTime<Utc>,
    ) -> Result<GradePreview> {
        let prior = self.store.get(user_id, item_id)?;
        let preview = self
            .scheduler_for(kind)
            .preview(prior.as_ref().map(|r| &r.fsrs), now)?;
        Ok(preview)
    }

    /// The user's due queue, most overdue first.
    pub fn due_queue(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>> {
        Ok(self.store.due_records(user_id, now, limit)?)
    }

    /// Whether the chapter holding `item_ids` has introduced enough items
    /// to unlock the next one.
    pub fn chapter_unlocked(&self, user_id: &str, item_ids: &[String]) -> Result<bool> {
        let introduced = self.store.introduced_count(user_id, item_ids)?;
        Ok(chapter_unlocks(introduced, item_ids.len()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
