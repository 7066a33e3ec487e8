//! Time-Gated Mastery Model
//!
//! The legacy, coarser progress metric shown to learners: a 0-100 mastery
//! score with an enforced minimum wait between mastery-increasing reviews,
//! plus a 0-100 "health" freshness number.
//!
//! This model deliberately does NOT drive due dates - that is the FSRS
//! scheduler's job ([`crate::fsrs`]). Mastery exists so the progress bar
//! resists being inflated by rapid-fire re-reviewing: a word only earns
//! deeper-retention credit after real time has passed, scaled by how well
//! it is already known.
//!
//! ## Bands and gates
//!
//! Mastery is divided into bands of ten points; each band carries the
//! minimum wait before the next *positive* mastery change:
//!
//! | Band | Mastery | Required wait |
//! |------|---------|---------------|
//! | 0    | 0-9     | none          |
//! | 1    | 10-19   | 2 hours       |
//! | 2    | 20-29   | 6 hours       |
//! | 3    | 30-39   | 12 hours      |
//! | 4    | 40-49   | 1 day         |
//! | 5    | 50-59   | 3 days        |
//! | 6    | 60-69   | 1 week        |
//! | 7    | 70-79   | 2 weeks       |
//! | 8    | 80-89   | 1 month       |
//! | 9    | 90-99   | 2 months      |
//! | 10   | 100     | 4 months      |
//!
//! Failures skip the gate entirely: `again` always costs mastery, and any
//! review - gated or not, failed or not - boosts health, because showing
//! up is still engagement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Upper bound of the mastery and health scales.
pub const MASTERY_MAX: i32 = 100;

/// Width of one mastery band.
pub const BAND_WIDTH: i32 = 10;

/// Number of bands (0 through 10 inclusive).
pub const BAND_COUNT: usize = 11;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Mastery model configuration. Injected, like
/// [`crate::fsrs::SchedulerParameters`], so tests can swap the gate table
/// without global mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryParameters {
    /// Required wait (hours) before a positive mastery change, indexed by
    /// band. Must be monotonically non-decreasing.
    pub gate_hours_by_band: [f64; BAND_COUNT],
    /// Mastery lost on a failed review.
    pub failure_penalty: i32,
    /// Mastery gained per grade (again, hard, medium, easy); the `again`
    /// slot is unused - failures take [`Self::failure_penalty`].
    pub gain_by_grade: [i32; 4],
    /// Health gained on a successful review.
    pub health_boost_success: i32,
    /// Health gained on a failed review. Smaller, but never zero -
    /// practicing counts even when recall fails.
    pub health_boost_failure: i32,
    /// Display-side health decay, points per day since last review.
    pub health_decay_per_day: f64,
}

impl Default for MasteryParameters {
    fn default() -> Self {
        Self {
            gate_hours_by_band: [
                0.0,    // band 0: no gate
                2.0,    // band 1
                6.0,    // band 2
                12.0,   // band 3
                24.0,   // band 4: 1 day
                72.0,   // band 5: 3 days
                168.0,  // band 6: 1 week
                336.0,  // band 7: 2 weeks
                720.0,  // band 8: 1 month
                1440.0, // band 9: 2 months
                2880.0, // band 10: 4 months
            ],
            failure_penalty: 15,
            gain_by_grade: [0, 5, 10, 15],
            health_boost_success: 15,
            health_boost_failure: 5,
            health_decay_per_day: 2.0,
        }
    }
}

// ============================================================================
// PROGRESS VALUE OBJECT
// ============================================================================

/// Mastery-model state for one (user, item) pair.
///
/// Independent of [`crate::fsrs::FsrsProgress`]; the two are joined only
/// by item identity in [`crate::progress::ProgressRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MasteryProgress {
    /// Coarse 0-100 progress score.
    pub mastery: i32,
    /// 0-100 freshness display value, boosted by any review.
    pub health: i32,
    /// When mastery last received a positive change. The gate measures
    /// elapsed time from here.
    pub last_correct_review_at: Option<DateTime<Utc>>,
}

impl MasteryProgress {
    /// A never-reviewed item.
    pub fn new_item() -> Self {
        Self::default()
    }

    /// Current mastery band, 0-10.
    pub fn band(&self) -> u8 {
        band_of(self.mastery)
    }
}

/// Band of a mastery value: `floor(mastery / 10)`, clamped to the table.
#[inline]
pub fn band_of(mastery: i32) -> u8 {
    (mastery.clamp(0, MASTERY_MAX) / BAND_WIDTH) as u8
}

// ============================================================================
// OUTCOME TYPES
// ============================================================================

/// Why (or whether) the time gate let a mastery gain through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeGateInfo {
    /// Band the item was in when reviewed.
    pub band: u8,
    /// The band's required wait in hours.
    pub required_wait_hours: f64,
    /// Hours since the last credited success; `None` for a never-credited
    /// item (which always passes).
    pub elapsed_hours: Option<f64>,
    /// Whether a positive mastery change was allowed.
    pub can_gain_mastery: bool,
}

/// Result of applying one review to the mastery model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryOutcome {
    /// Signed mastery delta actually applied (0 when gated).
    pub mastery_change: i32,
    /// Mastery after the change, clamped to [0, 100].
    pub new_mastery: i32,
    /// Health delta applied (always positive - any review is engagement).
    pub health_boost: i32,
    /// Gate evaluation details, for the UI to explain a blocked gain.
    pub gate: TimeGateInfo,
    /// The successor record to persist.
    pub progress: MasteryProgress,
}

// ============================================================================
// UPDATE FUNCTION
// ============================================================================

/// Apply one review to the mastery model. Pure: no clock reads, no I/O.
///
/// - `again` never consults the gate: mastery drops by the penalty
///   (floored at 0) and health still rises by the small failure boost.
/// - Success grades pass the gate when enough real time has elapsed since
///   the last *credited* success (or when there has never been one); a
///   blocked success changes no mastery but keeps the health boost.
///
/// A blocked success does not advance `last_correct_review_at` -
/// otherwise rapid re-reviewing could postpone the gate indefinitely.
pub fn calculate_mastery_change(
    prior: &MasteryProgress,
    grade: Grade,
    now: DateTime<Utc>,
    params: &MasteryParameters,
) -> MasteryOutcome {
    let band = prior.band();
    let required = params.gate_hours_by_band[band as usize];
    let elapsed_hours = prior
        .last_correct_review_at
        .map(|last| (now - last).num_seconds().max(0) as f64 / 3_600.0);

    if grade == Grade::Again {
        let new_mastery = (prior.mastery - params.failure_penalty).max(0);
        let health_boost = params.health_boost_failure;
        return MasteryOutcome {
            mastery_change: new_mastery - prior.mastery,
            new_mastery,
            health_boost,
            gate: TimeGateInfo {
                band,
                required_wait_hours: required,
                elapsed_hours,
                // Failures do not consult the gate at all.
                can_gain_mastery: false,
            },
            progress: MasteryProgress {
                mastery: new_mastery,
                health: (prior.health + health_boost).min(MASTERY_MAX),
                last_correct_review_at: prior.last_correct_review_at,
            },
        };
    }

    let can_gain = match elapsed_hours {
        None => true,
        Some(elapsed) => elapsed >= required,
    };
    let health_boost = params.health_boost_success;

    let (mastery_change, new_mastery, last_correct) = if can_gain {
        let gained = (prior.mastery + params.gain_by_grade[grade.index()]).min(MASTERY_MAX);
        (gained - prior.mastery, gained, Some(now))
    } else {
        (0, prior.mastery, prior.last_correct_review_at)
    };

    MasteryOutcome {
        mastery_change,
        new_mastery,
        health_boost,
        gate: TimeGateInfo {
            band,
            required_wait_hours: required,
            elapsed_hours,
            can_gain_mastery: can_gain,
        },
        progress: MasteryProgress {
            mastery: new_mastery,
            health: (prior.health + health_boost).min(MASTERY_MAX),
            last_correct_review_at: last_correct,
        },
    }
}

/// Display-side health: linear decay since the last review, floored at 0.
/// Evaluated on read and never written back.
pub fn decayed_health(
    health: i32,
    last_seen_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    params: &MasteryParameters,
) -> i32 {
    let Some(last) = last_seen_at else {
        return health.clamp(0, MASTERY_MAX);
    };
    let elapsed_days = (now - last).num_seconds().max(0) as f64 / 86_400.0;
    let decayed = health as f64 - params.health_decay_per_day * elapsed_days;
    (decayed.floor() as i32).clamp(0, MASTERY_MAX)
}

// ============================================================================
// TESTS
// ============================================================================
