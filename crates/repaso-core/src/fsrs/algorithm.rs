//! Retrievability and stability math
//!
//! Pure numeric primitives behind the scheduler. No I/O, no clocks - every
//! function is a total mapping from its arguments.
//!
//! ## Model
//!
//! Memory follows a power-law forgetting curve:
//!
//! ```text
//! R(t) = (1 + FACTOR * t / S)^(-DECAY)
//! ```
//!
//! where `S` (stability, in days) is defined as the elapsed time at which
//! recall probability has decayed to 90%. `FACTOR = 0.9^(-1/DECAY) - 1`
//! makes that definition hold exactly: `R(S) = 0.9`.
//!
//! Inverting the curve gives the scheduling rule - review exactly when the
//! model predicts recall probability will have fallen to the target
//! retention:
//!
//! ```text
//! t = S / FACTOR * (r^(-1/DECAY) - 1)
//! ```
//!
//! Lower target retention therefore means strictly longer intervals, which
//! is how the fragment profile spaces sub-sentence cards further apart
//! than full lemmas.

use crate::grade::Grade;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Exponent of the power-law forgetting curve.
pub const DECAY: f64 = 0.5;

/// Normalization constant: `0.9^(-1/DECAY) - 1`, exactly 19/81.
///
/// Chosen so that retrievability equals 0.9 when elapsed time equals
/// stability - the definition of stability itself.
pub const FACTOR: f64 = 19.0 / 81.0;

/// Floor for stability after any update. Stability must stay positive for
/// the forgetting curve to be defined.
pub const MIN_STABILITY: f64 = 0.01;

/// Ceiling for stability (100 years). Guards against float blow-up on long
/// easy streaks.
pub const MAX_STABILITY: f64 = 36_500.0;

/// Lower difficulty bound.
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Upper difficulty bound.
pub const MAX_DIFFICULTY: f64 = 10.0;

/// The difficulty that mean reversion pulls toward.
pub const DEFAULT_DIFFICULTY: f64 = 5.0;

/// Scale of stability growth on successful recall.
const STABILITY_GROWTH: f64 = 3.0;

/// Exponent making growth slow down as stability gets large (spacing
/// effect: a 100-day-stable card gains proportionally less than a
/// 2-day-stable one).
const SPACING_EXPONENT: f64 = -0.1;

/// Sensitivity of the surprise term `e^{k*(1-R)} - 1`. A success at low
/// retrievability was nearly forgotten, so it earns a larger boost.
const SURPRISE_SENSITIVITY: f64 = 1.0;

/// Growth multiplier for a strained (`hard`) recall.
const HARD_PENALTY: f64 = 0.6;

/// Growth multiplier for an effortless (`easy`) recall.
const EASY_BONUS: f64 = 1.4;

/// Fraction of pre-review stability kept after a lapse. A failure shrinks
/// the estimate sharply but never back to zero - relearning a known word
/// is faster than learning it cold.
const LAPSE_STABILITY_FRACTION: f64 = 0.2;

/// Weight of mean reversion toward [`DEFAULT_DIFFICULTY`] on every
/// difficulty update, preventing runaway drift to either bound.
const MEAN_REVERSION: f64 = 0.07;

/// Per-grade difficulty nudge, indexed by [`Grade::index`].
const DIFFICULTY_DELTA: [f64; 4] = [1.2, 0.6, 0.0, -0.8];

// ============================================================================
// FORGETTING CURVE
// ============================================================================

/// Probability that an item is still recallable `elapsed_days` after its
/// last review, given its current stability.
///
/// Evaluated on demand, never stored. Returns a value in `[0, 1]`;
/// `elapsed_days <= 0` yields exactly 1.0.
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    let stability = stability.max(MIN_STABILITY);
    let elapsed = elapsed_days.max(0.0);
    (1.0 + FACTOR * elapsed / stability).powf(-DECAY)
}

/// Days until retrievability decays to `desired_retention`, for a card of
/// the given stability.
///
/// This is the forgetting curve inverted: the scheduler calls it with the
/// *new* stability after an update, so the next review lands exactly where
/// the model predicts recall probability will have reached the target.
/// At the 0.9 retention that defines stability, the interval equals the
/// stability itself.
pub fn next_interval(stability: f64, desired_retention: f64) -> f64 {
    let stability = stability.max(MIN_STABILITY);
    let retention = desired_retention.clamp(0.01, 0.999);
    stability / FACTOR * (retention.powf(-1.0 / DECAY) - 1.0)
}

// ============================================================================
// STABILITY UPDATES
// ============================================================================

/// New stability after a review, routing on the grade.
///
/// Success grades grow stability; `Again` shrinks it via
/// [`next_forget_stability`]. Growth is larger when:
/// - the item is easy (low difficulty - the `11 - D` term),
/// - current stability is small (the `S^-0.1` spacing term),
/// - the success was surprising (low retrievability at recall time),
/// - the grade was `Easy` rather than `Hard`.
pub fn next_stability(stability: f64, difficulty: f64, retrievability: f64, grade: Grade) -> f64 {
    match grade {
        Grade::Again => next_forget_stability(stability),
        _ => next_recall_stability(stability, difficulty, retrievability, grade),
    }
}

/// Stability growth for a successful recall. See [`next_stability`].
pub fn next_recall_stability(
    stability: f64,
    difficulty: f64,
    retrievability: f64,
    grade: Grade,
) -> f64 {
    let stability = stability.max(MIN_STABILITY);
    let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    let retrievability = retrievability.clamp(0.0, 1.0);

    let grade_modifier = match grade {
        Grade::Hard => HARD_PENALTY,
        Grade::Easy => EASY_BONUS,
        _ => 1.0,
    };

    let surprise = (SURPRISE_SENSITIVITY * (1.0 - retrievability)).exp_m1();
    let growth = STABILITY_GROWTH
        * (11.0 - difficulty)
        * stability.powf(SPACING_EXPONENT)
        * surprise
        * grade_modifier;

    (stability * (1.0 + growth)).clamp(MIN_STABILITY, MAX_STABILITY)
}

/// Stability after a lapse: a sharp shrink to a fraction of the pre-review
/// value, floored at [`MIN_STABILITY`].
pub fn next_forget_stability(stability: f64) -> f64 {
    (stability * LAPSE_STABILITY_FRACTION).clamp(MIN_STABILITY, MAX_STABILITY)
}

// ============================================================================
// DIFFICULTY UPDATES
// ============================================================================

/// New difficulty after a review.
///
/// Nudged up on `again`/`hard`, down on `easy`, then pulled toward
/// [`DEFAULT_DIFFICULTY`] by mean reversion and clamped to bounds. The
/// reversion keeps long grade streaks from pinning difficulty at either
/// extreme.
pub fn next_difficulty(difficulty: f64, grade: Grade) -> f64 {
    let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    let nudged = difficulty + DIFFICULTY_DELTA[grade.index()];
    let reverted = MEAN_REVERSION * DEFAULT_DIFFICULTY + (1.0 - MEAN_REVERSION) * nudged;
    reverted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// ============================================================================
// TESTS
// ============================================================================
