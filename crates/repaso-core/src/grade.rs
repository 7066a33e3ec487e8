//! Review Grade - the four-way response signal
//!
//! Both scheduling models (FSRS and the time-gated mastery score) consume
//! the same user response. Historically the web client sent loosely-typed
//! strings with inconsistent naming between the two code paths
//! (`dont-know` vs `again`, `got-it` vs `medium`); this enum is the single
//! closed representation, and [`Grade::from_name`] carries the explicit
//! mapping table for every legacy spelling.

use serde::{Deserialize, Serialize};

use crate::fsrs::ScheduleError;

/// A user's response to a review prompt.
///
/// Integer values follow the FSRS convention (1 = failure, 4 = effortless):
///
/// | Grade  | Value | Meaning                              |
/// |--------|-------|--------------------------------------|
/// | Again  | 1     | Failed recall ("don't know")         |
/// | Hard   | 2     | Recalled with serious difficulty     |
/// | Medium | 3     | Recalled normally ("got it")         |
/// | Easy   | 4     | Effortless recall                    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Grade {
    /// Failed recall. The mastery model's `dont-know` maps here too.
    Again = 1,
    /// Successful but strained recall.
    Hard = 2,
    /// Ordinary successful recall.
    Medium = 3,
    /// Effortless recall.
    Easy = 4,
}

impl Grade {
    /// All grades in ascending order. Handy for preview tables and tests.
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Medium, Grade::Easy];

    /// True for any grade that counts as a successful recall.
    #[inline]
    pub fn is_success(&self) -> bool {
        !matches!(self, Grade::Again)
    }

    /// Zero-based index into grade-keyed parameter tables.
    #[inline]
    pub(crate) fn index(&self) -> usize {
        (*self as usize) - 1
    }

    /// Convert to the FSRS integer rating (1-4).
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Parse from an FSRS integer rating.
    ///
    /// Returns `None` for anything outside 1-4; callers at an API boundary
    /// should surface that as [`ScheduleError::InvalidGrade`] rather than
    /// defaulting.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Grade::Again),
            2 => Some(Grade::Hard),
            3 => Some(Grade::Medium),
            4 => Some(Grade::Easy),
            _ => None,
        }
    }

    /// Parse from a response name, including the legacy client spellings.
    ///
    /// `dont-know` (mastery path) and `again` (FSRS path) were the same
    /// button in the old client; both map to [`Grade::Again`]. Likewise
    /// `got-it` is the mastery path's name for [`Grade::Medium`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "again" | "dont-know" | "dont_know" => Some(Grade::Again),
            "hard" => Some(Grade::Hard),
            "medium" | "got-it" | "got_it" => Some(Grade::Medium),
            "easy" => Some(Grade::Easy),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Medium => "medium",
            Grade::Easy => "easy",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i32> for Grade {
    type Error = ScheduleError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Grade::from_i32(value).ok_or(ScheduleError::InvalidGrade(value))
    }
}

// ============================================================================
// TESTS
// ============================================================================
