//! Session Queue Assembly
//!
//! Deterministic selection policy for building a study session out of
//! persisted progress. No storage access here - callers fetch candidates
//! (see [`crate::storage`]) and hand them in as slices.
//!
//! Three layers, per the product rules:
//! - review queue: everything due, most overdue first;
//! - learn queue: unseen items from the current chapter, lemmas and
//!   phrases proportionally mixed so neither dominates;
//! - in-session requeue: a card graded `again` goes to the back of the
//!   in-memory queue for another attempt this session, while its
//!   persisted due date stays whatever the scheduler wrote.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::{ItemKind, ProgressRecord};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Share of a chapter's items that must be introduced before the next
/// chapter unlocks.
pub const CHAPTER_UNLOCK_THRESHOLD: f64 = 0.95;

// ============================================================================
// REVIEW QUEUE
// ============================================================================

/// Filter to the cards due at `now` and order them most overdue first.
pub fn build_review_queue(records: Vec<ProgressRecord>, now: DateTime<Utc>) -> Vec<ProgressRecord> {
    let mut due: Vec<ProgressRecord> = records
        .into_iter()
        .filter(|r| r.fsrs.is_due(now))
        .collect();
    // Earliest due date = most overdue. Cards with no due date yet (never
    // reviewed) sort ahead of everything.
    due.sort_by_key(|r| r.fsrs.due_at);
    due
}

// ============================================================================
// LEARN QUEUE
// ============================================================================

/// An item eligible for first exposure (no progress record yet, or one
/// with zero reps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnCandidate {
    pub item_id: String,
    pub kind: ItemKind,
}

impl LearnCandidate {
    pub fn new(item_id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            item_id: item_id.into(),
            kind,
        }
    }
}

/// Drop candidates the user has already been introduced to (a progress
/// record with at least one rep). What survives is learn-queue input.
pub fn filter_unseen(
    candidates: Vec<LearnCandidate>,
    records: &[ProgressRecord],
) -> Vec<LearnCandidate> {
    let introduced: std::collections::HashSet<&str> = records
        .iter()
        .filter(|r| r.is_introduced())
        .map(|r| r.item_id.as_str())
        .collect();
    candidates
        .into_iter()
        .filter(|c| !introduced.contains(c.item_id.as_str()))
        .collect()
}

/// Interleave unseen lemmas and phrases proportionally to their counts,
/// capped at `limit`.
///
/// Proportional fairness by cross-multiplication: at each slot the kind
/// whose taken/total ratio is lower goes next, so a chapter with 40
/// lemmas and 10 phrases yields roughly one phrase per four lemmas
/// instead of all lemmas first.
pub fn build_learn_queue(
    lemmas: &[LearnCandidate],
    phrases: &[LearnCandidate],
    limit: usize,
) -> Vec<LearnCandidate> {
    let mut queue = Vec::with_capacity(limit.min(lemmas.len() + phrases.len()));
    let (mut li, mut pi) = (0usize, 0usize);

    while queue.len() < limit && (li < lemmas.len() || pi < phrases.len()) {
        let take_lemma = if li >= lemmas.len() {
            false
        } else if pi >= phrases.len() {
            true
        } else {
            li * phrases.len() <= pi * lemmas.len()
        };

        if take_lemma {
            queue.push(lemmas[li].clone());
            li += 1;
        } else {
            queue.push(phrases[pi].clone());
            pi += 1;
        }
    }
    queue
}

// ============================================================================
// IN-SESSION QUEUE
// ============================================================================

/// The in-memory card queue for one study session.
///
/// [`SessionQueue::requeue_again`] is the session-local retry lane: the
/// failed card comes back at the end of this sitting. It deliberately
/// does not touch the persisted `due_at` - the scheduler has already
/// written the real (Relearning) due time.
#[derive(Debug, Clone, Default)]
pub struct SessionQueue<T> {
    cards: VecDeque<T>,
}

impl<T> SessionQueue<T> {
    /// Build a session from an ordered card list.
    pub fn from_cards(cards: impl IntoIterator<Item = T>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    /// Take the next card to show.
    pub fn next_card(&mut self) -> Option<T> {
        self.cards.pop_front()
    }

    /// Put a card graded `again` at the back of the session.
    pub fn requeue_again(&mut self, card: T) {
        self.cards.push_back(card);
    }

    /// Cards remaining this session.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the session is finished.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

// ============================================================================
// CHAPTER UNLOCK
// ============================================================================

/// Whether the next chapter unlocks, given introduced vs. total item
/// counts for the current one. An empty chapter blocks nothing.
pub fn chapter_unlocks(introduced: usize, total: usize) -> bool {
    if total == 0 {
        return true;
    }
    introduced as f64 / total as f64 >= CHAPTER_UNLOCK_THRESHOLD
}

// ============================================================================
// DUE-DATE DISPLAY
// ============================================================================

/// Humanize a due timestamp relative to `now` ("in 3 days"). Display
/// helper for the UI layer, not part of the scheduling contract.
pub fn humanize_due(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (due - now).num_seconds();
    if seconds < 60 {
        return "now".to_string();
    }

    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;

    let (count, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if hours < 24 {
        (hours, "hour")
    } else if days < 30 {
        (days, "day")
    } else if months < 12 {
        (months, "month")
    } else {
        (days / 365, "year")
    };

    if count == 1 {
        format!("in 1 {unit}")
    } else {
        format!("in {count} {unit}s")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::fsrs::{FsrsProgress, FsrsState};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn record_due(item_id: &str, due: DateTime<Utc>) -> ProgressRecord {
        let mut record = ProgressRecord::new_item("u1", item_id, ItemKind::Lemma, now());
        record.fsrs = FsrsProgress {
            stability: 2.0,
            difficulty: 5.0,
            state: FsrsState::Review,
            reps: 3,
            last_review_at: Some(due - Duration::days(2)),
            due_at: Some(due),
            ..FsrsProgress::default()
        };
        record
    }

    #[test]
    fn test_review_queue_most_overdue_first() {
        let records = vec![
            record_due("a", now() - Duration::hours(1)),
            record_due("b", now() - Duration::days(3)),
            record_due("c", now() + Duration::days(1)), // not due
            record_due("d", now() - Duration::days(1)),
        ];
        let queue = build_review_queue(records, now());

        let ids: Vec<&str> = queue.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a"]);
    }

    #[test]
    fn test_review_queue_includes_exactly_due() {
        let records = vec![record_due("edge", now())];
        assert_eq!(build_review_queue(records, now()).len(), 1);
    }

    #[test]
    fn test_learn_queue_proportional_mix() {
        let lemmas: Vec<LearnCandidate> = (0..4)
            .map(|i| LearnCandidate::new(format!("l{i}"), ItemKind::Lemma))
            .collect();
        let phrases: Vec<LearnCandidate> = (0..2)
            .map(|i| LearnCandidate::new(format!("p{i}"), ItemKind::Phrase))
            .collect();

        let queue = build_learn_queue(&lemmas, &phrases, 10);
        assert_eq!(queue.len(), 6);

        // Neither kind should dominate the front half.
        let first_half_phrases = queue[..3]
            .iter()
            .filter(|c| c.kind == ItemKind::Phrase)
            .count();
        assert!(first_half_phrases >= 1);
        // All items eventually included, order stable within a kind.
        assert_eq!(queue.iter().filter(|c| c.kind == ItemKind::Lemma).count(), 4);
    }

    #[test]
    fn test_learn_queue_respects_limit_and_exhaustion() {
        let lemmas = vec![LearnCandidate::new("l0", ItemKind::Lemma)];
        let phrases: Vec<LearnCandidate> = (0..5)
            .map(|i| LearnCandidate::new(format!("p{i}"), ItemKind::Phrase))
            .collect();

        let queue = build_learn_queue(&lemmas, &phrases, 4);
        assert_eq!(queue.len(), 4);
        // Lemma list exhausts; phrases fill the rest.
        assert_eq!(queue.iter().filter(|c| c.kind == ItemKind::Lemma).count(), 1);
    }

    #[test]
    fn test_filter_unseen_drops_introduced_items() {
        let mut seen = record_due("a", now());
        seen.fsrs.reps = 2;
        let mut unseen_record = record_due("b", now());
        unseen_record.fsrs.reps = 0;

        let candidates = vec![
            LearnCandidate::new("a", ItemKind::Lemma),
            LearnCandidate::new("b", ItemKind::Lemma),
            LearnCandidate::new("c", ItemKind::Phrase),
        ];
        let remaining = filter_unseen(candidates, &[seen, unseen_record]);

        let ids: Vec<&str> = remaining.iter().map(|c| c.item_id.as_str()).collect();
        // "a" is introduced; "b" has a record but zero reps; "c" is new.
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn test_session_requeue_goes_to_back() {
        let mut session = SessionQueue::from_cards(["a", "b", "c"]);
        let first = session.next_card().unwrap();
        assert_eq!(first, "a");

        // Graded again: retry at the end of the sitting.
        session.requeue_again(first);
        assert_eq!(session.next_card(), Some("b"));
        assert_eq!(session.next_card(), Some("c"));
        assert_eq!(session.next_card(), Some("a"));
        assert!(session.is_empty());
    }

    #[test]
    fn test_chapter_unlock_threshold() {
        assert!(chapter_unlocks(95, 100));
        assert!(!chapter_unlocks(94, 100));
        assert!(chapter_unlocks(20, 20));
        assert!(chapter_unlocks(0, 0));
        assert!(!chapter_unlocks(18, 20)); // 90%
    }

    #[test]
    fn test_humanize_due() {
        assert_eq!(humanize_due(now(), now()), "now");
        assert_eq!(humanize_due(now() - Duration::days(2), now()), "now");
        assert_eq!(humanize_due(now() + Duration::minutes(5), now()), "in 5 minutes");
        assert_eq!(humanize_due(now() + Duration::hours(1), now()), "in 1 hour");
        assert_eq!(humanize_due(now() + Duration::days(3), now()), "in 3 days");
        assert_eq!(humanize_due(now() + Duration::days(90), now()), "in 3 months");
        assert_eq!(humanize_due(now() + Duration::days(800), now()), "in 2 years");
    }
}
