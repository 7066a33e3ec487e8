//! Progress Records
//!
//! One record per (user, item), created on first review, mutated only by
//! scheduling transitions, never deleted while the account exists.
//!
//! The record is a join of two independent value objects - the FSRS
//! fields ([`FsrsProgress`]) and the legacy mastery fields
//! ([`MasteryProgress`]) - that share item identity and nothing else.
//! Keeping them separate keeps both state machines testable in isolation
//! and makes it obvious that neither reads the other's fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fsrs::FsrsProgress;
use crate::mastery::MasteryProgress;

// ============================================================================
// ITEM KINDS
// ============================================================================

/// The three schedulable item classes. All share the same progress-state
/// shape; the kind only selects the scheduling profile and the learn-queue
/// mixing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A dictionary headword.
    #[default]
    Lemma,
    /// A multi-word idiom.
    Phrase,
    /// A sub-sentence unit used by read-mode flashcards. Scheduled on the
    /// lower-retention fragment profile.
    Fragment,
}

impl ItemKind {
    /// Whether this kind uses the fragment scheduling profile.
    #[inline]
    pub fn is_fragment(&self) -> bool {
        matches!(self, ItemKind::Fragment)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Lemma => "lemma",
            ItemKind::Phrase => "phrase",
            ItemKind::Fragment => "fragment",
        }
    }

    /// Parse from string name.
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "phrase" => ItemKind::Phrase,
            "fragment" => ItemKind::Fragment,
            _ => ItemKind::Lemma,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PROGRESS RECORD
// ============================================================================

/// The full per-(user, item) progress row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Owning user.
    pub user_id: String,
    /// The learning item (lemma, phrase, or fragment id).
    pub item_id: String,
    /// Item class.
    pub kind: ItemKind,
    /// FSRS scheduling state.
    pub fsrs: FsrsProgress,
    /// Legacy mastery/health state.
    pub mastery: MasteryProgress,
    /// When the record was created (first exposure).
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Fresh record for an item's first exposure.
    pub fn new_item(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        kind: ItemKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            kind,
            fsrs: FsrsProgress::new_card(),
            mastery: MasteryProgress::new_item(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the item counts as introduced (at least one review).
    #[inline]
    pub fn is_introduced(&self) -> bool {
        self.fsrs.reps >= 1
    }
}

// ============================================================================
// TESTS
// ============================================================================
