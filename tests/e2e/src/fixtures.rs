//! Test Data Factory
//!
//! Shared setup for the journey tests: a temp-database review service
//! with an explicit, controllable clock, plus small Spanish vocabulary
//! samples.

use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use repaso_core::{ItemKind, ProgressStore, ReviewService};

/// A review service backed by a throwaway database.
///
/// Keeps the temp dir alive for the test's duration and exposes the
/// database path so tests can reopen the same file (simulating an app
/// restart or a second device).
pub struct TestHarness {
    pub service: ReviewService,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db_path = dir.path().join("repaso-e2e.db");
        let store = ProgressStore::new(Some(db_path.clone())).expect("open store");
        Self {
            service: ReviewService::new(store),
            db_path,
            _dir: dir,
        }
    }

    /// A second service over the same database file - another device, or
    /// the app after a restart.
    pub fn reopen(&self) -> ReviewService {
        let store = ProgressStore::new(Some(self.db_path.clone())).expect("reopen store");
        ReviewService::new(store)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed session start so every journey is deterministic.
pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Clock helper: `start` advanced by whole days.
pub fn days_later(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    start + Duration::days(days)
}

/// A small chapter of Spanish vocabulary: lemmas with a sprinkling of
/// phrases, the proportions a real chapter import produces.
pub fn sample_chapter() -> Vec<(String, ItemKind)> {
    let lemmas = [
        "hablar", "comer", "vivir", "andar", "tener", "hacer", "decir", "poder",
    ];
    let phrases = ["echar de menos", "tener ganas de"];

    lemmas
        .iter()
        .map(|l| (format!("lemma:{l}"), ItemKind::Lemma))
        .chain(phrases.iter().map(|p| (format!("phrase:{p}"), ItemKind::Phrase)))
        .collect()
}
