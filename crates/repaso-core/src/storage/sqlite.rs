//! SQLite Progress Store
//!
//! The external persistence collaborator for the scheduling core: one row
//! per (user, item) with exactly the [`ProgressRecord`] fields, written by
//! upsert with last-write-wins semantics, plus the per-day review
//! counters.
//!
//! Concurrency note: upserts are keyed on `(user_id, item_id)` with no
//! optimistic versioning. One user reviewing on two devices at once can
//! lose one device's write - an accepted limitation (each user reviews
//! one card at a time in one session), documented by the e2e suite rather
//! than silently "fixed" here.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::fsrs::{FsrsProgress, FsrsState};
use crate::mastery::MasteryProgress;
use crate::progress::{ItemKind, ProgressRecord};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Record not found
    #[error("Progress record not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// STORE
// ============================================================================

/// SQLite-backed progress store.
///
/// Separate reader/writer connections behind mutexes for interior
/// mutability: all methods take `&self`, so callers can share the store
/// behind an `Arc` without an outer lock.
pub struct ProgressStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl ProgressStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Open (or create) the store. `None` uses the platform data dir.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "repaso", "core").ok_or_else(|| {
                    StoreError::Init("Could not determine project directories".to_string())
                })?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("repaso.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    // ------------------------------------------------------------------
    // Progress records
    // ------------------------------------------------------------------

    /// Insert or overwrite the row for `(user_id, item_id)`.
    ///
    /// Last write wins; see the module-level concurrency note.
    pub fn upsert(&self, record: &ProgressRecord) -> Result<()> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO item_progress (
                user_id, item_id, item_kind,
                stability, difficulty, fsrs_state, learning_step,
                reps, lapses, last_review_at, due_at,
                mastery, health, last_correct_review_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ON CONFLICT(user_id, item_id) DO UPDATE SET
                item_kind = excluded.item_kind,
                stability = excluded.stability,
                difficulty = excluded.difficulty,
                fsrs_state = excluded.fsrs_state,
                learning_step = excluded.learning_step,
                reps = excluded.reps,
                lapses = excluded.lapses,
                last_review_at = excluded.last_review_at,
                due_at = excluded.due_at,
                mastery = excluded.mastery,
                health = excluded.health,
                last_correct_review_at = excluded.last_correct_review_at,
                updated_at = excluded.updated_at",
            params![
                record.user_id,
                record.item_id,
                record.kind.as_str(),
                record.fsrs.stability,
                record.fsrs.difficulty,
                record.fsrs.state.as_i32(),
                record.fsrs.learning_step as i32,
                record.fsrs.reps,
                record.fsrs.lapses,
                record.fsrs.last_review_at,
                record.fsrs.due_at,
                record.mastery.mastery,
                record.mastery.health,
                record.mastery.last_correct_review_at,
                record.created_at,
                record.updated_at,
            ],
        )?;
        tracing::debug!(
            user = %record.user_id,
            item = %record.item_id,
            state = %record.fsrs.state,
            "progress upserted"
        );
        Ok(())
    }

    /// Fetch the row for `(user_id, item_id)`, if any.
    pub fn get(&self, user_id: &str, item_id: &str) -> Result<Option<ProgressRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let record = reader
            .query_row(
                &format!("SELECT {COLUMNS} FROM item_progress WHERE user_id = ?1 AND item_id = ?2"),
                params![user_id, item_id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// All records due at `now` for a user, most overdue first.
    pub fn due_records(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {COLUMNS} FROM item_progress
             WHERE user_id = ?1 AND due_at IS NOT NULL AND due_at <= ?2
             ORDER BY due_at ASC
             LIMIT ?3"
        ))?;
        let rows = stmt.query_map(params![user_id, now, limit as i64], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// How many of the given chapter items the user has been introduced to
    /// (a progress row with at least one rep). Input to chapter unlock.
    pub fn introduced_count(&self, user_id: &str, item_ids: &[String]) -> Result<usize> {
        if item_ids.is_empty() {
            return Ok(0);
        }
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;

        let placeholders = (2..item_ids.len() + 2)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = reader.prepare(&format!(
            "SELECT COUNT(*) FROM item_progress
             WHERE user_id = ?1 AND reps >= 1 AND item_id IN ({placeholders})"
        ))?;

        let sql_params = std::iter::once(user_id.to_string()).chain(item_ids.iter().cloned());
        let count: i64 = stmt.query_row(params_from_iter(sql_params), |row| row.get(0))?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------
    // Daily activity
    // ------------------------------------------------------------------

    /// Bump the user's review counter for a day.
    pub fn record_activity(&self, user_id: &str, day: NaiveDate) -> Result<()> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO daily_activity (user_id, day, reviews)
             VALUES (?1, ?2, 1)
             ON CONFLICT(user_id, day) DO UPDATE SET reviews = reviews + 1",
            params![user_id, day.to_string()],
        )?;
        Ok(())
    }

    /// Reviews recorded for a user on a day.
    pub fn reviews_on(&self, user_id: &str, day: NaiveDate) -> Result<i64> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let count = reader
            .query_row(
                "SELECT reviews FROM daily_activity WHERE user_id = ?1 AND day = ?2",
                params![user_id, day.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Row mapping
    // ------------------------------------------------------------------

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ProgressRecord> {
        let state_raw: i32 = row.get("fsrs_state")?;
        // Refuse corrupt lifecycle values instead of repairing them; the
        // scheduler must never see a state it cannot have written.
        let state = FsrsState::from_i32(state_raw).ok_or_else(|| {
            rusqlite::Error::IntegralValueOutOfRange(5, state_raw as i64)
        })?;
        let kind: String = row.get("item_kind")?;

        Ok(ProgressRecord {
            user_id: row.get("user_id")?,
            item_id: row.get("item_id")?,
            kind: ItemKind::parse_name(&kind),
            fsrs: FsrsProgress {
                stability: row.get("stability")?,
                difficulty: row.get("difficulty")?,
                state,
                learning_step: row.get::<_, i32>("learning_step")? as u8,
                reps: row.get("reps")?,
                lapses: row.get("lapses")?,
                last_review_at: row.get("last_review_at")?,
                due_at: row.get("due_at")?,
            },
            mastery: MasteryProgress {
                mastery: row.get("mastery")?,
                health: row.get("health")?,
                last_correct_review_at: row.get("last_correct_review_at")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Column list shared by every SELECT, in [`ProgressStore::row_to_record`]
/// order.
const COLUMNS: &str = "user_id, item_id, item_kind, \
    stability, difficulty, fsrs_state, learning_step, reps, lapses, \
    last_review_at, due_at, mastery, health, last_correct_review_at, \
    created_at, updated_at";

// ============================================================================
// TESTS
// ============================================================================
