//! Database Migrations
//!
//! Schema migration definitions for the progress store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: item progress and daily activity",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Index due queries per user",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS item_progress (
    user_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    item_kind TEXT NOT NULL DEFAULT 'lemma',

    -- FSRS state
    stability REAL NOT NULL DEFAULT 0.0,
    difficulty REAL NOT NULL DEFAULT 0.0,
    fsrs_state INTEGER NOT NULL DEFAULT 0,
    learning_step INTEGER NOT NULL DEFAULT 0,
    reps INTEGER NOT NULL DEFAULT 0,
    lapses INTEGER NOT NULL DEFAULT 0,
    last_review_at TEXT,
    due_at TEXT,

    -- Legacy mastery fields
    mastery INTEGER NOT NULL DEFAULT 0,
    health INTEGER NOT NULL DEFAULT 0,
    last_correct_review_at TEXT,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    PRIMARY KEY (user_id, item_id)
);

CREATE TABLE IF NOT EXISTS daily_activity (
    user_id TEXT NOT NULL,
    day TEXT NOT NULL,
    reviews INTEGER NOT NULL DEFAULT 0,

    PRIMARY KEY (user_id, day)
);

UPDATE schema_version SET version = 1, applied_at = datetime('now');
"#;

/// V2: Due-queue queries scan (user_id, due_at)
const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_progress_user_due ON item_progress(user_id, due_at);
CREATE INDEX IF NOT EXISTS idx_progress_user_reps ON item_progress(user_id, reps);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Read the current schema version, creating the version table on first
/// contact with a fresh database.
fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL
        );
        INSERT INTO schema_version (version, applied_at)
        SELECT 0, datetime('now')
        WHERE NOT EXISTS (SELECT 1 FROM schema_version);",
    )?;
    conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))
}

/// Apply any pending migrations. Returns the number applied.
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}

// ============================================================================
// TESTS
// ============================================================================
