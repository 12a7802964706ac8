//! Versioned schema migrations.
//!
//! Migrations live in [`MIGRATIONS`], ordered by strictly increasing version.
//! Applied versions are recorded in `schema_version`. Each migration runs in
//! its own transaction together with its bookkeeping row, so a failure leaves
//! the schema at the previous version.
//!
//! A step is either a SQL batch or a Rust function, for data migrations that
//! need application logic.

use futures::future::BoxFuture;
use lorekeeper_core::text::count_words;
use lorekeeper_core::types::Timestamp;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

/// A data migration implemented in Rust. Runs inside the migration's
/// transaction.
pub type MigrationFn =
    for<'c> fn(&'c mut SqliteConnection) -> BoxFuture<'c, Result<(), sqlx::Error>>;

#[derive(Clone, Copy)]
pub enum MigrationStep {
    Sql(&'static str),
    Function(MigrationFn),
}

#[derive(Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: MigrationStep,
    /// `None` marks the migration irreversible.
    pub down: Option<MigrationStep>,
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No applied migration to roll back")]
    NothingToRollback,

    #[error("Migration {version} cannot be rolled back")]
    Irreversible { version: i64 },

    #[error("Database is at unknown schema version {0}")]
    UnknownVersion(i64),
}

/// A row of `schema_version`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: Timestamp,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        up: MigrationStep::Sql(V1_UP),
        down: Some(MigrationStep::Sql(V1_DOWN)),
    },
    Migration {
        version: 2,
        name: "chapter_word_count",
        up: MigrationStep::Function(backfill_word_counts),
        down: None,
    },
    Migration {
        version: 3,
        name: "lookup_indexes",
        up: MigrationStep::Sql(V3_UP),
        down: Some(MigrationStep::Sql(V3_DOWN)),
    },
];

const CREATE_VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version    INTEGER PRIMARY KEY,
    name       TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

async fn ensure_version_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_VERSION_TABLE).execute(pool).await?;
    Ok(())
}

async fn run_step(conn: &mut SqliteConnection, step: MigrationStep) -> Result<(), sqlx::Error> {
    match step {
        MigrationStep::Sql(sql) => {
            sqlx::raw_sql(sql).execute(&mut *conn).await?;
        }
        MigrationStep::Function(f) => f(conn).await?,
    }
    Ok(())
}

/// Highest applied version, or 0 for a fresh database.
pub async fn current_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    ensure_version_table(pool).await?;
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// All applied migrations, oldest first.
pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>, sqlx::Error> {
    ensure_version_table(pool).await?;
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at FROM schema_version ORDER BY version ASC",
    )
    .fetch_all(pool)
    .await
}

/// Apply every pending migration in order. Returns the versions applied by
/// this call; an up-to-date database yields an empty list.
pub async fn run_migrations(pool: &SqlitePool) -> Result<Vec<i64>, MigrationError> {
    let latest = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
    migrate_to(pool, latest).await
}

/// Apply pending migrations up to and including `target`.
pub async fn migrate_to(pool: &SqlitePool, target: i64) -> Result<Vec<i64>, MigrationError> {
    let current = current_version(pool).await?;
    let latest = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
    if current > latest {
        return Err(MigrationError::UnknownVersion(current));
    }
    if target > latest {
        return Err(MigrationError::UnknownVersion(target));
    }

    tracing::info!(current_version = current, target_version = target, "Checking database migrations");

    let mut applied = Vec::new();
    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current && m.version <= target)
    {
        tracing::info!(version = migration.version, name = migration.name, "Applying migration");

        let mut tx = pool.begin().await?;
        run_step(&mut tx, migration.up).await?;
        sqlx::query("INSERT INTO schema_version (version, name) VALUES (?1, ?2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        applied.push(migration.version);
    }

    if !applied.is_empty() {
        tracing::info!(count = applied.len(), "Database migrations completed");
    }
    Ok(applied)
}

/// Revert the most recently applied migration. Returns its version.
pub async fn rollback_last(pool: &SqlitePool) -> Result<i64, MigrationError> {
    let current = current_version(pool).await?;
    if current == 0 {
        return Err(MigrationError::NothingToRollback);
    }

    let migration = MIGRATIONS
        .iter()
        .find(|m| m.version == current)
        .ok_or(MigrationError::UnknownVersion(current))?;
    let down = migration
        .down
        .ok_or(MigrationError::Irreversible { version: current })?;

    tracing::warn!(version = current, name = migration.name, "Rolling back migration");

    let mut tx = pool.begin().await?;
    run_step(&mut tx, down).await?;
    sqlx::query("DELETE FROM schema_version WHERE version = ?1")
        .bind(current)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(current)
}

// ---------------------------------------------------------------------------
// Data migrations
// ---------------------------------------------------------------------------

fn backfill_word_counts(conn: &mut SqliteConnection) -> BoxFuture<'_, Result<(), sqlx::Error>> {
    Box::pin(async move {
        sqlx::query("ALTER TABLE chapters ADD COLUMN word_count INTEGER NOT NULL DEFAULT 0")
            .execute(&mut *conn)
            .await?;

        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, content FROM chapters WHERE content IS NOT NULL")
                .fetch_all(&mut *conn)
                .await?;

        for (id, content) in &rows {
            sqlx::query("UPDATE chapters SET word_count = ?1 WHERE id = ?2")
                .bind(count_words(content))
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }

        tracing::debug!(chapters = rows.len(), "Backfilled chapter word counts");
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

const V1_UP: &str = r#"
CREATE TABLE characters (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    role             TEXT,
    appearance       TEXT,
    voice_samples    TEXT NOT NULL DEFAULT '[]',
    motivation       TEXT,
    conflict_type    TEXT,
    template         TEXT,
    facets           TEXT,
    arc              TEXT,
    first_appearance INTEGER REFERENCES chapters(id) ON DELETE SET NULL,
    created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE relationships (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id          INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
    target_id          INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
    rel_type           TEXT NOT NULL,
    join_reason        TEXT,
    independent_goal   TEXT,
    appeal             TEXT,
    evolution          TEXT,
    disagree_scenarios TEXT NOT NULL DEFAULT '[]',
    leave_scenarios    TEXT NOT NULL DEFAULT '[]',
    mc_needs           TEXT,
    created_at         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    CHECK (source_id <> target_id)
);

CREATE TABLE world (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    power_system TEXT,
    social_rules TEXT NOT NULL DEFAULT '{}',
    updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE locations (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    location_type TEXT,
    significance  TEXT,
    atmosphere    TEXT,
    connections   TEXT NOT NULL DEFAULT '[]',
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE factions (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL,
    faction_type      TEXT,
    status_in_story   TEXT,
    leader_id         INTEGER REFERENCES characters(id) ON DELETE SET NULL,
    stance_to_mc      TEXT,
    goals             TEXT NOT NULL DEFAULT '[]',
    resources         TEXT NOT NULL DEFAULT '[]',
    internal_conflict TEXT,
    created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE timeline_events (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    event_date         TEXT,
    description        TEXT NOT NULL,
    related_characters TEXT NOT NULL DEFAULT '[]',
    related_locations  TEXT NOT NULL DEFAULT '[]',
    created_at         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE arcs (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    arc_type        TEXT,
    chapter_start   INTEGER,
    chapter_end     INTEGER,
    status          TEXT NOT NULL DEFAULT 'planned',
    progress        INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
    sections        TEXT NOT NULL DEFAULT '[]',
    main_characters TEXT NOT NULL DEFAULT '[]',
    created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE foreshadowing (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    content          TEXT NOT NULL,
    planted_chapter  INTEGER,
    planted_text     TEXT,
    hints            TEXT NOT NULL DEFAULT '[]',
    planned_payoff   TEXT,
    term             TEXT,
    status           TEXT NOT NULL DEFAULT 'active',
    resolved_chapter INTEGER,
    created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE volumes (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT,
    theme         TEXT,
    core_conflict TEXT,
    mc_growth     TEXT,
    chapter_start INTEGER,
    chapter_end   INTEGER,
    status        TEXT NOT NULL DEFAULT 'planned',
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE chapters (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    volume_id            INTEGER REFERENCES volumes(id) ON DELETE SET NULL,
    arc_id               INTEGER REFERENCES arcs(id) ON DELETE SET NULL,
    title                TEXT,
    sort_order           INTEGER NOT NULL DEFAULT 0,
    status               TEXT NOT NULL DEFAULT 'outline',
    outline              TEXT,
    content              TEXT,
    characters           TEXT NOT NULL DEFAULT '[]',
    locations            TEXT NOT NULL DEFAULT '[]',
    foreshadowing_hinted TEXT NOT NULL DEFAULT '[]',
    emotion_curve        TEXT,
    tension              TEXT,
    created_at           TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at           TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE hooks (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    hook_type  TEXT NOT NULL,
    chapter_id INTEGER REFERENCES chapters(id) ON DELETE SET NULL,
    content    TEXT NOT NULL,
    style      TEXT,
    strength   INTEGER CHECK (strength BETWEEN 0 AND 100),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
"#;

const V1_DOWN: &str = r#"
DROP TABLE hooks;
DROP TABLE chapters;
DROP TABLE volumes;
DROP TABLE foreshadowing;
DROP TABLE arcs;
DROP TABLE timeline_events;
DROP TABLE factions;
DROP TABLE locations;
DROP TABLE world;
DROP TABLE relationships;
DROP TABLE characters;
"#;

const V3_UP: &str = r#"
CREATE INDEX idx_characters_name ON characters(name COLLATE NOCASE);
CREATE INDEX idx_relationships_source ON relationships(source_id);
CREATE INDEX idx_relationships_target ON relationships(target_id);
CREATE INDEX idx_factions_leader ON factions(leader_id);
CREATE INDEX idx_foreshadowing_status ON foreshadowing(status);
CREATE INDEX idx_hooks_chapter ON hooks(chapter_id);
CREATE INDEX idx_chapters_volume_order ON chapters(volume_id, sort_order);
CREATE INDEX idx_chapters_arc ON chapters(arc_id);
"#;

const V3_DOWN: &str = r#"
DROP INDEX idx_chapters_arc;
DROP INDEX idx_chapters_volume_order;
DROP INDEX idx_hooks_chapter;
DROP INDEX idx_foreshadowing_status;
DROP INDEX idx_factions_leader;
DROP INDEX idx_relationships_target;
DROP INDEX idx_relationships_source;
DROP INDEX idx_characters_name;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_strictly_increase() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version, "{} !< {}", pair[0].name, pair[1].name);
        }
        assert_eq!(MIGRATIONS[0].version, 1);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = MIGRATIONS.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MIGRATIONS.len());
    }
}
