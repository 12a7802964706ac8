//! Integration tests for the migration runner.

use assert_matches::assert_matches;
use lorekeeper_db::migrate::{applied_migrations, current_version, MIGRATIONS};
use lorekeeper_db::{create_memory_pool, migrate_to, rollback_last, run_migrations, MigrationError};

fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

#[tokio::test]
async fn fresh_database_applies_everything() {
    let pool = create_memory_pool().await.unwrap();
    assert_eq!(current_version(&pool).await.unwrap(), 0);

    let applied = run_migrations(&pool).await.unwrap();
    let expected: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
    assert_eq!(applied, expected);
    assert_eq!(current_version(&pool).await.unwrap(), latest_version());

    lorekeeper_db::health_check(&pool).await.unwrap();
}

#[tokio::test]
async fn running_twice_is_a_no_op() {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();

    let second = run_migrations(&pool).await.unwrap();
    assert!(second.is_empty());

    let history = applied_migrations(&pool).await.unwrap();
    assert_eq!(history.len(), MIGRATIONS.len());
    assert_eq!(history[0].name, "initial_schema");
}

#[tokio::test]
async fn word_count_backfill_counts_existing_content() {
    let pool = create_memory_pool().await.unwrap();
    migrate_to(&pool, 1).await.unwrap();

    sqlx::query("INSERT INTO chapters (title, content) VALUES ('One', 'The quick brown fox')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO chapters (title) VALUES ('Empty')")
        .execute(&pool)
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();

    let counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT title, word_count FROM chapters ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(counts, vec![("One".to_string(), 4), ("Empty".to_string(), 0)]);
}

#[tokio::test]
async fn rollback_stops_at_irreversible_migration() {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();

    assert_eq!(rollback_last(&pool).await.unwrap(), 3);
    assert_eq!(current_version(&pool).await.unwrap(), 2);

    let index_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(index_count, 0);

    let err = rollback_last(&pool).await.unwrap_err();
    assert_matches!(err, MigrationError::Irreversible { version: 2 });
    assert_eq!(current_version(&pool).await.unwrap(), 2);

    // Re-applying restores the indexes.
    assert_eq!(run_migrations(&pool).await.unwrap(), vec![3]);
}

#[tokio::test]
async fn rollback_on_empty_database_fails() {
    let pool = create_memory_pool().await.unwrap();
    let err = rollback_last(&pool).await.unwrap_err();
    assert_matches!(err, MigrationError::NothingToRollback);
}

#[tokio::test]
async fn unknown_target_is_rejected() {
    let pool = create_memory_pool().await.unwrap();
    let err = migrate_to(&pool, latest_version() + 1).await.unwrap_err();
    assert_matches!(err, MigrationError::UnknownVersion(_));
}
