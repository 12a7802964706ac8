//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument. Queries use numbered
//! `?N` parameters; partial updates go through `COALESCE` so omitted fields
//! keep their stored value.

use std::collections::HashSet;

use lorekeeper_core::types::DbId;
use sqlx::SqlitePool;

pub mod arc_repo;
pub mod chapter_repo;
pub mod character_repo;
pub mod faction_repo;
pub mod foreshadowing_repo;
pub mod hook_repo;
pub mod location_repo;
pub mod relationship_repo;
pub mod timeline_repo;
pub mod volume_repo;
pub mod world_repo;

pub use arc_repo::ArcRepo;
pub use chapter_repo::ChapterRepo;
pub use character_repo::CharacterRepo;
pub use faction_repo::FactionRepo;
pub use foreshadowing_repo::ForeshadowingRepo;
pub use hook_repo::HookRepo;
pub use location_repo::LocationRepo;
pub use relationship_repo::RelationshipRepo;
pub use timeline_repo::TimelineRepo;
pub use volume_repo::VolumeRepo;
pub use world_repo::WorldRepo;

/// `?1, ?2, ...` for an `IN (...)` list starting at parameter `first`.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a row with `id` exists in `table`.
pub(crate) async fn row_exists(
    pool: &SqlitePool,
    table: &'static str,
    id: DbId,
) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
    sqlx::query_scalar::<_, bool>(&query)
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Ids from `ids` with no row in `table`, sorted and deduplicated.
pub(crate) async fn missing_ids(
    pool: &SqlitePool,
    table: &'static str,
    ids: &[DbId],
) -> Result<Vec<DbId>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = format!(
        "SELECT id FROM {table} WHERE id IN ({})",
        placeholders(1, ids.len())
    );
    let mut q = sqlx::query_scalar::<_, DbId>(&query);
    for id in ids {
        q = q.bind(*id);
    }
    let found: HashSet<DbId> = q.fetch_all(pool).await?.into_iter().collect();

    let mut missing: Vec<DbId> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    missing.sort_unstable();
    missing.dedup();
    Ok(missing)
}
