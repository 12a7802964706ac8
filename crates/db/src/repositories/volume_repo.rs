//! Repository for the `volumes` table.

use lorekeeper_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::volume::{CreateVolume, UpdateVolume, Volume};
use crate::NOW;

const COLUMNS: &str = "id, name, theme, core_conflict, mc_growth, chapter_start, chapter_end, \
     status, created_at, updated_at";

pub struct VolumeRepo;

impl VolumeRepo {
    /// Insert a new volume. `status` defaults to `planned`.
    pub async fn create(pool: &SqlitePool, input: &CreateVolume) -> Result<Volume, sqlx::Error> {
        let query = format!(
            "INSERT INTO volumes
                (name, theme, core_conflict, mc_growth, chapter_start, chapter_end, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, 'planned'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Volume>(&query)
            .bind(&input.name)
            .bind(&input.theme)
            .bind(&input.core_conflict)
            .bind(&input.mc_growth)
            .bind(input.chapter_start)
            .bind(input.chapter_end)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Volume>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM volumes WHERE id = ?1");
        sqlx::query_as::<_, Volume>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Volume>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM volumes
             ORDER BY chapter_start IS NULL, chapter_start ASC, id ASC"
        );
        sqlx::query_as::<_, Volume>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateVolume,
    ) -> Result<Option<Volume>, sqlx::Error> {
        let query = format!(
            "UPDATE volumes SET
                name = COALESCE(?2, name),
                theme = COALESCE(?3, theme),
                core_conflict = COALESCE(?4, core_conflict),
                mc_growth = COALESCE(?5, mc_growth),
                chapter_start = COALESCE(?6, chapter_start),
                chapter_end = COALESCE(?7, chapter_end),
                status = COALESCE(?8, status),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Volume>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.theme)
            .bind(&input.core_conflict)
            .bind(&input.mc_growth)
            .bind(input.chapter_start)
            .bind(input.chapter_end)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a volume. Its chapters are kept and detached.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM volumes WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "volumes", id).await
    }
}
