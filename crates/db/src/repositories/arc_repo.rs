//! Repository for the `arcs` table.

use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::arc::{CreateArc, StoryArc, UpdateArc};
use crate::NOW;

const COLUMNS: &str = "id, name, arc_type, chapter_start, chapter_end, status, progress, \
     sections, main_characters, created_at, updated_at";

pub struct ArcRepo;

impl ArcRepo {
    /// Insert a new arc. `status` defaults to `planned`, `progress` to 0.
    pub async fn create(pool: &SqlitePool, input: &CreateArc) -> Result<StoryArc, sqlx::Error> {
        let query = format!(
            "INSERT INTO arcs
                (name, arc_type, chapter_start, chapter_end, status, progress, sections,
                 main_characters)
             VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 'planned'), COALESCE(?6, 0),
                     COALESCE(?7, '[]'), COALESCE(?8, '[]'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(input.name.trim())
            .bind(&input.arc_type)
            .bind(input.chapter_start)
            .bind(input.chapter_end)
            .bind(&input.status)
            .bind(input.progress)
            .bind(input.sections.as_ref().map(Json))
            .bind(input.main_characters.as_ref().map(Json))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<StoryArc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM arcs WHERE id = ?1");
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Arcs in story order: by starting chapter, open-ended starts last.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<StoryArc>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM arcs
             ORDER BY chapter_start IS NULL, chapter_start ASC, id ASC"
        );
        sqlx::query_as::<_, StoryArc>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateArc,
    ) -> Result<Option<StoryArc>, sqlx::Error> {
        let query = format!(
            "UPDATE arcs SET
                name = COALESCE(?2, name),
                arc_type = COALESCE(?3, arc_type),
                chapter_start = COALESCE(?4, chapter_start),
                chapter_end = COALESCE(?5, chapter_end),
                status = COALESCE(?6, status),
                progress = COALESCE(?7, progress),
                sections = COALESCE(?8, sections),
                main_characters = COALESCE(?9, main_characters),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.arc_type)
            .bind(input.chapter_start)
            .bind(input.chapter_end)
            .bind(&input.status)
            .bind(input.progress)
            .bind(input.sections.as_ref().map(Json))
            .bind(input.main_characters.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM arcs WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "arcs", id).await
    }
}
