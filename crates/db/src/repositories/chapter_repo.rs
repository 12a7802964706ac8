//! Repository for the `chapters` table.

use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::chapter::{Chapter, ChapterSummary, CreateChapter, UpdateChapter};
use crate::NOW;

const COLUMNS: &str = "id, volume_id, arc_id, title, sort_order, status, outline, content, \
     word_count, characters, locations, foreshadowing_hinted, emotion_curve, tension, \
     created_at, updated_at";

const SUMMARY_COLUMNS: &str =
    "id, volume_id, arc_id, title, sort_order, status, word_count, tension, updated_at";

pub struct ChapterRepo;

impl ChapterRepo {
    /// Insert a new chapter. `word_count` is computed by the caller from
    /// `input.content`. A missing `sort_order` appends after the last
    /// chapter.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateChapter,
        word_count: i64,
    ) -> Result<Chapter, sqlx::Error> {
        let query = format!(
            "INSERT INTO chapters
                (volume_id, arc_id, title, sort_order, status, outline, content, word_count,
                 characters, locations, foreshadowing_hinted, emotion_curve, tension)
             VALUES (?1, ?2, ?3,
                     COALESCE(?4, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM chapters)),
                     COALESCE(?5, 'outline'), ?6, ?7, ?8,
                     COALESCE(?9, '[]'), COALESCE(?10, '[]'), COALESCE(?11, '[]'), ?12, ?13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(input.volume_id)
            .bind(input.arc_id)
            .bind(&input.title)
            .bind(input.sort_order)
            .bind(&input.status)
            .bind(input.outline.as_ref().map(Json))
            .bind(&input.content)
            .bind(word_count)
            .bind(input.characters.as_ref().map(Json))
            .bind(input.locations.as_ref().map(Json))
            .bind(input.foreshadowing_hinted.as_ref().map(Json))
            .bind(&input.emotion_curve)
            .bind(&input.tension)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chapters WHERE id = ?1");
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Chapter listing without content, optionally restricted to a volume.
    pub async fn list_summaries(
        pool: &SqlitePool,
        volume_id: Option<DbId>,
    ) -> Result<Vec<ChapterSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM chapters
             WHERE ?1 IS NULL OR volume_id = ?1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, ChapterSummary>(&query)
            .bind(volume_id)
            .fetch_all(pool)
            .await
    }

    /// Full chapters of one volume in reading order.
    pub async fn list_by_volume(
        pool: &SqlitePool,
        volume_id: DbId,
    ) -> Result<Vec<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters
             WHERE volume_id = ?1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(volume_id)
            .fetch_all(pool)
            .await
    }

    /// Every chapter in reading order.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Chapter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chapters ORDER BY sort_order ASC, id ASC");
        sqlx::query_as::<_, Chapter>(&query).fetch_all(pool).await
    }

    /// The given chapters in reading order. Unknown ids are skipped.
    pub async fn find_many(pool: &SqlitePool, ids: &[DbId]) -> Result<Vec<Chapter>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM chapters
             WHERE id IN ({})
             ORDER BY sort_order ASC, id ASC",
            super::placeholders(1, ids.len())
        );
        let mut q = sqlx::query_as::<_, Chapter>(&query);
        for id in ids {
            q = q.bind(*id);
        }
        q.fetch_all(pool).await
    }

    /// The chapter immediately before `chapter` in reading order.
    pub async fn find_previous(
        pool: &SqlitePool,
        chapter: &Chapter,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters
             WHERE sort_order < ?1 OR (sort_order = ?1 AND id < ?2)
             ORDER BY sort_order DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(chapter.sort_order)
            .bind(chapter.id)
            .fetch_optional(pool)
            .await
    }

    /// Update chapter metadata. Content has its own write path.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateChapter,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "UPDATE chapters SET
                volume_id = COALESCE(?2, volume_id),
                arc_id = COALESCE(?3, arc_id),
                title = COALESCE(?4, title),
                sort_order = COALESCE(?5, sort_order),
                status = COALESCE(?6, status),
                outline = COALESCE(?7, outline),
                characters = COALESCE(?8, characters),
                locations = COALESCE(?9, locations),
                foreshadowing_hinted = COALESCE(?10, foreshadowing_hinted),
                emotion_curve = COALESCE(?11, emotion_curve),
                tension = COALESCE(?12, tension),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .bind(input.volume_id)
            .bind(input.arc_id)
            .bind(&input.title)
            .bind(input.sort_order)
            .bind(&input.status)
            .bind(input.outline.as_ref().map(Json))
            .bind(input.characters.as_ref().map(Json))
            .bind(input.locations.as_ref().map(Json))
            .bind(input.foreshadowing_hinted.as_ref().map(Json))
            .bind(&input.emotion_curve)
            .bind(&input.tension)
            .fetch_optional(pool)
            .await
    }

    /// Replace the chapter body together with its word count.
    pub async fn save_content(
        pool: &SqlitePool,
        id: DbId,
        content: &str,
        word_count: i64,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "UPDATE chapters SET
                content = ?2,
                word_count = ?3,
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .bind(content)
            .bind(word_count)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "chapters", id).await
    }
}
