//! Repository for the `foreshadowing` table.
//!
//! Lifecycle rules (which status transitions are legal) belong to the
//! service layer; this repository writes whatever it is given.

use lorekeeper_core::bible::ForeshadowingHint;
use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::foreshadowing::{CreateForeshadowing, Foreshadowing, UpdateForeshadowing};
use crate::NOW;

const COLUMNS: &str = "id, content, planted_chapter, planted_text, hints, planned_payoff, term, \
     status, resolved_chapter, created_at, updated_at";

pub struct ForeshadowingRepo;

impl ForeshadowingRepo {
    /// Plant a new thread. Always starts `active` with no hints.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateForeshadowing,
    ) -> Result<Foreshadowing, sqlx::Error> {
        let query = format!(
            "INSERT INTO foreshadowing
                (content, planted_chapter, planted_text, planned_payoff, term, status)
             VALUES (?1, ?2, ?3, ?4, ?5, 'active')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Foreshadowing>(&query)
            .bind(input.content.trim())
            .bind(input.planted_chapter)
            .bind(&input.planted_text)
            .bind(&input.planned_payoff)
            .bind(&input.term)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<Foreshadowing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM foreshadowing WHERE id = ?1");
        sqlx::query_as::<_, Foreshadowing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Foreshadowing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM foreshadowing ORDER BY id ASC");
        sqlx::query_as::<_, Foreshadowing>(&query).fetch_all(pool).await
    }

    pub async fn list_by_status(
        pool: &SqlitePool,
        status: &str,
    ) -> Result<Vec<Foreshadowing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM foreshadowing WHERE status = ?1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, Foreshadowing>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Edit descriptive fields. Status is untouched.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateForeshadowing,
    ) -> Result<Option<Foreshadowing>, sqlx::Error> {
        let query = format!(
            "UPDATE foreshadowing SET
                content = COALESCE(?2, content),
                planted_chapter = COALESCE(?3, planted_chapter),
                planted_text = COALESCE(?4, planted_text),
                planned_payoff = COALESCE(?5, planned_payoff),
                term = COALESCE(?6, term),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Foreshadowing>(&query)
            .bind(id)
            .bind(input.content.as_deref().map(str::trim))
            .bind(input.planted_chapter)
            .bind(&input.planted_text)
            .bind(&input.planned_payoff)
            .bind(&input.term)
            .fetch_optional(pool)
            .await
    }

    /// Move an active thread to `status` and, for resolutions, record the
    /// resolving chapter. Returns `None` when the thread is missing or no
    /// longer active.
    pub async fn set_status(
        pool: &SqlitePool,
        id: DbId,
        status: &str,
        resolved_chapter: Option<DbId>,
    ) -> Result<Option<Foreshadowing>, sqlx::Error> {
        let query = format!(
            "UPDATE foreshadowing SET
                status = ?2,
                resolved_chapter = ?3,
                updated_at = {NOW}
             WHERE id = ?1 AND status = 'active'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Foreshadowing>(&query)
            .bind(id)
            .bind(status)
            .bind(resolved_chapter)
            .fetch_optional(pool)
            .await
    }

    /// Append a hint to an active thread's `hints` array. Returns `None` when
    /// the thread is missing or no longer active.
    pub async fn add_hint(
        pool: &SqlitePool,
        id: DbId,
        hint: &ForeshadowingHint,
    ) -> Result<Option<Foreshadowing>, sqlx::Error> {
        let query = format!(
            "UPDATE foreshadowing SET
                hints = json_insert(hints, '$[#]', json(?2)),
                updated_at = {NOW}
             WHERE id = ?1 AND status = 'active'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Foreshadowing>(&query)
            .bind(id)
            .bind(Json(hint))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM foreshadowing WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "foreshadowing", id).await
    }

    pub async fn missing_ids(pool: &SqlitePool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        super::missing_ids(pool, "foreshadowing", ids).await
    }
}
