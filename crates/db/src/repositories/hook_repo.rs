//! Repository for the `hooks` table.

use lorekeeper_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::hook::{CreateHook, Hook, UpdateHook};

const COLUMNS: &str = "id, hook_type, chapter_id, content, style, strength, created_at";

pub struct HookRepo;

impl HookRepo {
    pub async fn create(pool: &SqlitePool, input: &CreateHook) -> Result<Hook, sqlx::Error> {
        let query = format!(
            "INSERT INTO hooks (hook_type, chapter_id, content, style, strength)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hook>(&query)
            .bind(&input.hook_type)
            .bind(input.chapter_id)
            .bind(input.content.trim())
            .bind(&input.style)
            .bind(input.strength)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Hook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hooks WHERE id = ?1");
        sqlx::query_as::<_, Hook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Hook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hooks ORDER BY id ASC");
        sqlx::query_as::<_, Hook>(&query).fetch_all(pool).await
    }

    pub async fn list_by_chapter(
        pool: &SqlitePool,
        chapter_id: DbId,
    ) -> Result<Vec<Hook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hooks WHERE chapter_id = ?1 ORDER BY id ASC");
        sqlx::query_as::<_, Hook>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateHook,
    ) -> Result<Option<Hook>, sqlx::Error> {
        let query = format!(
            "UPDATE hooks SET
                hook_type = COALESCE(?2, hook_type),
                chapter_id = COALESCE(?3, chapter_id),
                content = COALESCE(?4, content),
                style = COALESCE(?5, style),
                strength = COALESCE(?6, strength)
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hook>(&query)
            .bind(id)
            .bind(&input.hook_type)
            .bind(input.chapter_id)
            .bind(input.content.as_deref().map(str::trim))
            .bind(&input.style)
            .bind(input.strength)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hooks WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
