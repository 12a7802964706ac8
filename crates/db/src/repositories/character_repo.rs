//! Repository for the `characters` table.

use lorekeeper_core::search::LIKE_ESCAPE;
use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::character::{Character, CreateCharacter, UpdateCharacter};
use crate::models::EntityName;
use crate::NOW;

const COLUMNS: &str = "id, name, role, appearance, voice_samples, motivation, conflict_type, \
     template, facets, arc, first_appearance, created_at, updated_at";

/// Provides CRUD operations for characters plus name lookups.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateCharacter,
    ) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters
                (name, role, appearance, voice_samples, motivation, conflict_type,
                 template, facets, arc, first_appearance)
             VALUES (?1, ?2, ?3, COALESCE(?4, '[]'), ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.name.trim())
            .bind(&input.role)
            .bind(&input.appearance)
            .bind(input.voice_samples.as_ref().map(Json))
            .bind(input.motivation.as_ref().map(Json))
            .bind(&input.conflict_type)
            .bind(&input.template)
            .bind(input.facets.as_ref().map(Json))
            .bind(input.arc.as_ref().map(Json))
            .bind(input.first_appearance)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = ?1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive exact name match. The oldest match wins.
    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE name = ?1 COLLATE NOCASE
             ORDER BY id ASC LIMIT 1"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    /// List characters ordered by name.
    pub async fn list(
        pool: &SqlitePool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             ORDER BY name COLLATE NOCASE ASC, id ASC
             LIMIT ?1 OFFSET ?2"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Search name and appearance with a `LIKE` pattern built by
    /// `lorekeeper_core::search::like_pattern`.
    pub async fn search(
        pool: &SqlitePool,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE name LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                OR appearance LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
             ORDER BY name COLLATE NOCASE ASC, id ASC
             LIMIT ?2"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every character's id and name, ordered by id.
    pub async fn list_names(pool: &SqlitePool) -> Result<Vec<EntityName>, sqlx::Error> {
        sqlx::query_as::<_, EntityName>("SELECT id, name FROM characters ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM characters")
            .fetch_one(pool)
            .await
    }

    /// Update a character. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE(?2, name),
                role = COALESCE(?3, role),
                appearance = COALESCE(?4, appearance),
                voice_samples = COALESCE(?5, voice_samples),
                motivation = COALESCE(?6, motivation),
                conflict_type = COALESCE(?7, conflict_type),
                template = COALESCE(?8, template),
                facets = COALESCE(?9, facets),
                arc = COALESCE(?10, arc),
                first_appearance = COALESCE(?11, first_appearance),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.role)
            .bind(&input.appearance)
            .bind(input.voice_samples.as_ref().map(Json))
            .bind(input.motivation.as_ref().map(Json))
            .bind(&input.conflict_type)
            .bind(&input.template)
            .bind(input.facets.as_ref().map(Json))
            .bind(input.arc.as_ref().map(Json))
            .bind(input.first_appearance)
            .fetch_optional(pool)
            .await
    }

    /// Delete a character. Relationships cascade and led factions lose
    /// their leader. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "characters", id).await
    }

    /// Ids from `ids` that do not name a character.
    pub async fn missing_ids(pool: &SqlitePool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        super::missing_ids(pool, "characters", ids).await
    }
}
