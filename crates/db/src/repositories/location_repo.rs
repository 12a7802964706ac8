//! Repository for the `locations` table.

use lorekeeper_core::search::LIKE_ESCAPE;
use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::location::{CreateLocation, Location, UpdateLocation};
use crate::models::EntityName;
use crate::NOW;

const COLUMNS: &str =
    "id, name, location_type, significance, atmosphere, connections, created_at, updated_at";

pub struct LocationRepo;

impl LocationRepo {
    pub async fn create(pool: &SqlitePool, input: &CreateLocation) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (name, location_type, significance, atmosphere, connections)
             VALUES (?1, ?2, ?3, ?4, COALESCE(?5, '[]'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(input.name.trim())
            .bind(&input.location_type)
            .bind(&input.significance)
            .bind(&input.atmosphere)
            .bind(input.connections.as_ref().map(Json))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE id = ?1");
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &SqlitePool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locations
             ORDER BY name COLLATE NOCASE ASC, id ASC
             LIMIT ?1 OFFSET ?2"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Search name, type and significance.
    pub async fn search(
        pool: &SqlitePool,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locations
             WHERE name LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                OR location_type LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                OR significance LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
             ORDER BY name COLLATE NOCASE ASC, id ASC
             LIMIT ?2"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_names(pool: &SqlitePool) -> Result<Vec<EntityName>, sqlx::Error> {
        sqlx::query_as::<_, EntityName>("SELECT id, name FROM locations ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateLocation,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!(
            "UPDATE locations SET
                name = COALESCE(?2, name),
                location_type = COALESCE(?3, location_type),
                significance = COALESCE(?4, significance),
                atmosphere = COALESCE(?5, atmosphere),
                connections = COALESCE(?6, connections),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.location_type)
            .bind(&input.significance)
            .bind(&input.atmosphere)
            .bind(input.connections.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "locations", id).await
    }

    pub async fn missing_ids(pool: &SqlitePool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        super::missing_ids(pool, "locations", ids).await
    }
}
