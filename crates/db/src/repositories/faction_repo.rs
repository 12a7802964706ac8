//! Repository for the `factions` table.

use lorekeeper_core::search::LIKE_ESCAPE;
use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::faction::{CreateFaction, Faction, UpdateFaction};
use crate::models::EntityName;
use crate::NOW;

const COLUMNS: &str = "id, name, faction_type, status_in_story, leader_id, stance_to_mc, goals, \
     resources, internal_conflict, created_at, updated_at";

pub struct FactionRepo;

impl FactionRepo {
    pub async fn create(pool: &SqlitePool, input: &CreateFaction) -> Result<Faction, sqlx::Error> {
        let query = format!(
            "INSERT INTO factions
                (name, faction_type, status_in_story, leader_id, stance_to_mc, goals,
                 resources, internal_conflict)
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, '[]'), COALESCE(?7, '[]'), ?8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Faction>(&query)
            .bind(input.name.trim())
            .bind(&input.faction_type)
            .bind(&input.status_in_story)
            .bind(input.leader_id)
            .bind(&input.stance_to_mc)
            .bind(input.goals.as_ref().map(Json))
            .bind(input.resources.as_ref().map(Json))
            .bind(&input.internal_conflict)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Faction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM factions WHERE id = ?1");
        sqlx::query_as::<_, Faction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &SqlitePool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Faction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM factions
             ORDER BY name COLLATE NOCASE ASC, id ASC
             LIMIT ?1 OFFSET ?2"
        );
        sqlx::query_as::<_, Faction>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Search name, type and goals.
    pub async fn search(
        pool: &SqlitePool,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<Faction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM factions
             WHERE name LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                OR faction_type LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                OR goals LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
             ORDER BY name COLLATE NOCASE ASC, id ASC
             LIMIT ?2"
        );
        sqlx::query_as::<_, Faction>(&query)
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_names(pool: &SqlitePool) -> Result<Vec<EntityName>, sqlx::Error> {
        sqlx::query_as::<_, EntityName>("SELECT id, name FROM factions ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateFaction,
    ) -> Result<Option<Faction>, sqlx::Error> {
        let query = format!(
            "UPDATE factions SET
                name = COALESCE(?2, name),
                faction_type = COALESCE(?3, faction_type),
                status_in_story = COALESCE(?4, status_in_story),
                leader_id = COALESCE(?5, leader_id),
                stance_to_mc = COALESCE(?6, stance_to_mc),
                goals = COALESCE(?7, goals),
                resources = COALESCE(?8, resources),
                internal_conflict = COALESCE(?9, internal_conflict),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Faction>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.faction_type)
            .bind(&input.status_in_story)
            .bind(input.leader_id)
            .bind(&input.stance_to_mc)
            .bind(input.goals.as_ref().map(Json))
            .bind(input.resources.as_ref().map(Json))
            .bind(&input.internal_conflict)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM factions WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "factions", id).await
    }
}
