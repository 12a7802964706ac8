//! Repository for the `relationships` table.

use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::relationship::{CreateRelationship, Relationship, UpdateRelationship};
use crate::NOW;

const COLUMNS: &str = "id, source_id, target_id, rel_type, join_reason, independent_goal, \
     appeal, evolution, disagree_scenarios, leave_scenarios, mc_needs, created_at, updated_at";

pub struct RelationshipRepo;

impl RelationshipRepo {
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateRelationship,
    ) -> Result<Relationship, sqlx::Error> {
        let query = format!(
            "INSERT INTO relationships
                (source_id, target_id, rel_type, join_reason, independent_goal, appeal,
                 evolution, disagree_scenarios, leave_scenarios, mc_needs)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, '[]'), COALESCE(?9, '[]'), ?10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Relationship>(&query)
            .bind(input.source_id)
            .bind(input.target_id)
            .bind(&input.rel_type)
            .bind(&input.join_reason)
            .bind(&input.independent_goal)
            .bind(&input.appeal)
            .bind(&input.evolution)
            .bind(input.disagree_scenarios.as_ref().map(Json))
            .bind(input.leave_scenarios.as_ref().map(Json))
            .bind(&input.mc_needs)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<Relationship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM relationships WHERE id = ?1");
        sqlx::query_as::<_, Relationship>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Relationship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM relationships ORDER BY id ASC");
        sqlx::query_as::<_, Relationship>(&query).fetch_all(pool).await
    }

    /// Relationships where the character is either endpoint.
    pub async fn list_for_character(
        pool: &SqlitePool,
        character_id: DbId,
    ) -> Result<Vec<Relationship>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM relationships
             WHERE source_id = ?1 OR target_id = ?1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Relationship>(&query)
            .bind(character_id)
            .fetch_all(pool)
            .await
    }

    /// Update a relationship. Returns `None` if it does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateRelationship,
    ) -> Result<Option<Relationship>, sqlx::Error> {
        let query = format!(
            "UPDATE relationships SET
                rel_type = COALESCE(?2, rel_type),
                join_reason = COALESCE(?3, join_reason),
                independent_goal = COALESCE(?4, independent_goal),
                appeal = COALESCE(?5, appeal),
                evolution = COALESCE(?6, evolution),
                disagree_scenarios = COALESCE(?7, disagree_scenarios),
                leave_scenarios = COALESCE(?8, leave_scenarios),
                mc_needs = COALESCE(?9, mc_needs),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Relationship>(&query)
            .bind(id)
            .bind(&input.rel_type)
            .bind(&input.join_reason)
            .bind(&input.independent_goal)
            .bind(&input.appeal)
            .bind(&input.evolution)
            .bind(input.disagree_scenarios.as_ref().map(Json))
            .bind(input.leave_scenarios.as_ref().map(Json))
            .bind(&input.mc_needs)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM relationships WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        super::row_exists(pool, "relationships", id).await
    }
}
