//! Repository for the singleton `world` row.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::world::{UpdateWorld, World};
use crate::NOW;

const COLUMNS: &str = "id, power_system, social_rules, updated_at";

pub struct WorldRepo;

impl WorldRepo {
    /// The stored world settings, or `None` before the first save.
    pub async fn get(pool: &SqlitePool) -> Result<Option<World>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM world WHERE id = 1");
        sqlx::query_as::<_, World>(&query).fetch_optional(pool).await
    }

    /// Create or update the world row. Omitted sections keep their value.
    pub async fn upsert(pool: &SqlitePool, input: &UpdateWorld) -> Result<World, sqlx::Error> {
        let query = format!(
            "INSERT INTO world (id, power_system, social_rules)
             VALUES (1, ?1, COALESCE(?2, '{{}}'))
             ON CONFLICT(id) DO UPDATE SET
                power_system = COALESCE(?1, world.power_system),
                social_rules = COALESCE(?2, world.social_rules),
                updated_at = {NOW}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, World>(&query)
            .bind(input.power_system.as_ref().map(Json))
            .bind(input.social_rules.as_ref().map(Json))
            .fetch_one(pool)
            .await
    }
}
