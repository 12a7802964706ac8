//! Repository for the `timeline_events` table.

use lorekeeper_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::timeline::{CreateTimelineEvent, TimelineEvent, UpdateTimelineEvent};

const COLUMNS: &str =
    "id, event_date, description, related_characters, related_locations, created_at";

pub struct TimelineRepo;

impl TimelineRepo {
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateTimelineEvent,
    ) -> Result<TimelineEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_events
                (event_date, description, related_characters, related_locations)
             VALUES (?1, ?2, COALESCE(?3, '[]'), COALESCE(?4, '[]'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(&input.event_date)
            .bind(input.description.trim())
            .bind(input.related_characters.as_ref().map(Json))
            .bind(input.related_locations.as_ref().map(Json))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_events WHERE id = ?1");
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All events ordered by in-world date, then insertion order. Undated
    /// events sort first.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_events ORDER BY event_date ASC, id ASC"
        );
        sqlx::query_as::<_, TimelineEvent>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateTimelineEvent,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_events SET
                event_date = COALESCE(?2, event_date),
                description = COALESCE(?3, description),
                related_characters = COALESCE(?4, related_characters),
                related_locations = COALESCE(?5, related_locations)
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .bind(&input.event_date)
            .bind(input.description.as_deref().map(str::trim))
            .bind(input.related_characters.as_ref().map(Json))
            .bind(input.related_locations.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timeline_events WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
