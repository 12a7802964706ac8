//! Timeline event model and DTOs.

use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `timeline_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEvent {
    pub id: DbId,
    /// In-world date, free text ("Year 3, spring").
    pub event_date: Option<String>,
    pub description: String,
    pub related_characters: Json<Vec<DbId>>,
    pub related_locations: Json<Vec<DbId>>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTimelineEvent {
    pub event_date: Option<String>,
    pub description: String,
    pub related_characters: Option<Vec<DbId>>,
    pub related_locations: Option<Vec<DbId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTimelineEvent {
    pub event_date: Option<String>,
    pub description: Option<String>,
    pub related_characters: Option<Vec<DbId>>,
    pub related_locations: Option<Vec<DbId>>,
}
