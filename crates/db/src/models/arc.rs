//! Plot arc model and DTOs.

use lorekeeper_core::bible::ArcSection;
use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `arcs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryArc {
    pub id: DbId,
    pub name: String,
    pub arc_type: Option<String>,
    pub chapter_start: Option<i64>,
    pub chapter_end: Option<i64>,
    pub status: String,
    /// 0..=100.
    pub progress: i64,
    pub sections: Json<Vec<ArcSection>>,
    pub main_characters: Json<Vec<DbId>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateArc {
    pub name: String,
    pub arc_type: Option<String>,
    pub chapter_start: Option<i64>,
    pub chapter_end: Option<i64>,
    /// Defaults to `planned`.
    pub status: Option<String>,
    /// Defaults to 0.
    pub progress: Option<i64>,
    pub sections: Option<Vec<ArcSection>>,
    pub main_characters: Option<Vec<DbId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArc {
    pub name: Option<String>,
    pub arc_type: Option<String>,
    pub chapter_start: Option<i64>,
    pub chapter_end: Option<i64>,
    pub status: Option<String>,
    pub progress: Option<i64>,
    pub sections: Option<Vec<ArcSection>>,
    pub main_characters: Option<Vec<DbId>>,
}
