//! Chapter model and DTOs.

use lorekeeper_core::bible::ChapterOutline;
use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A full row from the `chapters` table, including content.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chapter {
    pub id: DbId,
    pub volume_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub title: Option<String>,
    pub sort_order: i64,
    pub status: String,
    pub outline: Option<Json<ChapterOutline>>,
    pub content: Option<String>,
    pub word_count: i64,
    pub characters: Json<Vec<DbId>>,
    pub locations: Json<Vec<DbId>>,
    pub foreshadowing_hinted: Json<Vec<DbId>>,
    pub emotion_curve: Option<String>,
    pub tension: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Chapter listing entry without the content body.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChapterSummary {
    pub id: DbId,
    pub volume_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub title: Option<String>,
    pub sort_order: i64,
    pub status: String,
    pub word_count: i64,
    pub tension: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateChapter {
    pub volume_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub title: Option<String>,
    /// Defaults to one past the current maximum.
    pub sort_order: Option<i64>,
    /// Defaults to `outline`.
    pub status: Option<String>,
    pub outline: Option<ChapterOutline>,
    pub content: Option<String>,
    pub characters: Option<Vec<DbId>>,
    pub locations: Option<Vec<DbId>>,
    pub foreshadowing_hinted: Option<Vec<DbId>>,
    pub emotion_curve: Option<String>,
    pub tension: Option<String>,
}

/// Metadata update. Content is saved separately so word counts stay in
/// step with it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChapter {
    pub volume_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub title: Option<String>,
    pub sort_order: Option<i64>,
    pub status: Option<String>,
    pub outline: Option<ChapterOutline>,
    pub characters: Option<Vec<DbId>>,
    pub locations: Option<Vec<DbId>>,
    pub foreshadowing_hinted: Option<Vec<DbId>>,
    pub emotion_curve: Option<String>,
    pub tension: Option<String>,
}

/// Body of `PUT /chapters/{id}/content`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveChapterContent {
    pub content: String,
}
