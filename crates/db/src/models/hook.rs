//! Narrative hook model and DTOs.

use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `hooks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hook {
    pub id: DbId,
    pub hook_type: String,
    pub chapter_id: Option<DbId>,
    pub content: String,
    pub style: Option<String>,
    pub strength: Option<i64>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateHook {
    pub hook_type: String,
    pub chapter_id: Option<DbId>,
    pub content: String,
    pub style: Option<String>,
    pub strength: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHook {
    pub hook_type: Option<String>,
    pub chapter_id: Option<DbId>,
    pub content: Option<String>,
    pub style: Option<String>,
    pub strength: Option<i64>,
}
