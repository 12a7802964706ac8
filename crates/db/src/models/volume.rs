//! Volume model and DTOs.

use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `volumes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Volume {
    pub id: DbId,
    pub name: Option<String>,
    pub theme: Option<String>,
    pub core_conflict: Option<String>,
    pub mc_growth: Option<String>,
    pub chapter_start: Option<i64>,
    pub chapter_end: Option<i64>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVolume {
    pub name: Option<String>,
    pub theme: Option<String>,
    pub core_conflict: Option<String>,
    pub mc_growth: Option<String>,
    pub chapter_start: Option<i64>,
    pub chapter_end: Option<i64>,
    /// Defaults to `planned`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVolume {
    pub name: Option<String>,
    pub theme: Option<String>,
    pub core_conflict: Option<String>,
    pub mc_growth: Option<String>,
    pub chapter_start: Option<i64>,
    pub chapter_end: Option<i64>,
    pub status: Option<String>,
}
