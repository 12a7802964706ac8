//! Faction entity model and DTOs.

use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `factions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Faction {
    pub id: DbId,
    pub name: String,
    pub faction_type: Option<String>,
    pub status_in_story: Option<String>,
    /// Leading character; cleared when that character is deleted.
    pub leader_id: Option<DbId>,
    pub stance_to_mc: Option<String>,
    pub goals: Json<Vec<String>>,
    pub resources: Json<Vec<String>>,
    pub internal_conflict: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFaction {
    pub name: String,
    pub faction_type: Option<String>,
    pub status_in_story: Option<String>,
    pub leader_id: Option<DbId>,
    pub stance_to_mc: Option<String>,
    pub goals: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
    pub internal_conflict: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFaction {
    pub name: Option<String>,
    pub faction_type: Option<String>,
    pub status_in_story: Option<String>,
    pub leader_id: Option<DbId>,
    pub stance_to_mc: Option<String>,
    pub goals: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
    pub internal_conflict: Option<String>,
}
