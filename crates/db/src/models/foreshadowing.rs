//! Foreshadowing thread model and DTOs.

use lorekeeper_core::bible::ForeshadowingHint;
use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `foreshadowing` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Foreshadowing {
    pub id: DbId,
    pub content: String,
    pub planted_chapter: Option<DbId>,
    pub planted_text: Option<String>,
    pub hints: Json<Vec<ForeshadowingHint>>,
    pub planned_payoff: Option<String>,
    pub term: Option<String>,
    pub status: String,
    pub resolved_chapter: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for planting a thread. New threads are always `active`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateForeshadowing {
    pub content: String,
    pub planted_chapter: Option<DbId>,
    pub planted_text: Option<String>,
    pub planned_payoff: Option<String>,
    pub term: Option<String>,
}

/// DTO for editing a thread. Status changes go through the lifecycle
/// operations, not this DTO.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateForeshadowing {
    pub content: Option<String>,
    pub planted_chapter: Option<DbId>,
    pub planted_text: Option<String>,
    pub planned_payoff: Option<String>,
    pub term: Option<String>,
}

/// Body of `POST /foreshadowing/{id}/hints`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddHint {
    pub chapter: DbId,
    pub text: String,
}

/// Body of `POST /foreshadowing/{id}/resolve`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveForeshadowing {
    pub chapter: DbId,
}
