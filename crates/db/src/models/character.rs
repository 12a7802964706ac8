//! Character entity model and DTOs.

use lorekeeper_core::bible::{CharacterArc, Facets, Motivation};
use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub name: String,
    pub role: Option<String>,
    pub appearance: Option<String>,
    pub voice_samples: Json<Vec<String>>,
    pub motivation: Option<Json<Motivation>>,
    pub conflict_type: Option<String>,
    pub template: Option<String>,
    pub facets: Option<Json<Facets>>,
    pub arc: Option<Json<CharacterArc>>,
    /// Chapter the character first appears in.
    pub first_appearance: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new character.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCharacter {
    pub name: String,
    pub role: Option<String>,
    pub appearance: Option<String>,
    pub voice_samples: Option<Vec<String>>,
    pub motivation: Option<Motivation>,
    pub conflict_type: Option<String>,
    pub template: Option<String>,
    pub facets: Option<Facets>,
    pub arc: Option<CharacterArc>,
    pub first_appearance: Option<DbId>,
}

/// DTO for updating an existing character. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub role: Option<String>,
    pub appearance: Option<String>,
    pub voice_samples: Option<Vec<String>>,
    pub motivation: Option<Motivation>,
    pub conflict_type: Option<String>,
    pub template: Option<String>,
    pub facets: Option<Facets>,
    pub arc: Option<CharacterArc>,
    pub first_appearance: Option<DbId>,
}
