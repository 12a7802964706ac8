//! Location entity model and DTOs.

use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: DbId,
    pub name: String,
    pub location_type: Option<String>,
    pub significance: Option<String>,
    pub atmosphere: Option<String>,
    /// Ids of connected locations.
    pub connections: Json<Vec<DbId>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLocation {
    pub name: String,
    pub location_type: Option<String>,
    pub significance: Option<String>,
    pub atmosphere: Option<String>,
    pub connections: Option<Vec<DbId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLocation {
    pub name: Option<String>,
    pub location_type: Option<String>,
    pub significance: Option<String>,
    pub atmosphere: Option<String>,
    pub connections: Option<Vec<DbId>>,
}
