//! Directed character relationship model and DTOs.

use lorekeeper_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `relationships` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Relationship {
    pub id: DbId,
    pub source_id: DbId,
    pub target_id: DbId,
    pub rel_type: String,
    pub join_reason: Option<String>,
    pub independent_goal: Option<String>,
    pub appeal: Option<String>,
    pub evolution: Option<String>,
    pub disagree_scenarios: Json<Vec<String>>,
    pub leave_scenarios: Json<Vec<String>>,
    pub mc_needs: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a relationship.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRelationship {
    pub source_id: DbId,
    pub target_id: DbId,
    pub rel_type: String,
    pub join_reason: Option<String>,
    pub independent_goal: Option<String>,
    pub appeal: Option<String>,
    pub evolution: Option<String>,
    pub disagree_scenarios: Option<Vec<String>>,
    pub leave_scenarios: Option<Vec<String>>,
    pub mc_needs: Option<String>,
}

/// DTO for updating a relationship. Endpoints are fixed once created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRelationship {
    pub rel_type: Option<String>,
    pub join_reason: Option<String>,
    pub independent_goal: Option<String>,
    pub appeal: Option<String>,
    pub evolution: Option<String>,
    pub disagree_scenarios: Option<Vec<String>>,
    pub leave_scenarios: Option<Vec<String>>,
    pub mc_needs: Option<String>,
}
