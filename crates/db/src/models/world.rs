//! World settings singleton.

use lorekeeper_core::bible::{PowerSystem, SocialRules};
use lorekeeper_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// The single row of the `world` table (`id = 1`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct World {
    #[serde(skip)]
    pub id: i64,
    pub power_system: Option<Json<PowerSystem>>,
    pub social_rules: Json<SocialRules>,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /world`. Omitted sections keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorld {
    pub power_system: Option<PowerSystem>,
    pub social_rules: Option<SocialRules>,
}
