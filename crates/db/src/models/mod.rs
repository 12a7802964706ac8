//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` struct matching the table row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for partial updates
//!
//! Enum-like columns are plain strings here; the service layer validates
//! them against `lorekeeper_core::story` before they reach a repository.
//! JSON columns are stored as TEXT and mapped through `sqlx::types::Json`.

pub mod arc;
pub mod chapter;
pub mod character;
pub mod faction;
pub mod foreshadowing;
pub mod hook;
pub mod location;
pub mod relationship;
pub mod timeline;
pub mod volume;
pub mod world;

use lorekeeper_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Id and display name of any named entity, for pickers and name
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct EntityName {
    pub id: DbId,
    pub name: String,
}
