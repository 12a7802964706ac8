//! Service layer.
//!
//! Services validate input against the domain vocabulary, call the
//! repositories and publish a [`DomainEvent`](lorekeeper_events::DomainEvent)
//! after every successful mutation. Handlers stay thin: extract, call one
//! service method, wrap the result.

pub mod chapter_setup;
pub mod export;
pub mod intake;
pub mod seed;
pub mod story_bible;
pub mod writing;

use lorekeeper_core::error::CoreError;
use lorekeeper_core::types::DbId;
use lorekeeper_core::validation::parse_enum;
use lorekeeper_events::{DomainEvent, EventBus, EventType};

pub use chapter_setup::ChapterSetupService;
pub use export::ExportService;
pub use intake::IntakeService;
pub use story_bible::StoryBibleService;
pub use writing::WritingService;

/// Publish a mutation event for one entity.
pub(crate) fn publish(
    bus: &EventBus,
    event_type: EventType,
    entity: &str,
    id: DbId,
    payload: serde_json::Value,
) {
    bus.publish(
        DomainEvent::new(event_type)
            .with_entity(entity, id)
            .with_payload(payload),
    );
}

/// Validate an optional enum-like field against its vocabulary.
pub(crate) fn check_enum<T>(
    field: &str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<(), CoreError> {
    if let Some(value) = value {
        parse_enum(field, value, parse)?;
    }
    Ok(())
}

/// Reject a list of referenced ids that do not exist.
pub(crate) fn check_missing(field: &str, entity: &str, missing: &[DbId]) -> Result<(), CoreError> {
    if missing.is_empty() {
        return Ok(());
    }
    let ids = missing
        .iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(CoreError::Validation(format!(
        "{field}: unknown {entity} id(s) {ids}"
    )))
}

/// Reject a single referenced id that does not exist.
pub(crate) fn check_reference(
    field: &str,
    entity: &str,
    id: DbId,
    exists: bool,
) -> Result<(), CoreError> {
    if exists {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field}: {entity} {id} does not exist"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use lorekeeper_core::story::CharacterRole;

    use super::*;

    #[test]
    fn enum_check_allows_none_and_valid() {
        assert!(check_enum("role", None, CharacterRole::from_str_value).is_ok());
        assert!(check_enum("role", Some("main"), CharacterRole::from_str_value).is_ok());
    }

    #[test]
    fn enum_check_names_field() {
        let err = check_enum("role", Some("hero"), CharacterRole::from_str_value).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.starts_with("role:"));
    }

    #[test]
    fn missing_ids_are_listed() {
        assert!(check_missing("characters", "character", &[]).is_ok());
        let err = check_missing("characters", "character", &[4, 9]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("4, 9"));
    }
}
