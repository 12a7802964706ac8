//! Field-level validation helpers shared by the service layer.
//!
//! Every function returns [`CoreError::Validation`] with a message naming the
//! offending field, so the API can surface it verbatim.

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length for short name-like fields.
pub const MAX_NAME_LENGTH: usize = 200;

/// Reject empty or whitespace-only strings.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Like [`require_non_empty`] but for inputs that arrive as `Option`.
pub fn require_present(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_non_empty(field, v),
        None => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

/// Validate a name: non-empty and at most [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    require_non_empty(field, value)?;
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH}"
        )));
    }
    Ok(())
}

/// Validate an optional name; `None` passes.
pub fn validate_optional_name(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) => validate_name(field, v),
        None => Ok(()),
    }
}

/// Validate a 0..=100 percentage-style value.
pub fn validate_percentage(field: &str, value: i64) -> Result<(), CoreError> {
    if !(0..=100).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate a chapter range. Open-ended ranges always pass.
pub fn validate_chapter_range(start: Option<DbId>, end: Option<DbId>) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(CoreError::Validation(format!(
                "chapter_start ({start}) must not be after chapter_end ({end})"
            )));
        }
    }
    Ok(())
}

/// A relationship must connect two distinct characters.
pub fn validate_no_self_reference(source_id: DbId, target_id: DbId) -> Result<(), CoreError> {
    if source_id == target_id {
        return Err(CoreError::Validation(
            "A character cannot have a relationship with itself".to_string(),
        ));
    }
    Ok(())
}

/// Parse a string-backed enum value, mapping the parse error to a
/// field-named validation error.
pub fn parse_enum<T>(
    field: &str,
    value: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, CoreError> {
    parse(value).map_err(|e| CoreError::Validation(format!("{field}: {e}")))
}
