//! Query parameter types shared by handlers.

use lorekeeper_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?q=&limit=&offset=` for listable, searchable entities.
///
/// Values are clamped in the service layer via `clamp_limit` /
/// `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?status=` filter for foreshadowing.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

/// `?chapter_id=` filter for hooks.
#[derive(Debug, Default, Deserialize)]
pub struct ChapterFilterParams {
    pub chapter_id: Option<DbId>,
}

/// `?volume_id=` filter for chapters.
#[derive(Debug, Default, Deserialize)]
pub struct VolumeFilterParams {
    pub volume_id: Option<DbId>,
}

/// `GET /export/chapters?format=&volume_id=&ids=1,2`
#[derive(Debug, Default, Deserialize)]
pub struct ExportChaptersParams {
    pub format: Option<String>,
    pub volume_id: Option<DbId>,
    /// Comma-separated chapter ids.
    pub ids: Option<String>,
}

/// `GET /export/bible?format=`
#[derive(Debug, Default, Deserialize)]
pub struct ExportBibleParams {
    pub format: Option<String>,
}

/// Parse a comma-separated id list such as `"1, 2,3"`. Empty segments are
/// ignored.
pub fn parse_id_list(raw: &str) -> AppResult<Vec<DbId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id '{s}' in ids")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn id_list_parses_and_skips_blanks() {
        assert_eq!(parse_id_list("3, 1,,2 ").unwrap(), vec![3, 1, 2]);
        assert!(parse_id_list("").unwrap().is_empty());
    }

    #[test]
    fn id_list_rejects_garbage() {
        assert_matches!(parse_id_list("1,two"), Err(AppError::BadRequest(_)));
    }
}
