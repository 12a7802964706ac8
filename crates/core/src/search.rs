//! Search and pagination helpers.
//!
//! Story-bible search is a plain `LIKE` match on name-like columns; these
//! helpers build safe patterns and clamp paging input.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per list page.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Maximum number of rows per list page.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Escape character used in every `LIKE ... ESCAPE` clause.
pub const LIKE_ESCAPE: char = '\\';

// ---------------------------------------------------------------------------
// Query builder helpers
// ---------------------------------------------------------------------------

/// Build a substring `LIKE` pattern from user input.
///
/// `%`, `_` and the escape character are escaped so user input is matched
/// literally. Blank input returns `None`.
///
/// # Examples
///
/// ```
/// use lorekeeper_core::search::like_pattern;
/// assert_eq!(like_pattern("lin"), Some("%lin%".to_string()));
/// assert_eq!(like_pattern("50%"), Some("%50\\%%".to_string()));
/// assert_eq!(like_pattern("  "), None);
/// ```
pub fn like_pattern(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- like_pattern --------------------------------------------------------

    #[test]
    fn like_pattern_wraps_term() {
        assert_eq!(like_pattern("elder"), Some("%elder%".to_string()));
    }

    #[test]
    fn like_pattern_trims_input() {
        assert_eq!(like_pattern("  elder "), Some("%elder%".to_string()));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a_b"), Some("%a\\_b%".to_string()));
        assert_eq!(like_pattern("a\\b"), Some("%a\\\\b%".to_string()));
    }

    #[test]
    fn like_pattern_blank_returns_none() {
        assert_eq!(like_pattern(""), None);
        assert_eq!(like_pattern("\t"), None);
    }

    // -- clamp_limit ---------------------------------------------------------

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn clamp_limit_respects_max() {
        assert_eq!(clamp_limit(Some(200), 20, 100), 100);
    }

    #[test]
    fn clamp_limit_floors_at_one() {
        assert_eq!(clamp_limit(Some(-5), 20, 100), 1);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
    }

    // -- clamp_offset --------------------------------------------------------

    #[test]
    fn clamp_offset_defaults_to_zero() {
        assert_eq!(clamp_offset(None), 0);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(Some(-10)), 0);
    }
}
