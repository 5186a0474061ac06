//! Bookmark field validation and search-term handling.

use crate::error::CoreError;

/// Maximum allowed length for a bookmark URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum allowed length for a bookmark title.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Validated, trimmed bookmark fields ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkFields {
    pub url: String,
    pub title: String,
    pub notes: Option<String>,
}

/// Validate the user-supplied bookmark fields.
///
/// `url` and `title` are mandatory and must be non-blank. Blank notes are
/// stored as `NULL`.
pub fn validate_bookmark_fields(
    url: &str,
    title: &str,
    notes: Option<&str>,
) -> Result<BookmarkFields, CoreError> {
    let url = url.trim();
    let title = title.trim();

    if url.is_empty() || title.is_empty() {
        return Err(CoreError::Validation(
            "URL and title are required".to_string(),
        ));
    }
    if url.chars().count() > MAX_URL_LENGTH {
        return Err(CoreError::Validation(format!(
            "URL must not exceed {MAX_URL_LENGTH} characters"
        )));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must not exceed {MAX_TITLE_LENGTH} characters"
        )));
    }

    let notes = notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(BookmarkFields {
        url: url.to_string(),
        title: title.to_string(),
        notes,
    })
}

/// Build an `ILIKE` pattern matching `term` anywhere in a title.
///
/// Returns `None` for a blank term (no filtering). `%`, `_` and the escape
/// character `\` are escaped so they match literally.
pub fn title_search_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
