//! Category field validation.

use crate::error::CoreError;

/// Maximum allowed length for a category name (matches the column width).
pub const MAX_CATEGORY_NAME_LENGTH: usize = 255;

/// Validate and normalize a category name.
///
/// Leading and trailing whitespace is dropped; the remainder must be
/// non-empty and within [`MAX_CATEGORY_NAME_LENGTH`] characters.
pub fn normalize_category_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Category name is required".to_string(),
        ));
    }
    let len = trimmed.chars().count();
    if len > MAX_CATEGORY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Category name must not exceed {MAX_CATEGORY_NAME_LENGTH} characters, got {len}"
        )));
    }
    Ok(trimmed.to_string())
}
