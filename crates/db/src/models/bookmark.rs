//! Bookmark entity model and DTOs.

use linkshelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `bookmarks` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: DbId,
    pub owner_id: DbId,
    pub url: String,
    pub title: String,
    pub notes: Option<String>,
    pub category_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for creating a bookmark. Fields are already validated.
#[derive(Debug)]
pub struct CreateBookmark {
    pub owner_id: DbId,
    pub url: String,
    pub title: String,
    pub notes: Option<String>,
    pub category_id: Option<DbId>,
}

/// DTO for replacing a bookmark's editable fields.
#[derive(Debug)]
pub struct UpdateBookmark {
    pub url: String,
    pub title: String,
    pub notes: Option<String>,
    pub category_id: Option<DbId>,
}

/// Optional list filters. `title_pattern` is an `ILIKE` pattern.
#[derive(Debug, Default)]
pub struct BookmarkFilter {
    pub title_pattern: Option<String>,
    pub category_id: Option<DbId>,
}
