//! Repository for the `bookmarks` table.

use linkshelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::bookmark::{Bookmark, BookmarkFilter, CreateBookmark, UpdateBookmark};

/// Column list for bookmarks queries.
const COLUMNS: &str = "id, owner_id, url, title, notes, category_id, created_at";

/// Provides owner-scoped CRUD operations for bookmarks.
pub struct BookmarkRepo;

impl BookmarkRepo {
    /// List an owner's bookmarks, most recently created first.
    ///
    /// `filter.category_id` matches exactly (subcategories are not included);
    /// `filter.title_pattern` is matched case-insensitively against the title.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        filter: &BookmarkFilter,
    ) -> Result<Vec<Bookmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookmarks
             WHERE owner_id = $1
               AND ($2::BIGINT IS NULL OR category_id = $2)
               AND ($3::TEXT IS NULL OR title ILIKE $3 ESCAPE '\\')
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(owner_id)
            .bind(filter.category_id)
            .bind(&filter.title_pattern)
            .fetch_all(pool)
            .await
    }

    /// Find one of the owner's bookmarks by ID.
    pub async fn find_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Bookmark>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookmarks WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new bookmark, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBookmark) -> Result<Bookmark, sqlx::Error> {
        let query = format!(
            "INSERT INTO bookmarks (owner_id, url, title, notes, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(input.owner_id)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.notes)
            .bind(input.category_id)
            .fetch_one(pool)
            .await
    }

    /// Replace a bookmark's editable fields.
    ///
    /// Returns `None` if no bookmark with `id` belongs to `owner_id`.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        input: &UpdateBookmark,
    ) -> Result<Option<Bookmark>, sqlx::Error> {
        let query = format!(
            "UPDATE bookmarks SET
                url = $3,
                title = $4,
                notes = $5,
                category_id = $6
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.notes)
            .bind(input.category_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete one of the owner's bookmarks. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, owner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
