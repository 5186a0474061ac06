//! Repository for the `categories` table.

use linkshelf_core::category_tree::{collect_subtree, validate_reparent};
use linkshelf_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::category::{
    Category, CategoryUpdate, CreateCategory, DeletedSubtree, UpdateCategory,
};

/// Column list for categories queries.
const COLUMNS: &str = "id, owner_id, name, parent_id, created_at";

/// Provides owner-scoped CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List all of an owner's categories, ordered by name ascending.
    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE owner_id = $1
             ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find one of the owner's categories by ID.
    pub async fn find_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (owner_id, name, parent_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_one(pool)
            .await
    }

    /// Replace a category's name and parent, in one transaction.
    ///
    /// The owner's categories stay locked from the cycle check until the
    /// write commits.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<CategoryUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let owned = lock_owned(&mut tx, owner_id).await?;

        if !owned.iter().any(|c| c.id == id) {
            return Ok(CategoryUpdate::NotFound);
        }
        if let Err(e) = validate_reparent(&owned, id, input.parent_id) {
            return Ok(CategoryUpdate::Rejected(e));
        }

        let query = format!(
            "UPDATE categories SET
                name = $3,
                parent_id = $4
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CategoryUpdate::Updated(category))
    }

    /// Delete a category, all of its descendants, and every bookmark filed
    /// anywhere in that subtree, in one transaction.
    ///
    /// The owner's categories are locked and read first so the subtree is
    /// fully known before anything is removed. Returns `None` (and changes
    /// nothing) if no category with `id` belongs to `owner_id`.
    pub async fn delete_subtree(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<DeletedSubtree>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let owned = lock_owned(&mut tx, owner_id).await?;

        let Some(ids) = collect_subtree(&owned, id) else {
            return Ok(None);
        };

        let bookmarks = sqlx::query(
            "DELETE FROM bookmarks WHERE owner_id = $1 AND category_id = ANY($2)",
        )
        .bind(owner_id)
        .bind(ids.as_slice())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let categories = sqlx::query("DELETE FROM categories WHERE owner_id = $1 AND id = ANY($2)")
            .bind(owner_id)
            .bind(ids.as_slice())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!(owner_id, category_id = id, categories, bookmarks, "Deleted category subtree");
        Ok(Some(DeletedSubtree {
            categories,
            bookmarks,
        }))
    }
}

/// Lock and read every category the owner has. Rows are locked in id order.
async fn lock_owned(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: DbId,
) -> Result<Vec<Category>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM categories WHERE owner_id = $1 ORDER BY id FOR UPDATE"
    );
    sqlx::query_as::<_, Category>(&query)
        .bind(owner_id)
        .fetch_all(&mut **tx)
        .await
}
