//! Category entity model and DTOs.

use linkshelf_core::category_tree::CategoryNode;
use linkshelf_core::error::CoreError;
use linkshelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub parent_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl CategoryNode for Category {
    fn id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// DTO for creating a category. Fields are already validated.
#[derive(Debug)]
pub struct CreateCategory {
    pub owner_id: DbId,
    pub name: String,
    pub parent_id: Option<DbId>,
}

/// DTO for replacing a category's name and parent.
#[derive(Debug)]
pub struct UpdateCategory {
    pub name: String,
    pub parent_id: Option<DbId>,
}

/// Row counts removed by a cascading category delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedSubtree {
    pub categories: u64,
    pub bookmarks: u64,
}

/// Result of [`CategoryRepo::update`](crate::repositories::CategoryRepo::update).
#[derive(Debug)]
pub enum CategoryUpdate {
    Updated(Category),
    /// No category with that id belongs to the owner.
    NotFound,
    /// The new parent would break the hierarchy. Nothing was written.
    Rejected(CoreError),
}
