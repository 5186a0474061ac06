//! Wire types exchanged with the REST API (camelCase JSON).

use linkshelf_core::category_tree::CategoryNode;
use linkshelf_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Deserialize)]
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

/// Body for creating or replacing a bookmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkInput {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub category_id: Option<DbId>,
}

/// Body for creating or replacing a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub parent_id: Option<DbId>,
}

/// Filter for `GET /api/bookmarks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkQuery {
    pub search: String,
    pub category_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: DbId,
}

/// Identity behind the current token (`GET /api/auth/me`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Me {
    pub id: DbId,
    pub username: String,
}
