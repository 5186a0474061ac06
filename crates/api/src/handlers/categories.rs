//! Handlers for the `/categories` resource.
//!
//! Rows are stored flat; the tree and option views are computed per request
//! from the owner's full category list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use linkshelf_core::category::normalize_category_name;
use linkshelf_core::category_tree::{
    build_forest, check_not_self_parent, flatten_with_depth, validate_parent, FlatEntry, TreeNode,
};
use linkshelf_core::error::CoreError;
use linkshelf_core::types::DbId;
use linkshelf_db::models::category::{Category, CategoryUpdate, CreateCategory, UpdateCategory};
use linkshelf_db::repositories::CategoryRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for creating or replacing a category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

/// GET /api/categories
///
/// Flat list ordered by name.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(categories))
}

/// GET /api/categories/tree
pub async fn tree(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TreeNode<Category>>>> {
    let categories = CategoryRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(build_forest(&categories)))
}

/// GET /api/categories/options
///
/// Pre-order list with depth and indented label, for flat selectors.
pub async fn options(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FlatEntry<Category>>>> {
    let categories = CategoryRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(flatten_with_depth(&categories)))
}

/// POST /api/categories
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = normalize_category_name(&input.name)?;

    if input.parent_id.is_some() {
        let categories = CategoryRepo::list_for_owner(&state.pool, auth.user_id).await?;
        validate_parent(&categories, input.parent_id)?;
    }

    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            owner_id: auth.user_id,
            name,
            parent_id: input.parent_id,
        },
    )
    .await?;

    tracing::debug!(user_id = auth.user_id, category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
///
/// Full replacement of name and parent. Moving a category under itself or
/// one of its own descendants is rejected, also when two moves race.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CategoryRequest>,
) -> AppResult<Json<Category>> {
    let name = normalize_category_name(&input.name)?;
    check_not_self_parent(id, input.parent_id)?;

    let outcome = CategoryRepo::update(
        &state.pool,
        auth.user_id,
        id,
        &UpdateCategory {
            name,
            parent_id: input.parent_id,
        },
    )
    .await?;

    let category = match outcome {
        CategoryUpdate::Updated(category) => category,
        CategoryUpdate::NotFound => return Err(not_found(id)),
        CategoryUpdate::Rejected(e) => return Err(AppError::Core(e)),
    };

    Ok(Json(category))
}

/// DELETE /api/categories/{id}
///
/// Removes the category, every descendant, and every bookmark filed under
/// any of them, in one transaction.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CategoryRepo::delete_subtree(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        user_id = auth.user_id,
        category_id = id,
        categories = deleted.categories,
        bookmarks = deleted.bookmarks,
        "Category subtree deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}
