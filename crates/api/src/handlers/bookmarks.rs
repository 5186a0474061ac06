//! Handlers for the `/bookmarks` resource.
//!
//! Every query is scoped to the authenticated user; a bookmark owned by
//! someone else is indistinguishable from one that does not exist.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use linkshelf_core::bookmark::{title_search_pattern, validate_bookmark_fields};
use linkshelf_core::error::CoreError;
use linkshelf_core::types::DbId;
use linkshelf_db::models::bookmark::{Bookmark, BookmarkFilter, CreateBookmark, UpdateBookmark};
use linkshelf_db::repositories::{BookmarkRepo, CategoryRepo};
use linkshelf_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::BookmarkListParams;
use crate::state::AppState;

/// Request body for creating or replacing a bookmark.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub category_id: Option<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Bookmark",
        id,
    })
}

/// A bookmark may only be filed under one of its owner's categories.
async fn ensure_category_owned(
    pool: &DbPool,
    owner_id: DbId,
    category_id: Option<DbId>,
) -> AppResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    if CategoryRepo::find_for_owner(pool, owner_id, category_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Category {category_id} not found"
        ))));
    }
    Ok(())
}

/// GET /api/bookmarks?search=&categoryId=
///
/// Newest first. `search` matches titles case-insensitively; `categoryId`
/// is an exact match (subcategories are not included).
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BookmarkListParams>,
) -> AppResult<Json<Vec<Bookmark>>> {
    let filter = BookmarkFilter {
        title_pattern: params.search.as_deref().and_then(title_search_pattern),
        category_id: params.category_id,
    };
    let bookmarks = BookmarkRepo::list_for_owner(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(bookmarks))
}

/// GET /api/bookmarks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Bookmark>> {
    let bookmark = BookmarkRepo::find_for_owner(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(bookmark))
}

/// POST /api/bookmarks
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BookmarkRequest>,
) -> AppResult<(StatusCode, Json<Bookmark>)> {
    let fields = validate_bookmark_fields(&input.url, &input.title, input.notes.as_deref())?;
    ensure_category_owned(&state.pool, auth.user_id, input.category_id).await?;

    let bookmark = BookmarkRepo::create(
        &state.pool,
        &CreateBookmark {
            owner_id: auth.user_id,
            url: fields.url,
            title: fields.title,
            notes: fields.notes,
            category_id: input.category_id,
        },
    )
    .await?;

    tracing::debug!(user_id = auth.user_id, bookmark_id = bookmark.id, "Bookmark created");
    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// PUT /api/bookmarks/{id}
///
/// Full replacement: an omitted `categoryId` or `notes` clears the field.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<BookmarkRequest>,
) -> AppResult<Json<Bookmark>> {
    let fields = validate_bookmark_fields(&input.url, &input.title, input.notes.as_deref())?;
    ensure_category_owned(&state.pool, auth.user_id, input.category_id).await?;

    let bookmark = BookmarkRepo::update(
        &state.pool,
        auth.user_id,
        id,
        &UpdateBookmark {
            url: fields.url,
            title: fields.title,
            notes: fields.notes,
            category_id: input.category_id,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(bookmark))
}

/// DELETE /api/bookmarks/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !BookmarkRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    tracing::debug!(user_id = auth.user_id, bookmark_id = id, "Bookmark deleted");
    Ok(StatusCode::NO_CONTENT)
}
