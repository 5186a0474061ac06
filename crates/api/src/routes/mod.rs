pub mod auth;
pub mod bookmarks;
pub mod categories;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth         register, login, me
/// /bookmarks    list (search, categoryId), CRUD
/// /categories   list, tree, options, CRUD (cascading delete)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/bookmarks", bookmarks::router())
        .nest("/categories", categories::router())
}
