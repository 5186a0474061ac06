//! Route definitions for the `/bookmarks` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::bookmarks;
use crate::state::AppState;

/// Routes mounted at `/bookmarks`. All require auth.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bookmarks::list).post(bookmarks::create))
        .route(
            "/{id}",
            get(bookmarks::get_by_id)
                .put(bookmarks::update)
                .delete(bookmarks::delete),
        )
}
