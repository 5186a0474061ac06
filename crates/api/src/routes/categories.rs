//! Route definitions for the `/categories` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`. All require auth.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /tree      -> tree
/// GET    /options   -> options
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route("/tree", get(categories::tree))
        .route("/options", get(categories::options))
        .route("/{id}", put(categories::update).delete(categories::delete))
}
