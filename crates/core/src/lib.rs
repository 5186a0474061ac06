//! Domain layer for Linkshelf.
//!
//! Pure logic with no I/O: shared id/timestamp types, the [`error::CoreError`]
//! taxonomy, field validation for bookmarks and categories, and the
//! [`category_tree`] engine that turns a flat owner-scoped category list into
//! a nested forest or an indented flat list.

pub mod bookmark;
pub mod category;
pub mod category_tree;
pub mod error;
pub mod types;
