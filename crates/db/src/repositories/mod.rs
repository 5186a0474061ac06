//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Category and bookmark methods also take the
//! owner id and match on it in every statement: a row that belongs to another
//! user behaves exactly like a missing row.

pub mod bookmark_repo;
pub mod category_repo;
pub mod user_repo;

pub use bookmark_repo::BookmarkRepo;
pub use category_repo::CategoryRepo;
pub use user_repo::UserRepo;
