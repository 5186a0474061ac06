//! Row models and DTOs, one module per table.

pub mod bookmark;
pub mod category;
pub mod user;
