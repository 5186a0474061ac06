//! Query parameter types for API handlers.

use std::fmt;
use std::str::FromStr;

use linkshelf_core::types::DbId;
use serde::{de, Deserialize, Deserializer};

/// Query parameters for `GET /bookmarks` (`?search=&categoryId=`).
///
/// An empty value (`?categoryId=`) is the same as leaving the parameter out.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkListParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<DbId>,
}

fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}
