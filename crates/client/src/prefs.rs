//! Client-local preferences persisted as a JSON file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const MIN_SIDEBAR_WIDTH: u32 = 200;
pub const MAX_SIDEBAR_WIDTH: u32 = 500;
pub const DEFAULT_SIDEBAR_WIDTH: u32 = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalPrefs {
    pub sidebar_width: u32,
    pub theme: Theme,
    pub token: Option<String>,
}

impl Default for LocalPrefs {
    fn default() -> Self {
        Self {
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            theme: Theme::default(),
            token: None,
        }
    }
}

impl LocalPrefs {
    /// Load preferences from `path`.
    ///
    /// A missing file yields the defaults. A corrupt file is logged and
    /// replaced by the defaults rather than locking the user out.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Self>(&raw) {
            Ok(mut prefs) => {
                prefs.sidebar_width = clamp_sidebar_width(prefs.sidebar_width);
                Ok(prefs)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                Ok(Self::default())
            }
        }
    }

    /// Write preferences to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn set_sidebar_width(&mut self, width: u32) {
        self.sidebar_width = clamp_sidebar_width(width);
    }
}

pub fn clamp_sidebar_width(width: u32) -> u32 {
    width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH)
}
