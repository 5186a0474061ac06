//! Headless Linkshelf client.
//!
//! - [`api::ApiClient`] -- typed wrapper over the REST API.
//! - [`state::AppState`] -- session, dataset and UI-transient state.
//! - [`controller::Controller`] -- drives the state from user intents.
//! - [`debounce::SearchDebouncer`] and [`prefs::LocalPrefs`] -- input pacing
//!   and locally persisted preferences.

pub mod api;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod models;
pub mod prefs;
pub mod state;
