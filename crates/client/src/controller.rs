//! User-intent driver over [`AppState`].
//!
//! Every successful mutation is followed by a full reload of bookmarks and
//! categories. A reload that fails after login is treated as a lost session:
//! the token is dropped from state and from the preferences file.

use std::path::PathBuf;
use std::time::Instant;

use linkshelf_core::types::DbId;

use crate::api::ApiClient;
use crate::debounce::SearchDebouncer;
use crate::error::ClientError;
use crate::models::{BookmarkInput, BookmarkQuery, CategoryInput};
use crate::prefs::LocalPrefs;
use crate::state::{AppState, Dataset, DeleteTarget, FetchTicket, Modal};

pub struct Controller {
    api: ApiClient,
    state: AppState,
    debouncer: SearchDebouncer,
    prefs_path: PathBuf,
}

/// A reload that has been issued but not yet applied.
///
/// Holds its own copy of the API client, so several can be in flight while
/// the controller keeps handling input.
pub struct PendingRefresh {
    ticket: FetchTicket,
    api: ApiClient,
    query: BookmarkQuery,
}

/// Outcome of a [`PendingRefresh`], handed back to [`Controller::finish_refresh`].
pub struct RefreshResult {
    ticket: FetchTicket,
    outcome: Result<Dataset, ClientError>,
}

impl PendingRefresh {
    pub async fn run(self) -> RefreshResult {
        let outcome = tokio::try_join!(
            self.api.list_bookmarks(&self.query),
            self.api.list_categories(),
        )
        .map(|(bookmarks, categories)| Dataset {
            bookmarks,
            categories,
        });
        RefreshResult {
            ticket: self.ticket,
            outcome,
        }
    }
}

impl Controller {
    /// Build a controller for `base_url`, restoring preferences (and any
    /// saved token) from `prefs_path`.
    pub fn new(
        base_url: impl Into<String>,
        prefs_path: impl Into<PathBuf>,
    ) -> Result<Self, ClientError> {
        let prefs_path = prefs_path.into();
        let prefs = LocalPrefs::load(&prefs_path)?;
        let mut api = ApiClient::new(base_url);
        api.set_token(prefs.token.clone());

        Ok(Self {
            api,
            state: AppState::new(prefs),
            debouncer: SearchDebouncer::default(),
            prefs_path,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ---- session ----

    /// Register a new account. Does not log in.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<DbId, ClientError> {
        let response = self.api.register(username, email, password).await?;
        Ok(response.user_id)
    }

    /// Log in, persist the token, and load the user's data.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let response = self.api.login(email, password).await?;

        self.api.set_token(Some(response.token.clone()));
        self.state.session.token = Some(response.token.clone());
        self.state.session.user = Some(response.user);
        self.state.prefs.token = Some(response.token);
        self.save_prefs();

        self.refresh().await
    }

    /// Discard the token locally. The server keeps no session to revoke.
    pub fn logout(&mut self) {
        self.api.set_token(None);
        self.state.clear_session();
        self.debouncer.reset();
        self.save_prefs();
    }

    // ---- data ----

    /// Issue a reload with the current filters.
    pub fn prepare_refresh(&mut self) -> Result<PendingRefresh, ClientError> {
        if !self.state.session.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        let ticket = self.state.begin_fetch();
        Ok(PendingRefresh {
            ticket,
            api: self.api.clone(),
            query: BookmarkQuery {
                search: self.debouncer.committed().to_string(),
                category_id: self.state.ui.active_category_id,
            },
        })
    }

    /// Apply a finished reload.
    ///
    /// Stale results are dropped, failures included. A failure of the
    /// current reload logs the user out.
    pub fn finish_refresh(&mut self, result: RefreshResult) -> Result<bool, ClientError> {
        match result.outcome {
            Ok(dataset) => Ok(self.state.apply_fetch(result.ticket, dataset)),
            Err(e) if !self.state.is_current(result.ticket) => {
                tracing::debug!(error = %e, "Ignoring failure of superseded refresh");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Data refresh failed, logging out");
                self.logout();
                Err(e)
            }
        }
    }

    /// Reload bookmarks and categories and wait for the result.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let pending = self.prepare_refresh()?;
        let result = pending.run().await;
        self.finish_refresh(result).map(|_| ())
    }

    /// Record a keystroke in the search box.
    pub fn type_search(&mut self, term: &str, now: Instant) {
        self.state.ui.search_term = term.to_string();
        self.debouncer.input(term, now);
    }

    /// When the next debounced search falls due, if one is pending.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Run the debounced search if its quiet period has elapsed.
    ///
    /// Returns whether a reload was performed.
    pub async fn tick(&mut self, now: Instant) -> Result<bool, ClientError> {
        if self.debouncer.poll(now).is_none() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Filter by `category_id` (exact match), or clear the filter with `None`.
    pub async fn select_category(&mut self, category_id: Option<DbId>) -> Result<(), ClientError> {
        self.state.ui.active_category_id = category_id;
        self.refresh().await
    }

    // ---- modals ----

    /// Open the bookmark form, preselecting the active category.
    pub fn open_new_bookmark(&mut self) {
        self.open(Modal::BookmarkForm {
            editing: None,
            preselected_category_id: self.state.ui.active_category_id,
        });
    }

    pub fn open_edit_bookmark(&mut self, id: DbId) {
        let category_id = self
            .state
            .dataset
            .bookmarks
            .iter()
            .find(|b| b.id == id)
            .and_then(|b| b.category_id);
        self.open(Modal::BookmarkForm {
            editing: Some(id),
            preselected_category_id: category_id,
        });
    }

    /// Open the category form; `parent_id` is set when adding a subcategory.
    pub fn open_new_category(&mut self, parent_id: Option<DbId>) {
        self.open(Modal::CategoryForm {
            editing: None,
            parent_id,
        });
    }

    pub fn open_edit_category(&mut self, id: DbId) {
        let parent_id = self.state.dataset.category(id).and_then(|c| c.parent_id);
        self.open(Modal::CategoryForm {
            editing: Some(id),
            parent_id,
        });
    }

    pub fn open_confirm_delete(&mut self, target: DeleteTarget) {
        self.open(Modal::ConfirmDelete(target));
    }

    pub fn close_modal(&mut self) {
        self.state.ui.modal = Modal::None;
        self.state.ui.form_error = None;
    }

    pub fn dismiss_alert(&mut self) {
        self.state.ui.alert = None;
    }

    /// Submit the open bookmark form.
    ///
    /// On failure the form stays open with the server's message inline.
    pub async fn save_bookmark(&mut self, input: BookmarkInput) -> Result<(), ClientError> {
        let Modal::BookmarkForm { editing, .. } = self.state.ui.modal else {
            return Ok(());
        };
        let result = match editing {
            Some(id) => self.api.update_bookmark(id, &input).await.map(|_| ()),
            None => self.api.create_bookmark(&input).await.map(|_| ()),
        };
        self.after_save(result).await
    }

    /// Submit the open category form.
    pub async fn save_category(&mut self, input: CategoryInput) -> Result<(), ClientError> {
        let Modal::CategoryForm { editing, .. } = self.state.ui.modal else {
            return Ok(());
        };
        let result = match editing {
            Some(id) => self.api.update_category(id, &input).await.map(|_| ()),
            None => self.api.create_category(&input).await.map(|_| ()),
        };
        self.after_save(result).await
    }

    /// Carry out the open confirm-delete dialog.
    ///
    /// A failed delete closes the dialog and raises a blocking alert.
    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let Modal::ConfirmDelete(target) = self.state.ui.modal.clone() else {
            return Ok(());
        };
        let result = match &target {
            DeleteTarget::Bookmark { id, .. } => self.api.delete_bookmark(*id).await,
            DeleteTarget::Category { id, .. } => self.api.delete_category(*id).await,
        };
        self.close_modal();

        if let Err(e) = result {
            self.state.ui.alert = Some(format!("Delete failed: {e}"));
            return Err(e);
        }
        if let DeleteTarget::Category { id, .. } = target {
            if self.state.ui.active_category_id == Some(id) {
                self.state.ui.active_category_id = None;
            }
        }
        self.refresh().await
    }

    // ---- preferences ----

    pub fn toggle_theme(&mut self) {
        self.state.prefs.theme = self.state.prefs.theme.toggled();
        self.save_prefs();
    }

    /// Resize the sidebar; the width is clamped and persisted.
    pub fn set_sidebar_width(&mut self, width: u32) {
        self.state.prefs.set_sidebar_width(width);
        self.state.ui.sidebar_collapsed = false;
        self.save_prefs();
    }

    /// Collapse or reopen the sidebar at its saved width.
    pub fn toggle_sidebar(&mut self) {
        self.state.ui.sidebar_collapsed = !self.state.ui.sidebar_collapsed;
    }

    // ---- private helpers ----

    fn open(&mut self, modal: Modal) {
        self.state.ui.modal = modal;
        self.state.ui.form_error = None;
    }

    async fn after_save(&mut self, result: Result<(), ClientError>) -> Result<(), ClientError> {
        if let Err(e) = result {
            self.state.ui.form_error = Some(e.to_string());
            return Err(e);
        }
        self.close_modal();
        self.refresh().await
    }

    /// Preferences are best effort; a write failure is logged, not surfaced.
    fn save_prefs(&self) {
        if let Err(e) = self.state.prefs.save(&self.prefs_path) {
            tracing::warn!(path = %self.prefs_path.display(), error = %e, "Failed to save preferences");
        }
    }
}
