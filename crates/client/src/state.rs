//! Client application state.
//!
//! [`AppState`] is split into a [`SessionState`] (who is logged in), a
//! [`Dataset`] (the last accepted server snapshot) and a [`UiState`]
//! (filters, modal, transient messages). Each part is plain data and can be
//! tested on its own.

use linkshelf_core::category_tree::{build_forest, flatten_with_depth, FlatEntry, TreeNode};
use linkshelf_core::types::DbId;

use crate::models::{Bookmark, Category, UserInfo};
use crate::prefs::LocalPrefs;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<UserInfo>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Bookmarks and categories as last returned by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub bookmarks: Vec<Bookmark>,
    pub categories: Vec<Category>,
}

impl Dataset {
    /// Nested view for the sidebar.
    pub fn category_tree(&self) -> Vec<TreeNode<Category>> {
        build_forest(&self.categories)
    }

    /// Indented flat view for category selectors.
    pub fn category_options(&self) -> Vec<FlatEntry<Category>> {
        flatten_with_depth(&self.categories)
    }

    pub fn category(&self, id: DbId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Names from the root down to `id`, e.g. `["Dev", "Frontend"]`.
    ///
    /// Empty for an unknown id. Stops at a dangling parent or a repeated id.
    pub fn category_path(&self, id: DbId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut seen = Vec::new();
        let mut current = self.category(id);
        while let Some(category) = current {
            if seen.contains(&category.id) {
                break;
            }
            seen.push(category.id);
            path.push(category.name.as_str());
            current = category.parent_id.and_then(|pid| self.category(pid));
        }
        path.reverse();
        path
    }
}

/// What a confirm-delete dialog is about to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Bookmark { id: DbId, title: String },
    Category { id: DbId, name: String },
}

impl DeleteTarget {
    /// Confirmation text shown to the user.
    pub fn prompt(&self) -> String {
        match self {
            DeleteTarget::Bookmark { title, .. } => {
                format!("Delete \"{title}\"? This cannot be undone.")
            }
            DeleteTarget::Category { name, .. } => format!(
                "Delete \"{name}\"? All of its subcategories and the bookmarks \
                 filed under them are deleted too. This cannot be undone."
            ),
        }
    }
}

/// The modal currently open, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    None,
    BookmarkForm {
        /// `Some` when editing an existing bookmark.
        editing: Option<DbId>,
        preselected_category_id: Option<DbId>,
    },
    CategoryForm {
        editing: Option<DbId>,
        parent_id: Option<DbId>,
    },
    ConfirmDelete(DeleteTarget),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Raw search box contents (not yet debounced).
    pub search_term: String,
    pub active_category_id: Option<DbId>,
    pub modal: Modal,
    pub loading: bool,
    pub sidebar_collapsed: bool,
    /// Inline error shown inside the open form.
    pub form_error: Option<String>,
    /// Blocking alert, used for failed deletes.
    pub alert: Option<String>,
}

/// Identifies one data fetch; later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: SessionState,
    pub dataset: Dataset,
    pub ui: UiState,
    pub prefs: LocalPrefs,
    latest_fetch: u64,
}

impl AppState {
    pub fn new(prefs: LocalPrefs) -> Self {
        let session = SessionState {
            token: prefs.token.clone(),
            user: None,
        };
        Self {
            session,
            prefs,
            ..Default::default()
        }
    }

    /// Issue a ticket for a new fetch and mark the state as loading.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_fetch += 1;
        self.ui.loading = true;
        FetchTicket(self.latest_fetch)
    }

    /// Whether `ticket` belongs to the most recently issued fetch.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest_fetch
    }

    /// Install a fetched snapshot unless a newer fetch has been issued since.
    ///
    /// Returns whether the snapshot was applied.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, dataset: Dataset) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, latest = self.latest_fetch, "Discarding stale fetch");
            return false;
        }
        self.dataset = dataset;
        self.ui.loading = false;
        true
    }

    /// Forget the session and everything fetched under it.
    ///
    /// Bumps the fetch generation so in-flight responses are dropped.
    pub fn clear_session(&mut self) {
        self.latest_fetch += 1;
        self.session = SessionState::default();
        self.dataset = Dataset::default();
        self.ui = UiState {
            sidebar_collapsed: self.ui.sidebar_collapsed,
            ..UiState::default()
        };
        self.prefs.token = None;
    }
}
