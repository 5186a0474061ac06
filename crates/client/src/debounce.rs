//! Search input debouncing.
//!
//! The debouncer owns no timer. Callers report keystrokes and poll with the
//! current [`Instant`], so behaviour is deterministic under test.

use std::time::{Duration, Instant};

/// Quiet period after the last keystroke before a search is issued.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    committed: String,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            committed: String::new(),
        }
    }

    /// Record the current input value. Restarts the quiet period.
    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some((term.into(), now));
    }

    /// When the pending input becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Commit the pending input once the quiet period has elapsed.
    ///
    /// Returns the newly committed term, or `None` if nothing is due or the
    /// term equals the one already committed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if !due {
            return None;
        }
        let (term, _) = self.pending.take()?;
        if term == self.committed {
            return None;
        }
        self.committed = term.clone();
        Some(term)
    }

    /// The term searches are currently issued with.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Drop any pending input and reset the committed term.
    pub fn reset(&mut self) {
        self.pending = None;
        self.committed.clear();
    }
}
