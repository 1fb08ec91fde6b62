//! Lookup controller
//!
//! The engine-facing half of a lookup control. A host forwards its input
//! events here (text changes, focus, keys, row clicks) and renders from
//! [`LookupController::state`] and [`LookupController::is_open`].
//!
//! ```text
//!   Closed ──(window non-empty, focused or has text)──> Open
//!   Open ──(dismiss | accepted selection | successful blur)──> Closed
//! ```
//!
//! A fetch in flight never closes the list.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::{EngineConfig, LookupConfig};
use crate::engine::{EngineState, QueryScheduler};
use crate::model::Record;
use crate::reconcile::{self, SelectionCandidate};
use crate::source::PageSource;

/// Visibility of the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Closed,
    Open,
}

/// Drives one lookup control.
pub struct LookupController<S: PageSource + 'static> {
    config: LookupConfig,
    engine: EngineConfig,
    scheduler: QueryScheduler<S>,
    updates: watch::Receiver<EngineState>,
    text: String,
    focused: bool,
    list: ListState,
    dismissed: bool,
    highlighted: Option<usize>,
}

impl<S: PageSource + 'static> LookupController<S> {
    /// Create a controller for the lookup described by `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(source: Arc<S>, config: LookupConfig, engine: &EngineConfig) -> Self {
        if let Some(reason) = config.diagnose() {
            warn!("Lookup on '{}' is degenerate: {}", config.table, reason);
        }

        let scheduler = QueryScheduler::from_config(source, engine);
        let updates = scheduler.subscribe();

        Self {
            config,
            engine: engine.clone(),
            scheduler,
            updates,
            text: String::new(),
            focused: false,
            list: ListState::Closed,
            dismissed: false,
            highlighted: None,
        }
    }

    /* ========================= Input events ========================= */

    /// The input gained focus.
    pub fn on_focus(&mut self) {
        self.focused = true;
        self.refresh();
    }

    /// The user edited the text.
    ///
    /// Empty text drops the current query; anything else schedules a new
    /// descriptor, which the scheduler ignores if nothing changed.
    pub fn on_text_change(&mut self, text: &str) {
        self.text = text.to_string();
        self.dismissed = false;
        self.highlighted = None;

        if text.trim().is_empty() {
            self.scheduler.clear();
            return;
        }

        let descriptor = self.config.descriptor(text, &self.engine);
        self.scheduler.on_descriptor_change(descriptor);
    }

    /// The host wants the next page (scrolled to the end, "more" button).
    pub fn on_request_more(&self) -> bool {
        self.scheduler.request_more()
    }

    /// Enter was pressed, or the value is otherwise being committed.
    ///
    /// With the list open and a row highlighted, that row wins. Otherwise
    /// the text is reconciled against the current window, which may lag
    /// behind the latest keystroke.
    pub fn on_commit(&mut self, raw_text: &str) -> Option<SelectionCandidate> {
        let candidate = match self.highlighted_record() {
            Some(record) if self.is_open() => Some(SelectionCandidate::picked(
                record,
                self.config.primary_field().unwrap_or_default(),
            )),
            _ => self.reconcile(raw_text),
        };

        if let Some(candidate) = &candidate {
            debug!("Committed selection with key '{}'", candidate.key);
            self.close();
        }
        candidate
    }

    /// The input lost focus. Closes the list only if a selection resolves.
    pub fn on_blur(&mut self, raw_text: &str) -> Option<SelectionCandidate> {
        self.focused = false;
        self.on_commit(raw_text)
    }

    /// A row was clicked or otherwise picked directly.
    pub fn on_row_pick(&mut self, record: Record) -> SelectionCandidate {
        let candidate =
            SelectionCandidate::picked(record, self.config.primary_field().unwrap_or_default());
        self.close();
        candidate
    }

    /// Escape or Tab: close without selecting.
    pub fn on_dismiss(&mut self) {
        self.dismissed = true;
        self.close();
    }

    /// Move the highlight down, opening the list if needed.
    ///
    /// Reaching the last loaded row asks for the next page.
    pub fn highlight_next(&mut self) -> Option<usize> {
        let len = self.updates.borrow().items.len();
        if len == 0 {
            return None;
        }
        let next = match self.highlighted {
            Some(index) => (index + 1).min(len - 1),
            None => 0,
        };
        self.open_for_navigation(next);

        if next + 1 == len {
            self.scheduler.request_more();
        }
        self.highlighted
    }

    /// Move the highlight up, opening the list if needed.
    pub fn highlight_previous(&mut self) -> Option<usize> {
        let len = self.updates.borrow().items.len();
        if len == 0 {
            return None;
        }
        let previous = match self.highlighted {
            Some(index) => index.saturating_sub(1),
            None => len - 1,
        };
        self.open_for_navigation(previous);
        self.highlighted
    }

    /* ========================= Engine updates ========================= */

    /// Re-evaluate visibility and highlight against the latest state.
    pub fn refresh(&mut self) {
        let len = self.updates.borrow_and_update().items.len();

        if self.highlighted.is_some_and(|index| index >= len) {
            self.highlighted = None;
        }

        let wanted = self.focused || !self.text.trim().is_empty();
        if self.list == ListState::Closed && !self.dismissed && wanted && len > 0 {
            self.list = ListState::Open;
        }
    }

    /// Wait for the next engine state change, then refresh.
    ///
    /// # Returns
    /// * `bool` - False once the engine is gone
    pub async fn changed(&mut self) -> bool {
        if self.updates.changed().await.is_err() {
            return false;
        }
        self.refresh();
        true
    }

    /* ========================= Queries ========================= */

    /// Snapshot of the engine state.
    pub fn state(&self) -> EngineState {
        self.scheduler.state()
    }

    /// Reconcile `text` against the current window.
    pub fn reconcile(&self, text: &str) -> Option<SelectionCandidate> {
        let display = self.config.display_field()?;
        let key = self.config.primary_field().unwrap_or(display);
        let state = self.updates.borrow();
        reconcile::reconcile_with(text, state.window(), display, key)
    }

    pub fn is_open(&self) -> bool {
        self.list == ListState::Open
    }

    pub fn list_state(&self) -> ListState {
        self.list
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// The highlighted record, if any.
    pub fn highlighted_record(&self) -> Option<Record> {
        let index = self.highlighted?;
        self.updates.borrow().items.get(index).cloned()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Tear down the engine; later events are ignored.
    pub fn dispose(&mut self) {
        self.scheduler.dispose();
        self.close();
    }

    fn open_for_navigation(&mut self, index: usize) {
        self.dismissed = false;
        self.list = ListState::Open;
        self.highlighted = Some(index);
    }

    fn close(&mut self) {
        self.list = ListState::Closed;
        self.highlighted = None;
    }
}
