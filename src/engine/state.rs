use std::sync::Arc;

use crate::model::Record;

/// Lifecycle phase of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested, or reset.
    #[default]
    Idle,

    /// First page in flight.
    Loading,

    /// Last request settled (successfully or not).
    Ready,

    /// A follow-up page is in flight.
    LoadingMore,
}

impl Phase {
    pub fn is_loading(self) -> bool {
        matches!(self, Phase::Loading | Phase::LoadingMore)
    }
}

/// Observable state of one lookup.
///
/// `items` is a shared snapshot. Appending a page copies the vector when a
/// host still holds an older snapshot, so observers never see it change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    /// Current lifecycle phase
    pub phase: Phase,

    /// True while any request of the current query is in flight
    pub loading: bool,

    /// Materialized window, in request order
    pub items: Arc<Vec<Record>>,

    /// Number of records fetched for the current query
    pub fetched_count: usize,

    /// Total number of matching records reported by the source
    pub total_count: u64,

    /// Whether another page can be loaded
    pub has_more: bool,

    /// Message of the last failed request, cleared by the next success
    pub error: Option<String>,
}

impl EngineState {
    /// The materialized window.
    pub fn window(&self) -> &[Record] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.loading = phase.is_loading();
    }
}
