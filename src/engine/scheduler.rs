//! Query scheduler
//!
//! Sits between the host's descriptor stream and the [`ResultSet`]:
//!
//! 1. Identical descriptors are ignored.
//! 2. A burst of distinct descriptors is debounced; only the last one of the
//!    burst is committed, after the quiescence window elapses.
//! 3. Committing resets the result set and spawns the first-page request.
//!
//! The scheduler owns exactly one timer handle and one request handle and
//! replaces them on every commit. Must be used from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::result_set::ResultSet;
use super::state::EngineState;
use crate::config::EngineConfig;
use crate::model::RequestDescriptor;
use crate::source::PageSource;

/// Quiescence window used when none is configured.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(100);

struct Pending {
    seq: u64,
    descriptor: RequestDescriptor,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Slots {
    last_applied: Option<RequestDescriptor>,
    pending: Option<Pending>,
    request: Option<JoinHandle<()>>,
    next_seq: u64,
}

struct Shared<S> {
    result_set: ResultSet<S>,
    quiescence: Duration,
    cancel: CancellationToken,
    slots: Mutex<Slots>,
}

impl<S: PageSource + 'static> Shared<S> {
    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called by the timer task once the quiescence window elapsed.
    fn commit(&self, seq: u64, descriptor: RequestDescriptor) {
        let mut slots = self.slots();
        if self.cancel.is_cancelled() {
            return;
        }
        // A newer descriptor replaced this timer after it fired.
        if slots.pending.as_ref().map(|p| p.seq) != Some(seq) {
            return;
        }
        slots.pending = None;

        if let Some(previous) = slots.request.take() {
            previous.abort();
        }

        info!(
            "Committing query: filter={:?} page_size={}",
            descriptor.filter, descriptor.page_size
        );
        slots.last_applied = Some(descriptor.clone());
        self.result_set.reset();
        slots.request = Some(tokio::spawn(self.result_set.start(descriptor)));
    }
}

/// Debouncing front of a [`ResultSet`].
///
/// Dropping the scheduler disposes it.
pub struct QueryScheduler<S: PageSource + 'static> {
    shared: Arc<Shared<S>>,
}

impl<S: PageSource + 'static> QueryScheduler<S> {
    /// Create a scheduler over `source` with the given quiescence window.
    pub fn new(source: Arc<S>, quiescence: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                result_set: ResultSet::new(source),
                quiescence,
                cancel: CancellationToken::new(),
                slots: Mutex::new(Slots::default()),
            }),
        }
    }

    /// Create a scheduler using the engine configuration.
    pub fn from_config(source: Arc<S>, config: &EngineConfig) -> Self {
        Self::new(source, config.quiescence())
    }

    /// Schedule `descriptor` as the next query.
    ///
    /// # Returns
    /// * `bool` - True if a new debounce timer was armed
    pub fn on_descriptor_change(&self, descriptor: RequestDescriptor) -> bool {
        if self.shared.cancel.is_cancelled() {
            return false;
        }

        let mut slots = self.shared.slots();

        if slots
            .pending
            .as_ref()
            .is_some_and(|pending| pending.descriptor == descriptor)
        {
            debug!("Descriptor already pending, keeping timer");
            return false;
        }

        if let Some(pending) = slots.pending.take() {
            pending.timer.abort();
        }

        if slots.last_applied.as_ref() == Some(&descriptor) {
            debug!("Descriptor unchanged, skipping refetch");
            return false;
        }

        slots.next_seq += 1;
        let seq = slots.next_seq;
        let shared = Arc::clone(&self.shared);
        let armed = descriptor.clone();
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = shared.cancel.cancelled() => {}
                _ = tokio::time::sleep(shared.quiescence) => shared.commit(seq, armed),
            }
        });

        debug!("Armed debounce timer {} for filter={:?}", seq, descriptor.filter);
        slots.pending = Some(Pending {
            seq,
            descriptor,
            timer,
        });
        true
    }

    /// Load the next page of the applied query.
    ///
    /// # Returns
    /// * `bool` - True if a request was issued
    pub fn request_more(&self) -> bool {
        if self.shared.cancel.is_cancelled() {
            return false;
        }

        let mut slots = self.shared.slots();
        match self.shared.result_set.load_more() {
            Some(fetch) => {
                slots.request = Some(tokio::spawn(fetch));
                true
            }
            None => false,
        }
    }

    /// Cancel anything pending and empty the window.
    pub fn clear(&self) {
        if self.shared.cancel.is_cancelled() {
            return;
        }

        let mut slots = self.shared.slots();
        if let Some(pending) = slots.pending.take() {
            pending.timer.abort();
        }
        if let Some(request) = slots.request.take() {
            request.abort();
        }
        slots.last_applied = None;
        self.shared.result_set.reset();
        debug!("Scheduler cleared");
    }

    /// Tear down: no timer fires and no response applies afterwards.
    pub fn dispose(&self) {
        self.shared.cancel.cancel();

        let mut slots = self.shared.slots();
        if let Some(pending) = slots.pending.take() {
            pending.timer.abort();
        }
        if let Some(request) = slots.request.take() {
            request.abort();
        }
        self.shared.result_set.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Snapshot of the engine state.
    pub fn state(&self) -> EngineState {
        self.shared.result_set.state()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.shared.result_set.subscribe()
    }

    /// Descriptor of the last committed query.
    pub fn last_applied(&self) -> Option<RequestDescriptor> {
        self.shared.slots().last_applied.clone()
    }

    /// Descriptor waiting for the quiescence window, if any.
    pub fn pending(&self) -> Option<RequestDescriptor> {
        self.shared
            .slots()
            .pending
            .as_ref()
            .map(|pending| pending.descriptor.clone())
    }

    pub fn quiescence(&self) -> Duration {
        self.shared.quiescence
    }

    /// The underlying result set.
    pub fn result_set(&self) -> &ResultSet<S> {
        &self.shared.result_set
    }
}

impl<S: PageSource + 'static> Drop for QueryScheduler<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
