//! Incremental result set
//!
//! Owns the accumulated window of one logical query. Every request carries
//! the generation that was current when it was issued; `start`, `reset` and
//! `dispose` advance the generation, so a response whose generation no
//! longer matches is dropped on arrival instead of being applied.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::state::{EngineState, Phase};
use crate::error::Result;
use crate::model::{Continuation, RequestDescriptor};
use crate::source::{Page, PageResponse, PageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    FirstPage,
    NextPage,
}

/// One issued request and the generation it belongs to.
#[derive(Debug)]
struct Ticket {
    generation: u64,
    request: RequestDescriptor,
    kind: FetchKind,
}

struct Inner {
    state: EngineState,
    generation: u64,
    descriptor: Option<RequestDescriptor>,
    continuation: Option<Continuation>,
    disposed: bool,
    tx: watch::Sender<EngineState>,
}

impl Inner {
    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }
}

/// Paginated window over a [`PageSource`] for one descriptor at a time.
///
/// Cloning is cheap and yields a handle to the same result set.
pub struct ResultSet<S> {
    source: Arc<S>,
    inner: Arc<Mutex<Inner>>,
}

impl<S> Clone for ResultSet<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PageSource + 'static> ResultSet<S> {
    /// Create an idle result set reading from `source`.
    pub fn new(source: Arc<S>) -> Self {
        let (tx, _) = watch::channel(EngineState::default());
        Self {
            source,
            inner: Arc::new(Mutex::new(Inner {
                state: EngineState::default(),
                generation: 0,
                descriptor: None,
                continuation: None,
                disposed: false,
                tx,
            })),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> EngineState {
        self.lock().state.clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.lock().tx.subscribe()
    }

    /// Descriptor of the current query, if any.
    pub fn descriptor(&self) -> Option<RequestDescriptor> {
        self.lock().descriptor.clone()
    }

    /// Current generation; bumped by `start`, `reset` and `dispose`.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Begin a new query and return the future fetching its first page.
    ///
    /// The phase switches to `Loading` immediately; any response still in
    /// flight for an earlier query becomes stale. The window keeps its
    /// previous items until the first page arrives and replaces them, but
    /// it cannot be continued until then: a failed first page leaves
    /// `has_more` false.
    pub fn start(&self, descriptor: RequestDescriptor) -> BoxFuture<'static, ()> {
        let ticket = {
            let mut inner = self.lock();
            if inner.disposed {
                None
            } else {
                inner.generation += 1;
                inner.continuation = None;
                inner.descriptor = Some(descriptor.clone());
                // Paging state belongs to the query being replaced
                inner.state.has_more = false;
                inner.state.total_count = 0;
                inner.state.error = None;
                inner.state.set_phase(Phase::Loading);
                inner.publish();

                debug!(
                    "Starting query generation {}: filter={:?}",
                    inner.generation, descriptor.filter
                );
                Some(Ticket {
                    generation: inner.generation,
                    request: descriptor,
                    kind: FetchKind::FirstPage,
                })
            }
        };

        match ticket {
            Some(ticket) => self.execute(ticket),
            None => Box::pin(async {}),
        }
    }

    /// Request the next page of the current query.
    ///
    /// Returns `None` without doing anything when a request is already in
    /// flight, the query is exhausted, or nothing has been started.
    pub fn load_more(&self) -> Option<BoxFuture<'static, ()>> {
        let ticket = {
            let mut inner = self.lock();
            if inner.disposed || inner.state.phase != Phase::Ready || !inner.state.has_more {
                return None;
            }
            let request = inner
                .descriptor
                .as_ref()?
                .continued(inner.continuation.clone());
            inner.state.set_phase(Phase::LoadingMore);
            inner.publish();

            debug!(
                "Loading more for generation {} from {:?}",
                inner.generation, request.continuation
            );
            Ticket {
                generation: inner.generation,
                request,
                kind: FetchKind::NextPage,
            }
        };

        Some(self.execute(ticket))
    }

    /// Drop the current query and its window.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if inner.disposed {
            return;
        }
        inner.generation += 1;
        inner.descriptor = None;
        inner.continuation = None;
        inner.state = EngineState::default();
        inner.publish();
    }

    /// Make every outstanding and future request a no-op.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        if !inner.disposed {
            inner.disposed = true;
            inner.generation += 1;
            debug!("Result set disposed at generation {}", inner.generation);
        }
    }

    fn execute(&self, ticket: Ticket) -> BoxFuture<'static, ()> {
        let this = self.clone();
        Box::pin(async move {
            let result = this.source.fetch(&ticket.request).await;
            this.apply(ticket, result);
        })
    }

    fn apply(&self, ticket: Ticket, result: Result<PageResponse>) {
        let mut inner = self.lock();
        if inner.disposed || inner.generation != ticket.generation {
            debug!(
                "Dropping stale {:?} response of generation {} (current {})",
                ticket.kind, ticket.generation, inner.generation
            );
            return;
        }

        match result {
            Ok(response) => {
                let page =
                    Page::from_response(response, ticket.request.direction, ticket.request.page_size);
                let received = page.items.len();
                let state = &mut inner.state;

                match ticket.kind {
                    FetchKind::FirstPage => {
                        state.items = Arc::new(page.items);
                        state.fetched_count = received;
                    }
                    FetchKind::NextPage => {
                        Arc::make_mut(&mut state.items).extend(page.items);
                        state.fetched_count += received;
                    }
                }
                state.total_count = page.total_count;
                state.has_more = page.has_more;
                state.error = None;
                state.set_phase(Phase::Ready);
                inner.continuation = page.next_continuation;

                debug!(
                    "Applied {} records (fetched {}, total {}, more: {})",
                    received, inner.state.fetched_count, inner.state.total_count, inner.state.has_more
                );
            }
            Err(e) => {
                warn!("Query failed, keeping {} records: {}", inner.state.items.len(), e);
                inner.state.error = Some(e.to_string());
                inner.state.set_phase(Phase::Ready);
            }
        }

        inner.publish();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
