//! In-memory page source serving canned results per filter.
//!
//! This source does not evaluate filters. Each filter string is mapped to a
//! prepared record list, which makes it suitable for tests, demos and
//! replaying captured server answers.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{PageInfo, PageResponse, PageSource};
use crate::error::{Result, SourceError};
use crate::model::{Continuation, Direction, Record, RequestDescriptor};

#[derive(Debug, Clone, Default)]
struct Dataset {
    records: Vec<Record>,
    latency: Duration,
    failure: Option<SourceError>,
}

/// Page source answering from prepared record lists.
#[derive(Debug, Default)]
pub struct MemorySource {
    datasets: Mutex<HashMap<Option<String>, Dataset>>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl MemorySource {
    /// Create an empty source. Unknown filters answer with an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the records returned for `filter` (`None` = match-all).
    pub fn with_records(self, filter: Option<&str>, records: Vec<Record>) -> Self {
        self.insert(filter, records);
        self
    }

    /// Register the records returned for `filter`, replacing earlier ones.
    pub fn insert(&self, filter: Option<&str>, records: Vec<Record>) {
        self.dataset(filter, |dataset| dataset.records = records);
    }

    /// Delay every answer for `filter` by `latency`.
    pub fn set_latency(&self, filter: Option<&str>, latency: Duration) {
        self.dataset(filter, |dataset| dataset.latency = latency);
    }

    /// Make every request for `filter` fail with `error`.
    pub fn set_failure(&self, filter: Option<&str>, error: SourceError) {
        self.dataset(filter, |dataset| dataset.failure = Some(error));
    }

    /// Stop failing requests for `filter`.
    pub fn clear_failure(&self, filter: Option<&str>) {
        self.dataset(filter, |dataset| dataset.failure = None);
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn dataset(&self, filter: Option<&str>, update: impl FnOnce(&mut Dataset)) {
        let mut datasets = self.datasets.lock().unwrap_or_else(PoisonError::into_inner);
        update(datasets.entry(filter.map(str::to_string)).or_default());
    }
}

#[async_trait]
impl PageSource for MemorySource {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<PageResponse> {
        debug!(
            "Memory source request: filter={:?} continuation={:?}",
            request.filter, request.continuation
        );
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let dataset = self
            .datasets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.filter)
            .cloned()
            .unwrap_or_default();

        if !dataset.latency.is_zero() {
            tokio::time::sleep(dataset.latency).await;
        }

        if let Some(error) = dataset.failure {
            return Err(error.into());
        }

        paginate(&dataset.records, request)
    }
}

/// Slice `records` according to the request's cursor and direction.
fn paginate(records: &[Record], request: &RequestDescriptor) -> Result<PageResponse> {
    let total = records.len();
    let page_size = request.page_size.max(1) as usize;

    let anchor = match &request.continuation {
        None => None,
        Some(Continuation::Offset(offset)) => Some(*offset as usize),
        Some(Continuation::Cursor(cursor)) => Some(cursor.parse::<usize>().map_err(|_| {
            SourceError::RequestFailed(format!("Unknown continuation cursor: {cursor}"))
        })?),
    };

    let (start, end) = match request.direction {
        Direction::Forward => {
            let start = anchor.unwrap_or(0).min(total);
            (start, (start + page_size).min(total))
        }
        Direction::Backward => {
            let end = anchor.unwrap_or(total).min(total);
            (end.saturating_sub(page_size), end)
        }
    };

    Ok(PageResponse {
        items: records[start..end].to_vec(),
        total_count: total as u64,
        page_info: PageInfo {
            has_next_page: end < total,
            has_previous_page: start > 0,
            start_cursor: Some(Continuation::Offset(start as u64)),
            end_cursor: Some(Continuation::Offset(end as u64)),
        },
    })
}
