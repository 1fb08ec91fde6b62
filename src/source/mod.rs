//! Remote paginated query protocol
//!
//! The engine is agnostic to transport. A source only has to answer one
//! [`RequestDescriptor`] with one [`PageResponse`]; correlation and
//! cancellation are handled by the engine's generation gate.

mod memory;

pub use memory::MemorySource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::model::{Continuation, Direction, Record, RequestDescriptor};

/// A remote data source answering paginated, filtered queries.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page described by `request`.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<PageResponse>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for std::sync::Arc<S> {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<PageResponse> {
        (**self).fetch(request).await
    }
}

/// Cursor information returned alongside a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<Continuation>,
    pub end_cursor: Option<Continuation>,
}

/// Raw answer of a [`PageSource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub items: Vec<Record>,
    pub total_count: u64,
    pub page_info: PageInfo,
}

/// One page as seen by the result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records of this page, at most `page_size` of them
    pub items: Vec<Record>,

    /// Total number of records matching the filter
    pub total_count: u64,

    /// Whether another page exists in the requested direction
    pub has_more: bool,

    /// Cursor for the next page in the requested direction
    pub next_continuation: Option<Continuation>,
}

impl Page {
    /// Interpret a response for a request in `direction`.
    ///
    /// Items beyond `page_size` are dropped so a single page can never grow
    /// the window by more than one page worth of records.
    pub fn from_response(response: PageResponse, direction: Direction, page_size: u32) -> Self {
        let PageResponse {
            mut items,
            total_count,
            page_info,
        } = response;

        let limit = page_size as usize;
        if items.len() > limit {
            warn!(
                "Source returned {} items for a page of {}, truncating",
                items.len(),
                limit
            );
            items.truncate(limit);
        }

        let (has_more, next_continuation) = match direction {
            Direction::Forward => (page_info.has_next_page, page_info.end_cursor),
            Direction::Backward => (page_info.has_previous_page, page_info.start_cursor),
        };

        Self {
            items,
            total_count,
            // A page without a cursor cannot be continued.
            has_more: has_more && next_continuation.is_some(),
            next_continuation,
        }
    }
}
