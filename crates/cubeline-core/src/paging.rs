//! Client-driven paging over an OData collection.
//!
//! The fetcher asks for the total count on the first request and then steps
//! `$skip` by the page size itself. Server-driven paging (`@odata.nextLink`)
//! is deliberately ignored: services have been seen to drop entities while
//! following their own continuation links.

use crate::error::FetchError;
use crate::odata::CollectionQuery;
use crate::session::Transport;

/// Page size small enough that services don't apply their own paging
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// What a page handler reports back about the page it processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Total collection size; only read from the first page
    pub count: Option<u64>,
    /// Server-suggested continuation; never followed
    pub next_link: Option<String>,
}

/// Outcome of a completed paged fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub pages: usize,
    pub total: u64,
}

/// Retrieves a whole collection one page at a time.
pub struct PagedFetcher<T> {
    transport: T,
    page_size: u64,
}

impl<T: Transport> PagedFetcher<T> {
    pub fn new(transport: T, page_size: u64) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Fetch every page of `query`, handing each body to `handler` in order.
    ///
    /// Stops after the first page if the collection is empty, otherwise as
    /// soon as the accumulated offset reaches the reported total. A failed
    /// request or handler aborts the whole fetch.
    pub fn fetch<F, E>(&self, query: &CollectionQuery, mut handler: F) -> Result<FetchSummary, E>
    where
        F: FnMut(&str) -> Result<PageInfo, E>,
        E: From<FetchError>,
    {
        let collection = query.path();
        let mut target = query.page(0, self.page_size, true);
        let mut total: Option<u64> = None;
        let mut skip = 0u64;
        let mut pages = 0usize;

        loop {
            pages += 1;
            let operation = format!("fetch {collection} (page {pages})");
            let body = self.transport.get(&target, None, &operation)?;
            let info = handler(&body)?;

            if let Some(link) = &info.next_link {
                log::debug!("{collection}: ignoring server continuation {link}");
            }

            let total = match total {
                Some(total) => total,
                None => {
                    let count = info
                        .count
                        .ok_or(FetchError::MissingCount { operation })?;
                    log::debug!("{collection}: {count} items, page size {}", self.page_size);
                    total = Some(count);
                    count
                }
            };

            skip += self.page_size;
            if skip >= total {
                return Ok(FetchSummary { pages, total });
            }
            target = query.page(skip, self.page_size, false);
        }
    }
}
