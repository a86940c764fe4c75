//! Paged access to the Northwind service

use anyhow::{Context, Result};
use cubeline_core::{CollectionQuery, FetchSummary, Page, PageProgress, PagedFetcher, Transport};
use indicatif::ProgressBar;
use serde::de::DeserializeOwned;

/// Northwind OData source.
///
/// Collections are always fetched with client-driven paging; the page size
/// bounds how many records are decoded at once.
pub struct Northwind<T> {
    transport: T,
    page_size: u64,
}

impl<T: Transport> Northwind<T> {
    pub fn new(transport: T, page_size: u64) -> Self {
        Self {
            transport,
            page_size,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Page through `query`, handing every decoded batch to `batch` in order.
    pub(crate) fn for_each_page<R, F>(
        &self,
        query: &CollectionQuery,
        pb: &ProgressBar,
        mut batch: F,
    ) -> Result<FetchSummary>
    where
        R: DeserializeOwned,
        F: FnMut(Vec<R>) -> Result<()>,
    {
        let fetcher = PagedFetcher::new(&self.transport, self.page_size);
        let mut progress = PageProgress::new(pb);
        let operation = format!("decode {} page", query.path());
        fetcher.fetch::<_, anyhow::Error>(query, |body| {
            let page: Page<R> = Page::decode(body, &operation)?;
            let info = page.info();
            progress.page(page.value.len(), &info);
            batch(page.value)?;
            Ok(info)
        })
    }

    /// First entity of `query`, without paging
    pub(crate) fn first<R: DeserializeOwned>(
        &self,
        query: &CollectionQuery,
        operation: &str,
    ) -> Result<Option<R>> {
        let body = self.transport.get(&query.target(), None, operation)?;
        let page: Page<R> = Page::decode(&body, operation)?;
        Ok(page.value.into_iter().next())
    }

    /// First entity of `query`, failing if the collection is empty
    pub(crate) fn require_first<R: DeserializeOwned>(
        &self,
        query: &CollectionQuery,
        operation: &str,
    ) -> Result<R> {
        self.first(query, operation)?
            .with_context(|| format!("{operation}: collection is empty"))
    }
}
