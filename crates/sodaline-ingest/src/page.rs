//! Offset/limit pagination and size classification

use serde_json::Value;
use sodaline_core::FetchError;

use crate::client::CatalogApi;

/// One bounded fetch result from the row-page endpoint.
#[derive(Debug)]
pub struct Page {
    pub rows: Vec<Value>,
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    /// A page shorter than the limit (including empty) terminates pagination.
    pub fn is_last(&self) -> bool {
        self.rows.len() < self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lazy offset/limit pagination over a dataset's row endpoint.
///
/// Yields pages in strictly increasing offset order until the first short
/// page, which is the last. A dataset whose size is an exact multiple of the
/// limit costs one extra call returning an empty page: termination is only
/// ever confirmed by a short page, never inferred from declared row counts.
pub struct PageFetcher<'a> {
    api: &'a dyn CatalogApi,
    dataset_id: &'a str,
    limit: usize,
    offset: usize,
    done: bool,
}

impl<'a> PageFetcher<'a> {
    pub fn new(api: &'a dyn CatalogApi, dataset_id: &'a str, limit: usize) -> Self {
        Self::starting_at(api, dataset_id, limit, 0)
    }

    /// Resume pagination at a caller-chosen row offset.
    pub fn starting_at(
        api: &'a dyn CatalogApi,
        dataset_id: &'a str,
        limit: usize,
        offset: usize,
    ) -> Self {
        assert!(limit > 0, "page limit must be positive");
        Self {
            api,
            dataset_id,
            limit,
            offset,
            done: false,
        }
    }
}

impl Iterator for PageFetcher<'_> {
    type Item = Result<Page, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.api.get_page(self.dataset_id, self.limit, self.offset) {
            Ok(rows) => {
                let page = Page {
                    rows,
                    offset: self.offset,
                    limit: self.limit,
                };
                if page.is_last() {
                    self.done = true;
                }
                self.offset += self.limit;
                Some(Ok(page))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Routing decision made from the first page alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Fully contained in the first page; safe to hold in memory
    Small,
    /// First page came back completely full; the dataset may be arbitrarily
    /// bigger and must be streamed to disk page by page
    Large,
}

impl SizeClass {
    /// Classify from the first fetched page.
    ///
    /// A full first page routes to streaming even when the dataset's true
    /// size equals the limit exactly; that case costs one extra empty-page
    /// fetch to confirm completion.
    pub fn classify(first_page: &Page) -> Self {
        if first_page.rows.len() == first_page.limit {
            Self::Large
        } else {
            Self::Small
        }
    }
}
