//! Offset-based pagination over the submissions search endpoint.

use futures_util::stream::{self, Stream, TryStreamExt};
use log::{debug, info};

use super::types::{SearchPage, SearchResponse};
use crate::http::{Request, Transport};
use crate::query::{QueryError, QueryRunner, UNAUTHORIZED_MESSAGE};

/// Path of the search endpoint, relative to the API base URL.
pub const SEARCH_PATH: &str = "/api/v2/search/submissions";

/// Page size used when the caller doesn't pick one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Builds the search endpoint URL from a base such as `https://host`.
pub fn search_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), SEARCH_PATH)
}

#[derive(Debug)]
pub enum SearchError {
    /// The API key was rejected.
    Unauthorized,
    /// A page could not be fetched even after retries.
    PageFailed { offset: u64, source: QueryError },
    /// A page was valid JSON but not a search result.
    MalformedPage {
        offset: u64,
        source: serde_json::Error,
    },
    /// The next offset would not fit in a `u64`.
    OffsetOverflow { offset: u64, items_per_page: u64 },
}

impl SearchError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SearchError::Unauthorized)
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Unauthorized => f.write_str(UNAUTHORIZED_MESSAGE),
            SearchError::PageFailed { offset, .. } => {
                write!(f, "Paginated fetch failed at offset {}", offset)
            }
            SearchError::MalformedPage { offset, .. } => {
                write!(f, "Malformed search page at offset {}", offset)
            }
            SearchError::OffsetOverflow {
                offset,
                items_per_page,
            } => write!(
                f,
                "Page size {} at offset {} overflows the result offset",
                items_per_page, offset
            ),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Unauthorized | SearchError::OffsetOverflow { .. } => None,
            SearchError::PageFailed { source, .. } => Some(source),
            SearchError::MalformedPage { source, .. } => Some(source),
        }
    }
}

/// Walks the result pages of one search term.
///
/// The offset starts at 0 and grows by `items_per_page` after every page.
/// Iteration ends after the first page whose `current_item_count` differs
/// from `items_per_page`, or after the first failure.
pub struct SearchPager<'a, T: Transport> {
    runner: &'a QueryRunner<T>,
    url: String,
    query: String,
    limit: u64,
    offset: u64,
    pages: usize,
    done: bool,
}

impl<'a, T: Transport> SearchPager<'a, T> {
    pub fn new(
        runner: &'a QueryRunner<T>,
        base_url: &str,
        query: impl Into<String>,
        limit: u64,
    ) -> Self {
        Self {
            runner,
            url: search_url(base_url),
            query: query.into(),
            limit,
            offset: 0,
            pages: 0,
            done: false,
        }
    }

    /// Fetches the next page, or `None` once pagination has finished.
    #[tracing::instrument(skip(self), fields(offset = self.offset))]
    pub async fn next_page(&mut self) -> Result<Option<SearchPage>, SearchError> {
        if self.done {
            return Ok(None);
        }

        let offset = self.offset;
        let request = Request::get(&self.url)
            .param("q", &self.query)
            .param("offset", offset)
            .param("limit", self.limit);

        let page = match self.runner.query_api(request).await {
            Ok(output) => serde_json::from_value::<SearchResponse>(output.payload)
                .map(|response| response.data)
                .map_err(|source| SearchError::MalformedPage { offset, source }),
            Err(QueryError::Unauthorized) => Err(SearchError::Unauthorized),
            Err(source) => Err(SearchError::PageFailed { offset, source }),
        };

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        self.offset = match offset.checked_add(page.items_per_page) {
            Some(next) => next,
            None => {
                self.done = true;
                return Err(SearchError::OffsetOverflow {
                    offset,
                    items_per_page: page.items_per_page,
                });
            }
        };
        self.pages += 1;

        debug!(
            "Page {} at offset {}: {} of {} items",
            self.pages, offset, page.current_item_count, page.items_per_page
        );

        // A zero page size would never advance the cursor.
        if page.is_last() || page.items_per_page == 0 {
            info!(
                "Pagination finished after {} pages at offset {}",
                self.pages, self.offset
            );
            self.done = true;
        }

        Ok(Some(page))
    }

    /// Lazily yields the `sample` of every item on every page, fetching pages
    /// on demand.
    pub fn into_samples(self) -> impl Stream<Item = Result<String, SearchError>> + 'a {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Ok::<_, SearchError>(page.map(|page| (page, pager)))
        })
        .map_ok(|page| {
            stream::iter(page.into_samples().into_iter().map(Ok::<String, SearchError>))
        })
        .try_flatten()
    }
}
