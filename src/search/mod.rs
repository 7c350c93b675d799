//! Submissions search: response types and the pagination driver.

mod pager;
mod types;

pub use pager::{DEFAULT_PAGE_SIZE, SEARCH_PATH, SearchError, SearchPager, search_url};
pub use types::{ItemEnvelope, SearchPage, SearchResponse, Submission};
