//! Paginated keyword search shared by every site crawler.
//!
//! The pipeline for one keyword, leaf first:
//!
//! 1. [`PageFetcher`] / [`PageParser`]: site-specific collaborators that turn
//!    `(keyword, page)` into raw content and raw content into records
//! 2. [`paginated_search`]: walks pages `1..=max_query_page` lazily, with a
//!    cooldown between pages and a hard page cap
//! 3. [`filter_window`]: keeps the records inside the [`SearchWindow`] that
//!    mention the keyword, and ends the walk once records fall behind the
//!    window start
//! 4. [`KeywordAggregator`]: runs the above for each keyword in turn and tags
//!    the results
//!
//! Every stage reports what it does to an injected [`SearchObserver`].
//!
//! # Ordering assumption
//!
//! The early-stop rule is only correct if a site lists results newest first.
//! That is not verified up front. The filter reports any record newer than
//! its predecessor as [`SearchEvent::OrderViolation`], and
//! [`StopPolicy::Exhaustive`] turns the early stop off at the cost of always
//! walking to the page cap.
//!
//! [`SearchWindow`]: crate::models::SearchWindow

mod aggregate;
mod events;
mod filter;
mod paginated;
#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::KeywordAggregator;
pub use events::{SearchEvent, SearchObserver, SkipReason, TracingObserver};
pub use filter::{StopPolicy, TimeWindowFilter, Verdict, filter_window};
pub use paginated::paginated_search;

use crate::error::Result;
use crate::models::ArticleRecord;

/// Returns the raw content of one search result page.
///
/// Implementations own the site's URL scheme. Transport failures and
/// non-success responses surface as fetch errors.
pub trait PageFetcher {
    async fn fetch(&self, keyword: &str, page: u32) -> Result<Vec<u8>>;
}

/// Extracts article records from one search result page.
///
/// Records must come back in the order the site displays them. A page whose
/// markup lacks the expected structure is a parse error; a page with the
/// structure but no hits is an empty `Vec`.
pub trait PageParser {
    async fn parse(&self, raw: &[u8], keyword: &str) -> Result<Vec<ArticleRecord>>;
}
