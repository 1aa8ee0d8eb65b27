use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use chrono::NaiveDateTime;
use std::fmt;
use tracing::{debug, info, warn};

/// Why the filter dropped a record without ending the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Published after the window end.
    AfterWindow,
    /// Published before the window start (inside the grace period, or any
    /// time under [`StopPolicy::Exhaustive`](super::StopPolicy::Exhaustive)).
    BeforeWindow,
    /// Title does not contain the keyword and global search is off.
    KeywordMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::AfterWindow => "published after window end",
            SkipReason::BeforeWindow => "published before window start",
            SkipReason::KeywordMissing => "keyword not in title",
        })
    }
}

/// Something that happened while searching one keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    PageFetched {
        keyword: String,
        page: u32,
        records: usize,
    },
    /// Page walk ended early on a page without records.
    EmptyPage { keyword: String, page: u32 },
    /// Every page up to the cap was consumed; results may be truncated.
    PageCapReached {
        keyword: String,
        max_query_page: u32,
    },
    Skipped {
        keyword: String,
        record: ArticleRecord,
        reason: SkipReason,
    },
    Emitted {
        keyword: String,
        record: ArticleRecord,
    },
    /// The record is older than `threshold` (window start minus grace
    /// period), so the search for this keyword ended.
    Stopped {
        keyword: String,
        record: ArticleRecord,
        threshold: NaiveDateTime,
    },
    /// The record is newer than the one before it.
    OrderViolation {
        keyword: String,
        previous: NaiveDateTime,
        record: ArticleRecord,
    },
    KeywordCompleted { keyword: String, results: usize },
}

/// Sink for [`SearchEvent`]s, passed into each search component.
pub trait SearchObserver {
    fn notify(&self, event: SearchEvent);
}

/// Production sink: turns events into `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn notify(&self, event: SearchEvent) {
        match event {
            SearchEvent::PageFetched {
                keyword,
                page,
                records,
            } => debug!(%keyword, page, records, "Parsed search page"),
            SearchEvent::EmptyPage { keyword, page } => {
                info!(%keyword, page, "Stop search, page has no results")
            }
            SearchEvent::PageCapReached {
                keyword,
                max_query_page,
            } => warn!(
                %keyword,
                max_query_page,
                "Exceeded max query page; results may be truncated"
            ),
            SearchEvent::Skipped {
                keyword,
                record,
                reason,
            } => debug!(
                %keyword,
                title = %truncate_for_log(&record.title, 80),
                published_at = %record.published_at,
                %reason,
                "Skip data"
            ),
            SearchEvent::Emitted { keyword, record } => info!(
                %keyword,
                title = %record.title,
                link = %record.link,
                published_at = %record.published_at,
                "Get data"
            ),
            SearchEvent::Stopped {
                keyword,
                record,
                threshold,
            } => info!(
                %keyword,
                published_at = %record.published_at,
                %threshold,
                "Stop search, record is older than window start minus grace period"
            ),
            SearchEvent::OrderViolation {
                keyword,
                previous,
                record,
            } => warn!(
                %keyword,
                %previous,
                published_at = %record.published_at,
                title = %record.title,
                "Results are not newest-first; early stop may drop matches"
            ),
            SearchEvent::KeywordCompleted { keyword, results } => {
                info!(%keyword, results, "Keyword search completed")
            }
        }
    }
}

impl<T: SearchObserver + ?Sized> SearchObserver for &T {
    fn notify(&self, event: SearchEvent) {
        (**self).notify(event)
    }
}
