//! Data models for crawled search results.
//!
//! This module defines the values that flow through the search pipeline:
//! - [`ArticleRecord`]: one article candidate extracted from a search page
//! - [`SearchResult`]: an article record tagged with the keyword that found it
//! - [`SearchWindow`]: the publication time range a run is interested in
//! - [`SiteResults`]: the aggregated results of one site, ready for export
//!
//! Timestamps are [`NaiveDateTime`] in the news site's own local time. The
//! sites never state an offset, so the window given on the command line is
//! interpreted in that same local time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One article candidate as it appears on a search result page.
///
/// Records extracted from a page keep the site's display order. The search
/// pipeline assumes that order is newest first across the whole result
/// sequence; the early-stop rule depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Headline text with any keyword-highlight markup flattened.
    pub title: String,
    /// Link to the article page.
    pub link: String,
    /// Publication time, the sole ordering and filtering key.
    pub published_at: NaiveDateTime,
}

/// An [`ArticleRecord`] tagged with the keyword whose search produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub keyword: String,
    pub title: String,
    pub link: String,
    pub published_at: NaiveDateTime,
}

impl SearchResult {
    pub fn new(keyword: &str, record: ArticleRecord) -> Self {
        Self {
            keyword: keyword.to_string(),
            title: record.title,
            link: record.link,
            published_at: record.published_at,
        }
    }
}

/// Inclusive publication time range.
///
/// `start <= end` is a precondition the caller checks (see
/// [`SearchWindow::is_ordered`]); the search pipeline does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SearchWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// All results gathered from one news site during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteResults {
    /// Short site identifier, e.g. `"chinatimes"`.
    pub site: String,
    pub results: Vec<SearchResult>,
}
