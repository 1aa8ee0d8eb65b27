//! Deterministic stand-ins for the site collaborators.

use super::{PageFetcher, PageParser, SearchEvent, SearchObserver};
use crate::error::{CrawlError, Result};
use crate::models::ArticleRecord;
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn record(title: &str, published_at: NaiveDateTime) -> ArticleRecord {
    ArticleRecord {
        title: title.to_string(),
        link: format!("https://news.example/{}", published_at.format("%Y%m%d%H%M")),
        published_at,
    }
}

/// Serves a fixed list of pages. The fetched content is the page number, and
/// parsing maps it back to that page's records; pages past the end are empty.
#[derive(Default)]
pub struct StubSite {
    pages: Vec<Vec<ArticleRecord>>,
    fetches: RefCell<Vec<(String, u32)>>,
    fail_fetch_on: Option<u32>,
    fail_parse_on: Option<u32>,
    parses: Cell<u32>,
}

impl StubSite {
    pub fn new(pages: Vec<Vec<ArticleRecord>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing_fetch_on(mut self, page: u32) -> Self {
        self.fail_fetch_on = Some(page);
        self
    }

    pub fn failing_parse_on(mut self, page: u32) -> Self {
        self.fail_parse_on = Some(page);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    pub fn fetched_pages(&self, keyword: &str) -> Vec<u32> {
        self.fetches
            .borrow()
            .iter()
            .filter(|(k, _)| k == keyword)
            .map(|(_, p)| *p)
            .collect()
    }

    pub fn parse_count(&self) -> u32 {
        self.parses.get()
    }
}

impl PageFetcher for StubSite {
    async fn fetch(&self, keyword: &str, page: u32) -> Result<Vec<u8>> {
        self.fetches.borrow_mut().push((keyword.to_string(), page));
        if self.fail_fetch_on == Some(page) {
            return Err(CrawlError::HttpStatus {
                url: format!("stub://{keyword}/{page}"),
                status: 500,
            });
        }
        Ok(page.to_string().into_bytes())
    }
}

impl PageParser for StubSite {
    async fn parse(&self, raw: &[u8], _keyword: &str) -> Result<Vec<ArticleRecord>> {
        self.parses.set(self.parses.get() + 1);
        let page: u32 = std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CrawlError::parse("stub page number"))?;
        if self.fail_parse_on == Some(page) {
            return Err(CrawlError::parse("stub markup changed"));
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

/// Keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<SearchEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.borrow().clone()
    }

    pub fn cap_reached(&self) -> bool {
        self.events
            .borrow()
            .iter()
            .any(|e| matches!(e, SearchEvent::PageCapReached { .. }))
    }

    pub fn stopped(&self) -> bool {
        self.events
            .borrow()
            .iter()
            .any(|e| matches!(e, SearchEvent::Stopped { .. }))
    }
}

impl SearchObserver for RecordingObserver {
    fn notify(&self, event: SearchEvent) {
        self.events.borrow_mut().push(event);
    }
}
