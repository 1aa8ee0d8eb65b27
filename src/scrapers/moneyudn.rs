//! money.udn.com keyword search.
//!
//! The search page lists titles and links only. The publish time is read
//! from each article's share bar, which costs one more request per result;
//! the parser waits `interval` after each of those requests. Unless global
//! search is on, results whose title lacks the keyword are dropped before
//! that request is made.

use super::{resolve_link, selector};
use crate::error::{CrawlError, Result};
use crate::models::ArticleRecord;
use crate::search::PageParser;
use crate::session::DocumentSource;
use crate::utils::{flatten_text, parse_timestamp};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

pub const BASE_URL: &str = "https://money.udn.com/";

static SEARCH_CONTENT: Lazy<Selector> = Lazy::new(|| selector("div#search_content"));
static RESULT_ITEM: Lazy<Selector> = Lazy::new(|| selector("div#search_content dl dt"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h3"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static STORY_TIME: Lazy<Selector> =
    Lazy::new(|| selector("div#story div#shareBar div.shareBar__info--author span"));

pub fn search_url(keyword: &str, page: u32) -> String {
    format!(
        "{}search/result/1001/{}/{}",
        BASE_URL,
        urlencoding::encode(keyword),
        page
    )
}

/// Title and absolute link of one search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub title: String,
    pub link: String,
}

/// Parser for money.udn search pages; resolves publish times through `source`.
pub struct MoneyUdnParser<D> {
    source: D,
    interval: Duration,
    global_search: bool,
}

impl<D: DocumentSource> MoneyUdnParser<D> {
    pub fn new(source: D, interval: Duration, global_search: bool) -> Self {
        Self {
            source,
            interval,
            global_search,
        }
    }

    async fn published_at(&self, link: &str) -> Result<NaiveDateTime> {
        let body = self.source.get(link).await?;
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
        parse_story_time(&body, link)
    }
}

impl<D: DocumentSource> PageParser for MoneyUdnParser<D> {
    async fn parse(&self, raw: &[u8], keyword: &str) -> Result<Vec<ArticleRecord>> {
        let entries = parse_search_entries(raw)?;
        let mut records = Vec::with_capacity(entries.len());
        for SearchEntry { title, link } in entries {
            if !self.global_search && !title.contains(keyword) {
                debug!(%keyword, %title, "Skip data, keyword not in title");
                continue;
            }
            let published_at = self.published_at(&link).await?;
            records.push(ArticleRecord {
                title,
                link,
                published_at,
            });
        }
        Ok(records)
    }
}

/// Titles and links of one search page, in display order.
///
/// The keyword highlight (`<u>`) inside a title is flattened into plain text.
pub fn parse_search_entries(raw: &[u8]) -> Result<Vec<SearchEntry>> {
    let html = String::from_utf8_lossy(raw);
    let document = Html::parse_document(&html);

    if document.select(&SEARCH_CONTENT).next().is_none() {
        return Err(CrawlError::parse("moneyudn: no div#search_content on page"));
    }

    let entries = document
        .select(&RESULT_ITEM)
        .enumerate()
        .map(|(i, item)| {
            let title = item
                .select(&TITLE)
                .next()
                .map(|h3| flatten_text(h3.text()))
                .ok_or_else(|| CrawlError::parse(format!("moneyudn item {i}: no h3")))?;
            let href = item
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .ok_or_else(|| CrawlError::parse(format!("moneyudn item {i}: no a[href]")))?;
            Ok(SearchEntry {
                title,
                link: resolve_link(BASE_URL, href)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(count = entries.len(), "Parsed money.udn search page");
    Ok(entries)
}

/// Publish time from an article page's share bar.
pub fn parse_story_time(body: &[u8], link: &str) -> Result<NaiveDateTime> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let text = document
        .select(&STORY_TIME)
        .next()
        .and_then(|span| span.text().next())
        .map(str::trim)
        .ok_or_else(|| CrawlError::parse(format!("moneyudn {link}: no share bar time")))?;

    parse_timestamp(text)
        .ok_or_else(|| CrawlError::parse(format!("moneyudn {link}: unreadable time {text:?}")))
}
