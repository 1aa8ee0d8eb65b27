//! China Times keyword search.
//!
//! Search results live at `https://www.chinatimes.com/search/{keyword}?page={n}&chdtv`.
//! Every result item carries its own `<time datetime="...">`, so one request
//! per page is enough.

use super::{resolve_link, selector};
use crate::error::{CrawlError, Result};
use crate::models::ArticleRecord;
use crate::search::PageParser;
use crate::utils::{flatten_text, parse_timestamp};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

pub const BASE_URL: &str = "https://www.chinatimes.com/";

static RESULT_SECTION: Lazy<Selector> = Lazy::new(|| selector("section.search-result"));
static RESULT_ITEM: Lazy<Selector> =
    Lazy::new(|| selector("section.search-result div.article-list ul li"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("h3.title a"));
static TIME: Lazy<Selector> = Lazy::new(|| selector("time"));

pub fn search_url(keyword: &str, page: u32) -> String {
    format!(
        "{}search/{}?page={}&chdtv",
        BASE_URL,
        urlencoding::encode(keyword),
        page
    )
}

/// Parser for China Times search result pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChinaTimesParser;

impl PageParser for ChinaTimesParser {
    async fn parse(&self, raw: &[u8], _keyword: &str) -> Result<Vec<ArticleRecord>> {
        parse_search_page(raw)
    }
}

/// Extract the result items of one search page, in display order.
///
/// A page without the `section.search-result` container is a parse error;
/// the container with no items is an empty page.
pub fn parse_search_page(raw: &[u8]) -> Result<Vec<ArticleRecord>> {
    let html = String::from_utf8_lossy(raw);
    let document = Html::parse_document(&html);

    if document.select(&RESULT_SECTION).next().is_none() {
        return Err(CrawlError::parse("chinatimes: no section.search-result on page"));
    }

    let records = document
        .select(&RESULT_ITEM)
        .enumerate()
        .map(|(i, item)| {
            let broken = |what: String| CrawlError::parse(format!("chinatimes item {i}: {what}"));
            let anchor = item
                .select(&TITLE_LINK)
                .next()
                .ok_or_else(|| broken("no h3.title a".into()))?;
            let href = anchor
                .value()
                .attr("href")
                .ok_or_else(|| broken("link has no href".into()))?;
            let datetime = item
                .select(&TIME)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .ok_or_else(|| broken("no time[datetime]".into()))?;
            let published_at = parse_timestamp(datetime)
                .ok_or_else(|| broken(format!("unreadable datetime {datetime:?}")))?;

            Ok(ArticleRecord {
                title: flatten_text(anchor.text()),
                link: resolve_link(BASE_URL, href)?,
                published_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(count = records.len(), "Parsed China Times search page");
    Ok(records)
}
