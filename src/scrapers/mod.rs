//! News site adapters for keyword search.
//!
//! Each submodule knows one site's search URL scheme and result markup, and
//! provides a [`PageParser`] for it. Fetching is shared: a
//! [`SearchPageFetcher`] pairs a site's URL builder with the crawler's
//! [`HttpSession`].
//!
//! # Supported Sources
//!
//! | Source | Module | Publish time | Notes |
//! |--------|--------|--------------|-------|
//! | money.udn.com | [`moneyudn`] | article page | one extra request per result |
//! | China Times | [`chinatimes`] | search page | `<time datetime>` on each result |
//!
//! Sites are crawled one after another, in the order of [`Site::ALL`].

pub mod chinatimes;
pub mod moneyudn;

use crate::config::SearchSettings;
use crate::error::{CrawlError, Result};
use crate::models::{SearchResult, SearchWindow, SiteResults};
use crate::search::{KeywordAggregator, PageFetcher, PageParser, SearchObserver};
use crate::session::{DocumentSource, HttpSession};
use clap::ValueEnum;
use scraper::Selector;
use std::fmt;
use tracing::{info, instrument};
use url::Url;

/// A news site this crawler can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Site {
    Moneyudn,
    Chinatimes,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::Moneyudn, Site::Chinatimes];

    pub fn name(&self) -> &'static str {
        match self {
            Site::Moneyudn => "moneyudn",
            Site::Chinatimes => "chinatimes",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// [`PageFetcher`] that builds the search URL for a page and downloads it.
pub struct SearchPageFetcher<D> {
    source: D,
    url_for: fn(&str, u32) -> String,
}

impl<D: DocumentSource> SearchPageFetcher<D> {
    pub fn new(source: D, url_for: fn(&str, u32) -> String) -> Self {
        Self { source, url_for }
    }
}

impl<D: DocumentSource> PageFetcher for SearchPageFetcher<D> {
    async fn fetch(&self, keyword: &str, page: u32) -> Result<Vec<u8>> {
        let url = (self.url_for)(keyword, page);
        info!(%url, page, "Crawling url");
        self.source.get(&url).await
    }
}

/// Search all `keywords` on one site with a fresh session.
#[instrument(level = "info", skip_all, fields(%site))]
pub async fn crawl_site(
    site: Site,
    keywords: &[String],
    window: SearchWindow,
    global_search: bool,
    settings: &SearchSettings,
    observer: &dyn SearchObserver,
) -> Result<SiteResults> {
    let session = HttpSession::new(settings.user_agent.clone(), settings.request_timeout);
    let results = match site {
        Site::Moneyudn => {
            let fetcher = SearchPageFetcher::new(&session, moneyudn::search_url);
            let parser = moneyudn::MoneyUdnParser::new(
                &session,
                settings.page_query_interval,
                global_search,
            );
            aggregate(&fetcher, &parser, keywords, window, global_search, settings, observer)
                .await?
        }
        Site::Chinatimes => {
            let fetcher = SearchPageFetcher::new(&session, chinatimes::search_url);
            let parser = chinatimes::ChinaTimesParser;
            aggregate(&fetcher, &parser, keywords, window, global_search, settings, observer)
                .await?
        }
    };
    info!(count = results.len(), "Site search finished");
    Ok(SiteResults {
        site: site.name().to_string(),
        results,
    })
}

async fn aggregate<F: PageFetcher, P: PageParser>(
    fetcher: &F,
    parser: &P,
    keywords: &[String],
    window: SearchWindow,
    global_search: bool,
    settings: &SearchSettings,
    observer: &dyn SearchObserver,
) -> Result<Vec<SearchResult>> {
    KeywordAggregator::new(fetcher, parser, settings, observer)
        .run(keywords, window, global_search)
        .await
}

/// Compile a selector literal.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Resolve `href` against the site base; absolute links pass through.
pub(crate) fn resolve_link(base: &str, href: &str) -> Result<String> {
    let base =
        Url::parse(base).map_err(|e| CrawlError::parse(format!("bad base url {base}: {e}")))?;
    base.join(href.trim())
        .map(|u| u.to_string())
        .map_err(|e| CrawlError::parse(format!("bad link {href:?}: {e}")))
}
