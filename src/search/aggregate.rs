use super::{
    PageFetcher, PageParser, SearchEvent, SearchObserver, TimeWindowFilter, filter_window,
    paginated_search,
};
use crate::config::SearchSettings;
use crate::error::Result;
use crate::models::{ArticleRecord, SearchResult, SearchWindow};
use futures::{Stream, TryStreamExt};
use tracing::{info, instrument};

/// Runs the filtered search for each keyword in turn and tags the results.
///
/// Keywords are searched strictly one after another: a keyword's pages are
/// all fetched and filtered before the next keyword starts, so the site
/// only ever sees one request at a time.
pub struct KeywordAggregator<'a, F, P> {
    fetcher: &'a F,
    parser: &'a P,
    settings: &'a SearchSettings,
    observer: &'a dyn SearchObserver,
}

impl<'a, F, P> KeywordAggregator<'a, F, P>
where
    F: PageFetcher,
    P: PageParser,
{
    pub fn new(
        fetcher: &'a F,
        parser: &'a P,
        settings: &'a SearchSettings,
        observer: &'a dyn SearchObserver,
    ) -> Self {
        Self {
            fetcher,
            parser,
            settings,
            observer,
        }
    }

    /// Lazy filtered results for one keyword.
    ///
    /// Callers that want to keep partial results when a later page fails can
    /// consume this directly instead of [`run`](Self::run).
    pub fn search<'k>(
        &'k self,
        keyword: &'k str,
        window: SearchWindow,
        global_search: bool,
    ) -> impl Stream<Item = Result<ArticleRecord>> + 'k {
        let records =
            paginated_search(self.fetcher, self.parser, keyword, self.settings, self.observer);
        let filter = TimeWindowFilter::from_settings(keyword, window, global_search, self.settings);
        filter_window(records, filter, self.observer)
    }

    /// Search every keyword in order and concatenate the tagged results.
    ///
    /// Duplicate keywords are searched again, and an article matched by two
    /// keywords appears once per keyword. The first error aborts the run and
    /// discards everything gathered so far.
    #[instrument(
        level = "info",
        skip_all,
        fields(keywords = keywords.len(), global_search = global_search)
    )]
    pub async fn run(
        &self,
        keywords: &[String],
        window: SearchWindow,
        global_search: bool,
    ) -> Result<Vec<SearchResult>> {
        let mut results = Vec::new();
        for keyword in keywords {
            let records: Vec<ArticleRecord> =
                self.search(keyword, window, global_search).try_collect().await?;
            self.observer.notify(SearchEvent::KeywordCompleted {
                keyword: keyword.clone(),
                results: records.len(),
            });
            results.extend(records.into_iter().map(|r| SearchResult::new(keyword, r)));
        }
        info!(results = results.len(), "Aggregated keyword results");
        Ok(results)
    }
}
