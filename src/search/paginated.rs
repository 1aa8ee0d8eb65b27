use super::{PageFetcher, PageParser, SearchEvent, SearchObserver};
use crate::config::SearchSettings;
use crate::error::Result;
use crate::models::ArticleRecord;
use futures::Stream;
use futures::stream;
use std::collections::VecDeque;
use tokio::time::sleep;

struct PageCursor {
    next_page: u32,
    buffered: VecDeque<ArticleRecord>,
}

/// Lazily walk the search result pages for `keyword`.
///
/// Pages are requested one at a time, only when the consumer has drained the
/// previous page, and never more than `settings.max_query_page` of them.
/// Between two page requests the walk sleeps `settings.page_query_interval`.
/// If the consumer stops pulling, no further page is requested.
///
/// When the cap is exhausted the observer receives
/// [`SearchEvent::PageCapReached`]; the stream then ends like any other.
/// A fetch or parse error is yielded once and ends the stream.
///
/// The stream is not restartable: calling this again issues every request
/// again.
pub fn paginated_search<'a, F, P>(
    fetcher: &'a F,
    parser: &'a P,
    keyword: &'a str,
    settings: &'a SearchSettings,
    observer: &'a dyn SearchObserver,
) -> impl Stream<Item = Result<ArticleRecord>> + 'a
where
    F: PageFetcher,
    P: PageParser,
{
    let cursor = PageCursor {
        next_page: 1,
        buffered: VecDeque::new(),
    };

    stream::try_unfold(cursor, move |cursor| {
        next_record(fetcher, parser, keyword, settings, observer, cursor)
    })
}

async fn next_record<F, P>(
    fetcher: &F,
    parser: &P,
    keyword: &str,
    settings: &SearchSettings,
    observer: &dyn SearchObserver,
    mut cursor: PageCursor,
) -> Result<Option<(ArticleRecord, PageCursor)>>
where
    F: PageFetcher,
    P: PageParser,
{
    loop {
        if let Some(record) = cursor.buffered.pop_front() {
            return Ok(Some((record, cursor)));
        }

        let page = cursor.next_page;
        if page > settings.max_query_page {
            observer.notify(SearchEvent::PageCapReached {
                keyword: keyword.to_string(),
                max_query_page: settings.max_query_page,
            });
            return Ok(None);
        }

        if page > 1 && !settings.page_query_interval.is_zero() {
            sleep(settings.page_query_interval).await;
        }

        let raw = fetcher.fetch(keyword, page).await?;
        let records = parser.parse(&raw, keyword).await?;
        cursor.next_page += 1;

        observer.notify(SearchEvent::PageFetched {
            keyword: keyword.to_string(),
            page,
            records: records.len(),
        });

        if records.is_empty() && settings.stop_on_empty_page {
            observer.notify(SearchEvent::EmptyPage {
                keyword: keyword.to_string(),
                page,
            });
            return Ok(None);
        }
        cursor.buffered.extend(records);
    }
}
