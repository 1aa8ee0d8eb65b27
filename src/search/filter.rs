use super::{SearchEvent, SearchObserver, SkipReason};
use crate::config::SearchSettings;
use crate::error::Result;
use crate::models::{ArticleRecord, SearchWindow};
use chrono::{NaiveDateTime, TimeDelta};
use futures::stream::{self, Stream, TryStreamExt};
use serde::Deserialize;
use std::pin::Pin;

/// What to do with a record that is older than the window start minus the
/// grace period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// End the keyword's search. Relies on newest-first results.
    #[default]
    EarlyStop,
    /// Skip the record and keep scanning up to the page cap.
    Exhaustive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Emit,
    Skip(SkipReason),
    Stop,
}

/// Time-window and keyword-relevance checks for one keyword's results.
///
/// Checks run in this order, and the first that applies decides:
///
/// 1. older than `window.start - grace_period`: [`Verdict::Stop`]
/// 2. newer than `window.end`: skip
/// 3. older than `window.start`: skip (only reachable inside the grace period)
/// 4. title lacks the keyword and global search is off: skip
/// 5. otherwise [`Verdict::Emit`]
///
/// The grace period absorbs timestamp noise near the start boundary, since
/// some sites resolve publish times from a second page load. A zero grace
/// period stops exactly at `window.start`.
#[derive(Debug, Clone)]
pub struct TimeWindowFilter {
    keyword: String,
    window: SearchWindow,
    global_search: bool,
    threshold: NaiveDateTime,
    policy: StopPolicy,
    previous: Option<NaiveDateTime>,
}

impl TimeWindowFilter {
    pub fn new(
        keyword: &str,
        window: SearchWindow,
        global_search: bool,
        grace_period: TimeDelta,
    ) -> Self {
        let threshold = window
            .start
            .checked_sub_signed(grace_period)
            .unwrap_or(NaiveDateTime::MIN);
        Self {
            keyword: keyword.to_string(),
            window,
            global_search,
            threshold,
            policy: StopPolicy::EarlyStop,
            previous: None,
        }
    }

    pub fn from_settings(
        keyword: &str,
        window: SearchWindow,
        global_search: bool,
        settings: &SearchSettings,
    ) -> Self {
        Self::new(keyword, window, global_search, settings.grace_period)
            .with_policy(settings.stop_policy)
    }

    pub fn with_policy(mut self, policy: StopPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Window start minus grace period.
    pub fn stop_threshold(&self) -> NaiveDateTime {
        self.threshold
    }

    pub fn evaluate(&self, record: &ArticleRecord) -> Verdict {
        let at = record.published_at;
        if at < self.threshold {
            return match self.policy {
                StopPolicy::EarlyStop => Verdict::Stop,
                StopPolicy::Exhaustive => Verdict::Skip(SkipReason::BeforeWindow),
            };
        }
        if !self.window.contains(at) {
            return Verdict::Skip(if at > self.window.end {
                SkipReason::AfterWindow
            } else {
                SkipReason::BeforeWindow
            });
        }
        if !self.global_search && !record.title.contains(&self.keyword) {
            return Verdict::Skip(SkipReason::KeywordMissing);
        }
        Verdict::Emit
    }

    /// Remember `record` as the latest seen and return the previous
    /// timestamp if `record` is newer than it.
    pub fn check_order(&mut self, record: &ArticleRecord) -> Option<NaiveDateTime> {
        let previous = self.previous.replace(record.published_at)?;
        (record.published_at > previous).then_some(previous)
    }
}

type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<ArticleRecord>> + 'a>>;

/// Apply `filter` to a record stream, ending it at the first
/// [`Verdict::Stop`]. Errors from `records` pass through and end the stream.
pub fn filter_window<'a, S>(
    records: S,
    filter: TimeWindowFilter,
    observer: &'a dyn SearchObserver,
) -> impl Stream<Item = Result<ArticleRecord>> + 'a
where
    S: Stream<Item = Result<ArticleRecord>> + 'a,
{
    let records: RecordStream<'a> = Box::pin(records);
    stream::try_unfold((records, filter), move |(records, filter)| {
        next_match(records, filter, observer)
    })
}

async fn next_match<'a>(
    mut records: RecordStream<'a>,
    mut filter: TimeWindowFilter,
    observer: &dyn SearchObserver,
) -> Result<Option<(ArticleRecord, (RecordStream<'a>, TimeWindowFilter))>> {
    while let Some(record) = records.try_next().await? {
        if let Some(previous) = filter.check_order(&record) {
            observer.notify(SearchEvent::OrderViolation {
                keyword: filter.keyword().to_string(),
                previous,
                record: record.clone(),
            });
        }

        match filter.evaluate(&record) {
            Verdict::Emit => {
                observer.notify(SearchEvent::Emitted {
                    keyword: filter.keyword().to_string(),
                    record: record.clone(),
                });
                return Ok(Some((record, (records, filter))));
            }
            Verdict::Skip(reason) => observer.notify(SearchEvent::Skipped {
                keyword: filter.keyword().to_string(),
                record,
                reason,
            }),
            Verdict::Stop => {
                observer.notify(SearchEvent::Stopped {
                    keyword: filter.keyword().to_string(),
                    threshold: filter.stop_threshold(),
                    record,
                });
                return Ok(None);
            }
        }
    }
    Ok(None)
}
