//! Command-line interface definitions for the keyword news crawler.
//!
//! Search tuning flags (`--max-pages`, `--interval-secs`, ...) form the top
//! settings layer: they override the YAML file given with `--config`, which
//! overrides the built-in defaults.

use crate::config::SettingsOverrides;
use crate::scrapers::Site;
use crate::search::StopPolicy;
use crate::utils::parse_timestamp;
use chrono::NaiveDateTime;
use clap::Parser;

fn parse_time_arg(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw).ok_or_else(|| {
        format!("unrecognized time {raw:?}, expected e.g. 2020-01-15 or 2020-01-15 08:30")
    })
}

fn parse_keyword(raw: &str) -> Result<String, String> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err("keyword must not be blank".to_string());
    }
    Ok(keyword.to_string())
}

/// Search news sites for keywords within a publication time range.
///
/// # Examples
///
/// ```sh
/// # Two keywords on every site, printed to stdout
/// keyword_news --keywords 台積電 鴻海 --start 2020-01-10 --end 2020-01-20
///
/// # Only China Times, titles need not contain the keyword, JSON output
/// keyword_news --keywords AI --start 2020-01-10 --site chinatimes --global-search -j out/ai.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keywords to search, one search per keyword
    #[arg(long, num_args = 1.., required = true, value_parser = parse_keyword)]
    pub keywords: Vec<String>,

    /// Start of the publication window (inclusive)
    #[arg(long, value_parser = parse_time_arg)]
    pub start: NaiveDateTime,

    /// End of the publication window (inclusive). Default: now
    #[arg(long, value_parser = parse_time_arg)]
    pub end: Option<NaiveDateTime>,

    /// Keep results whose title does not contain the keyword
    #[arg(long)]
    pub global_search: bool,

    /// Show debug logging
    #[arg(long)]
    pub debug: bool,

    /// Site to search; repeat for several. Default: all sites
    #[arg(long = "site", value_enum)]
    pub sites: Vec<Site>,

    /// Maximum number of result pages per keyword
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Seconds to wait between requests to the same site
    #[arg(long)]
    pub interval_secs: Option<f64>,

    /// Keep walking pages until results are this many hours older than --start
    #[arg(long)]
    pub grace_hours: Option<u32>,

    /// Never stop early; scan every page up to --max-pages
    #[arg(long)]
    pub exhaustive: bool,

    /// Stop a keyword's search at the first page without results
    #[arg(long)]
    pub stop_on_empty_page: bool,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<f64>,

    /// Optional path to a YAML settings file
    #[arg(short, long, env = "KEYWORD_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Write results to this JSON file
    #[arg(short, long)]
    pub json_output: Option<String>,

    /// Write results to this Markdown file
    #[arg(short, long)]
    pub markdown_output: Option<String>,
}

impl Cli {
    /// The search settings given on the command line.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            max_query_page: self.max_pages,
            page_query_interval_secs: self.interval_secs,
            grace_period_hours: self.grace_hours,
            stop_policy: self.exhaustive.then_some(StopPolicy::Exhaustive),
            stop_on_empty_page: self.stop_on_empty_page.then_some(true),
            request_timeout_secs: self.timeout_secs,
            user_agent: None,
        }
    }

    /// Selected sites in crawl order, without repeats.
    pub fn sites(&self) -> Vec<Site> {
        if self.sites.is_empty() {
            return Site::ALL.to_vec();
        }
        Site::ALL
            .into_iter()
            .filter(|s| self.sites.contains(s))
            .collect()
    }

    pub fn has_file_output(&self) -> bool {
        self.json_output.is_some() || self.markdown_output.is_some()
    }
}
