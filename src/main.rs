//! # Keyword News
//!
//! Searches Taiwanese news sites for keywords and keeps the articles
//! published inside a time window.
//!
//! ## Features
//!
//! - Walks a site's paginated keyword search, newest results first
//! - Stops early once results fall behind the window start
//! - Optionally requires the keyword to appear in the headline
//! - Outputs a JSON file, a Markdown report, or a plain table on stdout
//!
//! ## Usage
//!
//! ```sh
//! keyword_news --keywords 台積電 --start 2020-01-10 --end 2020-01-20 -j ./out/results.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Pagination**: pull search pages one at a time, with a cooldown
//! 2. **Filtering**: keep records inside the window, stop when past it
//! 3. **Aggregation**: run every keyword in turn and tag its results
//! 4. **Output**: write JSON and Markdown, or print a table
//!
//! Sites are crawled one after another, each with its own HTTP session.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod scrapers;
mod search;
mod session;
mod utils;

use cli::Cli;
use config::{SearchSettings, load_config};
use models::SearchWindow;
use outputs::{json, markdown, print_table};
use search::TracingObserver;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse CLI first; --debug picks the default log level
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("keyword_news starting up");
    debug!(?args, "Parsed CLI arguments");

    let window = SearchWindow::new(
        args.start,
        args.end.unwrap_or_else(|| Local::now().naive_local()),
    );
    if !window.is_ordered() {
        error!(start = %window.start, end = %window.end, "Start time is after end time");
        return Err(format!("--start {} is after --end {}", window.start, window.end).into());
    }

    // ---- Settings: defaults, then config file, then CLI ----
    let mut settings = SearchSettings::default();
    if let Some(path) = &args.config {
        let file = load_config(path).await?;
        settings = settings.with_overrides(&file)?;
    }
    let settings = settings.with_overrides(&args.overrides())?;
    info!(
        max_query_page = settings.max_query_page,
        interval = ?settings.page_query_interval,
        grace = %settings.grace_period,
        policy = ?settings.stop_policy,
        "Search settings"
    );

    // Early check: output paths are writable
    for path in [&args.json_output, &args.markdown_output].into_iter().flatten() {
        if let Err(e) = ensure_writable_parent(path).await {
            error!(
                path = %path,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Crawl each site in turn ----
    let observer = TracingObserver;
    let mut all_results = Vec::new();
    for site in args.sites() {
        info!(
            %site,
            keywords = ?args.keywords,
            start = %window.start,
            end = %window.end,
            "Crawling site"
        );
        let crawled = scrapers::crawl_site(
            site,
            &args.keywords,
            window,
            args.global_search,
            &settings,
            &observer,
        )
        .await;
        match crawled {
            Ok(results) => all_results.push(results),
            Err(e) => {
                error!(%site, error = %e, unreachable = e.is_fetch(), "Site crawl failed");
                return Err(e.into());
            }
        }
    }

    let total: usize = all_results.iter().map(|s| s.results.len()).sum();
    info!(sites = all_results.len(), results = total, "Crawl finished");

    // ---- Output ----
    if let Some(path) = &args.json_output {
        json::write_results(&all_results, path).await?;
    }
    if let Some(path) = &args.markdown_output {
        markdown::write_results(&all_results, path).await?;
    }
    if !args.has_file_output() {
        print_table(&all_results);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
