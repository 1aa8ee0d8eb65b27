//! JSON export.
//!
//! The file holds an array with one entry per crawled site, in crawl order:
//!
//! ```text
//! [
//!   { "site": "moneyudn", "results": [ { "keyword": ..., "title": ..., "link": ..., "published_at": ... } ] },
//!   { "site": "chinatimes", "results": [] }
//! ]
//! ```

use crate::models::SiteResults;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write all site results to `path` as pretty-printed JSON.
///
/// Missing parent directories are created.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_results(sites: &[SiteResults], path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(sites)?;

    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    let total: usize = sites.iter().map(|s| s.results.len()).sum();
    info!(path = %path, sites = sites.len(), results = total, "Wrote JSON results");
    Ok(())
}
