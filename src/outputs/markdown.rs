//! Markdown export: one section per site with a results table.

use crate::models::SiteResults;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render the results of every site as Markdown.
pub fn results_to_markdown(sites: &[SiteResults]) -> String {
    let mut md = String::new();
    writeln!(md, "# Keyword news search\n").unwrap();

    for site in sites {
        writeln!(md, "## {}\n", site.site).unwrap();
        if site.results.is_empty() {
            writeln!(md, "_No results._\n").unwrap();
            continue;
        }

        // results arrive grouped by keyword
        let counts = site
            .results
            .iter()
            .chunk_by(|r| r.keyword.as_str())
            .into_iter()
            .map(|(keyword, group)| format!("`{}`: {}", keyword, group.count()))
            .join(", ");
        writeln!(md, "{}\n", counts).unwrap();

        writeln!(md, "| keyword | title | published_at | link |").unwrap();
        writeln!(md, "|---|---|---|---|").unwrap();
        for r in &site.results {
            writeln!(
                md,
                "| {} | {} | {} | <{}> |",
                escape_cell(&r.keyword),
                escape_cell(&r.title),
                r.published_at.format("%Y-%m-%d %H:%M:%S"),
                r.link
            )
            .unwrap();
        }
        md.push('\n');
    }
    md
}

/// Render and write the Markdown report to `path`.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_results(sites: &[SiteResults], path: &str) -> Result<(), Box<dyn Error>> {
    let md = results_to_markdown(sites);
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }
    fs::write(path, md).await?;
    info!(path = %path, "Wrote Markdown results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchResult;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn result(keyword: &str, title: &str, day: u32) -> SearchResult {
        SearchResult {
            keyword: keyword.to_string(),
            title: title.to_string(),
            link: format!("https://news.example/{day}"),
            published_at: NaiveDate::from_ymd_opt(2020, 1, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    fn sites() -> Vec<SiteResults> {
        vec![
            SiteResults {
                site: "moneyudn".to_string(),
                results: vec![
                    result("A", "A | B spin-off", 15),
                    result("A", "A again", 14),
                    result("B", "A | B spin-off", 15),
                ],
            },
            SiteResults {
                site: "chinatimes".to_string(),
                results: vec![],
            },
        ]
    }

    #[test]
    fn test_results_to_markdown() {
        let md = results_to_markdown(&sites());

        assert!(md.contains("## moneyudn"));
        assert!(md.contains("`A`: 2, `B`: 1"));
        assert!(md.contains(
            "| A | A \\| B spin-off | 2020-01-15 09:00:00 | <https://news.example/15> |"
        ));
        assert!(md.contains("## chinatimes\n\n_No results._"));
    }

    #[tokio::test]
    async fn test_write_results() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.md");
        let path = path.to_str().unwrap();

        write_results(&sites(), path).await.unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, results_to_markdown(&sites()));
    }
}
