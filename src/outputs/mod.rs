//! Export of aggregated search results.
//!
//! # Submodules
//!
//! - [`json`]: pretty JSON, one object per site
//! - [`markdown`]: one Markdown table per site
//!
//! Without any output path the run ends with [`print_table`], a plain
//! text listing on stdout.

pub mod json;
pub mod markdown;

use crate::models::SiteResults;
use std::fmt::Write;

/// Render every site's results as an aligned plain text table.
pub fn render_table(sites: &[SiteResults]) -> String {
    let mut out = String::new();
    for site in sites {
        let _ = writeln!(out, "[{}] {} result(s)", site.site, site.results.len());
        if site.results.is_empty() {
            continue;
        }
        let kw_width = site
            .results
            .iter()
            .map(|r| r.keyword.chars().count())
            .max()
            .unwrap_or(0)
            .max("keyword".len());
        let _ = writeln!(out, "{:<kw_width$}  {:<19}  title / link", "keyword", "published_at");
        for r in &site.results {
            let pad = kw_width - r.keyword.chars().count();
            let _ = writeln!(
                out,
                "{}{}  {}  {}",
                r.keyword,
                " ".repeat(pad),
                r.published_at.format("%Y-%m-%d %H:%M:%S"),
                r.title
            );
            let _ = writeln!(out, "{}  {:<19}  {}", " ".repeat(kw_width), "", r.link);
        }
    }
    out
}

pub fn print_table(sites: &[SiteResults]) {
    print!("{}", render_table(sites));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchResult;
    use chrono::NaiveDate;

    #[test]
    fn test_render_table() {
        let sites = vec![
            SiteResults {
                site: "moneyudn".to_string(),
                results: vec![],
            },
            SiteResults {
                site: "chinatimes".to_string(),
                results: vec![SearchResult {
                    keyword: "台積電".to_string(),
                    title: "台積電 法說會".to_string(),
                    link: "https://www.chinatimes.com/a".to_string(),
                    published_at: NaiveDate::from_ymd_opt(2020, 1, 15)
                        .unwrap()
                        .and_hms_opt(14, 30, 0)
                        .unwrap(),
                }],
            },
        ];

        let table = render_table(&sites);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "[moneyudn] 0 result(s)");
        assert_eq!(lines[1], "[chinatimes] 1 result(s)");
        assert!(lines[3].starts_with("台積電      2020-01-15 14:30:00  台積電 法說會"));
        assert!(lines[4].ends_with("https://www.chinatimes.com/a"));
    }
}
