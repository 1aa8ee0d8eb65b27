//! Search settings and the optional YAML configuration file.
//!
//! Settings are layered: built-in defaults, then the YAML file given with
//! `--config`, then command-line flags. Each layer is a [`SettingsOverrides`]
//! whose `Some` fields replace the value below it.
//!
//! ```yaml
//! max_query_page: 10
//! page_query_interval_secs: 1.0
//! grace_period_hours: 24
//! stop_policy: early_stop      # or: exhaustive
//! stop_on_empty_page: false
//! request_timeout_secs: 30
//! user_agent: "keyword_news/0.1"
//! ```

use crate::error::{CrawlError, Result};
use crate::search::StopPolicy;
use chrono::TimeDelta;
use serde::Deserialize;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Hard cap on pages fetched per keyword.
pub const MAX_QUERY_PAGE: u32 = 10;
/// Cooldown after every page (and secondary article) request.
pub const PAGE_QUERY_INTERVAL: Duration = Duration::from_secs(1);
/// Slack subtracted from the window start before the early-stop rule fires.
pub const GRACE_PERIOD: TimeDelta = TimeDelta::days(1);

/// Tunables of the paginated search and its filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub max_query_page: u32,
    pub page_query_interval: Duration,
    pub grace_period: TimeDelta,
    pub stop_policy: StopPolicy,
    /// End the page walk at the first page that parses to no records.
    pub stop_on_empty_page: bool,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_query_page: MAX_QUERY_PAGE,
            page_query_interval: PAGE_QUERY_INTERVAL,
            grace_period: GRACE_PERIOD,
            stop_policy: StopPolicy::EarlyStop,
            stop_on_empty_page: false,
            request_timeout: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SearchSettings {
    /// Return a copy with every `Some` field of `overrides` applied.
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Result<Self> {
        if let Some(pages) = overrides.max_query_page {
            if pages == 0 {
                return Err(CrawlError::Config("max_query_page must be at least 1".into()));
            }
            self.max_query_page = pages;
        }
        if let Some(secs) = overrides.page_query_interval_secs {
            self.page_query_interval = seconds("page_query_interval_secs", secs)?;
        }
        if let Some(hours) = overrides.grace_period_hours {
            self.grace_period = TimeDelta::hours(i64::from(hours));
        }
        if let Some(policy) = overrides.stop_policy {
            self.stop_policy = policy;
        }
        if let Some(stop) = overrides.stop_on_empty_page {
            self.stop_on_empty_page = stop;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout = Some(seconds("request_timeout_secs", secs)?);
        }
        if let Some(ua) = &overrides.user_agent {
            self.user_agent = ua.clone();
        }
        Ok(self)
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| CrawlError::Config(format!("{field} = {secs}: {e}")))
}

/// One layer of optional setting values (YAML file or CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsOverrides {
    pub max_query_page: Option<u32>,
    pub page_query_interval_secs: Option<f64>,
    pub grace_period_hours: Option<u32>,
    pub stop_policy: Option<StopPolicy>,
    pub stop_on_empty_page: Option<bool>,
    pub request_timeout_secs: Option<f64>,
    pub user_agent: Option<String>,
}

impl SettingsOverrides {
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Read a YAML settings file.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn load_config(path: &str) -> Result<SettingsOverrides> {
    let text = fs::read_to_string(path).await?;
    let overrides = SettingsOverrides::from_yaml(&text)?;
    info!(?overrides, "Loaded configuration file");
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_constants() {
        let settings = SearchSettings::default();
        assert_eq!(settings.max_query_page, 10);
        assert_eq!(settings.page_query_interval, Duration::from_secs(1));
        assert_eq!(settings.grace_period, TimeDelta::days(1));
        assert_eq!(settings.stop_policy, StopPolicy::EarlyStop);
        assert!(!settings.stop_on_empty_page);
        assert!(settings.request_timeout.is_none());
        assert!(settings.user_agent.starts_with("keyword_news/"));
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
max_query_page: 3
page_query_interval_secs: 0.5
grace_period_hours: 0
stop_policy: exhaustive
request_timeout_secs: 20
"#;
        let overrides = SettingsOverrides::from_yaml(yaml).unwrap();
        let settings = SearchSettings::default().with_overrides(&overrides).unwrap();

        assert_eq!(settings.max_query_page, 3);
        assert_eq!(settings.page_query_interval, Duration::from_millis(500));
        assert_eq!(settings.grace_period, TimeDelta::zero());
        assert_eq!(settings.stop_policy, StopPolicy::Exhaustive);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(20)));
        // untouched fields keep their defaults
        assert!(!settings.stop_on_empty_page);
    }

    #[test]
    fn test_empty_yaml_is_no_override() {
        let overrides = SettingsOverrides::from_yaml("  \n").unwrap();
        assert_eq!(overrides, SettingsOverrides::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(SettingsOverrides::from_yaml("max_pages: 3").is_err());
    }

    #[test]
    fn test_zero_pages_rejected() {
        let overrides = SettingsOverrides {
            max_query_page: Some(0),
            ..Default::default()
        };
        let err = SearchSettings::default().with_overrides(&overrides).unwrap_err();
        assert!(matches!(err, CrawlError::Config(_)));
    }

    #[test]
    fn test_negative_interval_rejected() {
        let overrides = SettingsOverrides {
            page_query_interval_secs: Some(-1.0),
            ..Default::default()
        };
        assert!(SearchSettings::default().with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_layers_apply_in_order() {
        let file = SettingsOverrides {
            max_query_page: Some(5),
            user_agent: Some("from-file".into()),
            ..Default::default()
        };
        let cli = SettingsOverrides {
            max_query_page: Some(2),
            ..Default::default()
        };
        let settings = SearchSettings::default()
            .with_overrides(&file)
            .and_then(|s| s.with_overrides(&cli))
            .unwrap();
        assert_eq!(settings.max_query_page, 2);
        assert_eq!(settings.user_agent, "from-file");
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stop_on_empty_page: true").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let overrides = load_config(&path).await.unwrap();
        assert_eq!(overrides.stop_on_empty_page, Some(true));
    }
}
