use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reddit: RedditConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub base_url: String,
    pub user_agent: String,
    /// No timeout unless set.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub throttle_ms: u64,
    pub mode: LookupMode,
}

/// Which lookup the batch runs for every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    #[default]
    Date,
    Details,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: "Comment-Checker/1.0".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl RedditConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("reddit.csv"),
            output_path: PathBuf::from("reddit_out.csv"),
            throttle_ms: 1000,
            mode: LookupMode::Date,
        }
    }
}

impl BatchConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;

        if let Ok(user_agent) = std::env::var("REDDIT_USER_AGENT") {
            config.reddit.user_agent = user_agent;
        }

        Ok(config)
    }

    /// Missing file means defaults; a malformed one is an error.
    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&config_text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.reddit.base_url, "https://www.reddit.com");
        assert_eq!(config.reddit.user_agent, "Comment-Checker/1.0");
        assert_eq!(config.reddit.request_timeout(), None);
        assert_eq!(config.batch.input_path, PathBuf::from("reddit.csv"));
        assert_eq!(config.batch.output_path, PathBuf::from("reddit_out.csv"));
        assert_eq!(config.batch.throttle(), Duration::from_millis(1000));
        assert_eq!(config.batch.mode, LookupMode::Date);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::parse(
            r#"
            [reddit]
            request_timeout_secs = 15

            [batch]
            output_path = "out/results.csv"
            mode = "details"
            "#,
        )
        .unwrap();

        assert_eq!(config.reddit.user_agent, "Comment-Checker/1.0");
        assert_eq!(config.reddit.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.batch.input_path, PathBuf::from("reddit.csv"));
        assert_eq!(config.batch.output_path, PathBuf::from("out/results.csv"));
        assert_eq!(config.batch.mode, LookupMode::Details);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(AppConfig::parse("[batch]\nmode = \"everything\"").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.batch.throttle_ms, 1000);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[batch\nthrottle_ms = ").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }
}
