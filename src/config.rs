use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::delete_confirm::DEFAULT_CONFIRM_TIMEOUT;
use crate::logging::{DEFAULT_MAX_LOG_LINES, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub delete_confirm_timeout_ms: u64,
    pub log_poll_interval_ms: u64,
    pub max_log_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 10,
            delete_confirm_timeout_ms: DEFAULT_CONFIRM_TIMEOUT.as_millis() as u64,
            log_poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            max_log_lines: DEFAULT_MAX_LOG_LINES,
        }
    }
}

impl Config {
    /// Load a YAML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("baseUrl must start with http:// or https://: '{}'", self.base_url);
        }
        if self.request_timeout_secs == 0 {
            bail!("requestTimeoutSecs must be greater than 0");
        }
        if self.log_poll_interval_ms == 0 {
            bail!("logPollIntervalMs must be greater than 0");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn delete_confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.delete_confirm_timeout_ms)
    }

    pub fn log_poll_interval(&self) -> Duration {
        Duration::from_millis(self.log_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.delete_confirm_timeout(), Duration::from_secs(5));
        assert_eq!(config.delete_confirm_timeout(), DEFAULT_CONFIRM_TIMEOUT);
        assert_eq!(config.log_poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(config.delete_confirm_timeout_ms, 5_000);
        assert_eq!(config.log_poll_interval_ms, 1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config("baseUrl: https://files.local\nmaxLogLines: 500\n");

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.base_url, "https://files.local");
        assert_eq!(config.max_log_lines, 500);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_load_rejects_bad_url() {
        let file = write_config("baseUrl: files.local\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("baseUrl"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/filedeck.yaml")).is_err());
    }
}
