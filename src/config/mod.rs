pub mod defaults;
pub mod parser;
pub mod validator;

use anyhow::Result;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin plus API base path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Route opened when the console starts (what `/` redirects to).
    #[serde(default = "default_start_page")]
    pub start_page: String,
    /// Initial `tail` of the log pager.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_validate_debounce_ms")]
    pub validate_debounce_ms: u64,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// `stderr` or a file path.
    #[serde(default = "default_log_output")]
    pub output: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            page_size: default_page_size(),
            validate_debounce_ms: default_validate_debounce_ms(),
            download_dir: default_download_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
        }
    }
}

/// Values given on the command line (or through the environment via clap).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub start_page: Option<String>,
    pub log_level: Option<String>,
}

impl AdminConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        parser::parse_config(path)
    }

    /// File (when given) or defaults, then overrides on top.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(base) = &overrides.api_base {
            self.api.base_url = base.clone();
        }
        if let Some(key) = &overrides.api_key {
            self.api.api_key = Some(key.clone());
        }
        if let Some(page) = &overrides.start_page {
            self.ui.start_page = page.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<Vec<String>> {
        validator::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            api_base: Some("https://waf.example.com/mamotama-api".to_string()),
            api_key: Some("k1".to_string()),
            start_page: None,
            log_level: Some("debug".to_string()),
        };
        let config = AdminConfig::load(None, &overrides).unwrap();

        assert_eq!(config.api.base_url, "https://waf.example.com/mamotama-api");
        assert_eq!(config.api.api_key.as_deref(), Some("k1"));
        assert_eq!(config.ui.start_page, "/status");
        assert_eq!(config.logging.level, "debug");
    }
}
