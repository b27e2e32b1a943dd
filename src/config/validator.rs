use super::AdminConfig;
use crate::tui::app::Route;
use anyhow::Result;

pub const MAX_PAGE_SIZE: u32 = 200;

/// Check a loaded configuration. Entries starting with `[X]` are fatal,
/// `[!]` are warnings and `[*]` recommendations.
pub fn validate_config(config: &AdminConfig) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    match reqwest::Url::parse(&config.api.base_url) {
        Ok(url) => {
            if !["http", "https"].contains(&url.scheme()) {
                warnings.push(format!(
                    "[X] API base URL must use http or https, got '{}'",
                    url.scheme()
                ));
            }
            if url.path().trim_end_matches('/').is_empty() {
                warnings.push(
                    "[X] API base path cannot be the root path '/'. Include it in base_url, e.g. /mamotama-api".to_string(),
                );
            }
        }
        Err(e) => {
            warnings.push(format!(
                "[X] Invalid API base URL '{}': {}",
                config.api.base_url, e
            ));
        }
    }

    if config.api.api_key.as_deref().map(str::trim).unwrap_or("").is_empty() {
        warnings.push(
            "[!] No API key configured. The backend rejects requests without X-API-Key unless auth is disabled".to_string(),
        );
    }

    if config.api.timeout_secs == 0 {
        warnings.push("[X] API timeout cannot be 0".to_string());
    }

    if config.ui.page_size == 0 || config.ui.page_size > MAX_PAGE_SIZE {
        warnings.push(format!(
            "[!] Page size {} is outside 1..={}. The backend clamps it",
            config.ui.page_size, MAX_PAGE_SIZE
        ));
    }

    if Route::from_path(&config.ui.start_page).is_none() {
        warnings.push(format!(
            "[!] Unknown start page '{}'. Falling back to /status",
            config.ui.start_page
        ));
    }

    if !["trace", "debug", "info", "warn", "error", "off"].contains(&config.logging.level.as_str()) {
        warnings.push(format!(
            "[X] Invalid log level: {}. Must be one of: trace, debug, info, warn, error, off",
            config.logging.level
        ));
    }

    if !["text", "json", "pretty"].contains(&config.logging.format.as_str()) {
        warnings.push(format!(
            "[X] Invalid log format: {}. Must be 'text', 'json' or 'pretty'",
            config.logging.format
        ));
    }

    if config.api.base_url.starts_with("http://")
        && !config.api.base_url.contains("://127.0.0.1")
        && !config.api.base_url.contains("://localhost")
    {
        warnings.push(
            "[*] Recommendation: Use https when the admin API is not on localhost; the API key travels in a header".to_string(),
        );
    }

    Ok(warnings)
}

pub fn has_errors(warnings: &[String]) -> bool {
    warnings.iter().any(|w| w.starts_with("[X]"))
}
