//! Default values for configuration options

use std::path::PathBuf;

// API defaults
pub(super) fn default_base_url() -> String {
    "http://127.0.0.1:9090/mamotama-api".to_string()
}

pub(super) fn default_timeout_secs() -> u64 {
    15
}

// UI defaults
pub(super) fn default_start_page() -> String {
    "/status".to_string()
}

pub(super) fn default_page_size() -> u32 {
    30
}

pub(super) fn default_validate_debounce_ms() -> u64 {
    300
}

pub(super) fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

// Logging defaults
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_log_output() -> String {
    "stderr".to_string()
}
