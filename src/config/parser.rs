use super::AdminConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn parse_config(path: &Path) -> Result<AdminConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AdminConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let config_content = r#"
[api]
base_url = "http://10.0.0.5:9090/mamotama-api"
api_key = "primary-key"

[ui]
page_size = 50
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = parse_config(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:9090/mamotama-api");
        assert_eq!(config.api.api_key.as_deref(), Some("primary-key"));
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.ui.page_size, 50);
        assert_eq!(config.ui.validate_debounce_ms, 300);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = parse_config(temp_file.path()).unwrap();
        assert_eq!(config.ui.start_page, "/status");
        assert!(config.api.api_key.is_none());
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[api\nbase_url = 1").unwrap();

        let err = parse_config(temp_file.path()).unwrap_err();
        assert!(format!("{}", err).contains("Failed to parse config file"));
    }
}
