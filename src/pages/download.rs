use crate::api::{ApiClient, ApiResult, LogSource};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn default_filename(src: LogSource, day: NaiveDate) -> String {
    format!("{}-{}.ndjson.gz", src, day.format("%Y%m%d"))
}

/// Keep only the last path component of a server-suggested name.
fn sanitize(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Optional RFC 3339 bounds forwarded to `/logs/download`.
#[derive(Debug, Clone, Default)]
pub struct TimeRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Download `sources` one after another into `dir`. Stops at the first
/// failure; files already written stay on disk.
pub async fn download_sources(
    client: &ApiClient,
    sources: &[LogSource],
    dir: &Path,
    day: NaiveDate,
    range: &TimeRange,
) -> ApiResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::with_capacity(sources.len());
    for &src in sources {
        let download = client
            .download_logs(src, range.from.as_deref(), range.to.as_deref())
            .await?;
        let filename = download
            .filename
            .as_deref()
            .and_then(sanitize)
            .unwrap_or_else(|| default_filename(src, day));
        let path = dir.join(filename);

        tokio::fs::write(&path, &download.blob).await?;
        info!(src = %src, path = %path.display(), bytes = download.blob.len(), "log downloaded");
        written.push(path);
    }

    Ok(written)
}

/// Every log source, sequentially.
pub async fn download_all(client: &ApiClient, dir: &Path, day: NaiveDate) -> ApiResult<Vec<PathBuf>> {
    download_sources(client, &LogSource::ALL, dir, day, &TimeRange::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filename() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(default_filename(LogSource::Waf, day), "waf-20250309.ndjson.gz");
        assert_eq!(default_filename(LogSource::Interesting, day), "intr-20250309.ndjson.gz");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize("../../etc/passwd"), Some("passwd".to_string()));
        assert_eq!(sanitize("logs\\waf.gz"), Some("waf.gz".to_string()));
        assert_eq!(sanitize(".."), None);
        assert_eq!(sanitize("dir/"), None);
    }
}
