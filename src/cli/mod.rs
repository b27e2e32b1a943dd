pub mod bypass;
pub mod cache;
pub mod logs;
pub mod rules;
pub mod status;
pub mod tui;

pub use bypass::{BypassArgs, BypassRulesArgs};
pub use cache::CacheRulesArgs;
pub use logs::LogsArgs;
pub use tui::TuiArgs;

use crate::api::{ApiClient, ValidationResult};
use crate::config::AdminConfig;
use anyhow::{Context as _, Result};
use std::path::Path;

/// What every subcommand needs: the resolved configuration and a client
/// built from it.
pub struct Context {
    pub config: AdminConfig,
    pub client: ApiClient,
}

impl Context {
    pub fn new(config: AdminConfig) -> Result<Self> {
        let client = ApiClient::from_config(&config.api).context("Failed to create API client")?;
        Ok(Self { config, client })
    }
}

/// Read a file argument, `-` meaning stdin.
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Print a validation result and turn `ok: false` into an error so the
/// process exits non-zero.
pub(crate) fn report_validation(result: &ValidationResult) -> Result<()> {
    if result.ok {
        println!("[OK] Validation passed");
        for message in &result.messages {
            println!("  {}", message);
        }
        return Ok(());
    }

    println!("[NG] Validation failed");
    for message in &result.messages {
        println!("  {}", message);
    }
    anyhow::bail!("validation failed with {} message(s)", result.messages.len())
}
