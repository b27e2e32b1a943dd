use super::{read_input, report_validation, Context};
use crate::api::{CacheRule, CacheRulesPayload};
use crate::pages::cache::SAVED_MESSAGE;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct CacheRulesArgs {
    #[command(subcommand)]
    pub command: CacheRulesCommand,
}

/// Input for validate/put: raw `cache.conf` text or a JSON array of rules.
#[derive(Args)]
pub struct CacheInput {
    /// Raw cache.conf text (`-` for stdin)
    #[arg(long, conflicts_with = "rules_file")]
    raw_file: Option<PathBuf>,

    /// JSON array of rules
    #[arg(long)]
    rules_file: Option<PathBuf>,
}

impl CacheInput {
    fn payload(&self) -> Result<CacheRulesPayload> {
        if let Some(path) = &self.raw_file {
            return Ok(CacheRulesPayload::raw(read_input(path)?));
        }
        match &self.rules_file {
            Some(path) => {
                let text = read_input(path)?;
                let rules: Vec<CacheRule> = serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse rules in {}", path.display()))?;
                Ok(CacheRulesPayload::rules(rules))
            }
            None => anyhow::bail!("Either --raw-file or --rules-file is required"),
        }
    }
}

#[derive(Subcommand)]
pub enum CacheRulesCommand {
    /// Print the current rules
    Get {
        /// Output format (raw, json)
        #[arg(short, long, default_value = "raw")]
        format: String,
    },

    /// Validate rules without saving them
    Validate {
        #[command(flatten)]
        input: CacheInput,
    },

    /// Save rules with If-Match
    Put {
        #[command(flatten)]
        input: CacheInput,

        /// ETag the edit was based on; fetched from the backend when omitted
        #[arg(short, long)]
        etag: Option<String>,
    },
}

pub async fn run(args: CacheRulesArgs, ctx: Context) -> Result<()> {
    match args.command {
        CacheRulesCommand::Get { format } => {
            let dto = ctx.client.cache_rules().await.context("Failed to fetch cache rules")?;
            match format.as_str() {
                "raw" => {
                    eprintln!("ETag: {}", dto.etag);
                    print!("{}", dto.raw);
                }
                "json" => println!("{}", serde_json::to_string_pretty(&dto)?),
                _ => anyhow::bail!("Invalid format: {}. Use 'raw' or 'json'", format),
            }
            for error in dto.errors.iter().flatten() {
                eprintln!("[!] {}", error);
            }
            Ok(())
        }

        CacheRulesCommand::Validate { input } => {
            let payload = input.payload()?;
            let result = ctx
                .client
                .validate_cache_rules(&payload)
                .await
                .context("Failed to validate cache rules")?;
            report_validation(&result)
        }

        CacheRulesCommand::Put { input, etag } => {
            let payload = input.payload()?;
            let etag = match etag {
                Some(etag) => etag,
                None => {
                    ctx.client
                        .cache_rules()
                        .await
                        .context("Failed to fetch current ETag")?
                        .etag
                }
            };

            let resp = ctx
                .client
                .save_cache_rules(&payload, Some(&etag))
                .await
                .context("Failed to save cache rules")?;
            if !resp.ok {
                anyhow::bail!("Failed to save cache rules: save failed");
            }
            println!("[OK] {}", SAVED_MESSAGE);
            if let Some(etag) = resp.etag {
                println!("ETag: {}", etag);
            }
            Ok(())
        }
    }
}
