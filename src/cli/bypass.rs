use super::{read_input, report_validation, Context};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct BypassArgs {
    #[command(subcommand)]
    pub command: BypassCommand,
}

/// Legacy plain-text bypass list.
#[derive(Subcommand)]
pub enum BypassCommand {
    /// Print the current list
    Get,

    /// Replace the list with a file's contents (`-` for stdin)
    Set {
        #[arg(short, long)]
        file: PathBuf,
    },
}

pub async fn run(args: BypassArgs, ctx: Context) -> Result<()> {
    match args.command {
        BypassCommand::Get => {
            let text = ctx.client.bypass_raw().await.context("Failed to fetch bypass list")?;
            print!("{}", text);
            Ok(())
        }

        BypassCommand::Set { file } => {
            let text = read_input(&file)?;
            ctx.client
                .save_bypass_raw(text)
                .await
                .context("Failed to save bypass list")?;
            println!("[OK] Bypass list saved");
            Ok(())
        }
    }
}

#[derive(Args)]
pub struct BypassRulesArgs {
    #[command(subcommand)]
    pub command: BypassRulesCommand,
}

/// Structured bypass rules with ETag-guarded writes.
#[derive(Subcommand)]
pub enum BypassRulesCommand {
    /// Print the current rules; the ETag goes to stderr
    Get,

    /// Validate a rules file without saving it
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Save a rules file with If-Match
    Put {
        #[arg(short, long)]
        file: PathBuf,

        /// ETag the edit was based on; fetched from the backend when omitted
        #[arg(short, long)]
        etag: Option<String>,
    },
}

pub async fn run_rules(args: BypassRulesArgs, ctx: Context) -> Result<()> {
    match args.command {
        BypassRulesCommand::Get => {
            let dto = ctx.client.bypass_rules().await.context("Failed to fetch bypass rules")?;
            if let Some(etag) = &dto.etag {
                eprintln!("ETag: {}", etag);
            }
            print!("{}", dto.raw.unwrap_or_default());
            Ok(())
        }

        BypassRulesCommand::Validate { file } => {
            let raw = read_input(&file)?;
            let result = ctx
                .client
                .validate_bypass_rules(&raw)
                .await
                .context("Failed to validate bypass rules")?;
            report_validation(&result)
        }

        BypassRulesCommand::Put { file, etag } => {
            let raw = read_input(&file)?;
            let etag = match etag {
                Some(etag) => Some(etag),
                None => {
                    ctx.client
                        .bypass_rules()
                        .await
                        .context("Failed to fetch current ETag")?
                        .etag
                }
            };

            let resp = ctx
                .client
                .save_bypass_rules(&raw, etag.as_deref())
                .await
                .context("Failed to save bypass rules")?;
            if !resp.ok {
                anyhow::bail!("Failed to save bypass rules: save failed");
            }
            info!(etag = ?resp.etag, "bypass rules saved");
            println!("[OK] Saved");
            if let Some(etag) = resp.etag {
                println!("ETag: {}", etag);
            }
            Ok(())
        }
    }
}
