use super::Context;
use crate::api::{Direction, LogQuery, LogSource};
use crate::pages::download::{self, TimeRange};
use crate::pages::logs::{navigation, page_window};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Subcommand)]
pub enum LogsCommand {
    /// Read one page of a log source
    Read {
        /// Log source (waf, accerr, intr)
        #[arg(short, long, default_value = "waf")]
        src: LogSource,

        /// Lines per page (the backend clamps to 1..200)
        #[arg(short, long, default_value = "30")]
        tail: u32,

        /// Line offset to page from
        #[arg(long)]
        cursor: Option<u64>,

        /// Paging direction relative to the cursor (prev, next)
        #[arg(short, long)]
        dir: Option<Direction>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the legacy WAF log tail
    Tail,

    /// Download log sources as gzip-compressed NDJSON
    Download {
        /// Sources to fetch; all of them when omitted
        #[arg(short, long)]
        src: Vec<LogSource>,

        /// Lower time bound (RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// Upper time bound (RFC 3339)
        #[arg(long)]
        to: Option<String>,

        /// Directory to write into; defaults to ui.download_dir
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

pub async fn run(args: LogsArgs, ctx: Context) -> Result<()> {
    match args.command {
        LogsCommand::Read {
            src,
            tail,
            cursor,
            dir,
            format,
        } => {
            let query = LogQuery { src, tail, cursor, dir };
            let resp = ctx
                .client
                .read_logs(&query)
                .await
                .with_context(|| format!("Failed to read {} logs", src))?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&resp)?),
                "text" => {
                    let window = page_window(dir, resp.next_cursor, resp.lines.len());
                    let (can_prev, can_next) = navigation(dir, &resp, window);

                    println!("=== {} ===", src.label());
                    match window {
                        Some(w) => println!("Lines: {}..{} ({} shown)", w.start, w.end, w.len()),
                        None => println!("Lines: {} shown", resp.lines.len()),
                    }
                    println!();
                    for line in &resp.lines {
                        println!(
                            "{} {:6} {:>3} {} {}",
                            line.ts().unwrap_or("-"),
                            line.method().unwrap_or("-"),
                            line.status().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                            line.path().unwrap_or("-"),
                            line.rule_id().map(|r| format!("rule={}", r)).unwrap_or_default(),
                        );
                    }
                    println!();
                    if let Some(w) = window {
                        if can_prev {
                            println!("Older: --cursor {} --dir prev", w.start);
                        }
                        if can_next {
                            println!("Newer: --cursor {} --dir next", w.end);
                        }
                    }
                }
                _ => anyhow::bail!("Invalid format: {}. Use 'text' or 'json'", format),
            }
            Ok(())
        }

        LogsCommand::Tail => {
            let tail = ctx.client.log_tail().await.context("Failed to fetch log tail")?;
            for line in &tail.log_tail {
                println!("{}", line);
            }
            Ok(())
        }

        LogsCommand::Download {
            src,
            from,
            to,
            out_dir,
        } => {
            let sources = if src.is_empty() { LogSource::ALL.to_vec() } else { src };
            let dir = out_dir.unwrap_or_else(|| ctx.config.ui.download_dir.clone());
            let today = chrono::Local::now().date_naive();
            let range = TimeRange { from, to };

            let written = download::download_sources(&ctx.client, &sources, &dir, today, &range)
                .await
                .context("Log download failed")?;
            for path in &written {
                println!("[OK] {}", path.display());
            }
            Ok(())
        }
    }
}
