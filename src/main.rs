use anyhow::Result;
use clap::{Parser, Subcommand};
use mamotama_admin::config::{self, AdminConfig, Overrides};
use mamotama_admin::{cli, logging};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "mamotama-admin")]
#[command(version = mamotama_admin::VERSION)]
#[command(about = "Admin console for the Mamotama WAF", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend API base URL
    #[arg(long, global = true, env = "MAMOTAMA_API_BASE")]
    api_base: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, global = true, env = "MAMOTAMA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Page the console opens on
    #[arg(long, global = true, env = "MAMOTAMA_START_PAGE")]
    start_page: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive console
    Tui(cli::TuiArgs),

    /// Print backend status
    Status,

    /// Read, tail and download logs
    Logs(cli::LogsArgs),

    /// Print the loaded rule files
    Rules,

    /// Legacy bypass list
    Bypass(cli::BypassArgs),

    /// Structured bypass rules
    BypassRules(cli::BypassRulesArgs),

    /// Cache rules
    CacheRules(cli::CacheRulesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        api_base: cli.api_base,
        api_key: cli.api_key,
        start_page: cli.start_page,
        log_level: cli.log_level,
    };
    let config = AdminConfig::load(cli.config.as_deref(), &overrides)?;

    let warnings = config.validate()?;
    if config::validator::has_errors(&warnings) {
        for warning in &warnings {
            eprintln!("{}", warning);
        }
        anyhow::bail!("Invalid configuration");
    }

    let interactive = matches!(cli.command, Commands::Tui(_));
    logging::init_logging(&config.logging, interactive)?;
    for warning in &warnings {
        if interactive {
            warn!("{}", warning);
        } else {
            eprintln!("{}", warning);
        }
    }

    let ctx = cli::Context::new(config)?;

    match cli.command {
        Commands::Tui(args) => cli::tui::run(args, ctx).await,
        Commands::Status => cli::status::run(ctx).await,
        Commands::Logs(args) => cli::logs::run(args, ctx).await,
        Commands::Rules => cli::rules::run(ctx).await,
        Commands::Bypass(args) => cli::bypass::run(args, ctx).await,
        Commands::BypassRules(args) => cli::bypass::run_rules(args, ctx).await,
        Commands::CacheRules(args) => cli::cache::run(args, ctx).await,
    }
}
