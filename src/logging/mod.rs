use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `interactive` is set while the TUI owns the terminal: stderr output would
/// corrupt the screen, so only a file output keeps logging then.
pub fn init_logging(config: &LoggingConfig, interactive: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let writer = match config.output.as_str() {
        "stderr" if interactive => BoxMakeWriter::new(io::sink),
        "stderr" => BoxMakeWriter::new(io::stderr),
        "stdout" if interactive => BoxMakeWriter::new(io::sink),
        "stdout" => BoxMakeWriter::new(io::stdout),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    let ansi = !interactive && config.output == "stderr";
    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format.as_str() {
        "json" => registry.with(fmt::layer().json().with_writer(writer)).try_init(),
        "pretty" => registry.with(fmt::layer().pretty().with_writer(writer)).try_init(),
        _ => registry
            .with(fmt::layer().with_writer(writer).with_ansi(ansi))
            .try_init(),
    };

    result.context("Failed to install tracing subscriber")
}
