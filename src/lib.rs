pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod pages;
pub mod tui;

pub use api::{ApiClient, ApiError};
pub use config::AdminConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
