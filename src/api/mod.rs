pub mod client;
pub mod disposition;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use disposition::filename_from_disposition;
pub use error::{ApiError, ApiResult};
pub use types::*;
