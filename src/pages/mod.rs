//! View state for each console page, independent of how it is drawn.
//!
//! Pages own their data and issue requests through a [`task::Latest`] slot,
//! so the render loop only ever calls `poll` and never waits on the network.

pub mod bypass;
pub mod bypass_rules;
pub mod cache;
pub mod download;
pub mod logs;
pub mod rules;
pub mod status;
pub mod task;

pub use bypass::RawBypassEditor;
pub use bypass_rules::BypassRulesEditor;
pub use cache::{CacheField, CacheRulesEditor, EditMode};
pub use logs::{LogViewer, PageWindow, RowTone};
pub use rules::RulesView;
pub use status::StatusView;
pub use task::Latest;
