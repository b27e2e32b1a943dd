use super::Context;
use crate::tui;
use crate::tui::app::{App, Route};
use anyhow::Result;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct TuiArgs {
    /// Page to open first (e.g. /logs); overrides ui.start_page
    #[arg(short, long)]
    page: Option<String>,
}

pub async fn run(args: TuiArgs, mut ctx: Context) -> Result<()> {
    if let Some(page) = args.page {
        if Route::from_path(&page).is_none() {
            anyhow::bail!(
                "Unknown page: {}. Use one of: {}",
                page,
                Route::ALL.iter().map(|r| r.path()).collect::<Vec<_>>().join(", ")
            );
        }
        ctx.config.ui.start_page = page;
    }

    info!(api = %ctx.client.base_url(), page = %ctx.config.ui.start_page, "starting console");
    let app = App::new(ctx.client, &ctx.config);
    tui::run_tui(app).await
}
