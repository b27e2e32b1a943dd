use super::Context;
use anyhow::{Context as _, Result};

pub async fn run(ctx: Context) -> Result<()> {
    let rules = ctx.client.rules().await.context("Failed to fetch rules")?;

    if rules.is_empty() {
        println!("No rule files loaded");
        return Ok(());
    }

    for (path, body) in &rules {
        println!("=== {} ===", path);
        println!("{}", body.trim_end());
        println!();
    }
    Ok(())
}
