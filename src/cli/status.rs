use super::Context;
use anyhow::{Context as _, Result};

pub async fn run(ctx: Context) -> Result<()> {
    let status = ctx.client.status().await.context("Failed to fetch status")?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
