/*
 * Responsibility
 * - Binary entry point: delegates to app::run()
 */
use anyhow::Result;
use oidc_actions::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
