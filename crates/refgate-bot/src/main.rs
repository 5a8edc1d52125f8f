//! Refgate bot binary
//!
//! Long-polls the Bot API and credits channel-gated referrals.

use refgate_bot::{BotConfig, BotNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refgate=info,refgate_bot=info,refgate_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Refgate");

    // Missing BOT_TOKEN / CHANNEL_USERNAME stops the process here.
    let config = BotConfig::from_env().inspect_err(|e| tracing::error!("{}", e))?;

    let node = BotNode::new(config).await?;
    node.run().await?;

    Ok(())
}
