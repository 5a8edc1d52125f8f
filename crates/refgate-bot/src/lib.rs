//! Refgate Bot - channel-gated referral rewards over Telegram
//!
//! Users share a personal `t.me` deep link. When an invited user has joined
//! the gated channel and starts the bot through that link, the inviter is
//! credited once; at the configured target the inviter receives the reward
//! message exactly once.
//!
//! # Architecture
//!
//! - **Config**: environment variables, validated at startup
//! - **Telegram**: thin Bot API client (`getMe`, `getUpdates`, `sendMessage`, `getChatMember`)
//! - **Membership**: fail-closed channel membership oracle
//! - **Router**: `/start`, `/link`, `/check`, `/help` → reply + notifications
//! - **Dispatch**: fire-and-forget notification delivery
//! - **API**: optional HTTP health and referral status endpoints
//!
//! # Example
//!
//! ```no_run
//! use refgate_bot::{BotConfig, BotNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::from_env()?;
//!     let node = BotNode::new(config).await?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod membership;
pub mod messages;
pub mod node;
pub mod router;
pub mod telegram;

pub use command::{referral_link, Command};
pub use config::BotConfig;
pub use dispatch::{Dispatcher, Notifier};
pub use error::{Error, Result};
pub use membership::{ChannelMembership, MembershipOracle};
pub use node::{BotNode, Ledger};
pub use router::{CommandRouter, Invocation, Notification, NotificationKind, Response};
pub use telegram::TelegramClient;
