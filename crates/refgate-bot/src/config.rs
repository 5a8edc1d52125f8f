//! Environment-driven configuration.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use refgate_ledger::threshold::DEFAULT_TARGET;

use crate::error::{Error, Result};

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Reward message used when `REWARD_TEXT` is unset.
pub const DEFAULT_REWARD_TEXT: &str =
    "🎁 Congrats! You reached the referral goal. Contact the channel admins to claim your reward.";

/// Configuration for a bot node.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot API credential (`BOT_TOKEN`)
    pub bot_token: String,

    /// Gated channel, `@name` or numeric id (`CHANNEL_USERNAME`)
    pub channel: String,

    /// Referrals required for the reward (`REF_TARGET`)
    pub ref_target: usize,

    /// Reward message body (`REWARD_TEXT`)
    pub reward_text: String,

    /// RocksDB directory; `None` keeps state in memory (`REFGATE_DATA_DIR`)
    pub data_dir: Option<PathBuf>,

    /// Health/count HTTP API address; `None` disables it (`REFGATE_API_ADDR`)
    pub api_addr: Option<SocketAddr>,

    /// Bot API base URL (`TELEGRAM_API_URL`)
    pub api_url: String,

    /// Upper bound on a membership lookup (`MEMBERSHIP_TIMEOUT_SECS`)
    pub membership_timeout: Duration,

    /// Long-poll timeout for `getUpdates` (`POLL_TIMEOUT_SECS`)
    pub poll_timeout: Duration,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("channel", &self.channel)
            .field("ref_target", &self.ref_target)
            .field("reward_text", &self.reward_text)
            .field("data_dir", &self.data_dir)
            .field("api_addr", &self.api_addr)
            .field("api_url", &self.api_url)
            .field("membership_timeout", &self.membership_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl BotConfig {
    /// Create config from environment variables.
    ///
    /// Fails if `BOT_TOKEN` or `CHANNEL_USERNAME` is missing, or if any
    /// optional variable is set to an unparsable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN");
        let channel = var("CHANNEL_USERNAME");
        let (bot_token, channel) = match (bot_token, channel) {
            (Some(token), Some(channel)) => (token, channel),
            _ => {
                return Err(Error::Config(
                    "Missing BOT_TOKEN or CHANNEL_USERNAME environment variables".into(),
                ))
            }
        };

        let ref_target = parse_var(&var, "REF_TARGET")?.unwrap_or(DEFAULT_TARGET);
        if ref_target == 0 {
            return Err(Error::Config("REF_TARGET must be at least 1".into()));
        }

        let reward_text = lookup("REWARD_TEXT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REWARD_TEXT.to_string());

        let data_dir = var("REFGATE_DATA_DIR").map(PathBuf::from);
        let api_addr = parse_var(&var, "REFGATE_API_ADDR")?;
        let api_url = var("TELEGRAM_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let membership_timeout = parse_var(&var, "MEMBERSHIP_TIMEOUT_SECS")?.unwrap_or(5);
        let poll_timeout = parse_var(&var, "POLL_TIMEOUT_SECS")?.unwrap_or(30);
        if membership_timeout == 0 {
            return Err(Error::Config("MEMBERSHIP_TIMEOUT_SECS must be at least 1".into()));
        }

        Ok(Self {
            bot_token,
            channel,
            ref_target,
            reward_text,
            data_dir,
            api_addr,
            api_url,
            membership_timeout: Duration::from_secs(membership_timeout),
            poll_timeout: Duration::from_secs(poll_timeout),
        })
    }
}

fn parse_var<T, F>(var: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| {
            raw.parse()
                .map_err(|_| Error::Config(format!("Invalid {}: {:?}", name, raw)))
        })
        .transpose()
}
