//! Inbound command parsing.

use refgate_ledger::UserId;

/// A bot command recognized in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start [arg]`; `arg` is the raw deep-link payload, if any.
    Start { arg: Option<String> },
    /// `/link`
    Link,
    /// `/check`
    Check,
    /// `/help`
    Help,
}

impl Command {
    /// Parse message text addressed to `bot_username`.
    ///
    /// Accepts `/cmd` and `/cmd@bot_username` (case-insensitive mention).
    /// Returns `None` for plain text, unknown commands, and commands
    /// addressed to a different bot.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;

        let name = match head.split_once('@') {
            Some((name, mention)) if mention.eq_ignore_ascii_case(bot_username) => name,
            Some(_) => return None,
            None => head,
        };

        match name {
            "start" => Some(Self::Start {
                arg: parts.next().map(str::to_string),
            }),
            "link" => Some(Self::Link),
            "check" => Some(Self::Check),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Personal referral link of `user`.
pub fn referral_link(bot_username: &str, user: UserId) -> String {
    format!("https://t.me/{}?start={}", bot_username, user)
}
