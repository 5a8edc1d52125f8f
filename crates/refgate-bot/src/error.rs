//! Error types for the bot.

use thiserror::Error;

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with `ok: false`
    #[error("Telegram API error {code}: {description}")]
    Telegram { code: i64, description: String },

    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] refgate_ledger::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
