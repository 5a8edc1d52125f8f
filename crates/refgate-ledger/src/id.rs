//! Chat user identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a chat user.
///
/// Wraps the numeric id assigned by the chat transport. Ids taken from
/// untrusted text (deep-link arguments) go through [`UserId::parse`], which
/// only accepts positive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw id as delivered by the transport.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parse an id from user-supplied text.
    ///
    /// Returns `None` for anything that is not a positive integer.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Some(Self(id)),
            _ => None,
        }
    }

    /// The raw numeric id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
