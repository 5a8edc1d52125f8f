//! Per-inviter referral state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::id::UserId;

/// Referral state of a single inviter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralRecord {
    /// The inviter this record aggregates.
    pub inviter: UserId,

    /// Every distinct user validly credited to this inviter.
    pub referred: BTreeSet<UserId>,

    /// Whether the reward has been issued. Never reset.
    pub rewarded: bool,
}

impl ReferralRecord {
    /// Create an empty record.
    pub fn new(inviter: UserId) -> Self {
        Self {
            inviter,
            referred: BTreeSet::new(),
            rewarded: false,
        }
    }

    /// Number of credited referrals.
    pub fn count(&self) -> usize {
        self.referred.len()
    }

    /// Add a referred user. Returns false if already present or if `user`
    /// is the inviter itself.
    pub(crate) fn insert(&mut self, user: UserId) -> bool {
        if user == self.inviter {
            return false;
        }
        self.referred.insert(user)
    }
}
