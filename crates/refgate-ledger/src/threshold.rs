//! Reward threshold.
//!
//! An inviter qualifies for the reward once its count of valid referrals
//! reaches the target. The reward is a single event: later referrals never
//! re-arm it.

/// Default number of valid referrals required for the reward.
pub const DEFAULT_TARGET: usize = 3;

/// Threshold policy applied by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPolicy {
    target: usize,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

impl RewardPolicy {
    /// Create a policy. A target of 0 is raised to 1 so that a reward always
    /// follows at least one credit.
    pub const fn new(target: usize) -> Self {
        Self {
            target: if target == 0 { 1 } else { target },
        }
    }

    /// The configured target.
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Check if a referral count meets the target.
    pub const fn is_met(&self, count: usize) -> bool {
        count >= self.target
    }

    /// How many more referrals are needed to meet the target.
    pub const fn remaining(&self, count: usize) -> usize {
        self.target.saturating_sub(count)
    }
}
