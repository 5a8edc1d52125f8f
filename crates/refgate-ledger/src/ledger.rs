//! The referral ledger.
//!
//! [`ReferralLedger::record_referral`] is the single mutation path. It runs
//! the whole check-insert-reward-commit sequence under one lock, so the
//! reward decision is always made on the latest committed count and at most
//! one caller ever sees [`Outcome::ThresholdReached`] for a given inviter.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::id::UserId;
use crate::record::ReferralRecord;
use crate::store::{MemoryStore, ReferralStore};
use crate::threshold::RewardPolicy;

/// Result of crediting a referral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The referred user was already credited to this inviter. Nothing changed.
    AlreadyCredited,
    /// The referred user was already credited to another inviter. Nothing changed.
    ClaimedByOther {
        /// The inviter holding the credit.
        inviter: UserId,
    },
    /// Credited; the new count is below the target or the reward was already issued.
    Credited(usize),
    /// Credited, and this credit issued the reward. Returned once per inviter.
    ThresholdReached(usize),
}

impl Outcome {
    /// The inviter's new count, if this call credited anyone.
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Credited(n) | Self::ThresholdReached(n) => Some(*n),
            Self::AlreadyCredited | Self::ClaimedByOther { .. } => None,
        }
    }
}

/// Owner of all referral state.
pub struct ReferralLedger<S = MemoryStore> {
    store: Mutex<S>,
    policy: RewardPolicy,
}

impl ReferralLedger<MemoryStore> {
    /// Create a volatile ledger.
    pub fn in_memory(target: usize) -> Self {
        Self::new(MemoryStore::new(), target)
    }
}

impl<S: ReferralStore> ReferralLedger<S> {
    /// Create a ledger over `store` with the given reward target.
    pub fn new(store: S, target: usize) -> Self {
        Self {
            store: Mutex::new(store),
            policy: RewardPolicy::new(target),
        }
    }

    /// The reward target.
    pub fn target(&self) -> usize {
        self.policy.target()
    }

    /// The reward policy.
    pub fn policy(&self) -> RewardPolicy {
        self.policy
    }

    // Records are only written through `commit` at the end of a critical
    // section, so a guard poisoned by a panic still sees consistent state.
    fn lock(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credit `referred` to `inviter`.
    ///
    /// The caller must already have confirmed that `referred` is a valid
    /// join (channel member). The ledger performs no I/O beyond its store.
    pub fn record_referral(&self, inviter: UserId, referred: UserId) -> Result<Outcome> {
        if inviter == referred {
            return Err(Error::SelfReferral(inviter));
        }

        let mut store = self.lock();

        if let Some(owner) = store.referrer_of(referred)? {
            if owner == inviter {
                debug!("{} already credited to {}", referred, inviter);
                return Ok(Outcome::AlreadyCredited);
            }
            debug!("{} already credited to {}, not {}", referred, owner, inviter);
            return Ok(Outcome::ClaimedByOther { inviter: owner });
        }

        let mut record = store
            .load(inviter)?
            .unwrap_or_else(|| ReferralRecord::new(inviter));

        if !record.insert(referred) {
            return Ok(Outcome::AlreadyCredited);
        }

        let count = record.count();
        let outcome = if !record.rewarded && self.policy.is_met(count) {
            record.rewarded = true;
            Outcome::ThresholdReached(count)
        } else {
            Outcome::Credited(count)
        };

        store.commit(&record, referred)?;

        info!(
            "Credited {} to {} ({}/{}){}",
            referred,
            inviter,
            count,
            self.policy.target(),
            if matches!(outcome, Outcome::ThresholdReached(_)) { ", reward issued" } else { "" }
        );

        Ok(outcome)
    }

    /// Number of referrals credited to `user`; 0 if it has no record.
    pub fn count(&self, user: UserId) -> Result<usize> {
        Ok(self.lock().load(user)?.map_or(0, |r| r.count()))
    }

    /// Whether `user` has a record.
    pub fn has_record(&self, user: UserId) -> Result<bool> {
        Ok(self.lock().load(user)?.is_some())
    }

    /// Snapshot of a user's record.
    pub fn record(&self, user: UserId) -> Result<Option<ReferralRecord>> {
        self.lock().load(user)
    }
}
