//! Storage backends for referral state.
//!
//! The ledger owns exactly one store and only touches it while holding its
//! lock, so implementations need no internal synchronization.

use std::collections::HashMap;

use crate::error::Result;
use crate::id::UserId;
use crate::record::ReferralRecord;

/// Key-value persistence for referral records.
pub trait ReferralStore: Send {
    /// Load the record of an inviter, if one exists.
    fn load(&self, inviter: UserId) -> Result<Option<ReferralRecord>>;

    /// Look up which inviter a user was credited to.
    fn referrer_of(&self, referred: UserId) -> Result<Option<UserId>>;

    /// Persist an updated record together with the attribution of
    /// `referred` to `record.inviter`. Both writes land or neither does.
    fn commit(&mut self, record: &ReferralRecord, referred: UserId) -> Result<()>;
}

impl<S: ReferralStore + ?Sized> ReferralStore for Box<S> {
    fn load(&self, inviter: UserId) -> Result<Option<ReferralRecord>> {
        (**self).load(inviter)
    }

    fn referrer_of(&self, referred: UserId) -> Result<Option<UserId>> {
        (**self).referrer_of(referred)
    }

    fn commit(&mut self, record: &ReferralRecord, referred: UserId) -> Result<()> {
        (**self).commit(record, referred)
    }
}

/// Volatile in-memory store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Records keyed by inviter.
    records: HashMap<UserId, ReferralRecord>,

    /// Referred user -> inviter it was credited to.
    referrers: HashMap<UserId, UserId>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of inviters with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record exists yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReferralStore for MemoryStore {
    fn load(&self, inviter: UserId) -> Result<Option<ReferralRecord>> {
        Ok(self.records.get(&inviter).cloned())
    }

    fn referrer_of(&self, referred: UserId) -> Result<Option<UserId>> {
        Ok(self.referrers.get(&referred).copied())
    }

    fn commit(&mut self, record: &ReferralRecord, referred: UserId) -> Result<()> {
        self.referrers.insert(referred, record.inviter);
        self.records.insert(record.inviter, record.clone());
        Ok(())
    }
}
