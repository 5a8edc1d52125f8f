//! Persistent storage using RocksDB.

use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;

use crate::error::Result;
use crate::id::UserId;
use crate::record::ReferralRecord;
use crate::store::ReferralStore;

/// Durable referral store.
///
/// Layout:
/// - `record:{inviter}` -> JSON [`ReferralRecord`]
/// - `referrer:{referred}` -> inviter id as decimal text
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }
}

fn record_key(inviter: UserId) -> String {
    format!("record:{}", inviter)
}

fn referrer_key(referred: UserId) -> String {
    format!("referrer:{}", referred)
}

impl ReferralStore for RocksStore {
    fn load(&self, inviter: UserId) -> Result<Option<ReferralRecord>> {
        match self.db.get(record_key(inviter).as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn referrer_of(&self, referred: UserId) -> Result<Option<UserId>> {
        match self.db.get(referrer_key(referred).as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn commit(&mut self, record: &ReferralRecord, referred: UserId) -> Result<()> {
        let mut batch = WriteBatch::default();
        batch.put(record_key(record.inviter).as_bytes(), serde_json::to_vec(record)?);
        batch.put(referrer_key(referred).as_bytes(), serde_json::to_vec(&record.inviter)?);
        self.db.write(batch)?;
        Ok(())
    }
}
