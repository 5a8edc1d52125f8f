//! Refgate Ledger - referral crediting with exactly-once rewards
//!
//! The ledger is the only component that reads or writes referral state.
//! Everything else (chat transport, membership lookup, notification
//! delivery) talks to it through [`ReferralLedger`] and reacts to the
//! [`Outcome`] it returns.
//!
//! # Guarantees
//!
//! - **No self-referral**: an inviter can never be credited with itself
//! - **First inviter wins**: a referred user is credited to one inviter, once
//! - **Exactly-once reward**: `ThresholdReached` is returned at most once per inviter
//! - **Monotonic counts**: a referred set only ever grows
//!
//! # Example
//!
//! ```
//! use refgate_ledger::{MemoryStore, Outcome, ReferralLedger, UserId};
//!
//! let ledger = ReferralLedger::new(MemoryStore::new(), 2);
//! let inviter = UserId::new(1);
//!
//! assert_eq!(ledger.record_referral(inviter, UserId::new(2)).unwrap(), Outcome::Credited(1));
//! assert_eq!(ledger.record_referral(inviter, UserId::new(3)).unwrap(), Outcome::ThresholdReached(2));
//! assert_eq!(ledger.record_referral(inviter, UserId::new(3)).unwrap(), Outcome::AlreadyCredited);
//! assert_eq!(ledger.count(inviter).unwrap(), 2);
//! ```

pub mod error;
pub mod id;
pub mod ledger;
pub mod record;
pub mod rocks;
pub mod store;
pub mod threshold;

pub use error::{Error, Result};
pub use id::UserId;
pub use ledger::{Outcome, ReferralLedger};
pub use record::ReferralRecord;
pub use rocks::RocksStore;
pub use store::{MemoryStore, ReferralStore};
pub use threshold::RewardPolicy;
