//! `tally-core` — multi-codec ledger reconciliation engine.
//!
//! Audits an explorer key-value database: every wallet's balance buckets
//! must be internally consistent with their itemized outputs, and the sum
//! of all wallet balances must match the published network stats. Wallet
//! and stats records may be stored in any one of three wire encodings
//! (MessagePack, JSON, Protocol Buffers); a run decodes all records
//! through a single codec chosen at configuration time.

pub mod amount;
pub mod codec;
pub mod engine;
pub mod error;
pub mod source;
pub mod types;

pub use amount::Amount;
pub use codec::{Codec, Encoding};
pub use engine::{run, Accumulator, CancelToken, Report};
pub use error::{ReconError, TotalKind};
pub use source::{
    wallet_store_key, FetchError, KvSource, MemberIter, StoreKey, ADDRESSES_SET,
    ADDRESS_KEY_PREFIX, STATS_KEY,
};
pub use types::{BalanceBucket, ChainStats, Output, WalletBalance};
