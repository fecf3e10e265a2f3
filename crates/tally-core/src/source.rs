//! Seam between the engine and the external key-value store.
//!
//! The store is a collaborator, not part of the core: it only has to
//! enumerate members of a set and fetch a value by key. Concrete
//! implementations (redb-backed, in-memory) live in `tally-store`.

/// Name of the set holding every unique address seen on chain.
pub const ADDRESSES_SET: &str = "addresses";

/// Key of the singleton network-stats record.
pub const STATS_KEY: &str = "stats";

/// Row prefix for wallet records.
pub const ADDRESS_KEY_PREFIX: &str = "a:";

/// Failure of a single store operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// The store did not respond within the caller-supplied bound.
    Timeout,
    /// Any other backend failure.
    Backend(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "store timed out"),
            FetchError::Backend(reason) => write!(f, "store failure: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A key in the store. Wallet records are addressed by row + field
/// (a hash field in the original redis layout); the stats record and set
/// names are plain keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Plain(String),
    Field { row: String, field: String },
}

impl StoreKey {
    /// Human-readable form for error reporting.
    pub fn describe(&self) -> String {
        match self {
            StoreKey::Plain(key) => key.clone(),
            StoreKey::Field { row, field } => format!("{row}:{field}"),
        }
    }
}

/// Derive the store key for a wallet record: the row is the `a:` prefix plus
/// the first 6 characters of the address, the field is the remainder.
/// Split on a char boundary so multi-byte addresses cannot panic.
pub fn wallet_store_key(address: &str) -> StoreKey {
    let split = address
        .char_indices()
        .nth(6)
        .map(|(i, _)| i)
        .unwrap_or(address.len());
    let (head, tail) = address.split_at(split);
    StoreKey::Field {
        row: format!("{ADDRESS_KEY_PREFIX}{head}"),
        field: tail.to_string(),
    }
}

/// Lazy, finite sequence of distinct set members. Order is unspecified;
/// each member appears exactly once.
pub type MemberIter<'a> = Box<dyn Iterator<Item = Result<String, FetchError>> + 'a>;

/// Read-only view of the external key-value store.
pub trait KvSource {
    fn enumerate(&self, set: &str) -> Result<MemberIter<'_>, FetchError>;

    /// `Ok(None)` means "no value for this key" and is not an error.
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, FetchError>;
}
