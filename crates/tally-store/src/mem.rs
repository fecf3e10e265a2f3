//! In-memory key-value source for tests and dry runs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tally_core::{FetchError, KvSource, MemberIter, StoreKey};

/// Map-backed source mirroring the redb layout. The `time_out` knob makes
/// a specific key behave like a store that missed its fetch deadline.
#[derive(Default)]
pub struct MemSource {
    sets: BTreeMap<String, BTreeSet<String>>,
    values: HashMap<StoreKey, Vec<u8>>,
    timeouts: HashSet<StoreKey>,
}

impl MemSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, set: &str, member: &str) {
        self.sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
    }

    pub fn put(&mut self, key: StoreKey, value: Vec<u8>) {
        self.values.insert(key, value);
    }

    /// Make every fetch of `key` fail with `FetchError::Timeout`.
    pub fn time_out(&mut self, key: StoreKey) {
        self.timeouts.insert(key);
    }
}

impl KvSource for MemSource {
    fn enumerate(&self, set: &str) -> Result<MemberIter<'_>, FetchError> {
        match self.sets.get(set) {
            Some(members) => Ok(Box::new(members.iter().cloned().map(Ok))),
            None => Ok(Box::new(std::iter::empty())),
        }
    }

    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, FetchError> {
        if self.timeouts.contains(key) {
            return Err(FetchError::Timeout);
        }
        Ok(self.values.get(key).cloned())
    }
}
