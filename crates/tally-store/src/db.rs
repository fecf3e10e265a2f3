//! redb-backed key-value source.
//!
//! Two logical tables:
//! - `set_members` — one entry per member of a named set (empty values)
//! - `values`     — wallet records (row/field keys) and plain-keyed records
//!
//! Reads implement the core's `KvSource` seam; the write side exists for
//! seeding databases and tests. redb is a local file store, so the fetch
//! timeout bound of remote sources never fires here.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};

use tally_core::{FetchError, KvSource, MemberIter, StoreKey};

use crate::keys::{decode_member_key, encode_member_key, encode_value_key, member_key_prefix};

const SET_MEMBERS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("set_members");
const VALUES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("values");

pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) a redb database at `path`.
    pub fn open(path: &Path) -> Result<Self, String> {
        let db = Database::create(path).map_err(|e| format!("redb open: {e}"))?;
        // Ensure both tables exist by opening a write transaction.
        let tx = db
            .begin_write()
            .map_err(|e| format!("redb begin_write: {e}"))?;
        tx.open_table(SET_MEMBERS_TABLE)
            .map_err(|e| format!("create set_members table: {e}"))?;
        tx.open_table(VALUES_TABLE)
            .map_err(|e| format!("create values table: {e}"))?;
        tx.commit().map_err(|e| format!("redb commit: {e}"))?;
        Ok(Self { db })
    }

    /// Begin a write transaction for seeding. Stage mutations on the
    /// returned `WriteBatch`, then call `commit()`.
    pub fn begin_write(&self) -> Result<WriteBatch, String> {
        let tx = self
            .db
            .begin_write()
            .map_err(|e| format!("begin_write: {e}"))?;
        Ok(WriteBatch { tx })
    }

    fn members_of(&self, set: &str) -> Result<Vec<Result<String, FetchError>>, FetchError> {
        let backend = |e: String| FetchError::Backend(e);
        let tx = self
            .db
            .begin_read()
            .map_err(|e| backend(format!("begin_read: {e}")))?;
        let table = tx
            .open_table(SET_MEMBERS_TABLE)
            .map_err(|e| backend(format!("open set_members: {e}")))?;
        let prefix = member_key_prefix(set);
        let iter = table
            .range(prefix.as_slice()..)
            .map_err(|e| backend(format!("set_members range: {e}")))?;
        let mut members = Vec::new();
        for entry in iter {
            let (key_guard, _) = match entry {
                Ok(pair) => pair,
                Err(e) => {
                    members.push(Err(FetchError::Backend(format!("set_members next: {e}"))));
                    break;
                }
            };
            let key = key_guard.value();
            if !key.starts_with(&prefix) {
                break;
            }
            members.push(decode_member_key(&prefix, key).map_err(FetchError::Backend));
        }
        Ok(members)
    }
}

impl KvSource for Store {
    // The read transaction cannot outlive this call, so members are
    // materialized up front; sets are address lists, not bulk data.
    fn enumerate(&self, set: &str) -> Result<MemberIter<'_>, FetchError> {
        let members = self.members_of(set)?;
        Ok(Box::new(members.into_iter()))
    }

    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, FetchError> {
        let backend = |e: String| FetchError::Backend(e);
        let raw = encode_value_key(key);
        let tx = self
            .db
            .begin_read()
            .map_err(|e| backend(format!("begin_read: {e}")))?;
        let table = tx
            .open_table(VALUES_TABLE)
            .map_err(|e| backend(format!("open values: {e}")))?;
        match table
            .get(raw.as_slice())
            .map_err(|e| backend(format!("get value: {e}")))?
        {
            Some(guard) => Ok(Some(guard.value().to_vec())),
            None => Ok(None),
        }
    }
}

/// Wraps a redb write transaction for atomic multi-key seeding.
pub struct WriteBatch {
    tx: WriteTransaction,
}

impl WriteBatch {
    pub fn add_member(&self, set: &str, member: &str) -> Result<(), String> {
        let key = encode_member_key(set, member);
        let mut table = self
            .tx
            .open_table(SET_MEMBERS_TABLE)
            .map_err(|e| format!("open set_members: {e}"))?;
        table
            .insert(key.as_slice(), b"".as_slice())
            .map_err(|e| format!("add member: {e}"))?;
        Ok(())
    }

    pub fn put(&self, key: &StoreKey, value: &[u8]) -> Result<(), String> {
        let raw = encode_value_key(key);
        let mut table = self
            .tx
            .open_table(VALUES_TABLE)
            .map_err(|e| format!("open values: {e}"))?;
        table
            .insert(raw.as_slice(), value)
            .map_err(|e| format!("put value: {e}"))?;
        Ok(())
    }

    /// Commit the batch atomically.
    pub fn commit(self) -> Result<(), String> {
        self.tx.commit().map_err(|e| format!("commit: {e}"))
    }
}
