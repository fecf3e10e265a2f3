//! `tally-store` — key-value sources for the reconciliation engine.
//!
//! Provides a redb-backed store with canonical key byte layouts plus an
//! in-memory source for tests; both implement `tally_core::KvSource`.

pub mod db;
pub mod keys;
pub mod mem;

pub use db::{Store, WriteBatch};
pub use mem::MemSource;

#[cfg(test)]
mod tests;
