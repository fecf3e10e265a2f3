//! Reconciliation engine: one fail-fast pass over the address space.
//!
//! Enumerate addresses, fetch and decode each wallet through the injected
//! codec, validate per-wallet invariants, accumulate running totals, then
//! cross-check the totals against the network-stats record. Any failure
//! aborts the run; a single inconsistent wallet invalidates trust in the
//! whole snapshot, so there is no partial report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::amount::Amount;
use crate::codec::Codec;
use crate::error::{ReconError, TotalKind};
use crate::source::{wallet_store_key, FetchError, KvSource, StoreKey, ADDRESSES_SET, STATS_KEY};
use crate::types::WalletBalance;

/// Caller-initiated abort handle. Cloneable; all clones share one flag.
/// The engine observes cancellation before starting each fetch and stops
/// new work; in-flight store calls are allowed to finish.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Running totals for one validation pass. Owned by `run`, add-only,
/// read once at the end for the cross-check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Accumulator {
    pub wallet_count: u64,
    pub sum_unlocked: Amount,
    pub sum_locked: Amount,
}

impl Accumulator {
    fn record(&mut self, wallet: &WalletBalance) {
        self.sum_unlocked.add_assign(&wallet.unlocked.total);
        self.sum_locked.add_assign(&wallet.locked.total);
        self.wallet_count += 1;
    }
}

/// Result of a fully successful reconciliation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub wallet_count: u64,
    pub block_height: u64,
    pub sum_unlocked: Amount,
    pub sum_locked: Amount,
}

fn fetch_failure(key: &str, err: FetchError) -> ReconError {
    match err {
        FetchError::Timeout => ReconError::FetchTimeout {
            key: key.to_string(),
        },
        FetchError::Backend(reason) => ReconError::Store {
            key: key.to_string(),
            reason,
        },
    }
}

/// Per-wallet invariants, checked identically for every codec:
/// - unlocked: an itemized breakdown is optional and may be partial, so
///   `sum(outputs) <= total`;
/// - locked: locked funds must always itemize, so `sum(outputs) == total`.
fn check_wallet(address: &str, wallet: &WalletBalance) -> Result<(), ReconError> {
    if !wallet.unlocked.outputs.is_empty() && wallet.unlocked.output_sum() > wallet.unlocked.total {
        return Err(ReconError::BalanceOverflow {
            address: address.to_string(),
        });
    }
    if wallet.locked.output_sum() != wallet.locked.total {
        return Err(ReconError::BalanceMismatch {
            address: address.to_string(),
        });
    }
    Ok(())
}

/// Run one full reconciliation pass.
///
/// The codec is chosen once by the caller and injected; mixing formats
/// within a run is rejected upstream at configuration time. The source is
/// read-only; running twice over an unchanged store yields the same report.
pub fn run(
    source: &dyn KvSource,
    codec: &dyn Codec,
    cancel: &CancelToken,
) -> Result<Report, ReconError> {
    let mut acc = Accumulator::default();

    let members = source
        .enumerate(ADDRESSES_SET)
        .map_err(|e| fetch_failure(ADDRESSES_SET, e))?;
    for member in members {
        if cancel.is_cancelled() {
            return Err(ReconError::Cancelled);
        }
        let address = member.map_err(|e| fetch_failure(ADDRESSES_SET, e))?;
        let key = wallet_store_key(&address);
        let bytes = match source.get(&key).map_err(|e| fetch_failure(&address, e))? {
            Some(bytes) => bytes,
            // Referenced but unpopulated address: contributes nothing,
            // not counted, not an error.
            None => continue,
        };
        let wallet = codec
            .decode_wallet(&bytes)
            .map_err(|reason| ReconError::Decode {
                key: address.clone(),
                reason,
            })?;
        check_wallet(&address, &wallet)?;
        acc.record(&wallet);
    }

    if cancel.is_cancelled() {
        return Err(ReconError::Cancelled);
    }
    let stats_key = StoreKey::Plain(STATS_KEY.to_string());
    let bytes = source
        .get(&stats_key)
        .map_err(|e| fetch_failure(STATS_KEY, e))?
        .ok_or(ReconError::MissingStats)?;
    let stats = codec
        .decode_stats(&bytes)
        .map_err(|reason| ReconError::Decode {
            key: STATS_KEY.to_string(),
            reason,
        })?;

    let expected_unlocked = stats.unlocked_coins().ok_or_else(|| ReconError::StatsInvalid {
        total: stats.total_coins.clone(),
        locked: stats.locked_coins.clone(),
    })?;
    if expected_unlocked != acc.sum_unlocked {
        return Err(ReconError::Reconciliation {
            kind: TotalKind::Unlocked,
            expected: expected_unlocked,
            actual: acc.sum_unlocked,
        });
    }
    if stats.locked_coins != acc.sum_locked {
        return Err(ReconError::Reconciliation {
            kind: TotalKind::Locked,
            expected: stats.locked_coins,
            actual: acc.sum_locked,
        });
    }

    Ok(Report {
        wallet_count: acc.wallet_count,
        block_height: stats.block_height,
        sum_unlocked: acc.sum_unlocked,
        sum_locked: acc.sum_locked,
    })
}
