//! Canonical in-memory representation of wallet balances and chain stats.
//!
//! Every codec decodes into these structs; the shape is fixed regardless of
//! wire format. All entities live for a single validation pass only.

use std::collections::BTreeMap;

use crate::amount::Amount;

/// One discrete fund entry contributing to a balance bucket's total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub amount: Amount,
    pub description: Option<String>,
    /// Unlock timestamp; set for locked outputs, absent for unlocked ones.
    pub locked_until: Option<u64>,
}

/// A balance bucket: a stated total plus an (id -> output) breakdown.
///
/// Ordered by output id so iteration and re-encoding are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceBucket {
    pub total: Amount,
    pub outputs: BTreeMap<String, Output>,
}

impl BalanceBucket {
    /// Exact sum of all itemized output amounts.
    pub fn output_sum(&self) -> Amount {
        let mut sum = Amount::zero();
        for output in self.outputs.values() {
            sum.add_assign(&output.amount);
        }
        sum
    }
}

/// The balance state of one wallet. Either bucket may be absent on the wire;
/// absence decodes to a zero total with no outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletBalance {
    pub unlocked: BalanceBucket,
    pub locked: BalanceBucket,
}

/// Chain-wide authoritative totals, fetched once per validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainStats {
    pub block_height: u64,
    pub timestamp: u64,
    pub total_coins: Amount,
    pub locked_coins: Amount,
}

impl ChainStats {
    /// Derived unlocked figure: `total_coins - locked_coins`.
    /// `None` when the record claims more locked than total coins.
    pub fn unlocked_coins(&self) -> Option<Amount> {
        self.total_coins.checked_sub(&self.locked_coins)
    }
}
