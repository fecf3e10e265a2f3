use core::fmt;

use crate::amount::Amount;

/// Which aggregate figure a cross-check failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotalKind {
    Unlocked,
    Locked,
}

impl TotalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TotalKind::Unlocked => "unlocked",
            TotalKind::Locked => "locked",
        }
    }
}

/// Terminal failures of a reconciliation run.
///
/// Every variant aborts the run; there is no internal recovery and no
/// partial-success state. The first error observed carries the full context
/// (offending key or address, expected vs actual values).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconError {
    /// Payload present but unparseable under the selected codec.
    Decode { key: String, reason: String },
    /// The store did not answer within the configured bound.
    /// Retryable by the caller; never retried internally.
    FetchTimeout { key: String },
    /// Store backend failure other than a timeout.
    Store { key: String, reason: String },
    /// Unlocked outputs sum exceeds the stated unlocked total.
    BalanceOverflow { address: String },
    /// Locked outputs sum differs from the stated locked total.
    BalanceMismatch { address: String },
    /// The global stats record is absent.
    MissingStats,
    /// The stats record claims more locked than total coins.
    StatsInvalid { total: Amount, locked: Amount },
    /// Aggregated wallet totals disagree with the published stats.
    Reconciliation {
        kind: TotalKind,
        expected: Amount,
        actual: Amount,
    },
    /// The caller aborted the run via its cancel token.
    Cancelled,
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconError::Decode { key, reason } => {
                write!(f, "failed to decode value for key {key}: {reason}")
            }
            ReconError::FetchTimeout { key } => {
                write!(f, "fetch timed out for key {key}")
            }
            ReconError::Store { key, reason } => {
                write!(f, "store failure for key {key}: {reason}")
            }
            ReconError::BalanceOverflow { address } => {
                write!(f, "invalid unlocked balance for wallet {address}: outputs exceed total")
            }
            ReconError::BalanceMismatch { address } => {
                write!(f, "invalid locked balance for wallet {address}: outputs do not sum to total")
            }
            ReconError::MissingStats => write!(f, "network stats record is missing"),
            ReconError::StatsInvalid { total, locked } => {
                write!(f, "invalid network stats: locked coins {locked} exceed total coins {total}")
            }
            ReconError::Reconciliation {
                kind,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "unexpected total {} coins: {expected} != {actual}",
                    kind.as_str()
                )
            }
            ReconError::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl std::error::Error for ReconError {}
