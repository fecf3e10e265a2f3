//! Protocol Buffers wire format.
//!
//! Message structs are written by hand with prost derives instead of
//! generated from a .proto file; the schema is small and frozen, and the
//! tag numbers below must match the explorer's `types.proto` exactly.
//! The stats message carries many more fields on the wire (transaction
//! counters, payout totals); prost skips the tags we do not declare.

use std::collections::HashMap;

use prost::Message;

use super::Codec;
use crate::amount::Amount;
use crate::types::{BalanceBucket, ChainStats, Output, WalletBalance};

pub struct ProtobufCodec;

#[derive(Clone, PartialEq, Message)]
struct PbWallet {
    #[prost(message, optional, tag = "1")]
    balance_unlocked: Option<PbUnlockedBalance>,
    #[prost(message, optional, tag = "2")]
    balance_locked: Option<PbLockedBalance>,
}

#[derive(Clone, PartialEq, Message)]
struct PbUnlockedBalance {
    #[prost(bytes = "vec", tag = "1")]
    total: Vec<u8>,
    #[prost(map = "string, message", tag = "2")]
    outputs: HashMap<String, PbUnlockedOutput>,
}

#[derive(Clone, PartialEq, Message)]
struct PbUnlockedOutput {
    #[prost(bytes = "vec", tag = "1")]
    amount: Vec<u8>,
    #[prost(string, optional, tag = "2")]
    description: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct PbLockedBalance {
    #[prost(bytes = "vec", tag = "1")]
    total: Vec<u8>,
    #[prost(map = "string, message", tag = "2")]
    outputs: HashMap<String, PbLockedOutput>,
}

#[derive(Clone, PartialEq, Message)]
struct PbLockedOutput {
    #[prost(bytes = "vec", tag = "1")]
    amount: Vec<u8>,
    #[prost(uint64, optional, tag = "2")]
    locked_until: Option<u64>,
    #[prost(string, optional, tag = "3")]
    description: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct PbNetworkStats {
    #[prost(uint64, tag = "1")]
    timestamp: u64,
    #[prost(uint64, tag = "2")]
    blockheight: u64,
    #[prost(bytes = "vec", tag = "14")]
    coins: Vec<u8>,
    #[prost(bytes = "vec", tag = "15")]
    locked_coins: Vec<u8>,
}

fn unlocked_to_canonical(balance: PbUnlockedBalance) -> BalanceBucket {
    let outputs = balance
        .outputs
        .into_iter()
        .map(|(id, output)| {
            (
                id,
                Output {
                    amount: Amount::from_be_bytes(&output.amount),
                    description: output.description,
                    locked_until: None,
                },
            )
        })
        .collect();
    BalanceBucket {
        total: Amount::from_be_bytes(&balance.total),
        outputs,
    }
}

fn locked_to_canonical(balance: PbLockedBalance) -> BalanceBucket {
    let outputs = balance
        .outputs
        .into_iter()
        .map(|(id, output)| {
            (
                id,
                Output {
                    amount: Amount::from_be_bytes(&output.amount),
                    description: output.description,
                    locked_until: output.locked_until,
                },
            )
        })
        .collect();
    BalanceBucket {
        total: Amount::from_be_bytes(&balance.total),
        outputs,
    }
}

fn unlocked_to_wire(bucket: &BalanceBucket) -> PbUnlockedBalance {
    let outputs = bucket
        .outputs
        .iter()
        .map(|(id, output)| {
            (
                id.clone(),
                PbUnlockedOutput {
                    amount: output.amount.to_be_bytes(),
                    description: output.description.clone(),
                },
            )
        })
        .collect();
    PbUnlockedBalance {
        total: bucket.total.to_be_bytes(),
        outputs,
    }
}

fn locked_to_wire(bucket: &BalanceBucket) -> PbLockedBalance {
    let outputs = bucket
        .outputs
        .iter()
        .map(|(id, output)| {
            (
                id.clone(),
                PbLockedOutput {
                    amount: output.amount.to_be_bytes(),
                    locked_until: output.locked_until,
                    description: output.description.clone(),
                },
            )
        })
        .collect();
    PbLockedBalance {
        total: bucket.total.to_be_bytes(),
        outputs,
    }
}

fn bucket_is_empty(bucket: &BalanceBucket) -> bool {
    bucket.total.is_zero() && bucket.outputs.is_empty()
}

impl Codec for ProtobufCodec {
    fn decode_wallet(&self, bytes: &[u8]) -> Result<WalletBalance, String> {
        let wire = PbWallet::decode(bytes).map_err(|e| format!("protobuf wallet: {e}"))?;
        Ok(WalletBalance {
            unlocked: wire
                .balance_unlocked
                .map(unlocked_to_canonical)
                .unwrap_or_default(),
            locked: wire
                .balance_locked
                .map(locked_to_canonical)
                .unwrap_or_default(),
        })
    }

    fn decode_stats(&self, bytes: &[u8]) -> Result<ChainStats, String> {
        let wire = PbNetworkStats::decode(bytes).map_err(|e| format!("protobuf stats: {e}"))?;
        Ok(ChainStats {
            block_height: wire.blockheight,
            timestamp: wire.timestamp,
            total_coins: Amount::from_be_bytes(&wire.coins),
            locked_coins: Amount::from_be_bytes(&wire.locked_coins),
        })
    }

    fn encode_wallet(&self, wallet: &WalletBalance) -> Result<Vec<u8>, String> {
        let wire = PbWallet {
            balance_unlocked: (!bucket_is_empty(&wallet.unlocked))
                .then(|| unlocked_to_wire(&wallet.unlocked)),
            balance_locked: (!bucket_is_empty(&wallet.locked))
                .then(|| locked_to_wire(&wallet.locked)),
        };
        Ok(wire.encode_to_vec())
    }

    fn encode_stats(&self, stats: &ChainStats) -> Result<Vec<u8>, String> {
        let wire = PbNetworkStats {
            timestamp: stats.timestamp,
            blockheight: stats.block_height,
            coins: stats.total_coins.to_be_bytes(),
            locked_coins: stats.locked_coins.to_be_bytes(),
        };
        Ok(wire.encode_to_vec())
    }
}
