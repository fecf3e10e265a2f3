//! MessagePack wire format.
//!
//! Struct-as-map with single-letter keys (`b`, `u`, `l`, `t`, `o`, `a`,
//! `lu`, `d`; stats `cbh`, `cts`, `ct`, `lct`) and amounts as msgpack bin
//! values holding big-endian bytes. Encoding goes through
//! `rmp_serde::to_vec_named` so field names survive; positional arrays
//! would not match the explorer's map layout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use super::Codec;
use crate::amount::Amount;
use crate::types::{BalanceBucket, ChainStats, Output, WalletBalance};

pub struct MessagePackCodec;

#[derive(Debug, Default, Serialize, Deserialize)]
struct MsgpWallet {
    #[serde(rename = "b", default, skip_serializing_if = "Option::is_none")]
    balance: Option<MsgpBalance>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MsgpBalance {
    #[serde(rename = "u", default, skip_serializing_if = "Option::is_none")]
    unlocked: Option<MsgpBucket>,
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    locked: Option<MsgpBucket>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MsgpBucket {
    #[serde(rename = "t")]
    total: ByteBuf,
    #[serde(rename = "o", default, skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, MsgpOutput>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MsgpOutput {
    #[serde(rename = "a")]
    amount: ByteBuf,
    #[serde(rename = "lu", default, skip_serializing_if = "Option::is_none")]
    locked_until: Option<u64>,
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MsgpStats {
    #[serde(rename = "cbh")]
    block_height: u64,
    #[serde(rename = "cts", default)]
    timestamp: u64,
    #[serde(rename = "ct")]
    total_coins: ByteBuf,
    #[serde(rename = "lct")]
    locked_coins: ByteBuf,
}

fn bucket_to_canonical(bucket: MsgpBucket) -> BalanceBucket {
    let outputs = bucket
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
        total: Amount::from_be_bytes(&bucket.total),
        outputs,
    }
}

fn bucket_to_wire(bucket: &BalanceBucket) -> MsgpBucket {
    let outputs = bucket
        .outputs
        .iter()
        .map(|(id, output)| {
            (
                id.clone(),
                MsgpOutput {
                    amount: ByteBuf::from(output.amount.to_be_bytes()),
                    locked_until: output.locked_until,
                    description: output.description.clone(),
                },
            )
        })
        .collect();
    MsgpBucket {
        total: ByteBuf::from(bucket.total.to_be_bytes()),
        outputs,
    }
}

fn bucket_is_empty(bucket: &BalanceBucket) -> bool {
    bucket.total.is_zero() && bucket.outputs.is_empty()
}

impl Codec for MessagePackCodec {
    fn decode_wallet(&self, bytes: &[u8]) -> Result<WalletBalance, String> {
        let wire: MsgpWallet =
            rmp_serde::from_slice(bytes).map_err(|e| format!("msgp wallet: {e}"))?;
        let Some(balance) = wire.balance else {
            return Ok(WalletBalance::default());
        };
        Ok(WalletBalance {
            unlocked: balance.unlocked.map(bucket_to_canonical).unwrap_or_default(),
            locked: balance.locked.map(bucket_to_canonical).unwrap_or_default(),
        })
    }

    fn decode_stats(&self, bytes: &[u8]) -> Result<ChainStats, String> {
        let wire: MsgpStats =
            rmp_serde::from_slice(bytes).map_err(|e| format!("msgp stats: {e}"))?;
        Ok(ChainStats {
            block_height: wire.block_height,
            timestamp: wire.timestamp,
            total_coins: Amount::from_be_bytes(&wire.total_coins),
            locked_coins: Amount::from_be_bytes(&wire.locked_coins),
        })
    }

    fn encode_wallet(&self, wallet: &WalletBalance) -> Result<Vec<u8>, String> {
        let balance = if bucket_is_empty(&wallet.unlocked) && bucket_is_empty(&wallet.locked) {
            None
        } else {
            Some(MsgpBalance {
                unlocked: (!bucket_is_empty(&wallet.unlocked))
                    .then(|| bucket_to_wire(&wallet.unlocked)),
                locked: (!bucket_is_empty(&wallet.locked)).then(|| bucket_to_wire(&wallet.locked)),
            })
        };
        rmp_serde::to_vec_named(&MsgpWallet { balance }).map_err(|e| format!("msgp wallet: {e}"))
    }

    fn encode_stats(&self, stats: &ChainStats) -> Result<Vec<u8>, String> {
        let wire = MsgpStats {
            block_height: stats.block_height,
            timestamp: stats.timestamp,
            total_coins: ByteBuf::from(stats.total_coins.to_be_bytes()),
            locked_coins: ByteBuf::from(stats.locked_coins.to_be_bytes()),
        };
        rmp_serde::to_vec_named(&wire).map_err(|e| format!("msgp stats: {e}"))
    }
}
