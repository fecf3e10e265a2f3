//! JSON wire format.
//!
//! Long field names, amounts as decimal strings (a JSON number would lose
//! precision past 2^53), absent substructures omitted entirely. Unknown
//! fields in the stats record are ignored; the explorer writes more fields
//! than the audit reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Codec;
use crate::amount::Amount;
use crate::types::{BalanceBucket, ChainStats, Output, WalletBalance};

pub struct JsonCodec;

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonWallet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    balance: Option<JsonBalance>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonBalance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlocked: Option<JsonBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locked: Option<JsonBucket>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonBucket {
    total: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, JsonOutput>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonOutput {
    amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(
        rename = "lockedUntil",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    locked_until: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonStats {
    #[serde(rename = "blockHeight")]
    block_height: u64,
    #[serde(default)]
    timestamp: u64,
    coins: String,
    #[serde(rename = "lockedCoins")]
    locked_coins: String,
}

fn bucket_to_canonical(bucket: JsonBucket) -> Result<BalanceBucket, String> {
    let mut outputs = BTreeMap::new();
    for (id, output) in bucket.outputs {
        outputs.insert(
            id,
            Output {
                amount: Amount::from_dec_str(&output.amount)?,
                description: output.description,
                locked_until: output.locked_until,
            },
        );
    }
    Ok(BalanceBucket {
        total: Amount::from_dec_str(&bucket.total)?,
        outputs,
    })
}

fn bucket_to_wire(bucket: &BalanceBucket) -> JsonBucket {
    let outputs = bucket
        .outputs
        .iter()
        .map(|(id, output)| {
            (
                id.clone(),
                JsonOutput {
                    amount: output.amount.to_string(),
                    description: output.description.clone(),
                    locked_until: output.locked_until,
                },
            )
        })
        .collect();
    JsonBucket {
        total: bucket.total.to_string(),
        outputs,
    }
}

fn bucket_is_empty(bucket: &BalanceBucket) -> bool {
    bucket.total.is_zero() && bucket.outputs.is_empty()
}

impl Codec for JsonCodec {
    fn decode_wallet(&self, bytes: &[u8]) -> Result<WalletBalance, String> {
        let wire: JsonWallet =
            serde_json::from_slice(bytes).map_err(|e| format!("json wallet: {e}"))?;
        let Some(balance) = wire.balance else {
            return Ok(WalletBalance::default());
        };
        Ok(WalletBalance {
            unlocked: balance
                .unlocked
                .map(bucket_to_canonical)
                .transpose()?
                .unwrap_or_default(),
            locked: balance
                .locked
                .map(bucket_to_canonical)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    fn decode_stats(&self, bytes: &[u8]) -> Result<ChainStats, String> {
        let wire: JsonStats =
            serde_json::from_slice(bytes).map_err(|e| format!("json stats: {e}"))?;
        Ok(ChainStats {
            block_height: wire.block_height,
            timestamp: wire.timestamp,
            total_coins: Amount::from_dec_str(&wire.coins)?,
            locked_coins: Amount::from_dec_str(&wire.locked_coins)?,
        })
    }

    fn encode_wallet(&self, wallet: &WalletBalance) -> Result<Vec<u8>, String> {
        let balance = if bucket_is_empty(&wallet.unlocked) && bucket_is_empty(&wallet.locked) {
            None
        } else {
            Some(JsonBalance {
                unlocked: (!bucket_is_empty(&wallet.unlocked))
                    .then(|| bucket_to_wire(&wallet.unlocked)),
                locked: (!bucket_is_empty(&wallet.locked)).then(|| bucket_to_wire(&wallet.locked)),
            })
        };
        serde_json::to_vec(&JsonWallet { balance }).map_err(|e| format!("json wallet: {e}"))
    }

    fn encode_stats(&self, stats: &ChainStats) -> Result<Vec<u8>, String> {
        let wire = JsonStats {
            block_height: stats.block_height,
            timestamp: stats.timestamp,
            coins: stats.total_coins.to_string(),
            locked_coins: stats.locked_coins.to_string(),
        };
        serde_json::to_vec(&wire).map_err(|e| format!("json stats: {e}"))
    }
}
