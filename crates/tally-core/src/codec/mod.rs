//! Wire-format codecs.
//!
//! Three incompatible encodings share one logical schema:
//! balance -> { unlocked, locked } -> { total, outputs { id -> output } }.
//! Each codec decodes raw bytes into the canonical `WalletBalance` /
//! `ChainStats` structs and can re-encode them for seeding and round-trip
//! tests. The active codec is a pure configuration choice made once per
//! run; the engine never branches on format per record.

pub mod json;
pub mod msgp;
pub mod pb;

use crate::types::{ChainStats, WalletBalance};

/// The closed set of supported wire formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    MessagePack,
    Json,
    Protobuf,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::MessagePack => "msgp",
            Encoding::Json => "json",
            Encoding::Protobuf => "protobuf",
        }
    }

    /// The codec implementing this encoding, selected once at
    /// configuration time and injected into the engine.
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Encoding::MessagePack => &msgp::MessagePackCodec,
            Encoding::Json => &json::JsonCodec,
            Encoding::Protobuf => &pb::ProtobufCodec,
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "msgp" => Ok(Encoding::MessagePack),
            "json" => Ok(Encoding::Json),
            "protobuf" => Ok(Encoding::Protobuf),
            other => Err(format!("unknown encoding type: {other}")),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wire-format-specific decoder/encoder pair over the canonical model.
///
/// Decode errors carry only the reason; the engine attaches the offending
/// store key. A wallet record missing the whole balance substructure is
/// valid and decodes to a zeroed `WalletBalance`.
pub trait Codec {
    fn decode_wallet(&self, bytes: &[u8]) -> Result<WalletBalance, String>;
    fn decode_stats(&self, bytes: &[u8]) -> Result<ChainStats, String>;
    fn encode_wallet(&self, wallet: &WalletBalance) -> Result<Vec<u8>, String>;
    fn encode_stats(&self, stats: &ChainStats) -> Result<Vec<u8>, String>;
}
