//! Exact unsigned coin amounts.
//!
//! Coin quantities are arbitrary-precision: multi-byte integers on the wire,
//! never native machine words. Decoding must not truncate and addition must
//! not wrap, so all arithmetic goes through `num_bigint::BigUint`.

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An exact, non-negative coin amount of arbitrary bit width.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigUint::zero())
    }

    pub fn from_u64(v: u64) -> Self {
        Amount(BigUint::from(v))
    }

    /// Decode a big-endian unsigned integer of any width.
    /// Leading zero bytes are allowed; an empty slice decodes to zero.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Amount(BigUint::from_bytes_be(bytes))
    }

    /// Minimal big-endian byte encoding. Zero encodes to an empty slice,
    /// matching the wire convention of the explorer databases we audit.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        self.0.to_bytes_be()
    }

    /// Parse a decimal string (the JSON wire form for amounts).
    pub fn from_dec_str(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty amount string".to_string());
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid decimal amount: {s:?}"));
        }
        let v = s
            .parse::<BigUint>()
            .map_err(|e| format!("parse amount {s:?}: {e}"))?;
        Ok(Amount(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Exact addition; amounts cannot overflow.
    pub fn add(&self, other: &Amount) -> Amount {
        Amount(&self.0 + &other.0)
    }

    pub fn add_assign(&mut self, other: &Amount) {
        self.0 += &other.0;
    }

    /// Exact subtraction; `None` when `other` exceeds `self`
    /// (amounts are never negative).
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if other.0 > self.0 {
            return None;
        }
        Some(Amount(&self.0 - &other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Amounts serialize as decimal strings for determinism and to avoid
// precision loss in JSON consumers.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_dec_str(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn be_bytes_roundtrip() {
        let cases: &[&[u8]] = &[
            &[],
            &[0x01],
            &[0xff, 0xff],
            &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ];
        for bytes in cases {
            let a = Amount::from_be_bytes(bytes);
            assert_eq!(Amount::from_be_bytes(&a.to_be_bytes()), a);
        }
    }

    #[test]
    fn leading_zeros_normalize() {
        let a = Amount::from_be_bytes(&[0x00, 0x00, 0x01, 0x2c]);
        assert_eq!(a, Amount::from_u64(300));
        assert_eq!(a.to_be_bytes(), vec![0x01, 0x2c]);
    }

    #[test]
    fn zero_encodes_empty() {
        assert_eq!(Amount::zero().to_be_bytes(), Vec::<u8>::new());
        assert_eq!(Amount::from_be_bytes(&[]), Amount::zero());
        assert_eq!(Amount::from_be_bytes(&[0x00, 0x00]), Amount::zero());
    }

    #[test]
    fn wider_than_u64() {
        // 2^80 + 5: must survive decode/encode without truncation.
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(&[0u8; 10]);
        bytes[10] = 0x05;
        let a = Amount::from_be_bytes(&bytes);
        assert_eq!(a.to_be_bytes(), bytes);
        assert_eq!(a.to_string(), "1208925819614629174706181");
    }

    #[test]
    fn dec_str_parse() {
        assert_eq!(Amount::from_dec_str("0").unwrap(), Amount::zero());
        assert_eq!(Amount::from_dec_str("300").unwrap(), Amount::from_u64(300));
        assert!(Amount::from_dec_str("").is_err());
        assert!(Amount::from_dec_str("-1").is_err());
        assert!(Amount::from_dec_str("12a").is_err());
    }

    #[test]
    fn checked_sub_refuses_negative() {
        let a = Amount::from_u64(100);
        let b = Amount::from_u64(101);
        assert_eq!(a.checked_sub(&b), None);
        assert_eq!(b.checked_sub(&a), Some(Amount::from_u64(1)));
    }

    #[test]
    fn serde_decimal_string() {
        let a = Amount::from_u64(1234);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"1234\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
