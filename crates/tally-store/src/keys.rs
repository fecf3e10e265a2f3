//! Canonical byte layouts for store keys.
//!
//! Two flat tables hold everything, so logical keys are serialized into
//! byte strings with a `0x00` separator. Addresses and set names are
//! ASCII identifiers in the source data and never contain NUL.

use tally_core::StoreKey;

const SEP: u8 = 0x00;

/// Key for one member of a set: `set || 0x00 || member`.
pub fn encode_member_key(set: &str, member: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(set.len() + 1 + member.len());
    buf.extend_from_slice(set.as_bytes());
    buf.push(SEP);
    buf.extend_from_slice(member.as_bytes());
    buf
}

/// Range-scan prefix covering every member of `set`.
pub fn member_key_prefix(set: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(set.len() + 1);
    buf.extend_from_slice(set.as_bytes());
    buf.push(SEP);
    buf
}

/// Extract the member name from a full member key, given the scanned prefix.
pub fn decode_member_key(prefix: &[u8], key: &[u8]) -> Result<String, String> {
    if !key.starts_with(prefix) {
        return Err("member key does not match set prefix".to_string());
    }
    String::from_utf8(key[prefix.len()..].to_vec())
        .map_err(|e| format!("member key not utf-8: {e}"))
}

/// Key for a stored value. Plain keys and row/field keys share one table:
/// `key || 0x00` and `row || 0x00 || field` respectively.
pub fn encode_value_key(key: &StoreKey) -> Vec<u8> {
    match key {
        StoreKey::Plain(key) => {
            let mut buf = Vec::with_capacity(key.len() + 1);
            buf.extend_from_slice(key.as_bytes());
            buf.push(SEP);
            buf
        }
        StoreKey::Field { row, field } => {
            let mut buf = Vec::with_capacity(row.len() + 1 + field.len());
            buf.extend_from_slice(row.as_bytes());
            buf.push(SEP);
            buf.extend_from_slice(field.as_bytes());
            buf
        }
    }
}
