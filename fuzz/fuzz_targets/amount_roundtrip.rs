#![no_main]

use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;
use tally_core::Amount;

// Wire amounts are minimal big-endian byte strings (empty = zero).
// Roundtrip property: decode → re-encode always yields the minimal form,
// and agrees with BigUint on the value.
fuzz_target!(|data: &[u8]| {
    let amount = Amount::from_be_bytes(data);
    let bytes = amount.to_be_bytes();

    // Minimal form: no leading zero byte, zero is empty.
    if let Some(first) = bytes.first() {
        if *first == 0 {
            panic!("to_be_bytes produced a leading zero byte");
        }
    } else if !amount.is_zero() {
        panic!("non-zero amount encoded as empty bytes");
    }

    if Amount::from_be_bytes(&bytes) != amount {
        panic!("amount bytes roundtrip mismatch");
    }

    // Decimal rendering must agree with BigUint on the same bytes.
    if amount.to_string() != BigUint::from_bytes_be(data).to_string() {
        panic!("amount decimal rendering disagrees with BigUint");
    }
});
