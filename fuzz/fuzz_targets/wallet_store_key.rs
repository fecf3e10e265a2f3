#![no_main]

use libfuzzer_sys::fuzz_target;
use tally_core::{wallet_store_key, StoreKey, ADDRESS_KEY_PREFIX};

// wallet_store_key splits an address into row + field. Must never panic,
// even for short or multi-byte addresses, and the split must lose nothing.
fuzz_target!(|data: &[u8]| {
    let Ok(address) = std::str::from_utf8(data) else {
        return;
    };

    let key = wallet_store_key(address);
    let StoreKey::Field { row, field } = key else {
        panic!("wallet key must be a row/field pair");
    };

    let Some(head) = row.strip_prefix(ADDRESS_KEY_PREFIX) else {
        panic!("wallet row missing address prefix");
    };
    if format!("{head}{field}") != address {
        panic!("wallet key split lost characters");
    }
    if head.chars().count() > 6 {
        panic!("wallet row head longer than 6 characters");
    }
});
