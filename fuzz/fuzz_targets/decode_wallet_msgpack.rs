#![no_main]

use libfuzzer_sys::fuzz_target;
use tally_core::{Codec, Encoding};

// Fuzz MessagePack wallet decoding: no-panic and determinism on arbitrary
// bytes, and re-encode/decode stability for every accepted record.
fuzz_target!(|data: &[u8]| {
    let codec = Encoding::MessagePack.codec();

    let r1 = codec.decode_wallet(data);
    let r2 = codec.decode_wallet(data);
    match (&r1, &r2) {
        (Ok(a), Ok(b)) => {
            if a != b {
                panic!("msgpack decode_wallet non-deterministic");
            }
        }
        (Err(_), Err(_)) => {}
        _ => panic!("msgpack decode_wallet non-deterministic error/ok mismatch"),
    }

    if let Ok(wallet) = r1 {
        let bytes = codec.encode_wallet(&wallet).expect("encode accepted wallet");
        let again = codec.decode_wallet(&bytes).expect("decode own encoding");
        if again != wallet {
            panic!("msgpack wallet not stable across re-encode");
        }
    }
});
