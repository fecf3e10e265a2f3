#![no_main]

use libfuzzer_sys::fuzz_target;
use tally_core::{Codec, Encoding};

// Fuzz JSON wallet decoding: no-panic and determinism on arbitrary bytes,
// and re-encode/decode stability for every accepted record.
fuzz_target!(|data: &[u8]| {
    let codec = Encoding::Json.codec();

    let r1 = codec.decode_wallet(data);
    let r2 = codec.decode_wallet(data);
    match (&r1, &r2) {
        (Ok(a), Ok(b)) => {
            if a != b {
                panic!("json decode_wallet non-deterministic");
            }
        }
        (Err(_), Err(_)) => {}
        _ => panic!("json decode_wallet non-deterministic error/ok mismatch"),
    }

    if let Ok(wallet) = r1 {
        let bytes = codec.encode_wallet(&wallet).expect("encode accepted wallet");
        let again = codec.decode_wallet(&bytes).expect("decode own encoding");
        if again != wallet {
            panic!("json wallet not stable across re-encode");
        }
    }
});
