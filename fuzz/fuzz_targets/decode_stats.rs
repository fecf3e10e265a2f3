#![no_main]

use libfuzzer_sys::fuzz_target;
use tally_core::{Codec, Encoding};

// Fuzz stats decoding across all three codecs on the same input.
// No-panic only; the codecs legitimately disagree on what they accept.
fuzz_target!(|data: &[u8]| {
    for encoding in [Encoding::MessagePack, Encoding::Json, Encoding::Protobuf] {
        let codec = encoding.codec();
        if let Ok(stats) = codec.decode_stats(data) {
            // unlocked_coins must never panic, even on stats that claim
            // more locked than total coins.
            let _ = stats.unlocked_coins();

            let bytes = codec.encode_stats(&stats).expect("encode accepted stats");
            let again = codec.decode_stats(&bytes).expect("decode own encoding");
            if again != stats {
                panic!("{encoding} stats not stable across re-encode");
            }
        }
    }
});
