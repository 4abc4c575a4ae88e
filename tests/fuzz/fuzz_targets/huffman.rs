//! Fuzz target for the Huffman container.
//!
//! Compresses arbitrary input and checks the round trip, then feeds the raw
//! input to the decoder, which must reject garbage without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use bytepress::compress::container;
use bytepress::Error;

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM
    if data.len() > 256 * 1024 {
        return;
    }

    match container::compress_slice(data) {
        Ok(packed) => {
            let restored = container::decompress_slice(&packed).expect("decode own output");
            assert_eq!(restored, data, "Huffman round trip mismatch");
        }
        Err(Error::TooManySymbols { count }) => assert_eq!(count, 256),
        Err(e) => panic!("unexpected compression error: {e}"),
    }

    let _ = container::decompress_slice(data);
});
