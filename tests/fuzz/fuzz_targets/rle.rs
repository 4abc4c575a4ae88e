//! Fuzz target for run-length encoding.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bytepress::compress::rle::{self, RleMode};

#[derive(Arbitrary, Debug)]
struct RleInput {
    advanced: bool,
    data: Vec<u8>,
}

fuzz_target!(|input: RleInput| {
    let mode = if input.advanced {
        RleMode::Advanced
    } else {
        RleMode::Basic
    };

    let packed = rle::compress_slice(&input.data, mode).expect("encode into memory");
    let restored = rle::decompress_slice(&packed).expect("decode own output");
    assert_eq!(restored, input.data, "RLE round trip mismatch");

    let _ = rle::decompress_slice(&input.data);
});
