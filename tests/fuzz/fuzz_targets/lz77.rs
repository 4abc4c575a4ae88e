//! Fuzz target for LZ77 compression.
//!
//! Tests that LZ77 compression handles arbitrary input without panicking
//! and produces tokens that reconstruct the input.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bytepress::compress::lz77::{self, Lz77Compressor, Lz77Options, Token};

/// Structured input for LZ77 fuzzing.
#[derive(Arbitrary, Debug)]
struct Lz77Input {
    /// Compression level (1-9)
    level: u8,
    /// Window size override (0 keeps the level default)
    window: u16,
    /// Raw data to compress
    data: Vec<u8>,
}

fuzz_target!(|input: Lz77Input| {
    // Limit input size to avoid OOM
    if input.data.len() > 256 * 1024 {
        return;
    }

    // Clamp compression level
    let level = (input.level % 9) + 1;
    let mut options = Lz77Options::level(level);
    if input.window != 0 {
        options.window_size = input.window as usize;
    }

    let tokens = Lz77Compressor::new(&options).compress(&input.data);
    for token in &tokens {
        if let Token::Match { length, distance } = token {
            assert!(*length >= 3, "match shorter than minimum");
            assert!(*distance as usize <= options.window_size, "match outside window");
        }
    }

    let expanded = lz77::expand(&tokens).expect("expand own tokens");
    assert_eq!(
        expanded, input.data,
        "LZ77 tokens do not reconstruct original data"
    );

    // Raw bytes as a token stream: may fail, must not panic.
    let _ = lz77::decompress_slice(&input.data);
});
