//! Compression algorithms.
//!
//! [`container`] is the Huffman codec proper, built from [`frequency`],
//! [`heap`] and [`huffman`]. [`lz77`] and [`rle`] are independent codecs
//! with their own stream formats. [`Algorithm`] picks one at run time.

pub mod container;
pub mod frequency;
pub mod heap;
pub mod huffman;
pub mod lz77;
pub mod rle;

use std::io::{Read, Seek, Write};

use crate::error::Result;

pub use container::{HuffmanOptions, HuffmanStats};
pub use frequency::FrequencyTable;
pub use heap::MinHeap;
pub use huffman::{Code, CodeTable, HuffmanTree, Node};
pub use lz77::{Lz77Options, Token};
pub use rle::RleMode;

/// Codec selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Huffman container.
    #[default]
    Huffman,
    /// LZ77 token stream.
    Lz77,
    /// Run-length encoding. The mode only matters when compressing; the
    /// decoder reads it from the stream.
    Rle(RleMode),
}

impl Algorithm {
    /// File extension for compressed output.
    pub fn extension(self) -> &'static str {
        match self {
            Algorithm::Huffman => "huf",
            Algorithm::Lz77 => "lz7",
            Algorithm::Rle(_) => "rle",
        }
    }

    /// Inverse of [`Algorithm::extension`].
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "huf" => Some(Algorithm::Huffman),
            "lz7" => Some(Algorithm::Lz77),
            "rle" => Some(Algorithm::Rle(RleMode::default())),
            _ => None,
        }
    }
}

/// Per-codec settings used by the dispatch functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressOptions {
    /// Buffer sizes for the Huffman codec.
    pub huffman: HuffmanOptions,
    /// Match search settings for LZ77.
    pub lz77: Lz77Options,
}

/// Compress `input` into `output` with `algorithm`.
///
/// Returns the number of input bytes consumed.
pub fn compress_stream<R, W>(
    algorithm: Algorithm,
    input: &mut R,
    output: &mut W,
    options: &CompressOptions,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    log::debug!("compressing with {algorithm:?}");
    match algorithm {
        Algorithm::Huffman => Ok(container::compress(input, output, &options.huffman)?.input_len),
        Algorithm::Lz77 => Ok(lz77::compress(input, output, &options.lz77)?.0),
        Algorithm::Rle(mode) => Ok(rle::compress(input, output, mode)?.0),
    }
}

/// Decompress `input` into `output` with `algorithm`.
///
/// Returns the number of bytes written.
pub fn decompress_stream<R, W>(
    algorithm: Algorithm,
    input: &mut R,
    output: &mut W,
    options: &CompressOptions,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    log::debug!("decompressing with {algorithm:?}");
    match algorithm {
        Algorithm::Huffman => container::decompress(input, output, &options.huffman),
        Algorithm::Lz77 => lz77::decompress(input, output),
        Algorithm::Rle(_) => rle::decompress(input, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ALL: [Algorithm; 4] = [
        Algorithm::Huffman,
        Algorithm::Lz77,
        Algorithm::Rle(RleMode::Basic),
        Algorithm::Rle(RleMode::Advanced),
    ];

    #[test]
    fn test_dispatch_round_trip() {
        let data = b"she sells sea shells by the sea shore, sssssss".repeat(20);
        let options = CompressOptions::default();
        for algorithm in ALL {
            let mut compressed = Vec::new();
            let read =
                compress_stream(algorithm, &mut Cursor::new(&data), &mut compressed, &options)
                    .unwrap();
            assert_eq!(read, data.len() as u64);

            let mut restored = Vec::new();
            let written = decompress_stream(
                algorithm,
                &mut Cursor::new(&compressed),
                &mut restored,
                &options,
            )
            .unwrap();
            assert_eq!(written, data.len() as u64, "{algorithm:?}");
            assert_eq!(restored, data, "{algorithm:?}");
        }
    }

    #[test]
    fn test_extensions() {
        for algorithm in ALL {
            let back = Algorithm::from_extension(algorithm.extension()).unwrap();
            assert_eq!(back.extension(), algorithm.extension());
        }
        assert_eq!(Algorithm::from_extension("zip"), None);
    }
}
