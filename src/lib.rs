//! # bytepress
//!
//! Streaming lossless byte compression.
//!
//! The core codec is static Huffman coding: byte frequencies are counted,
//! scaled to fit one byte each, and turned into a deterministic prefix code
//! through a comparator-driven min-heap. The container stores the scaled
//! table, the packed bitstream, and the exact bit count, so any byte stream
//! decodes back to the original.
//!
//! LZ77 and run-length encoding are provided as independent codecs with
//! their own stream formats.
//!
//! ## Features
//!
//! - **Streaming I/O** over any `Read + Seek` input and `Write` output
//! - **Deterministic codes**: identical input always yields identical output
//! - **LZ77** with hash-chain match search and tunable levels
//! - **RLE** in basic and advanced (literal-group) modes
//! - No unsafe code
//!
//! ## Example
//!
//! ```rust
//! use bytepress::compress::container;
//!
//! let data = b"abracadabra";
//! let packed = container::compress_slice(data).unwrap();
//! let unpacked = container::decompress_slice(&packed).unwrap();
//! assert_eq!(unpacked, data);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod compress;
pub mod error;
pub mod output;

pub use compress::{compress_stream, decompress_stream, Algorithm, CompressOptions};
pub use error::{Error, Result};
pub use output::PartialOutput;
