//! Huffman container format.
//!
//! ```text
//! [1 byte]      symbol count N (0-255)
//! [N x 2 bytes] (symbol, scaled frequency) pairs, ascending by symbol
//! [variable]    encoded bitstream, MSB first, zero-padded final byte
//! [8 bytes]     total_bits, u64 little-endian, at end of stream
//! ```
//!
//! Frequencies are scaled to fit one byte before the tree is built, and the
//! encoder builds its tree from the scaled table too, so encoder and decoder
//! always agree on the codes.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::bits::{read_some, BitReader, BitWriter};
use crate::compress::frequency::FrequencyTable;
use crate::compress::huffman::{CodeTable, HuffmanTree, Node};
use crate::error::{Error, Result};

/// Most distinct symbols the one-byte count field can describe.
pub const MAX_SYMBOLS: usize = u8::MAX as usize;

/// Size of the trailing total-bit-count field.
pub const TOTAL_BITS_SIZE: usize = 8;

/// Buffer sizes used while streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanOptions {
    /// Chunk size for reading the input (counting and encoding passes).
    pub read_buffer_size: usize,
    /// Bytes buffered by the bit writer before each write.
    pub write_buffer_size: usize,
    /// Decoded bytes buffered before each write.
    pub output_buffer_size: usize,
}

impl Default for HuffmanOptions {
    fn default() -> Self {
        Self {
            read_buffer_size: 4096,
            write_buffer_size: 4096,
            output_buffer_size: 4096,
        }
    }
}

/// Decoded container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Scaled frequencies exactly as stored.
    pub frequencies: FrequencyTable,
    /// Number of meaningful bits in the bitstream.
    pub total_bits: u64,
}

/// Summary of one compression run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanStats {
    /// Bytes read from the input.
    pub input_len: u64,
    /// Distinct symbols in the input.
    pub symbols: usize,
    /// Meaningful bits in the encoded stream.
    pub total_bits: u64,
    /// Longest code assigned.
    pub max_code_length: u8,
}

/// Write the symbol count and the scaled `(symbol, frequency)` pairs.
///
/// Returns the scaled table that was written. Fails with
/// [`Error::TooManySymbols`] before writing anything if all 256 byte values
/// are present.
pub fn write_header<W: Write>(
    writer: &mut W,
    frequencies: &FrequencyTable,
) -> Result<FrequencyTable> {
    let distinct = frequencies.distinct();
    if distinct > MAX_SYMBOLS {
        return Err(Error::TooManySymbols { count: distinct });
    }

    let scaled = frequencies.scaled();
    let mut header = Vec::with_capacity(1 + 2 * distinct);
    header.push(distinct as u8);
    for (symbol, weight) in scaled.present() {
        header.push(symbol);
        header.push(weight as u8);
    }
    writer.write_all(&header)?;

    log::debug!(
        "header: {} symbols, scale divisor {}",
        distinct,
        frequencies.scale_divisor()
    );
    Ok(scaled)
}

/// Append the trailing total-bit-count field.
pub fn write_trailer<W: Write>(writer: &mut W, total_bits: u64) -> Result<()> {
    writer.write_all(&total_bits.to_le_bytes())?;
    Ok(())
}

/// Read the header and trailer, leaving `reader` at the start of the bitstream.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> Result<Header> {
    let mut count = [0u8; 1];
    reader
        .read_exact(&mut count)
        .map_err(|e| Error::header_eof(e, "symbol count"))?;
    let count = count[0] as usize;

    let mut pairs = vec![0u8; 2 * count];
    reader
        .read_exact(&mut pairs)
        .map_err(|e| Error::header_eof(e, "symbol table"))?;

    let mut frequencies = FrequencyTable::new();
    for pair in pairs.chunks_exact(2) {
        let (symbol, weight) = (pair[0], pair[1] as u64);
        if weight == 0 {
            return Err(Error::CorruptHeader(format!(
                "symbol {symbol:#04x} has zero frequency"
            )));
        }
        if frequencies.get(symbol) != 0 {
            return Err(Error::CorruptHeader(format!(
                "symbol {symbol:#04x} listed twice"
            )));
        }
        frequencies.set(symbol, weight);
    }

    let table_end = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    if end < table_end + TOTAL_BITS_SIZE as u64 {
        return Err(Error::CorruptHeader("missing trailing bit count".into()));
    }
    reader.seek(SeekFrom::End(-(TOTAL_BITS_SIZE as i64)))?;
    let mut trailer = [0u8; TOTAL_BITS_SIZE];
    reader
        .read_exact(&mut trailer)
        .map_err(|e| Error::header_eof(e, "trailing bit count"))?;
    let total_bits = u64::from_le_bytes(trailer);

    let payload_len = end - table_end - TOTAL_BITS_SIZE as u64;
    if payload_len != total_bits.div_ceil(8) {
        return Err(Error::CorruptHeader(format!(
            "{total_bits} bits declared but {payload_len} payload bytes present"
        )));
    }
    if count == 0 && total_bits != 0 {
        return Err(Error::CorruptHeader("bitstream present without symbols".into()));
    }

    reader.seek(SeekFrom::Start(table_end))?;
    Ok(Header {
        frequencies,
        total_bits,
    })
}

/// Compress `input` into `output`.
///
/// The input is read twice: once to count frequencies and once to encode, so
/// it must be seekable. Compression starts at the input's current position.
pub fn compress<R, W>(
    input: &mut R,
    output: &mut W,
    options: &HuffmanOptions,
) -> Result<HuffmanStats>
where
    R: Read + Seek,
    W: Write,
{
    let start = input.stream_position()?;
    let frequencies = FrequencyTable::count(input, options.read_buffer_size)?;
    let scaled = write_header(output, &frequencies)?;

    let mut stats = HuffmanStats {
        input_len: frequencies.total(),
        symbols: frequencies.distinct(),
        ..HuffmanStats::default()
    };

    let Some(tree) = HuffmanTree::build(&scaled)? else {
        write_trailer(output, 0)?;
        output.flush()?;
        return Ok(stats);
    };
    if tree.root().is_leaf() {
        log::debug!("single-symbol input: coding every byte as the 1-bit code 0");
    }
    let codes = tree.code_table()?;
    stats.max_code_length = codes.max_length();
    log::debug!(
        "tree depth {}, longest code {} bits",
        tree.depth(),
        stats.max_code_length
    );

    input.seek(SeekFrom::Start(start))?;
    let writer = BitWriter::with_capacity(&mut *output, options.write_buffer_size);
    let (_, total_bits) = encode(input, writer, &codes, options.read_buffer_size)?;
    write_trailer(output, total_bits)?;
    output.flush()?;

    stats.total_bits = total_bits;
    log::info!(
        "huffman: {} bytes -> {} bits ({} symbols)",
        stats.input_len,
        total_bits,
        stats.symbols
    );
    Ok(stats)
}

/// Stream `input` through `codes` into `writer` and flush it.
///
/// Returns the inner writer and the number of meaningful bits written.
pub fn encode<R: Read, W: Write>(
    input: &mut R,
    mut writer: BitWriter<W>,
    codes: &CodeTable,
    chunk_size: usize,
) -> Result<(W, u64)> {
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let n = read_some(input, &mut chunk)?;
        if n == 0 {
            break;
        }
        for &byte in &chunk[..n] {
            let code = codes.get(byte);
            if code.length == 0 {
                return Err(Error::Compression(format!(
                    "byte {byte:#04x} has no code (input changed between passes?)"
                )));
            }
            writer.write_bits(code.bits, code.length)?;
        }
    }
    writer.finish()
}

/// Decompress `input` into `output`. Returns the number of bytes written.
pub fn decompress<R, W>(input: &mut R, output: &mut W, options: &HuffmanOptions) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    let header = read_header(input)?;
    let Some(tree) = HuffmanTree::build(&header.frequencies)? else {
        output.flush()?;
        return Ok(0);
    };

    let mut reader = BitReader::with_capacity(&mut *input, options.read_buffer_size);
    let written = decode(
        &mut reader,
        &tree,
        header.total_bits,
        output,
        options.output_buffer_size,
    )?;
    log::info!("huffman: {} bits -> {} bytes", header.total_bits, written);
    Ok(written)
}

/// Walk `tree` bit by bit until `total_bits` bits have been consumed.
///
/// Each leaf reached emits its symbol and restarts at the root. Output is
/// written in chunks of `buffer_size` bytes.
pub fn decode<R: Read, W: Write>(
    reader: &mut BitReader<R>,
    tree: &HuffmanTree,
    total_bits: u64,
    output: &mut W,
    buffer_size: usize,
) -> Result<u64> {
    let buffer_size = buffer_size.max(1);
    let mut buffer = Vec::with_capacity(buffer_size);
    let mut written = 0u64;
    let root = tree.root();
    let mut node = root;

    while reader.bits_read() < total_bits {
        let Some(bit) = reader.read_bit()? else {
            return Err(Error::InvalidDecode(format!(
                "bitstream ended after {} of {} bits",
                reader.bits_read(),
                total_bits
            )));
        };
        node = node.child(bit);
        if let Node::Leaf { symbol, .. } = node {
            buffer.push(*symbol);
            if buffer.len() == buffer_size {
                output.write_all(&buffer)?;
                written += buffer.len() as u64;
                buffer.clear();
            }
            node = root;
        }
    }

    if !std::ptr::eq(node, root) {
        return Err(Error::InvalidDecode("bitstream ends inside a code".into()));
    }
    output.write_all(&buffer)?;
    written += buffer.len() as u64;
    output.flush()?;
    Ok(written)
}

/// Compress a byte slice into a new container.
pub fn compress_slice(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    compress(
        &mut std::io::Cursor::new(data),
        &mut output,
        &HuffmanOptions::default(),
    )?;
    Ok(output)
}

/// Decompress a container held in memory.
pub fn decompress_slice(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decompress(
        &mut std::io::Cursor::new(data),
        &mut output,
        &HuffmanOptions::default(),
    )?;
    Ok(output)
}
