//! Run-length encoding.
//!
//! A compressed stream starts with one mode byte followed by records:
//!
//! - **Basic** (`0`): `[count][byte]` pairs, `count` in 1-255.
//! - **Advanced** (`1`): a control byte `c`. If `c < 128`, `c` literal bytes
//!   follow (1-127). Otherwise the next byte is repeated `c - 126` times
//!   (2-129). Runs of a single byte are gathered into literal records, so
//!   data without repeats grows by about one byte in 127 instead of doubling.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};

use crate::bits::{read_some, DEFAULT_BUFFER_SIZE};
use crate::error::{Error, Result};

const BASIC_RUN_LIMIT: usize = 255;
const ADVANCED_RUN_LIMIT: usize = 129;
const ADVANCED_RUN_BIAS: usize = 126;
const LITERAL_LIMIT: usize = 127;

/// RLE record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RleMode {
    /// Every run is a `[count][byte]` pair.
    #[default]
    Basic,
    /// Runs and literal groups share a control byte.
    Advanced,
}

impl RleMode {
    /// Header byte identifying the mode.
    pub fn as_byte(self) -> u8 {
        match self {
            RleMode::Basic => 0,
            RleMode::Advanced => 1,
        }
    }

    /// Parse a header byte.
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(RleMode::Basic),
            1 => Ok(RleMode::Advanced),
            other => Err(Error::CorruptHeader(format!("unknown RLE mode {other}"))),
        }
    }

    fn run_limit(self) -> usize {
        match self {
            RleMode::Basic => BASIC_RUN_LIMIT,
            RleMode::Advanced => ADVANCED_RUN_LIMIT,
        }
    }
}

/// Streaming RLE encoder.
///
/// Bytes are fed through [`RleEncoder::write`]; [`RleEncoder::finish`]
/// emits the pending run and returns the sink.
pub struct RleEncoder<W: Write> {
    inner: W,
    mode: RleMode,
    buffer: Vec<u8>,
    capacity: usize,
    literals: Vec<u8>,
    run_byte: u8,
    run_len: usize,
    bytes_written: u64,
}

impl<W: Write> RleEncoder<W> {
    /// Write the mode byte and return an encoder ready for data.
    pub fn new(inner: W, mode: RleMode) -> Result<Self> {
        Self::with_capacity(inner, mode, DEFAULT_BUFFER_SIZE)
    }

    /// Like [`RleEncoder::new`] with an explicit output buffer size.
    pub fn with_capacity(inner: W, mode: RleMode, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(2);
        let mut encoder = Self {
            inner,
            mode,
            buffer: Vec::with_capacity(capacity),
            capacity,
            literals: Vec::with_capacity(LITERAL_LIMIT),
            run_byte: 0,
            run_len: 0,
            bytes_written: 0,
        };
        encoder.emit(&[mode.as_byte()])?;
        Ok(encoder)
    }

    /// Feed input bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            if self.run_len > 0 && byte == self.run_byte && self.run_len < self.mode.run_limit() {
                self.run_len += 1;
            } else {
                self.end_run()?;
                self.run_byte = byte;
                self.run_len = 1;
            }
        }
        Ok(())
    }

    /// Emit everything pending and return the sink with the encoded length.
    pub fn finish(mut self) -> Result<(W, u64)> {
        self.end_run()?;
        self.flush_literals()?;
        self.flush_buffer()?;
        self.inner.flush()?;
        Ok((self.inner, self.bytes_written))
    }

    fn end_run(&mut self) -> Result<()> {
        let (byte, len) = (self.run_byte, self.run_len);
        self.run_len = 0;
        match (self.mode, len) {
            (_, 0) => Ok(()),
            (RleMode::Basic, len) => self.emit(&[len as u8, byte]),
            (RleMode::Advanced, 1) => {
                self.literals.push(byte);
                if self.literals.len() == LITERAL_LIMIT {
                    self.flush_literals()?;
                }
                Ok(())
            }
            (RleMode::Advanced, len) => {
                self.flush_literals()?;
                self.emit(&[(len + ADVANCED_RUN_BIAS) as u8, byte])
            }
        }
    }

    fn flush_literals(&mut self) -> Result<()> {
        if self.literals.is_empty() {
            return Ok(());
        }
        let literals = std::mem::take(&mut self.literals);
        self.emit(&[literals.len() as u8])?;
        self.emit(&literals)?;
        self.literals = literals;
        self.literals.clear();
        Ok(())
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        if self.buffer.len() + bytes.len() > self.capacity {
            self.flush_buffer()?;
        }
        self.buffer.extend_from_slice(bytes);
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }
}

fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    Ok((read_some(reader, &mut byte)? == 1).then_some(byte[0]))
}

fn run_byte<R: Read>(reader: &mut R) -> Result<u8> {
    read_byte(reader)?.ok_or_else(|| Error::InvalidDecode("RLE run is missing its byte".into()))
}

/// Compress everything readable from `input` into `output`.
///
/// Returns `(bytes read, bytes written)`; the written count includes the
/// mode byte.
pub fn compress<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    mode: RleMode,
) -> Result<(u64, u64)> {
    let mut encoder = RleEncoder::new(output, mode)?;
    let mut chunk = vec![0u8; DEFAULT_BUFFER_SIZE];
    let mut read_total = 0u64;
    loop {
        let n = read_some(input, &mut chunk)?;
        if n == 0 {
            break;
        }
        encoder.write(&chunk[..n])?;
        read_total += n as u64;
    }
    let (_, written) = encoder.finish()?;
    log::info!("rle ({mode:?}): {read_total} bytes -> {written} bytes");
    Ok((read_total, written))
}

/// Decompress everything readable from `input` into `output`.
///
/// Returns the number of bytes written.
pub fn decompress<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<u64> {
    let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, input);
    let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, output);

    let mode = match read_byte(&mut reader)? {
        Some(byte) => RleMode::from_byte(byte)?,
        None => return Err(Error::CorruptHeader("missing RLE mode byte".into())),
    };

    let mut written = 0u64;
    let mut literals = [0u8; LITERAL_LIMIT];
    while let Some(control) = read_byte(&mut reader)? {
        let control = control as usize;
        match mode {
            RleMode::Basic => {
                if control == 0 {
                    return Err(Error::InvalidDecode("RLE run of length 0".into()));
                }
                let byte = run_byte(&mut reader)?;
                writer.write_all(&[byte].repeat(control))?;
                written += control as u64;
            }
            RleMode::Advanced if control > LITERAL_LIMIT => {
                let count = control - ADVANCED_RUN_BIAS;
                let byte = run_byte(&mut reader)?;
                writer.write_all(&[byte].repeat(count))?;
                written += count as u64;
            }
            RleMode::Advanced => {
                if control == 0 {
                    return Err(Error::InvalidDecode("RLE literal group of length 0".into()));
                }
                let group = &mut literals[..control];
                reader.read_exact(group).map_err(|e| {
                    if e.kind() == ErrorKind::UnexpectedEof {
                        Error::InvalidDecode(format!(
                            "RLE literal group of {control} bytes is truncated"
                        ))
                    } else {
                        Error::Io(e)
                    }
                })?;
                writer.write_all(group)?;
                written += control as u64;
            }
        }
    }
    writer.flush()?;
    log::info!("rle ({mode:?}): decoded {written} bytes");
    Ok(written)
}

/// Compress a byte slice in memory.
pub fn compress_slice(data: &[u8], mode: RleMode) -> Result<Vec<u8>> {
    let mut encoder = RleEncoder::new(Vec::with_capacity(data.len() / 2 + 1), mode)?;
    encoder.write(data)?;
    Ok(encoder.finish()?.0)
}

/// Decompress a byte slice in memory.
pub fn decompress_slice(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(&mut &data[..], &mut out)?;
    Ok(out)
}
