//! Bit-level I/O over byte streams.
//!
//! Both directions are MSB-first within each byte and buffer a fixed number of
//! bytes between calls to the underlying reader or writer.

use std::io::{ErrorKind, Read, Write};

use crate::error::Result;

/// Default buffer size in bytes for [`BitWriter`] and [`BitReader`].
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Read into `buf`, retrying on `Interrupted`. Returns 0 at end of stream.
pub(crate) fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// A buffered bit writer that packs bits MSB first.
///
/// Bits accumulate in a fixed-size byte buffer; when the buffer is full it is
/// written to the inner writer and cleared. The writer never seeks.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    buffer: Vec<u8>,
    /// Bit position within `buffer`.
    bit_count: usize,
    total_bits: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a bit writer with the default buffer size.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a bit writer that buffers `capacity` bytes (at least one).
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            buffer: vec![0; capacity.max(1)],
            bit_count: 0,
            total_bits: 0,
        }
    }

    /// Write the low `length` bits of `pattern`, most significant first.
    ///
    /// # Arguments
    /// * `pattern` - Right-aligned bit pattern (bits above `length` are ignored)
    /// * `length` - Number of bits to write (0-64)
    pub fn write_bits(&mut self, pattern: u64, length: u8) -> Result<()> {
        debug_assert!(length <= 64);

        let mut remaining = length;
        while remaining > 0 {
            let byte_index = self.bit_count / 8;
            let space = 8 - (self.bit_count % 8) as u8;
            let to_write = remaining.min(space);

            // Top `to_write` bits of what is left, placed just below the bits
            // already used in the current byte.
            let shift = remaining - to_write;
            let mask = (1u64 << to_write) - 1;
            let bits = ((pattern >> shift) & mask) as u8;
            self.buffer[byte_index] |= bits << (space - to_write);

            self.bit_count += to_write as usize;
            self.total_bits += to_write as u64;
            remaining -= to_write;

            if self.bit_count == self.buffer.len() * 8 {
                self.write_buffer(self.buffer.len())?;
            }
        }
        Ok(())
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Write out buffered bits, zero-padding the final partial byte.
    ///
    /// Only the used bytes are written. Bits written afterwards start on a
    /// fresh byte.
    pub fn flush(&mut self) -> Result<()> {
        if self.bit_count > 0 {
            self.write_buffer(self.bit_count.div_ceil(8))?;
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the inner writer together with the total bit count.
    pub fn finish(mut self) -> Result<(W, u64)> {
        self.flush()?;
        Ok((self.inner, self.total_bits))
    }

    /// Number of meaningful bits written so far (padding excluded).
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    fn write_buffer(&mut self, used: usize) -> Result<()> {
        self.inner.write_all(&self.buffer[..used])?;
        self.buffer.fill(0);
        self.bit_count = 0;
        Ok(())
    }
}

/// A buffered bit reader for MSB-first streams written by [`BitWriter`].
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    buffer: Vec<u8>,
    filled: usize,
    /// Bit position within the filled part of `buffer`.
    bit_pos: usize,
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a bit reader with the default buffer size.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a bit reader that refills `capacity` bytes (at least one) at a time.
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buffer: vec![0; capacity.max(1)],
            filled: 0,
            bit_pos: 0,
            bits_read: 0,
        }
    }

    /// Read one bit. Returns `None` at end of stream.
    #[inline]
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.bit_pos == self.filled * 8 && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buffer[self.bit_pos / 8];
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1 == 1;
        self.bit_pos += 1;
        self.bits_read += 1;
        Ok(Some(bit))
    }

    /// Read `n` bits (0-64) MSB first. Returns `None` if the stream ends first.
    pub fn read_bits(&mut self, n: u8) -> Result<Option<u64>> {
        debug_assert!(n <= 64);
        let mut value = 0u64;
        for _ in 0..n {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// Total bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Unwrap the reader. Buffered but unread bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn refill(&mut self) -> Result<bool> {
        self.filled = read_some(&mut self.inner, &mut self.buffer)?;
        self.bit_pos = 0;
        Ok(self.filled > 0)
    }
}
