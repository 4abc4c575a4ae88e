//! Byte frequency tables.

use std::io::Read;

use crate::bits::read_some;
use crate::error::Result;

/// Number of distinct byte values.
pub const ALPHABET_SIZE: usize = 256;

/// Largest frequency that fits the one-byte header field.
pub const MAX_SCALED_FREQUENCY: u64 = u8::MAX as u64;

/// Occurrence count for every byte value, indexed by the byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    /// An all-zero table.
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Count every byte of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.update(data);
        table
    }

    /// Scan `reader` to EOF in chunks of `chunk_size` bytes.
    pub fn count<R: Read>(reader: &mut R, chunk_size: usize) -> Result<Self> {
        let mut table = Self::new();
        let mut chunk = vec![0u8; chunk_size.max(1)];
        loop {
            let n = read_some(reader, &mut chunk)?;
            if n == 0 {
                break;
            }
            table.update(&chunk[..n]);
        }
        log::debug!(
            "frequency scan: {} bytes, {} distinct symbols",
            table.total(),
            table.distinct()
        );
        Ok(table)
    }

    /// Add the bytes of `data` to the running counts.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    /// Count for `symbol`.
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Overwrite the count for `symbol`.
    pub fn set(&mut self, symbol: u8, count: u64) {
        self.counts[symbol as usize] = count;
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Largest count in the table (0 when empty).
    pub fn max(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// True if no symbol was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// `(symbol, count)` for every present symbol, ascending by symbol.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(symbol, &c)| (symbol as u8, c))
    }

    /// Divisor that brings the largest count into one byte: `max(1, ceil(max / 255))`.
    pub fn scale_divisor(&self) -> u64 {
        self.max().div_ceil(MAX_SCALED_FREQUENCY).max(1)
    }

    /// Quantize every present count to `1..=255`.
    ///
    /// Present symbols never scale to zero, so the set of present symbols is
    /// unchanged. Only relative order matters for the tree, and the decoder
    /// rebuilds from exactly this table.
    pub fn scaled(&self) -> Self {
        let divisor = self.scale_divisor();
        let mut scaled = Self::new();
        for (symbol, count) in self.present() {
            scaled.set(symbol, (count / divisor).max(1));
        }
        scaled
    }
}
