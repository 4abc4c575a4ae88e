//! LZ77 compression with a sliding window.
//!
//! LZ77 finds repeated sequences in the input and replaces them with
//! (length, distance) pairs referring back to previous occurrences. Matches
//! are found greedily: at each position the longest match inside the window
//! is taken, located through hash chains over 3-byte prefixes.
//!
//! Every token is serialized as three bytes:
//!
//! ```text
//! [distance: u16 LE][length or literal: u8]
//! ```
//!
//! A distance of zero marks a literal; otherwise the third byte is the match
//! length.

use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Largest window (and therefore distance) supported.
pub const MAX_DISTANCE: usize = 32 * 1024;

/// Maximum match length (fits the one-byte length field).
pub const MAX_MATCH_LENGTH: usize = u8::MAX as usize;

/// Minimum match length worth encoding.
pub const MIN_MATCH_LENGTH: usize = 3;

/// Bytes per serialized token.
pub const TOKEN_SIZE: usize = 3;

const HASH_SIZE: usize = 1 << 15;

const NIL: usize = usize::MAX;

/// LZ77 token representing either a literal or a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte that couldn't be compressed.
    Literal(u8),
    /// A back-reference: (length, distance).
    Match {
        /// Length of the match (3-255).
        length: u8,
        /// Distance back to the match (1-32768).
        distance: u16,
    },
}

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77Options {
    /// How far back matches may reach (1-32768 bytes).
    pub window_size: usize,
    /// Candidates examined per position.
    pub max_chain_length: usize,
}

impl Default for Lz77Options {
    fn default() -> Self {
        Self::level(6)
    }
}

impl Lz77Options {
    /// Preset for a compression level 1-9 (higher = better compression, slower).
    pub fn level(level: u8) -> Self {
        let max_chain_length = match level.clamp(1, 9) {
            1 => 4,
            2 => 8,
            3 => 16,
            4 => 32,
            5 => 64,
            6 => 128,
            7 => 256,
            8 => 1024,
            _ => 4096,
        };
        Self {
            window_size: MAX_DISTANCE,
            max_chain_length,
        }
    }
}

#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    let val = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], 0]);
    (val.wrapping_mul(0x1E35_A7BD) >> 17) as usize & (HASH_SIZE - 1)
}

/// LZ77 compressor with hash chain for fast matching.
pub struct Lz77Compressor {
    /// Hash table: maps hash -> most recent position
    head: Vec<usize>,
    /// Chain links: prev[pos % window] -> previous position with same hash
    prev: Vec<usize>,
    window_size: usize,
    max_chain_length: usize,
}

impl Lz77Compressor {
    /// Create a compressor with the given search parameters.
    pub fn new(options: &Lz77Options) -> Self {
        let window_size = options.window_size.clamp(1, MAX_DISTANCE);
        Self {
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; window_size],
            window_size,
            max_chain_length: options.max_chain_length.max(1),
        }
    }

    /// Compress data and return LZ77 tokens.
    pub fn compress(&mut self, data: &[u8]) -> Vec<Token> {
        self.head.fill(NIL);
        self.prev.fill(NIL);

        let mut tokens = Vec::with_capacity(data.len() / 2 + 1);
        let mut pos = 0;
        while pos < data.len() {
            match self.find_best_match(data, pos) {
                Some((length, distance)) => {
                    tokens.push(Token::Match {
                        length: length as u8,
                        distance: distance as u16,
                    });
                    for p in pos..pos + length {
                        self.update_hash(data, p);
                    }
                    pos += length;
                }
                None => {
                    tokens.push(Token::Literal(data[pos]));
                    self.update_hash(data, pos);
                    pos += 1;
                }
            }
        }
        tokens
    }

    fn find_best_match(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH_LENGTH > data.len() {
            return None;
        }

        let max_len = (data.len() - pos).min(MAX_MATCH_LENGTH);
        let mut chain_pos = self.head[hash3(data, pos)];
        let mut best_length = MIN_MATCH_LENGTH - 1;
        let mut best_distance = 0;
        let mut chain_remaining = self.max_chain_length;

        while chain_pos != NIL && chain_remaining > 0 {
            let distance = pos - chain_pos;
            if distance > self.window_size {
                break;
            }

            let length = match_length(data, chain_pos, pos, max_len);
            if length > best_length {
                best_length = length;
                best_distance = distance;
                if length == max_len {
                    break;
                }
            }

            // Slots are reused once the window wraps; only ever walk backwards.
            let next = self.prev[chain_pos % self.window_size];
            if next == NIL || next >= chain_pos {
                break;
            }
            chain_pos = next;
            chain_remaining -= 1;
        }

        (best_length >= MIN_MATCH_LENGTH).then_some((best_length, best_distance))
    }

    #[inline]
    fn update_hash(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH_LENGTH > data.len() {
            return;
        }
        let hash = hash3(data, pos);
        self.prev[pos % self.window_size] = self.head[hash];
        self.head[hash] = pos;
    }
}

#[inline]
fn match_length(data: &[u8], earlier: usize, pos: usize, max_len: usize) -> usize {
    data[earlier..]
        .iter()
        .zip(&data[pos..pos + max_len])
        .take_while(|(a, b)| a == b)
        .count()
}

/// Serialize tokens into three-byte records.
pub fn write_tokens(tokens: &[Token], out: &mut Vec<u8>) {
    out.reserve(tokens.len() * TOKEN_SIZE);
    for token in tokens {
        match *token {
            Token::Literal(byte) => out.extend_from_slice(&[0, 0, byte]),
            Token::Match { length, distance } => {
                out.extend_from_slice(&distance.to_le_bytes());
                out.push(length);
            }
        }
    }
}

/// Parse three-byte records back into tokens.
pub fn read_tokens(data: &[u8]) -> Result<Vec<Token>> {
    if data.len() % TOKEN_SIZE != 0 {
        return Err(Error::InvalidDecode(format!(
            "LZ77 stream length {} is not a multiple of {}",
            data.len(),
            TOKEN_SIZE
        )));
    }
    data.chunks_exact(TOKEN_SIZE)
        .map(|record| {
            let distance = u16::from_le_bytes([record[0], record[1]]);
            match (distance, record[2]) {
                (0, byte) => Ok(Token::Literal(byte)),
                (_, 0) => Err(Error::InvalidDecode("LZ77 match of length 0".into())),
                (distance, length) => Ok(Token::Match { length, distance }),
            }
        })
        .collect()
}

/// Expand tokens, checking every back-reference against the output so far.
pub fn expand(tokens: &[Token]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for token in tokens {
        match *token {
            Token::Literal(byte) => out.push(byte),
            Token::Match { length, distance } => {
                let distance = distance as usize;
                if distance > out.len() {
                    return Err(Error::InvalidDecode(format!(
                        "LZ77 distance {} exceeds {} bytes of output",
                        distance,
                        out.len()
                    )));
                }
                // Byte-by-byte so overlapping matches repeat their own output.
                let start = out.len() - distance;
                for i in 0..length as usize {
                    let byte = out[start + i];
                    out.push(byte);
                }
            }
        }
    }
    Ok(out)
}

/// Compress a byte slice to the three-byte token format.
pub fn compress_slice(data: &[u8], options: &Lz77Options) -> Vec<u8> {
    let tokens = Lz77Compressor::new(options).compress(data);
    let mut out = Vec::new();
    write_tokens(&tokens, &mut out);
    out
}

/// Decompress a three-byte token stream held in memory.
pub fn decompress_slice(data: &[u8]) -> Result<Vec<u8>> {
    expand(&read_tokens(data)?)
}

/// Compress everything readable from `input` into `output`.
///
/// Returns `(bytes read, bytes written)`.
pub fn compress<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    options: &Lz77Options,
) -> Result<(u64, u64)> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let compressed = compress_slice(&data, options);
    output.write_all(&compressed)?;
    output.flush()?;
    log::info!(
        "lz77: {} bytes -> {} bytes ({} tokens)",
        data.len(),
        compressed.len(),
        compressed.len() / TOKEN_SIZE
    );
    Ok((data.len() as u64, compressed.len() as u64))
}

/// Decompress everything readable from `input` into `output`.
///
/// Returns the number of bytes written.
pub fn decompress<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<u64> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let expanded = decompress_slice(&data)?;
    output.write_all(&expanded)?;
    output.flush()?;
    log::info!("lz77: {} bytes -> {} bytes", data.len(), expanded.len());
    Ok(expanded.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_for(data: &[u8]) -> Vec<Token> {
        Lz77Compressor::new(&Lz77Options::default()).compress(data)
    }

    #[test]
    fn test_lz77_no_matches() {
        let data = b"abcdefgh";
        let tokens = tokens_for(data);

        // All literals
        assert_eq!(tokens.len(), 8);
        for (i, &token) in tokens.iter().enumerate() {
            assert_eq!(token, Token::Literal(data[i]));
        }
    }

    #[test]
    fn test_lz77_simple_repeat() {
        let tokens = tokens_for(b"abcabcabc");
        // "abc" as literals, then one overlapping match of 6.
        assert_eq!(
            tokens,
            vec![
                Token::Literal(b'a'),
                Token::Literal(b'b'),
                Token::Literal(b'c'),
                Token::Match {
                    length: 6,
                    distance: 3
                },
            ]
        );
    }

    #[test]
    fn test_lz77_run_of_one_byte() {
        let tokens = tokens_for(&[7u8; 100]);
        assert_eq!(tokens[0], Token::Literal(7));
        assert_eq!(
            tokens[1],
            Token::Match {
                length: 99,
                distance: 1
            }
        );
        assert_eq!(expand(&tokens).unwrap(), vec![7u8; 100]);
    }

    #[test]
    fn test_lz77_match_length_capped() {
        let data = vec![0u8; 1000];
        let tokens = tokens_for(&data);
        for token in &tokens {
            if let Token::Match { length, .. } = token {
                assert!(*length as usize <= MAX_MATCH_LENGTH);
            }
        }
        assert_eq!(expand(&tokens).unwrap(), data);
    }

    #[test]
    fn test_lz77_empty() {
        assert!(tokens_for(&[]).is_empty());
        assert!(compress_slice(&[], &Lz77Options::default()).is_empty());
        assert!(decompress_slice(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_small_window_limits_distance() {
        let options = Lz77Options {
            window_size: 4,
            max_chain_length: 16,
        };
        let data = b"abcdefgh-abcdefgh";
        let tokens = Lz77Compressor::new(&options).compress(data);
        assert!(tokens.iter().all(|t| match t {
            Token::Match { distance, .. } => *distance <= 4,
            Token::Literal(_) => true,
        }));
        assert_eq!(expand(&tokens).unwrap(), data);
    }

    #[test]
    fn test_wire_format() {
        let mut out = Vec::new();
        write_tokens(
            &[
                Token::Literal(0x41),
                Token::Match {
                    length: 5,
                    distance: 0x0102,
                },
            ],
            &mut out,
        );
        assert_eq!(out, vec![0, 0, 0x41, 0x02, 0x01, 5]);
    }

    #[test]
    fn test_round_trip_text() {
        let data = b"It was the best of times, it was the worst of times, it was the age of wisdom";
        let compressed = compress_slice(data, &Lz77Options::level(9));
        assert!(compressed.len() < data.len() * TOKEN_SIZE);
        assert_eq!(decompress_slice(&compressed).unwrap(), data);
    }

    #[test]
    fn test_rejects_bad_streams() {
        assert!(matches!(
            decompress_slice(&[0, 0]),
            Err(Error::InvalidDecode(_))
        ));
        // Distance 1 with nothing decoded yet.
        assert!(matches!(
            decompress_slice(&[1, 0, 3]),
            Err(Error::InvalidDecode(_))
        ));
        // Zero-length match.
        assert!(matches!(
            decompress_slice(&[0, 0, b'x', 1, 0, 0]),
            Err(Error::InvalidDecode(_))
        ));
    }
}
