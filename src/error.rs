//! Error types for the bytepress library.

use thiserror::Error;

/// Result type alias for bytepress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compressing or decompressing a stream.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying read, write, or seek failed (including short reads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Insert into a heap that is already at its fixed capacity.
    #[error("heap is full (capacity {capacity})")]
    HeapFull {
        /// Capacity fixed at construction.
        capacity: usize,
    },
    /// Extract from an empty heap.
    #[error("heap is empty")]
    HeapEmpty,
    /// The one-byte symbol count cannot describe this many distinct symbols.
    #[error("{count} distinct symbols exceed the container limit of 255")]
    TooManySymbols {
        /// Number of distinct symbols found in the input.
        count: usize,
    },
    /// A generated code does not fit the 64-bit pattern field.
    #[error("code for symbol {symbol:#04x} is {length} bits long (max 64)")]
    CodeTooLong {
        /// Symbol whose code overflowed.
        symbol: u8,
        /// Depth of the symbol's leaf.
        length: usize,
    },
    /// Header is truncated or internally inconsistent.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),
    /// Payload could not be decoded.
    #[error("invalid compressed data: {0}")]
    InvalidDecode(String),
    /// Internal compression error.
    #[error("compression error: {0}")]
    Compression(String),
}

impl Error {
    /// Maps an unexpected end-of-file on a header read into [`Error::CorruptHeader`].
    pub(crate) fn header_eof(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::CorruptHeader(format!("truncated while reading {what}"))
        } else {
            Error::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::TooManySymbols { count: 256 }.to_string(),
            "256 distinct symbols exceed the container limit of 255"
        );
        assert_eq!(
            Error::CodeTooLong {
                symbol: 0x41,
                length: 70
            }
            .to_string(),
            "code for symbol 0x41 is 70 bits long (max 64)"
        );
        assert_eq!(Error::HeapFull { capacity: 3 }.to_string(), "heap is full (capacity 3)");
    }

    #[test]
    fn test_header_eof_mapping() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(matches!(
            Error::header_eof(eof, "symbol table"),
            Error::CorruptHeader(msg) if msg.contains("symbol table")
        ));

        let other = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(Error::header_eof(other, "count"), Error::Io(_)));
    }
}
