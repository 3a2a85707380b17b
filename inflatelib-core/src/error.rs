//! Error types for inflatelib operations.
//!
//! A single error enum covers the decoder and the offline block encoder.
//! The decoder treats every error as terminal: once an [`InflateError`] has
//! been returned, the inflater replays the same error on every further call.
//! The type is `Clone` to support that replay; the library performs no I/O,
//! so there is no `io::Error` variant.

use thiserror::Error;

/// The main error type for inflatelib operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InflateError {
    /// Reserved block type (BTYPE=11) in a block header.
    #[error("invalid block type: BTYPE=11 is reserved")]
    InvalidBlockType,

    /// Stored-block header failed the LEN/NLEN complement check.
    #[error("corrupt stored block: LEN={len:#06x} but NLEN={nlen:#06x}")]
    CorruptStoredBlock {
        /// LEN field as read from the stream.
        len: u16,
        /// NLEN field as read from the stream.
        nlen: u16,
    },

    /// A code-length vector is over-subscribed or otherwise disallowed.
    #[error("invalid code lengths: {detail}")]
    InvalidCodeLengths {
        /// Description of the violation.
        detail: String,
    },

    /// A code-length vector under-specifies its tree (Kraft sum below one
    /// with more than one code present).
    #[error("incomplete Huffman tree: {assigned} codes leave unassigned bit patterns")]
    IncompleteTree {
        /// Number of codes the vector assigns.
        assigned: usize,
    },

    /// RLE symbol 16 (copy previous length) appeared before any length was
    /// emitted.
    #[error("code-length repeat with no previous length to copy")]
    RepeatBeforeFirst,

    /// A code-length run expanded past the number of entries the header
    /// declared.
    #[error("code-length run overflows the declared {expected} entries")]
    OverflowCodeLengths {
        /// Total entries the header declared (HLIT + HDIST).
        expected: usize,
    },

    /// A bit pattern does not decode to any symbol in the current table.
    #[error("bit pattern matches no Huffman code")]
    InvalidCode,

    /// A decoded symbol lies outside its alphabet.
    #[error("invalid symbol {symbol}")]
    InvalidSymbol {
        /// The offending symbol value.
        symbol: u16,
    },

    /// A back-reference reaches before the start of output or beyond the
    /// window capacity.
    #[error("invalid back-reference distance {distance}: only {available} bytes of history")]
    InvalidDistance {
        /// The requested distance.
        distance: usize,
        /// Bytes of history actually available.
        available: usize,
    },

    /// Input ended before the final block completed.
    #[error("unexpected end of input before the final block")]
    UnexpectedEnd,

    /// The encoder built a code longer than the alphabet permits.
    #[error("Huffman tree depth {depth} exceeds the {limit}-bit limit")]
    TreeTooTall {
        /// Deepest leaf the construction produced.
        depth: u16,
        /// Maximum code length the alphabet allows.
        limit: u16,
    },

    /// The encoder's input symbol stream failed to parse or validate.
    #[error("invalid symbol stream: {detail}")]
    InvalidSymbolStream {
        /// Description of the parse failure.
        detail: String,
    },

    /// A textual block rendering failed to parse during bit packing.
    #[error("invalid block text: {detail}")]
    InvalidBlockText {
        /// Description of the malformed token or structure.
        detail: String,
    },
}

/// Result type alias for inflatelib operations.
pub type Result<T> = std::result::Result<T, InflateError>;

impl InflateError {
    /// Create a corrupt stored block error.
    pub fn corrupt_stored_block(len: u16, nlen: u16) -> Self {
        Self::CorruptStoredBlock { len, nlen }
    }

    /// Create an invalid code lengths error.
    pub fn invalid_code_lengths(detail: impl Into<String>) -> Self {
        Self::InvalidCodeLengths {
            detail: detail.into(),
        }
    }

    /// Create an incomplete tree error.
    pub fn incomplete_tree(assigned: usize) -> Self {
        Self::IncompleteTree { assigned }
    }

    /// Create a code-length overflow error.
    pub fn overflow_code_lengths(expected: usize) -> Self {
        Self::OverflowCodeLengths { expected }
    }

    /// Create an invalid symbol error.
    pub fn invalid_symbol(symbol: u16) -> Self {
        Self::InvalidSymbol { symbol }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, available: usize) -> Self {
        Self::InvalidDistance {
            distance,
            available,
        }
    }

    /// Create a tree-too-tall error.
    pub fn tree_too_tall(depth: u16, limit: u16) -> Self {
        Self::TreeTooTall { depth, limit }
    }

    /// Create a symbol stream error.
    pub fn invalid_symbol_stream(detail: impl Into<String>) -> Self {
        Self::InvalidSymbolStream {
            detail: detail.into(),
        }
    }

    /// Create a block text error.
    pub fn invalid_block_text(detail: impl Into<String>) -> Self {
        Self::InvalidBlockText {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InflateError::corrupt_stored_block(0x0005, 0x0005);
        assert!(err.to_string().contains("corrupt stored block"));

        let err = InflateError::invalid_distance(300, 5);
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("5"));

        let err = InflateError::tree_too_tall(19, 15);
        assert!(err.to_string().contains("19"));
    }

    #[test]
    fn test_error_clone_eq() {
        let err = InflateError::invalid_code_lengths("over-subscribed");
        assert_eq!(err.clone(), err);
    }
}
