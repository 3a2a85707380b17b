//! Length/distance base tables and the fixed Huffman codes.
//!
//! The base and extra-bit tables follow RFC 1951 §3.2.5; Deflate64 changes
//! exactly three entries: length symbol 285 gains 16 extra bits over base 3
//! (match lengths up to 65 538), and distance symbols 30 and 31 exist with
//! bases 32 769 and 49 153 and 14 extra bits each (distances up to 65 536,
//! matching the enlarged 64 KiB window).

use crate::huffman::HuffmanTable;
use inflatelib_core::window::sizes;
use std::sync::OnceLock;

/// Which bitstream variant an inflater or encoder targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateMode {
    /// RFC 1951 DEFLATE: 32 KiB window, match lengths up to 258.
    Deflate,
    /// Microsoft Deflate64: 64 KiB window, match lengths up to 65 538.
    Deflate64,
}

impl InflateMode {
    /// History window capacity for this variant.
    pub fn window_size(self) -> usize {
        match self {
            Self::Deflate => sizes::DEFLATE,
            Self::Deflate64 => sizes::DEFLATE64,
        }
    }

    /// Largest back-reference length a block may encode.
    pub fn max_match_length(self) -> u32 {
        match self {
            Self::Deflate => 258,
            Self::Deflate64 => 65_538,
        }
    }

    /// Largest back-reference distance a block may encode.
    pub fn max_distance(self) -> u32 {
        match self {
            Self::Deflate => 32_768,
            Self::Deflate64 => 65_536,
        }
    }

    /// Number of symbols in this variant's distance alphabet.
    pub fn distance_symbol_count(self) -> usize {
        match self {
            Self::Deflate => 30,
            Self::Deflate64 => 32,
        }
    }
}

/// Base match lengths for length codes 257-285 (RFC 1951 §3.2.5).
///
/// In Deflate64 the final entry (symbol 285) is overridden: base 3 with 16
/// extra bits. Use [`decode_length`] / [`length_extra_bits`] rather than
/// indexing directly when the mode matters.
pub const LENGTH_BASE: [u32; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (Deflate64: base 3, 16 extra bits)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285 (Deflate64: 16)
];

/// Length symbol whose interpretation differs between the two variants.
pub const LONG_LENGTH_SYMBOL: u16 = 285;

/// Base distances for distance codes 0-31.
///
/// Codes 30 and 31 exist only in Deflate64; DEFLATE streams never reference
/// them.
pub const DISTANCE_BASE: [u32; 32] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
    32769, 49153, // 30-31: 14 extra bits (Deflate64 only)
];

/// Number of extra bits for distance codes 0-31.
pub const DISTANCE_EXTRA_BITS: [u8; 32] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
    14, 14, // 30-31 (Deflate64 only)
];

/// Order of code length codes in a dynamic block header (RFC 1951 §3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Number of extra bits carried by a length code in the given mode.
pub fn length_extra_bits(mode: InflateMode, code: u16) -> u8 {
    debug_assert!((257..=285).contains(&code));
    if mode == InflateMode::Deflate64 && code == LONG_LENGTH_SYMBOL {
        16
    } else {
        LENGTH_EXTRA_BITS[(code - 257) as usize]
    }
}

/// Decode a match length from a length code and its extra bits.
pub fn decode_length(mode: InflateMode, code: u16, extra: u32) -> u32 {
    debug_assert!((257..=285).contains(&code));
    if mode == InflateMode::Deflate64 && code == LONG_LENGTH_SYMBOL {
        3 + extra
    } else {
        LENGTH_BASE[(code - 257) as usize] + extra
    }
}

/// Number of extra bits carried by a distance code.
pub fn distance_extra_bits(code: u16) -> u8 {
    debug_assert!(code < 32);
    DISTANCE_EXTRA_BITS[code as usize]
}

/// Decode a distance from a distance code and its extra bits.
pub fn decode_distance(code: u16, extra: u32) -> u32 {
    debug_assert!(code < 32);
    DISTANCE_BASE[code as usize] + extra
}

/// Convert a match length to `(code, extra_bits, extra_value)`.
pub fn length_to_code(mode: InflateMode, length: u32) -> (u16, u8, u32) {
    debug_assert!(
        length >= 3 && length <= mode.max_match_length(),
        "length out of range: {}",
        length
    );

    if mode == InflateMode::Deflate64 && length >= 258 {
        return (LONG_LENGTH_SYMBOL, 16, length - 3);
    }

    let code = match length {
        3..=10 => length - 3 + 257,
        11..=18 => (length - 11) / 2 + 265,
        19..=34 => (length - 19) / 4 + 269,
        35..=66 => (length - 35) / 8 + 273,
        67..=130 => (length - 67) / 16 + 277,
        131..=257 => (length - 131) / 32 + 281,
        _ => 285, // 258
    } as u16;

    let base = LENGTH_BASE[(code - 257) as usize];
    let extra_bits = LENGTH_EXTRA_BITS[(code - 257) as usize];
    (code, extra_bits, length - base)
}

/// Convert a distance to `(code, extra_bits, extra_value)`.
pub fn distance_to_code(mode: InflateMode, distance: u32) -> (u16, u8, u32) {
    debug_assert!(
        distance >= 1 && distance <= mode.max_distance(),
        "distance out of range: {}",
        distance
    );

    let bases = &DISTANCE_BASE[..mode.distance_symbol_count()];
    let code = bases.partition_point(|&base| base <= distance) - 1;
    (
        code as u16,
        DISTANCE_EXTRA_BITS[code],
        distance - DISTANCE_BASE[code],
    )
}

/// Fixed literal/length code lengths (RFC 1951 §3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [8u8; 288];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths
}

/// Fixed distance code lengths: 5 bits for all 32 codes.
///
/// RFC 1951 defines all 32 even though codes 30-31 never occur in DEFLATE;
/// in Deflate64 they are live.
pub fn fixed_distance_lengths() -> [u8; 32] {
    [5u8; 32]
}

/// The fixed literal/length decoding table, built once.
pub fn fixed_litlen_table() -> &'static HuffmanTable {
    static TABLE: OnceLock<HuffmanTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        HuffmanTable::from_code_lengths(&fixed_litlen_lengths(), 15)
            .expect("fixed literal/length table construction cannot fail")
    })
}

/// The fixed distance decoding table, built once.
pub fn fixed_distance_table() -> &'static HuffmanTable {
    static TABLE: OnceLock<HuffmanTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        HuffmanTable::from_code_lengths(&fixed_distance_lengths(), 15)
            .expect("fixed distance table construction cannot fail")
    })
}
