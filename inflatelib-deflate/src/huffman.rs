//! Canonical Huffman tables for DEFLATE decoding.
//!
//! DEFLATE transmits Huffman codes as per-symbol bit lengths; the codes
//! themselves are reconstructed canonically (RFC 1951 §3.2.2): symbols are
//! ordered first by code length, then numerically, and codes of each length
//! are consecutive. A length of 0 means the symbol is absent.
//!
//! Codes are stored in the bitstream MSB-first while everything else is
//! LSB-first, so the lookup table is indexed by the bit-reversed code prefix.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-285 (0-255 literals, 256 end-of-block, 257-285
//!   lengths), codes up to 15 bits
//! - **Distance**: 0-29 (DEFLATE) or 0-31 (Deflate64), codes up to 15 bits
//! - **Code Length**: 0-18, codes up to 7 bits

use inflatelib_core::BitReader;
use inflatelib_core::error::{InflateError, Result};

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_CODE_LENGTH: u8 = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_CODELEN_CODE_LENGTH: u8 = 7;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Outcome of a single-symbol decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A symbol was decoded and its bits consumed.
    Symbol(u16),
    /// The buffered bits do not yet cover the code; feed more and retry.
    /// Nothing was consumed.
    NeedMoreInput,
    /// The buffered bits cannot extend to any assigned code.
    Invalid,
}

/// A Huffman decoding table.
///
/// Codes no longer than `FAST_BITS` resolve through a direct lookup indexed
/// by the reversed bit prefix; longer codes fall back to a canonical
/// walk over the per-length code ranges. Decoding never consumes bits unless
/// a whole symbol resolves, so a suspended decode resumes cleanly once more
/// input arrives.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Direct lookup table: `(symbol, code_length)`, zero length = miss.
    fast_table: Vec<(u16, u8)>,
    /// Number of bits indexing the fast table.
    fast_bits: u32,
    /// Longest assigned code, 0 for an empty table.
    max_code_length: u32,
    /// Symbols ordered by (length, symbol).
    symbols: Vec<u16>,
    /// Number of codes per length.
    counts: [u16; MAX_CODE_LENGTH as usize + 1],
    /// First canonical code of each length.
    base_codes: [u32; MAX_CODE_LENGTH as usize + 1],
    /// Index into `symbols` of each length's first symbol.
    symbol_offsets: [u16; MAX_CODE_LENGTH as usize + 1],
}

impl HuffmanTable {
    /// Number of bits resolved by the direct lookup table.
    const FAST_BITS: u32 = 9;

    /// Build a table from per-symbol code lengths.
    ///
    /// `max_code_length` is the alphabet's ceiling (15, or 7 for the
    /// code-length alphabet). The length vector must satisfy the Kraft
    /// inequality exactly, with two sanctioned exceptions: an all-zero
    /// vector builds an empty table (valid while no symbol is ever decoded
    /// from it), and a single code of length 1 is accepted (a one-symbol
    /// alphabet cannot fill its code space).
    pub fn from_code_lengths(code_lengths: &[u8], max_code_length: u8) -> Result<Self> {
        debug_assert!(max_code_length <= MAX_CODE_LENGTH);

        let mut counts = [0u16; MAX_CODE_LENGTH as usize + 1];
        let mut max_len = 0u8;
        for &len in code_lengths {
            if len > 0 {
                if len > max_code_length {
                    return Err(InflateError::invalid_code_lengths(format!(
                        "code length {} exceeds the {}-bit limit",
                        len, max_code_length
                    )));
                }
                counts[len as usize] += 1;
                max_len = max_len.max(len);
            }
        }

        if max_len == 0 {
            // No symbols at all; decoding from this table always fails.
            return Ok(Self {
                fast_table: Vec::new(),
                fast_bits: 0,
                max_code_length: 0,
                symbols: Vec::new(),
                counts,
                base_codes: [0; MAX_CODE_LENGTH as usize + 1],
                symbol_offsets: [0; MAX_CODE_LENGTH as usize + 1],
            });
        }

        let assigned: usize = counts.iter().map(|&c| c as usize).sum();

        // Kraft check over the full code space.
        let mut left: i64 = 1;
        for bits in 1..=max_code_length as usize {
            left <<= 1;
            left -= counts[bits] as i64;
            if left < 0 {
                return Err(InflateError::invalid_code_lengths(
                    "over-subscribed code set",
                ));
            }
        }
        if left > 0 && !(assigned == 1 && max_len == 1) {
            return Err(InflateError::incomplete_tree(assigned));
        }

        // First canonical code of each length (RFC 1951 §3.2.2).
        let mut base_codes = [0u32; MAX_CODE_LENGTH as usize + 1];
        let mut code = 0u32;
        for bits in 1..=max_len as usize {
            code = (code + counts[bits - 1] as u32) << 1;
            base_codes[bits] = code;
        }

        let mut symbol_offsets = [0u16; MAX_CODE_LENGTH as usize + 1];
        let mut offset = 0u16;
        for bits in 1..=max_len as usize {
            symbol_offsets[bits] = offset;
            offset += counts[bits];
        }

        let fast_bits = Self::FAST_BITS.min(max_len as u32);
        let mut fast_table = vec![(0u16, 0u8); 1 << fast_bits];
        let mut symbols = vec![0u16; assigned];
        let mut next_code = base_codes;

        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            let len = len as usize;
            let code = next_code[len];
            next_code[len] += 1;

            let index = symbol_offsets[len] as usize + (code - base_codes[len]) as usize;
            symbols[index] = symbol as u16;

            if len as u32 <= fast_bits {
                let reversed = reverse_bits(code as u16, len as u8) as usize;
                let stride = 1usize << len;
                let mut slot = reversed;
                while slot < fast_table.len() {
                    fast_table[slot] = (symbol as u16, len as u8);
                    slot += stride;
                }
            }
        }

        Ok(Self {
            fast_table,
            fast_bits,
            max_code_length: max_len as u32,
            symbols,
            counts,
            base_codes,
            symbol_offsets,
        })
    }

    /// Longest assigned code length, 0 for an empty table.
    pub fn max_code_length(&self) -> u32 {
        self.max_code_length
    }

    /// Decode one symbol from the reader.
    ///
    /// Consumes exactly the symbol's code length on success and nothing
    /// otherwise.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader) -> Decoded {
        if self.max_code_length == 0 {
            return Decoded::Invalid;
        }

        let (bits, got) = reader.peek_bits_upto(self.max_code_length);
        if got == 0 {
            return Decoded::NeedMoreInput;
        }

        if got >= self.fast_bits {
            let index = (bits as usize) & (self.fast_table.len() - 1);
            let (symbol, len) = self.fast_table[index];
            if len > 0 {
                reader.consume_bits(len as u32);
                return Decoded::Symbol(symbol);
            }
        }

        self.decode_slow(reader, bits, got)
    }

    /// Canonical walk for codes the fast table cannot resolve.
    fn decode_slow(&self, reader: &mut BitReader, bits: u32, got: u32) -> Decoded {
        let mut code = 0u32;
        for len in 1..=self.max_code_length {
            if len > got {
                return Decoded::NeedMoreInput;
            }
            // The stream stores codes MSB-first: accumulate in that order.
            code = (code << 1) | ((bits >> (len - 1)) & 1);

            let count = self.counts[len as usize] as u32;
            if count > 0 && code >= self.base_codes[len as usize] {
                let index = code - self.base_codes[len as usize];
                if index < count {
                    reader.consume_bits(len);
                    let slot = self.symbol_offsets[len as usize] as usize + index as usize;
                    return Decoded::Symbol(self.symbols[slot]);
                }
            }
        }
        Decoded::Invalid
    }
}

/// Assign canonical codes to a valid code-length vector.
///
/// Returns one code per symbol; symbols with length 0 get code 0. The codes
/// are the plain RFC 1951 values (MSB-first on the wire).
pub fn canonical_codes(code_lengths: &[u8]) -> Vec<u16> {
    let mut counts = [0u32; MAX_CODE_LENGTH as usize + 1];
    for &len in code_lengths {
        debug_assert!(len <= MAX_CODE_LENGTH);
        if len > 0 {
            counts[len as usize] += 1;
        }
    }

    let mut next_code = [0u32; MAX_CODE_LENGTH as usize + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LENGTH as usize {
        code = (code + counts[bits - 1]) << 1;
        next_code[bits] = code;
    }

    let mut codes = vec![0u16; code_lengths.len()];
    for (symbol, &len) in code_lengths.iter().enumerate() {
        if len > 0 {
            codes[symbol] = next_code[len as usize] as u16;
            next_code[len as usize] += 1;
        }
    }
    codes
}

/// Reverse the low `length` bits of `code`.
fn reverse_bits(mut code: u16, length: u8) -> u16 {
    let mut reversed = 0u16;
    for _ in 0..length {
        reversed = (reversed << 1) | (code & 1);
        code >>= 1;
    }
    reversed
}
