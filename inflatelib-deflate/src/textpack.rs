//! Reference bit-packer for the encoder's textual block grammar.
//!
//! The encoder renders a block as lines of binary tokens:
//!
//! - a token of `0`/`1` digits is an N-bit binary number, most-significant
//!   bit first (the default mode, used for Huffman codes);
//! - `>N` pushes a bit-ordering override: until the matching `>>N`, each
//!   token is packed LSB-first as an N-bit-style value field (header counts
//!   and extra bits);
//! - `#` starts a comment running to end of line.
//!
//! Packing the text yields the DEFLATE byte stream, padded with zero bits
//! to a byte boundary at the end.

use inflatelib_core::BitWriter;
use inflatelib_core::error::{InflateError, Result};

/// Pack a textual block rendering into its byte stream.
pub fn pack_block_text(text: &str) -> Result<Vec<u8>> {
    let mut writer = BitWriter::new();
    let mut override_depth = 0usize;

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("");
        for token in line.split_whitespace() {
            if let Some(rest) = token.strip_prefix(">>") {
                check_override_width(rest)?;
                if override_depth == 0 {
                    return Err(InflateError::invalid_block_text(
                        "'>>' pops an override that was never pushed",
                    ));
                }
                override_depth -= 1;
            } else if let Some(rest) = token.strip_prefix('>') {
                check_override_width(rest)?;
                override_depth += 1;
            } else {
                if token.is_empty() || !token.bytes().all(|b| b == b'0' || b == b'1') {
                    return Err(InflateError::invalid_block_text(format!(
                        "malformed binary token {:?}",
                        token
                    )));
                }
                if token.len() > 32 {
                    return Err(InflateError::invalid_block_text(format!(
                        "token wider than 32 bits: {:?}",
                        token
                    )));
                }
                if override_depth > 0 {
                    // Value field: pack LSB-first.
                    let value = u32::from_str_radix(token, 2).map_err(|_| {
                        InflateError::invalid_block_text(format!("bad binary token {:?}", token))
                    })?;
                    writer.write_bits(value, token.len() as u32);
                } else {
                    // Huffman code: the written digits hit the stream in order.
                    for digit in token.bytes() {
                        writer.write_bit(digit == b'1');
                    }
                }
            }
        }
    }

    if override_depth != 0 {
        return Err(InflateError::invalid_block_text(
            "unbalanced bit-ordering override",
        ));
    }
    Ok(writer.finish())
}

fn check_override_width(rest: &str) -> Result<()> {
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InflateError::invalid_block_text(format!(
            "malformed override token width {:?}",
            rest
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pack_msb_first() {
        // Code 01110001 then padding: the first digit is the first stream
        // bit, i.e. the LSB of the output byte.
        let bytes = pack_block_text("01110001").unwrap();
        assert_eq!(bytes, vec![0b1000_1110]);
    }

    #[test]
    fn test_fields_pack_lsb_first() {
        // Value 2 as a 2-bit field: bits 0 then 1; then a bare 1 bit.
        let bytes = pack_block_text(">1 10 >>1 1").unwrap();
        assert_eq!(bytes, vec![0b0000_0110]);
    }

    #[test]
    fn test_comments_ignored() {
        let bytes = pack_block_text("# header\n1 # BFINAL\n>1 01 >>1 # BTYPE\n").unwrap();
        assert_eq!(bytes.len(), 1);
        assert_eq!(bytes[0] & 0b111, 0b011);
    }

    #[test]
    fn test_unbalanced_override_rejected() {
        assert!(pack_block_text(">1 10").is_err());
        assert!(pack_block_text(">>1 10").is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert!(pack_block_text("10x1").is_err());
        assert!(pack_block_text(">z 1 >>z").is_err());
    }
}
