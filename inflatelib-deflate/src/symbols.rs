//! The block encoder's input: a textual literal/length/distance symbol
//! stream.
//!
//! Grammar, one symbol per token:
//!
//! - `'c'` is a single-character literal (standard backslash escapes)
//! - `"string"` emits one literal per character
//! - `(length, distance)` is a back-reference; the encoder derives the codes
//!   and extra bits
//! - a bare decimal symbol 0..=285; values above 256 must be followed by
//!   the length-extra value, the distance symbol, and the distance-extra
//!   value as three further decimal tokens
//!
//! Whitespace, commas, semicolons and periods separate tokens; `#` starts a
//! comment running to end of line.

use crate::tables::{
    InflateMode, distance_extra_bits, distance_to_code, length_extra_bits, length_to_code,
};
use inflatelib_core::error::{InflateError, Result};

/// One entry of the symbol stream, normalized to codes and extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockItem {
    /// A literal byte (symbols 0..=255).
    Lit(u8),
    /// End of block (symbol 256).
    Eob,
    /// A back-reference, stored as its wire representation.
    Ref {
        /// Length code, 257..=285.
        len_symbol: u16,
        /// Extra-bit value accompanying the length code.
        len_extra: u32,
        /// Distance code, 0..=29 (0..=31 for Deflate64).
        dist_symbol: u16,
        /// Extra-bit value accompanying the distance code.
        dist_extra: u32,
    },
}

/// Parse a symbol stream into block items, validating against `mode`.
pub fn parse_symbol_stream(mode: InflateMode, text: &str) -> Result<Vec<BlockItem>> {
    Parser::new(mode, text).run()
}

struct Parser {
    mode: InflateMode,
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(mode: InflateMode, text: &str) -> Self {
        Self {
            mode,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, detail: impl Into<String>) -> InflateError {
        InflateError::invalid_symbol_stream(detail)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || c == ';' || c == '.' {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn run(&mut self) -> Result<Vec<BlockItem>> {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            let Some(c) = self.peek() else {
                return Ok(items);
            };
            match c {
                '\'' => items.push(self.parse_char_literal()?),
                '"' => self.parse_string_literal(&mut items)?,
                '(' => items.push(self.parse_pair()?),
                '0'..='9' => self.parse_bare_symbol(&mut items)?,
                other => {
                    return Err(self.error(format!("unexpected character {:?}", other)));
                }
            }
        }
    }

    /// One possibly-escaped character; `delim` is the active quote.
    fn parse_escapable_char(&mut self, delim: char) -> Result<u8> {
        let c = self
            .bump()
            .ok_or_else(|| self.error(format!("unterminated {} literal", delim)))?;
        let value = if c == '\\' {
            let escaped = self
                .bump()
                .ok_or_else(|| self.error("dangling backslash escape"))?;
            match escaped {
                '0' => '\0',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                'b' => '\u{0008}',
                'f' => '\u{000C}',
                'v' => '\u{000B}',
                '\\' => '\\',
                '"' => '"',
                '\'' => '\'',
                other => {
                    return Err(self.error(format!("unknown escape \\{}", other)));
                }
            }
        } else {
            c
        };
        u8::try_from(value as u32)
            .map_err(|_| self.error(format!("character {:?} is not a byte literal", value)))
    }

    fn parse_char_literal(&mut self) -> Result<BlockItem> {
        self.bump(); // opening quote
        let byte = self.parse_escapable_char('\'')?;
        match self.bump() {
            Some('\'') => Ok(BlockItem::Lit(byte)),
            _ => Err(self.error("character literal must hold exactly one character")),
        }
    }

    fn parse_string_literal(&mut self, items: &mut Vec<BlockItem>) -> Result<()> {
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string literal")),
                Some('"') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => items.push(BlockItem::Lit(self.parse_escapable_char('"')?)),
            }
        }
    }

    fn parse_number(&mut self, what: &str) -> Result<u64> {
        self.skip_separators();
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error(format!("expected {}", what)));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse::<u64>()
            .map_err(|_| self.error(format!("{} out of range: {}", what, digits)))
    }

    fn parse_pair(&mut self) -> Result<BlockItem> {
        self.bump(); // '('
        let length = self.parse_number("match length")?;
        let distance = self.parse_number("match distance")?;
        self.skip_separators();
        match self.bump() {
            Some(')') => {}
            _ => return Err(self.error("expected ')' after (length, distance)")),
        }

        if length < 3 || length > self.mode.max_match_length() as u64 {
            return Err(self.error(format!(
                "match length {} outside 3..={}",
                length,
                self.mode.max_match_length()
            )));
        }
        if distance < 1 || distance > self.mode.max_distance() as u64 {
            return Err(self.error(format!(
                "match distance {} outside 1..={}",
                distance,
                self.mode.max_distance()
            )));
        }

        let (len_symbol, _, len_extra) = length_to_code(self.mode, length as u32);
        let (dist_symbol, _, dist_extra) = distance_to_code(self.mode, distance as u32);
        Ok(BlockItem::Ref {
            len_symbol,
            len_extra,
            dist_symbol,
            dist_extra,
        })
    }

    fn parse_bare_symbol(&mut self, items: &mut Vec<BlockItem>) -> Result<()> {
        let symbol = self.parse_number("symbol")?;
        match symbol {
            0..=255 => items.push(BlockItem::Lit(symbol as u8)),
            256 => items.push(BlockItem::Eob),
            257..=285 => {
                let len_symbol = symbol as u16;
                let len_extra = self.parse_number("length-extra value")?;
                let dist_symbol = self.parse_number("distance symbol")?;
                let dist_extra = self.parse_number("distance-extra value")?;

                let len_bits = length_extra_bits(self.mode, len_symbol) as u64;
                if len_bits == 0 && len_extra != 0 || len_bits > 0 && len_extra >= 1 << len_bits {
                    return Err(self.error(format!(
                        "length-extra {} does not fit in {} bits",
                        len_extra, len_bits
                    )));
                }
                if dist_symbol >= self.mode.distance_symbol_count() as u64 {
                    return Err(self.error(format!(
                        "distance symbol {} outside the alphabet",
                        dist_symbol
                    )));
                }
                let dist_bits = distance_extra_bits(dist_symbol as u16) as u64;
                if dist_bits == 0 && dist_extra != 0 || dist_bits > 0 && dist_extra >= 1 << dist_bits
                {
                    return Err(self.error(format!(
                        "distance-extra {} does not fit in {} bits",
                        dist_extra, dist_bits
                    )));
                }

                items.push(BlockItem::Ref {
                    len_symbol,
                    len_extra: len_extra as u32,
                    dist_symbol: dist_symbol as u16,
                    dist_extra: dist_extra as u32,
                });
            }
            _ => {
                return Err(self.error(format!("symbol {} outside the alphabet", symbol)));
            }
        }
        Ok(())
    }
}
