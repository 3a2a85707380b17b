//! Dynamic block header decoding (RFC 1951 §3.2.7).
//!
//! A dynamic block header carries HLIT/HDIST/HCLEN, then the code-length
//! alphabet's own code lengths in a fixed permutation order, then the
//! combined literal/length + distance code-length vector compressed with the
//! run-length symbols 16 (copy previous), 17 (short zero run) and 18 (long
//! zero run).
//!
//! The decoder here is resumable: it consumes bits only in whole atomic
//! units (a field, one 3-bit length, one code-length symbol, one run of
//! extra bits), so input may dry up at any point and decoding continues
//! exactly where it stopped once more bytes are fed.

use crate::huffman::{
    CODELEN_ALPHABET_SIZE, Decoded, HuffmanTable, LITLEN_ALPHABET_SIZE, MAX_CODE_LENGTH,
    MAX_CODELEN_CODE_LENGTH,
};
use crate::tables::{CODE_LENGTH_ORDER, InflateMode};
use inflatelib_core::BitReader;
use inflatelib_core::error::{InflateError, Result};

/// Outcome of one header decoding step.
#[derive(Debug)]
pub(crate) enum HeaderStep {
    /// Input ran out mid-header; feed more and call again.
    NeedInput,
    /// The header is fully decoded; both tables are ready.
    Complete {
        /// Literal/length decoding table.
        litlen: HuffmanTable,
        /// Distance decoding table.
        distance: HuffmanTable,
    },
}

/// A run-length op decoded from the code-length alphabet, waiting for its
/// extra bits.
#[derive(Debug, Clone, Copy)]
enum PendingRepeat {
    /// Symbol 16: repeat the previous length 3 + 2 extra bits times.
    CopyPrevious { value: u8 },
    /// Symbol 17: emit 3 + 3 extra bits zeros.
    ShortZeroRun,
    /// Symbol 18: emit 11 + 7 extra bits zeros.
    LongZeroRun,
}

impl PendingRepeat {
    fn extra_bits(self) -> u32 {
        match self {
            Self::CopyPrevious { .. } => 2,
            Self::ShortZeroRun => 3,
            Self::LongZeroRun => 7,
        }
    }

    fn expand(self, extra: u32) -> (u8, usize) {
        match self {
            Self::CopyPrevious { value } => (value, 3 + extra as usize),
            Self::ShortZeroRun => (0, 3 + extra as usize),
            Self::LongZeroRun => (0, 11 + extra as usize),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Awaiting the 14 bits of HLIT, HDIST and HCLEN.
    Counts,
    /// Reading the HCLEN 3-bit code-length code lengths.
    CodeLengthCodes,
    /// Decoding the combined literal/length + distance length vector.
    SymbolLengths,
}

/// Resumable decoder for a dynamic block header.
#[derive(Debug)]
pub(crate) struct DynamicHeaderDecoder {
    phase: Phase,
    /// Literal/length codes declared (HLIT + 257).
    num_litlen: usize,
    /// Distance codes declared (HDIST + 1).
    num_dist: usize,
    /// Code-length code lengths declared (HCLEN + 4).
    num_codelen: usize,
    /// How many of the 3-bit code-length lengths have been read.
    codelen_read: usize,
    codelen_lengths: [u8; CODELEN_ALPHABET_SIZE],
    codelen_table: Option<HuffmanTable>,
    /// Decoded lengths, literal/length alphabet first.
    lengths: Vec<u8>,
    pending: Option<PendingRepeat>,
}

impl DynamicHeaderDecoder {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Counts,
            num_litlen: 0,
            num_dist: 0,
            num_codelen: 0,
            codelen_read: 0,
            codelen_lengths: [0; CODELEN_ALPHABET_SIZE],
            codelen_table: None,
            lengths: Vec::new(),
            pending: None,
        }
    }

    /// Drive the header decode as far as the buffered input allows.
    pub(crate) fn step(&mut self, reader: &mut BitReader, mode: InflateMode) -> Result<HeaderStep> {
        loop {
            match self.phase {
                Phase::Counts => {
                    let Some(bits) = reader.peek_bits(14) else {
                        return Ok(HeaderStep::NeedInput);
                    };
                    reader.consume_bits(14);

                    self.num_litlen = (bits & 0x1F) as usize + 257;
                    self.num_dist = ((bits >> 5) & 0x1F) as usize + 1;
                    self.num_codelen = ((bits >> 10) & 0xF) as usize + 4;

                    if self.num_litlen > LITLEN_ALPHABET_SIZE {
                        return Err(InflateError::invalid_code_lengths(format!(
                            "{} literal/length codes declared, at most {} allowed",
                            self.num_litlen, LITLEN_ALPHABET_SIZE
                        )));
                    }
                    if self.num_dist > mode.distance_symbol_count() {
                        return Err(InflateError::invalid_code_lengths(format!(
                            "{} distance codes declared, at most {} allowed",
                            self.num_dist,
                            mode.distance_symbol_count()
                        )));
                    }

                    self.lengths = Vec::with_capacity(self.num_litlen + self.num_dist);
                    self.phase = Phase::CodeLengthCodes;
                }

                Phase::CodeLengthCodes => {
                    while self.codelen_read < self.num_codelen {
                        let Some(bits) = reader.peek_bits(3) else {
                            return Ok(HeaderStep::NeedInput);
                        };
                        reader.consume_bits(3);
                        self.codelen_lengths[CODE_LENGTH_ORDER[self.codelen_read]] = bits as u8;
                        self.codelen_read += 1;
                    }

                    let table = HuffmanTable::from_code_lengths(
                        &self.codelen_lengths,
                        MAX_CODELEN_CODE_LENGTH,
                    )?;
                    self.codelen_table = Some(table);
                    self.phase = Phase::SymbolLengths;
                }

                Phase::SymbolLengths => {
                    let total = self.num_litlen + self.num_dist;
                    while self.lengths.len() < total {
                        if let Some(pending) = self.pending {
                            let Some(extra) = reader.peek_bits(pending.extra_bits()) else {
                                return Ok(HeaderStep::NeedInput);
                            };
                            reader.consume_bits(pending.extra_bits());

                            let (value, count) = pending.expand(extra);
                            if self.lengths.len() + count > total {
                                return Err(InflateError::overflow_code_lengths(total));
                            }
                            for _ in 0..count {
                                self.lengths.push(value);
                            }
                            self.pending = None;
                            continue;
                        }

                        let decoded = match &self.codelen_table {
                            Some(table) => table.decode(reader),
                            None => return Err(InflateError::InvalidCode),
                        };
                        match decoded {
                            Decoded::NeedMoreInput => return Ok(HeaderStep::NeedInput),
                            Decoded::Invalid => return Err(InflateError::InvalidCode),
                            Decoded::Symbol(symbol @ 0..=15) => {
                                self.lengths.push(symbol as u8);
                            }
                            Decoded::Symbol(16) => match self.lengths.last() {
                                Some(&value) => {
                                    self.pending = Some(PendingRepeat::CopyPrevious { value });
                                }
                                None => return Err(InflateError::RepeatBeforeFirst),
                            },
                            Decoded::Symbol(17) => self.pending = Some(PendingRepeat::ShortZeroRun),
                            Decoded::Symbol(18) => self.pending = Some(PendingRepeat::LongZeroRun),
                            Decoded::Symbol(symbol) => {
                                return Err(InflateError::invalid_symbol(symbol));
                            }
                        }
                    }

                    let litlen = HuffmanTable::from_code_lengths(
                        &self.lengths[..self.num_litlen],
                        MAX_CODE_LENGTH,
                    )?;
                    let distance = HuffmanTable::from_code_lengths(
                        &self.lengths[self.num_litlen..],
                        MAX_CODE_LENGTH,
                    )?;
                    return Ok(HeaderStep::Complete { litlen, distance });
                }
            }
        }
    }
}
