//! Streaming DEFLATE / Deflate64 decompression.
//!
//! [`Inflater`] is a resumable state machine. The caller feeds compressed
//! bytes in chunks of any size and pulls decompressed bytes into buffers of
//! any size; the machine suspends whenever it runs out of input bits or of
//! window headroom and resumes exactly where it stopped. Bits are consumed
//! only in whole atomic units (a header field, one Huffman symbol, one run
//! of extra bits), and output bytes are committed to the window in whole
//! units, so no partial symbol is ever observable.
//!
//! # Example
//!
//! ```
//! use inflatelib_deflate::{InflateMode, Inflater, InflateStatus};
//!
//! // BFINAL=1 stored block holding "Hello".
//! let stream = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
//!
//! let mut inflater = Inflater::new(InflateMode::Deflate);
//! inflater.feed(&stream);
//! inflater.finish();
//!
//! let mut out = [0u8; 16];
//! let progress = inflater.inflate(&mut out).unwrap();
//! assert_eq!(progress.status, InflateStatus::Done);
//! assert_eq!(&out[..progress.produced], b"Hello");
//! ```

use crate::header::{DynamicHeaderDecoder, HeaderStep};
use crate::huffman::{Decoded, END_OF_BLOCK, HuffmanTable};
use crate::tables::{
    InflateMode, decode_distance, decode_length, distance_extra_bits, fixed_distance_table,
    fixed_litlen_table, length_extra_bits,
};
use inflatelib_core::error::{InflateError, Result};
use inflatelib_core::traits::{DecompressStatus, Decompressor};
use inflatelib_core::{BitReader, SlidingWindow};

/// Highest valid literal/length symbol.
const MAX_LITLEN_SYMBOL: u16 = 285;

/// Chunk size for pumping stored-block bytes through the window.
const STORED_CHUNK: usize = 512;

/// Resource the inflater is waiting on, or completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateStatus {
    /// The compressed input is exhausted; feed more and call again.
    NeedsInput,
    /// The output buffer filled up; drain it and call again.
    NeedsOutput,
    /// The final block has been decoded and fully drained.
    Done,
}

/// Progress report from one [`Inflater::inflate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Whole fed bytes the decoder drew through its bit buffer this call.
    pub consumed: usize,
    /// Bytes written to the output buffer this call.
    pub produced: usize,
    /// What the inflater is waiting on next.
    pub status: InflateStatus,
}

/// Decoding tables for the current Huffman block.
#[derive(Debug)]
enum BlockTables {
    /// The RFC-defined static tables (BTYPE=01).
    Fixed,
    /// Tables decoded from a dynamic header (BTYPE=10).
    Dynamic {
        litlen: HuffmanTable,
        distance: HuffmanTable,
    },
}

impl BlockTables {
    fn litlen(&self) -> &HuffmanTable {
        match self {
            Self::Fixed => fixed_litlen_table(),
            Self::Dynamic { litlen, .. } => litlen,
        }
    }

    fn distance(&self) -> &HuffmanTable {
        match self {
            Self::Fixed => fixed_distance_table(),
            Self::Dynamic { distance, .. } => distance,
        }
    }
}

/// Position inside a Huffman block's symbol loop.
#[derive(Debug, Clone, Copy)]
enum HuffmanStep {
    /// Awaiting the next literal/length symbol.
    LitLenSymbol,
    /// Awaiting the extra bits of a length code.
    LengthExtra { symbol: u16 },
    /// Awaiting the distance symbol of a back-reference.
    DistanceSymbol { length: u32 },
    /// Awaiting the extra bits of a distance code.
    DistanceExtra { length: u32, symbol: u16 },
    /// A back-reference copy with bytes still to produce.
    CopyMatch { remaining: u32, distance: u32 },
}

/// Top-level decoder state.
#[derive(Debug)]
enum State {
    /// Awaiting the 3-bit BFINAL/BTYPE header of the next block.
    BlockHeader,
    /// Awaiting the LEN/NLEN pair of a stored block (already byte-aligned).
    StoredLen,
    /// Copying the body of a stored block.
    Stored { remaining: u32 },
    /// Decoding a dynamic block header.
    DynamicHeader(DynamicHeaderDecoder),
    /// Inside a Huffman block.
    Block {
        tables: BlockTables,
        step: HuffmanStep,
    },
    /// The final block has been decoded.
    Done,
    /// A terminal error; replayed on every further call.
    Failed(InflateError),
}

/// What a single state-machine step achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    /// State advanced; keep going.
    Progressed,
    /// Out of input bits.
    NeedInput,
    /// Out of window headroom; drain and retry.
    NeedSpace,
    /// The final block is complete.
    Finished,
}

/// Result of processing one Huffman-block sub-step.
enum BlockProgress {
    Continue,
    EndOfBlock,
    Suspend(StepOutcome),
}

/// Streaming DEFLATE / Deflate64 decompressor.
#[derive(Debug)]
pub struct Inflater {
    mode: InflateMode,
    reader: BitReader,
    window: SlidingWindow,
    state: State,
    /// BFINAL of the block currently being decoded.
    final_block: bool,
    /// Set by [`finish`](Self::finish): no more input will ever arrive.
    input_finished: bool,
}

impl Inflater {
    /// Create a decoder for the given bitstream variant.
    pub fn new(mode: InflateMode) -> Self {
        Self {
            mode,
            reader: BitReader::new(),
            window: SlidingWindow::new(mode.window_size()),
            state: State::BlockHeader,
            final_block: false,
            input_finished: false,
        }
    }

    /// The variant this decoder was created for.
    pub fn mode(&self) -> InflateMode {
        self.mode
    }

    /// Append compressed bytes to the input queue.
    pub fn feed(&mut self, input: &[u8]) {
        self.reader.feed(input);
    }

    /// Declare that no more input will be fed.
    ///
    /// After this, running out of bits mid-stream is a real error and
    /// [`inflate`](Self::inflate) reports [`InflateError::UnexpectedEnd`]
    /// instead of asking for more.
    pub fn finish(&mut self) {
        self.input_finished = true;
    }

    /// Restore the just-created state, keeping the mode.
    pub fn reset(&mut self) {
        self.reader.reset();
        self.window.clear();
        self.state = State::BlockHeader;
        self.final_block = false;
        self.input_finished = false;
    }

    /// Whether the stream has fully decoded and drained.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Done) && self.window.pending() == 0
    }

    /// Decode as much as the fed input and `output` space allow.
    ///
    /// Output bytes are produced in strict stream order. Errors are
    /// terminal: every later call returns the same error.
    pub fn inflate(&mut self, output: &mut [u8]) -> Result<Progress> {
        if let State::Failed(error) = &self.state {
            return Err(error.clone());
        }

        let consumed_start = self.reader.bytes_consumed();
        let mut produced = 0;

        let status = loop {
            // Hand finished bytes to the caller before doing more work, so
            // window headroom is always as large as the caller allows.
            produced += self.window.drain(&mut output[produced..]);

            if matches!(self.state, State::Done) {
                break if self.window.pending() > 0 {
                    InflateStatus::NeedsOutput
                } else {
                    InflateStatus::Done
                };
            }

            match self.step() {
                Ok(StepOutcome::Progressed) | Ok(StepOutcome::Finished) => continue,
                Ok(StepOutcome::NeedInput) => {
                    if self.input_finished {
                        let error = InflateError::UnexpectedEnd;
                        self.state = State::Failed(error.clone());
                        return Err(error);
                    }
                    break InflateStatus::NeedsInput;
                }
                Ok(StepOutcome::NeedSpace) => {
                    if produced == output.len() {
                        break InflateStatus::NeedsOutput;
                    }
                    // The drain at the top of the loop makes room.
                }
                Err(error) => {
                    self.state = State::Failed(error.clone());
                    return Err(error);
                }
            }
        };

        Ok(Progress {
            consumed: (self.reader.bytes_consumed() - consumed_start) as usize,
            produced,
            status,
        })
    }

    /// The state that follows a completed block.
    fn next_block_state(&self) -> State {
        if self.final_block {
            State::Done
        } else {
            State::BlockHeader
        }
    }

    /// Advance the state machine by one atomic unit.
    fn step(&mut self) -> Result<StepOutcome> {
        match &self.state {
            State::BlockHeader => self.step_block_header(),
            State::StoredLen => self.step_stored_len(),
            State::Stored { remaining } => {
                let remaining = *remaining;
                self.step_stored(remaining)
            }
            State::DynamicHeader(_) => self.step_dynamic_header(),
            State::Block { .. } => self.step_huffman_block(),
            State::Done => Ok(StepOutcome::Finished),
            State::Failed(error) => Err(error.clone()),
        }
    }

    fn step_block_header(&mut self) -> Result<StepOutcome> {
        let Some(bits) = self.reader.peek_bits(3) else {
            return Ok(StepOutcome::NeedInput);
        };
        self.reader.consume_bits(3);

        self.final_block = bits & 1 != 0;
        match (bits >> 1) & 0b11 {
            0 => {
                self.reader.align_to_byte();
                self.state = State::StoredLen;
            }
            1 => {
                self.state = State::Block {
                    tables: BlockTables::Fixed,
                    step: HuffmanStep::LitLenSymbol,
                };
            }
            2 => {
                self.state = State::DynamicHeader(DynamicHeaderDecoder::new());
            }
            _ => return Err(InflateError::InvalidBlockType),
        }
        Ok(StepOutcome::Progressed)
    }

    fn step_stored_len(&mut self) -> Result<StepOutcome> {
        let Some(bits) = self.reader.peek_bits(32) else {
            return Ok(StepOutcome::NeedInput);
        };
        let len = (bits & 0xFFFF) as u16;
        let nlen = (bits >> 16) as u16;
        if nlen != !len {
            return Err(InflateError::corrupt_stored_block(len, nlen));
        }
        self.reader.consume_bits(32);

        self.state = if len == 0 {
            self.next_block_state()
        } else {
            State::Stored {
                remaining: len as u32,
            }
        };
        Ok(StepOutcome::Progressed)
    }

    fn step_stored(&mut self, remaining: u32) -> Result<StepOutcome> {
        let free = self.window.free();
        if free == 0 {
            return Ok(StepOutcome::NeedSpace);
        }
        let available = self.reader.available_bytes();
        if available == 0 {
            return Ok(StepOutcome::NeedInput);
        }

        let mut chunk = [0u8; STORED_CHUNK];
        let take = (remaining as usize).min(free).min(available).min(STORED_CHUNK);
        let got = self.reader.read_bytes(&mut chunk[..take]);
        debug_assert_eq!(got, take);
        self.window.extend(&chunk[..got]);

        let remaining = remaining - got as u32;
        self.state = if remaining == 0 {
            self.next_block_state()
        } else {
            State::Stored { remaining }
        };
        Ok(StepOutcome::Progressed)
    }

    fn step_dynamic_header(&mut self) -> Result<StepOutcome> {
        let State::DynamicHeader(mut decoder) =
            std::mem::replace(&mut self.state, State::BlockHeader)
        else {
            unreachable!()
        };

        match decoder.step(&mut self.reader, self.mode)? {
            HeaderStep::NeedInput => {
                self.state = State::DynamicHeader(decoder);
                Ok(StepOutcome::NeedInput)
            }
            HeaderStep::Complete { litlen, distance } => {
                self.state = State::Block {
                    tables: BlockTables::Dynamic { litlen, distance },
                    step: HuffmanStep::LitLenSymbol,
                };
                Ok(StepOutcome::Progressed)
            }
        }
    }

    fn step_huffman_block(&mut self) -> Result<StepOutcome> {
        let State::Block { tables, mut step } =
            std::mem::replace(&mut self.state, State::BlockHeader)
        else {
            unreachable!()
        };

        let progress = self.block_substep(&tables, &mut step);
        match progress {
            Ok(BlockProgress::Continue) => {
                self.state = State::Block { tables, step };
                Ok(StepOutcome::Progressed)
            }
            Ok(BlockProgress::EndOfBlock) => {
                self.state = self.next_block_state();
                Ok(StepOutcome::Progressed)
            }
            Ok(BlockProgress::Suspend(outcome)) => {
                self.state = State::Block { tables, step };
                Ok(outcome)
            }
            Err(error) => Err(error),
        }
    }

    /// Process one sub-step of the symbol loop (RFC 1951 §3.2.3).
    fn block_substep(
        &mut self,
        tables: &BlockTables,
        step: &mut HuffmanStep,
    ) -> Result<BlockProgress> {
        // Every sub-step except end-of-block may write to the window;
        // requiring a byte of headroom up front keeps the logic uniform.
        if self.window.free() == 0 {
            return Ok(BlockProgress::Suspend(StepOutcome::NeedSpace));
        }

        match *step {
            HuffmanStep::LitLenSymbol => match tables.litlen().decode(&mut self.reader) {
                Decoded::NeedMoreInput => Ok(BlockProgress::Suspend(StepOutcome::NeedInput)),
                Decoded::Invalid => Err(InflateError::InvalidCode),
                Decoded::Symbol(symbol) => {
                    if symbol < END_OF_BLOCK {
                        self.window.push_literal(symbol as u8);
                        Ok(BlockProgress::Continue)
                    } else if symbol == END_OF_BLOCK {
                        Ok(BlockProgress::EndOfBlock)
                    } else if symbol > MAX_LITLEN_SYMBOL {
                        Err(InflateError::invalid_symbol(symbol))
                    } else {
                        *step = HuffmanStep::LengthExtra { symbol };
                        Ok(BlockProgress::Continue)
                    }
                }
            },

            HuffmanStep::LengthExtra { symbol } => {
                let extra_bits = length_extra_bits(self.mode, symbol) as u32;
                let Some(extra) = self.reader.peek_bits(extra_bits) else {
                    return Ok(BlockProgress::Suspend(StepOutcome::NeedInput));
                };
                self.reader.consume_bits(extra_bits);

                let length = decode_length(self.mode, symbol, extra);
                *step = HuffmanStep::DistanceSymbol { length };
                Ok(BlockProgress::Continue)
            }

            HuffmanStep::DistanceSymbol { length } => {
                match tables.distance().decode(&mut self.reader) {
                    Decoded::NeedMoreInput => Ok(BlockProgress::Suspend(StepOutcome::NeedInput)),
                    Decoded::Invalid => Err(InflateError::InvalidCode),
                    Decoded::Symbol(symbol) => {
                        if symbol as usize >= self.mode.distance_symbol_count() {
                            return Err(InflateError::invalid_symbol(symbol));
                        }
                        *step = HuffmanStep::DistanceExtra { length, symbol };
                        Ok(BlockProgress::Continue)
                    }
                }
            }

            HuffmanStep::DistanceExtra { length, symbol } => {
                let extra_bits = distance_extra_bits(symbol) as u32;
                let Some(extra) = self.reader.peek_bits(extra_bits) else {
                    return Ok(BlockProgress::Suspend(StepOutcome::NeedInput));
                };
                self.reader.consume_bits(extra_bits);

                let distance = decode_distance(symbol, extra);
                if distance as usize > self.window.history_len() {
                    return Err(InflateError::invalid_distance(
                        distance as usize,
                        self.window.history_len(),
                    ));
                }
                *step = HuffmanStep::CopyMatch {
                    remaining: length,
                    distance,
                };
                Ok(BlockProgress::Continue)
            }

            HuffmanStep::CopyMatch {
                remaining,
                distance,
            } => {
                let take = (remaining as usize).min(self.window.free());
                self.window.copy_match(distance as usize, take)?;

                let remaining = remaining - take as u32;
                *step = if remaining > 0 {
                    HuffmanStep::CopyMatch {
                        remaining,
                        distance,
                    }
                } else {
                    HuffmanStep::LitLenSymbol
                };
                Ok(BlockProgress::Continue)
            }
        }
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        self.feed(input);
        let progress = self.inflate(output)?;
        let status = match progress.status {
            InflateStatus::NeedsInput => DecompressStatus::NeedsInput,
            InflateStatus::NeedsOutput => DecompressStatus::NeedsOutput,
            InflateStatus::Done => DecompressStatus::Done,
        };
        // The feed call buffers the whole chunk.
        Ok((input.len(), progress.produced, status))
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        Inflater::is_finished(self)
    }
}

/// Decompress a complete DEFLATE stream held in memory.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with_mode(InflateMode::Deflate, data)
}

/// Decompress a complete Deflate64 stream held in memory.
pub fn inflate64(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with_mode(InflateMode::Deflate64, data)
}

fn inflate_with_mode(mode: InflateMode, data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new(mode);
    inflater.feed(data);
    inflater.finish();

    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32 * 1024];
    loop {
        let progress = inflater.inflate(&mut buffer)?;
        output.extend_from_slice(&buffer[..progress.produced]);
        match progress.status {
            InflateStatus::Done => break,
            // finish() turns input starvation into UnexpectedEnd, so only
            // output-bound pauses reach here.
            InflateStatus::NeedsOutput | InflateStatus::NeedsInput => continue,
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflate_stored() {
        let compressed = [
            0x01, // BFINAL=1, BTYPE=00, padding
            0x05, 0x00, // LEN=5
            0xFA, 0xFF, // NLEN=!5
            b'H', b'e', b'l', b'l', b'o',
        ];
        assert_eq!(inflate(&compressed).unwrap(), b"Hello");
    }

    #[test]
    fn test_inflate_empty_stored() {
        let compressed = [0x01, 0x00, 0x00, 0xFF, 0xFF];
        assert!(inflate(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_inflate_static_block() {
        // BFINAL=1, BTYPE=01, literals 'A' 'B' 'C', end of block.
        let compressed = [0x73, 0x74, 0x72, 0x06, 0x00];
        assert_eq!(inflate(&compressed).unwrap(), b"ABC");
    }

    #[test]
    fn test_invalid_block_type() {
        // First byte 0b0000_0111: BFINAL=1, BTYPE=11.
        let err = inflate(&[0x07]).unwrap_err();
        assert_eq!(err, InflateError::InvalidBlockType);
    }

    #[test]
    fn test_corrupt_stored_block() {
        let err = inflate(&[0x01, 0x05, 0x00, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            InflateError::CorruptStoredBlock {
                len: 5,
                nlen: 0x0000,
            }
        );
    }

    #[test]
    fn test_truncated_stream() {
        let err = inflate(&[0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e']).unwrap_err();
        assert_eq!(err, InflateError::UnexpectedEnd);
    }

    #[test]
    fn test_error_is_terminal() {
        let mut inflater = Inflater::new(InflateMode::Deflate);
        inflater.feed(&[0x07]);
        let mut out = [0u8; 8];
        let first = inflater.inflate(&mut out).unwrap_err();
        let second = inflater.inflate(&mut out).unwrap_err();
        assert_eq!(first, second);

        // feed() after failure does not revive the machine.
        inflater.feed(&[0x01, 0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(inflater.inflate(&mut out).unwrap_err(), first);
    }

    #[test]
    fn test_multiple_blocks() {
        // Two stored blocks: "He" (BFINAL=0) then "llo" (BFINAL=1).
        let compressed = [
            0x00, 0x02, 0x00, 0xFD, 0xFF, b'H', b'e', // BFINAL=0
            0x01, 0x03, 0x00, 0xFC, 0xFF, b'l', b'l', b'o', // BFINAL=1
        ];
        assert_eq!(inflate(&compressed).unwrap(), b"Hello");
    }

    #[test]
    fn test_needs_input_then_resumes() {
        let compressed = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
        let mut inflater = Inflater::new(InflateMode::Deflate);
        let mut out = [0u8; 16];
        let mut collected = Vec::new();

        for &byte in &compressed {
            inflater.feed(&[byte]);
            let progress = inflater.inflate(&mut out).unwrap();
            collected.extend_from_slice(&out[..progress.produced]);
        }
        assert_eq!(collected, b"Hello");
        assert!(inflater.is_finished());
    }

    #[test]
    fn test_tiny_output_buffer() {
        let compressed = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
        let mut inflater = Inflater::new(InflateMode::Deflate);
        inflater.feed(&compressed);
        inflater.finish();

        let mut out = [0u8; 2];
        let mut collected = Vec::new();
        loop {
            let progress = inflater.inflate(&mut out).unwrap();
            collected.extend_from_slice(&out[..progress.produced]);
            if progress.status == InflateStatus::Done {
                break;
            }
        }
        assert_eq!(collected, b"Hello");
    }

    #[test]
    fn test_reset_reuses_instance() {
        let compressed = [0x01, 0x00, 0x00, 0xFF, 0xFF];
        let mut inflater = Inflater::new(InflateMode::Deflate);
        inflater.feed(&compressed);
        inflater.finish();
        let mut out = [0u8; 4];
        assert_eq!(
            inflater.inflate(&mut out).unwrap().status,
            InflateStatus::Done
        );

        inflater.reset();
        inflater.feed(&compressed);
        inflater.finish();
        assert_eq!(
            inflater.inflate(&mut out).unwrap().status,
            InflateStatus::Done
        );
    }

    #[test]
    fn test_decompressor_trait() {
        let compressed = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
        let mut inflater = Inflater::new(InflateMode::Deflate);
        let output = inflater.decompress_all(&compressed).unwrap();
        assert_eq!(output, b"Hello");
        assert!(Decompressor::is_finished(&inflater));
    }
}
