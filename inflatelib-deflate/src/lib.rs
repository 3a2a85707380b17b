//! # inflatelib Deflate
//!
//! Streaming decompression of DEFLATE (RFC 1951) and the Microsoft
//! Deflate64 variant, plus an offline encoder that renders a fully-formed
//! dynamic block from a symbol stream.
//!
//! ## Decoding
//!
//! [`Inflater`] consumes compressed bytes in chunks of any size and produces
//! decompressed bytes into buffers of any size, suspending and resuming at
//! arbitrary bit boundaries:
//!
//! ```rust
//! use inflatelib_deflate::inflate;
//!
//! // A stored block holding "Hello".
//! let stream = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
//! assert_eq!(inflate(&stream).unwrap(), b"Hello");
//! ```
//!
//! Deflate64 differs from DEFLATE in exactly three places: length symbol 285
//! carries 16 extra bits over base 3 (matches up to 65 538), distance
//! symbols 30 and 31 exist with 14 extra bits each (distances up to 65 536),
//! and the history window is 64 KiB. [`inflate64`] and
//! [`InflateMode::Deflate64`] select that variant.
//!
//! ## Encoding
//!
//! [`parse_symbol_stream`] reads the textual symbol grammar,
//! [`encode_block_text`] builds canonical length-limited Huffman codes and
//! renders the block as text, and [`pack_block_text`] packs that text into
//! the byte stream.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod encoder;
mod header;
pub mod huffman;
pub mod inflate;
pub mod symbols;
pub mod tables;
pub mod textpack;

// Re-exports
pub use encoder::encode_block_text;
pub use huffman::{Decoded, HuffmanTable};
pub use inflate::{InflateStatus, Inflater, Progress, inflate, inflate64};
pub use symbols::{BlockItem, parse_symbol_stream};
pub use tables::InflateMode;
pub use textpack::pack_block_text;
