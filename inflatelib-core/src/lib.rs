//! # inflatelib Core
//!
//! Core components for the inflatelib decompression library.
//!
//! This crate provides the building blocks the codec layer is assembled
//! from:
//!
//! - [`bitstream`]: chunk-fed bit-level input and LSB-first bit packing
//! - [`window`]: the sliding history window with ordered drain
//! - [`traits`]: the streaming decompressor contract
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! inflatelib is layered; this crate is the bottom layer:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Tools                                               │
//! │     block-encode CLI                                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE / Deflate64 inflater, block encoder         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                             │
//! │     BitReader/BitWriter, SlidingWindow, errors          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use inflatelib_core::bitstream::BitReader;
//!
//! let mut reader = BitReader::new();
//! reader.feed(&[0xAB, 0xCD]);
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xDAB);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{InflateError, Result};
pub use traits::{DecompressStatus, Decompressor};
pub use window::SlidingWindow;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{InflateError, Result};
    pub use crate::traits::{DecompressStatus, Decompressor};
    pub use crate::window::SlidingWindow;
}
