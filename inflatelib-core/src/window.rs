//! Sliding window for LZ77-style decompression.
//!
//! The window is a ring buffer holding the most recent bytes of produced
//! output. It serves two roles at once: it is the history that back-references
//! copy from, and the staging area from which produced bytes are handed to
//! the caller in stream order via [`SlidingWindow::drain`].
//!
//! A byte may only be overwritten after the caller has drained it, so the
//! writable headroom ([`SlidingWindow::free`]) is the window's back-pressure
//! signal: when it reaches zero the decoder must pause until the caller makes
//! room.

use crate::error::{InflateError, Result};

/// Window sizes used by the supported bitstream variants.
pub mod sizes {
    /// Window size for DEFLATE (32 KiB).
    pub const DEFLATE: usize = 32 * 1024;
    /// Window size for Deflate64 (64 KiB).
    pub const DEFLATE64: usize = 64 * 1024;
}

/// A ring buffer of recently produced bytes with a drain cursor.
///
/// `total_written - total_emitted` bytes are pending: produced but not yet
/// returned to the caller. Pending bytes are never overwritten.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    /// The ring storage; length is the capacity.
    buffer: Vec<u8>,
    /// Capacity minus one, for cheap modulo (capacity is a power of two).
    mask: u64,
    /// Bytes written into the window over its whole lifetime.
    total_written: u64,
    /// Bytes handed to the caller over the window's whole lifetime.
    total_emitted: u64,
}

impl SlidingWindow {
    /// Create a window with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not a power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "capacity must be a power of 2, got {}",
            capacity
        );
        Self {
            buffer: vec![0; capacity],
            mask: capacity as u64 - 1,
            total_written: 0,
            total_emitted: 0,
        }
    }

    /// The window capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes of history currently addressable by a back-reference.
    pub fn history_len(&self) -> usize {
        self.total_written.min(self.buffer.len() as u64) as usize
    }

    /// Bytes produced but not yet drained.
    pub fn pending(&self) -> usize {
        (self.total_written - self.total_emitted) as usize
    }

    /// Writable headroom before pending bytes would be overwritten.
    pub fn free(&self) -> usize {
        self.buffer.len() - self.pending()
    }

    /// Total bytes written over the window's lifetime.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Append one literal byte.
    pub fn push_literal(&mut self, byte: u8) {
        debug_assert!(self.free() > 0);
        self.buffer[(self.total_written & self.mask) as usize] = byte;
        self.total_written += 1;
    }

    /// Append a run of literal bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        debug_assert!(self.free() >= bytes.len());
        for &byte in bytes {
            self.buffer[(self.total_written & self.mask) as usize] = byte;
            self.total_written += 1;
        }
    }

    /// Copy `length` bytes from `distance` bytes back in the history.
    ///
    /// The copy proceeds byte by byte, so when `distance < length` it reads
    /// bytes it has just produced (the run-length case: `distance` 1 repeats
    /// the last byte). The caller must have clamped `length` to
    /// [`free`](Self::free).
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.history_len() {
            return Err(InflateError::invalid_distance(distance, self.history_len()));
        }
        debug_assert!(length <= self.free());

        let mut src = self.total_written - distance as u64;
        for _ in 0..length {
            let byte = self.buffer[(src & self.mask) as usize];
            self.buffer[(self.total_written & self.mask) as usize] = byte;
            src += 1;
            self.total_written += 1;
        }
        Ok(())
    }

    /// Move pending bytes into `out` in stream order.
    ///
    /// Returns how many bytes were copied: the smaller of `out.len()` and
    /// [`pending`](Self::pending).
    pub fn drain(&mut self, out: &mut [u8]) -> usize {
        let n = self.pending().min(out.len());
        if n == 0 {
            return 0;
        }
        let start = (self.total_emitted & self.mask) as usize;
        let first = n.min(self.buffer.len() - start);
        out[..first].copy_from_slice(&self.buffer[start..start + first]);
        if n > first {
            out[first..n].copy_from_slice(&self.buffer[..n - first]);
        }
        self.total_emitted += n as u64;
        n
    }

    /// Drop all content and cursors.
    pub fn clear(&mut self) {
        self.total_written = 0;
        self.total_emitted = 0;
        self.buffer.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_all(window: &mut SlidingWindow) -> Vec<u8> {
        let mut out = vec![0u8; window.pending()];
        let n = window.drain(&mut out);
        assert_eq!(n, out.len());
        out
    }

    #[test]
    fn test_push_and_drain_order() {
        let mut window = SlidingWindow::new(8);
        window.extend(b"Hel");
        window.push_literal(b'l');
        window.push_literal(b'o');

        assert_eq!(window.pending(), 5);
        assert_eq!(drain_all(&mut window), b"Hello");
        assert_eq!(window.pending(), 0);
        assert_eq!(window.history_len(), 5);
    }

    #[test]
    fn test_drain_wraps_around() {
        let mut window = SlidingWindow::new(4);
        window.extend(b"AB");
        assert_eq!(drain_all(&mut window), b"AB");
        window.extend(b"CDEF");
        assert_eq!(drain_all(&mut window), b"CDEF");
        assert_eq!(window.history_len(), 4);
    }

    #[test]
    fn test_copy_match() {
        let mut window = SlidingWindow::new(32);
        window.extend(b"ABCD");
        window.copy_match(4, 4).unwrap();
        assert_eq!(drain_all(&mut window), b"ABCDABCD");
    }

    #[test]
    fn test_copy_match_overlapping() {
        // length > distance repeats the pattern
        let mut window = SlidingWindow::new(32);
        window.extend(b"AB");
        window.copy_match(2, 6).unwrap();
        assert_eq!(drain_all(&mut window), b"ABABABAB");
    }

    #[test]
    fn test_copy_match_distance_one_fill() {
        let mut window = SlidingWindow::new(32);
        window.push_literal(b'X');
        window.copy_match(1, 5).unwrap();
        assert_eq!(drain_all(&mut window), b"XXXXXX");
    }

    #[test]
    fn test_copy_match_at_full_capacity_distance() {
        let mut window = SlidingWindow::new(8);
        window.extend(b"ABCDEFGH");
        assert_eq!(drain_all(&mut window), b"ABCDEFGH");
        window.copy_match(8, 2).unwrap();
        assert_eq!(drain_all(&mut window), b"AB");
    }

    #[test]
    fn test_invalid_distance() {
        let mut window = SlidingWindow::new(8);
        assert!(matches!(
            window.copy_match(1, 1),
            Err(InflateError::InvalidDistance { .. })
        ));

        window.extend(b"AB");
        assert!(matches!(
            window.copy_match(3, 1),
            Err(InflateError::InvalidDistance {
                distance: 3,
                available: 2,
            })
        ));
        assert!(window.copy_match(0, 1).is_err());
    }

    #[test]
    fn test_backpressure_accounting() {
        let mut window = SlidingWindow::new(4);
        window.extend(b"ABCD");
        assert_eq!(window.free(), 0);

        let mut out = [0u8; 1];
        assert_eq!(window.drain(&mut out), 1);
        assert_eq!(&out, b"A");
        assert_eq!(window.free(), 1);

        window.push_literal(b'E');
        assert_eq!(window.free(), 0);
        assert_eq!(drain_all(&mut window), b"BCDE");
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_non_power_of_two_panics() {
        let _ = SlidingWindow::new(100);
    }
}
