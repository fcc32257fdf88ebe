/*
    FluxFox
    https://github.com/dbalsom/fluxfox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/bitstream/mod.rs

    A bounded bit buffer and a cursor for reading it
*/
//! A [BitStream] is the bit sequence produced by PLL bit-cell recovery. It has a fixed capacity
//! chosen at creation and never grows past it; a push into a full stream is refused.
//!
//! Decoders read a stream through a [BitCursor], which reads and consumes bits most-significant
//! first. A read past the end of the stream returns `None` instead of touching out-of-range bits.

use std::ops::Index;

use bit_vec::BitVec;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitStream {
    bits: BitVec,
    capacity: usize,
}

impl From<BitVec> for BitStream {
    fn from(bits: BitVec) -> Self {
        let capacity = bits.len();
        Self { bits, capacity }
    }
}

impl Index<usize> for BitStream {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bits[index]
    }
}

impl BitStream {
    /// Create an empty stream that will accept at most `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a stream from a byte slice, most significant bit first. If `bit_len` is provided
    /// the stream is shortened to that many bits.
    pub fn from_bytes(bytes: &[u8], bit_len: Option<usize>) -> Self {
        let mut bits = BitVec::from_bytes(bytes);
        if let Some(bit_len) = bit_len {
            bits.truncate(bit_len);
        }
        Self::from(bits)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.bits.len() >= self.capacity
    }

    /// Append a bit. Returns false, leaving the stream unchanged, if the stream is full.
    pub fn push(&mut self, bit: bool) -> bool {
        if self.is_full() {
            return false;
        }
        self.bits.push(bit);
        true
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index)
    }

    /// Set the bit at `index`. Out of range indices are ignored.
    pub fn set(&mut self, index: usize, bit: bool) {
        if index < self.bits.len() {
            self.bits.set(index, bit);
        }
    }

    /// Invert the bit at `index`. Out of range indices are ignored.
    pub fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get(index) {
            self.bits.set(index, !bit);
        }
    }

    /// Shorten the stream to `len` bits. Has no effect if the stream is already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    pub fn data(&self) -> &BitVec {
        &self.bits
    }

    pub fn into_inner(self) -> BitVec {
        self.bits
    }

    /// Return a copy of the stream packed into bytes. A trailing partial byte is zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.to_bytes()
    }

    pub fn iter(&self) -> bit_vec::Iter<'_> {
        self.bits.iter()
    }

    /// Return a cursor positioned at bit `position`.
    pub fn cursor(&self, position: usize) -> BitCursor<'_> {
        BitCursor::new(&self.bits, position)
    }
}

/// A read position within a bit buffer.
#[derive(Clone, Debug)]
pub struct BitCursor<'a> {
    bits: &'a BitVec,
    position: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(bits: &'a BitVec, position: usize) -> Self {
        Self {
            bits,
            position: std::cmp::min(position, bits.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.bits.len()
    }

    /// Move to `position`, clamped to the end of the buffer.
    pub fn seek(&mut self, position: usize) {
        self.position = std::cmp::min(position, self.bits.len());
    }

    /// Return the next `n` bits (at most 32) as an integer without consuming them.
    /// Returns `None` if fewer than `n` bits remain.
    pub fn peek(&self, n: usize) -> Option<u32> {
        debug_assert!(n <= 32);
        if n > 32 || n > self.remaining() {
            return None;
        }
        let mut value = 0u32;
        for bi in self.position..self.position + n {
            value = (value << 1) | self.bits[bi] as u32;
        }
        Some(value)
    }

    /// Skip `n` bits. If fewer than `n` bits remain the cursor moves to the end and false is
    /// returned.
    pub fn advance(&mut self, n: usize) -> bool {
        if n > self.remaining() {
            self.position = self.bits.len();
            return false;
        }
        self.position += n;
        true
    }

    /// Read and consume the next `n` bits (at most 32). Nothing is consumed on failure.
    pub fn take(&mut self, n: usize) -> Option<u32> {
        let value = self.peek(n)?;
        self.position += n;
        Some(value)
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.position)?;
        self.position += 1;
        Some(bit)
    }

    /// Consume consecutive bits equal to `bit`, returning how many were skipped.
    pub fn skip_while(&mut self, bit: bool) -> usize {
        let start = self.position;
        while self.bits.get(self.position) == Some(bit) {
            self.position += 1;
        }
        self.position - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_respects_capacity() {
        let mut stream = BitStream::with_capacity(3);
        assert!(stream.push(true));
        assert!(stream.push(false));
        assert!(stream.push(true));
        assert!(stream.is_full());
        assert!(!stream.push(true));
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.to_bytes(), vec![0b1010_0000]);
    }

    #[test]
    fn test_from_bytes_truncates() {
        let stream = BitStream::from_bytes(&[0xFF, 0x00], Some(12));
        assert_eq!(stream.len(), 12);
        assert!(stream[7]);
        assert!(!stream[8]);
    }

    #[test]
    fn test_cursor_peek_take() {
        let stream = BitStream::from_bytes(&[0x44, 0x89, 0xF0], None);
        let mut cursor = stream.cursor(0);

        assert_eq!(cursor.peek(16), Some(0x4489));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.take(16), Some(0x4489));
        assert_eq!(cursor.position(), 16);
        assert_eq!(cursor.remaining(), 8);
        assert_eq!(cursor.take(4), Some(0xF));
        assert_eq!(cursor.take(4), Some(0x0));
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_cursor_underflow() {
        let stream = BitStream::from_bytes(&[0xAB], None);
        let mut cursor = stream.cursor(4);

        assert_eq!(cursor.peek(8), None);
        assert_eq!(cursor.take(8), None);
        // A failed take consumes nothing.
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.take(4), Some(0xB));
        assert_eq!(cursor.read_bit(), None);

        cursor.seek(0);
        assert!(!cursor.advance(9));
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_cursor_skip_while() {
        let stream = BitStream::from_bytes(&[0b0001_1101], None);
        let mut cursor = stream.cursor(0);
        assert_eq!(cursor.skip_while(false), 3);
        assert_eq!(cursor.skip_while(true), 3);
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn test_cursor_start_clamped() {
        let stream = BitStream::from_bytes(&[0xAB], None);
        let cursor = stream.cursor(100);
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.remaining(), 0);
    }
}
