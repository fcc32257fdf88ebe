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

    src/sync.rs

    Sync mark search over a recovered bitstream
*/
//! Two kinds of synchronization are supported. MFM, FM and Apple fields begin with a fixed 16-bit
//! pattern, found with a sliding shift register. Commodore fields begin with a long run of one
//! bits, found with a run-length counter.

use crate::bitstream::BitStream;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncPattern {
    /// A 16-bit word. Only bits set in `mask` are compared.
    Word { value: u16, mask: u16 },
    /// A run of at least `min_ones` consecutive one bits.
    Run { min_ones: usize },
}

impl SyncPattern {
    pub const fn word(value: u16) -> Self {
        SyncPattern::Word { value, mask: 0xFFFF }
    }

    pub const fn masked(value: u16, mask: u16) -> Self {
        SyncPattern::Word { value, mask }
    }

    pub const fn run(min_ones: usize) -> Self {
        SyncPattern::Run { min_ones }
    }
}

/// The location of a sync match.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncMatch {
    /// Bit offset of the first bit of the match.
    pub start: usize,
    /// Bit offset of the first bit following the match.
    pub end: usize,
    /// The matched 16-bit word, or for a run, the run length saturated to 16 bits.
    pub word: u16,
}

/// Search `bits` for `pattern`, beginning at bit offset `start`.
///
/// If `limit` is provided, a match must begin at or before that bit offset.
pub fn find_sync(bits: &BitStream, pattern: SyncPattern, start: usize, limit: Option<usize>) -> Option<SyncMatch> {
    let found = match pattern {
        SyncPattern::Word { value, mask } => find_word(bits, value, mask, start, limit),
        SyncPattern::Run { min_ones } => find_run(bits, min_ones, start, limit),
    };
    if found.is_none() {
        log::trace!("find_sync(): No {:?} found after bit {}", pattern, start);
    }
    found
}

fn find_word(bits: &BitStream, value: u16, mask: u16, start: usize, limit: Option<usize>) -> Option<SyncMatch> {
    let search_end = match limit {
        Some(limit) => std::cmp::min(limit.saturating_add(16), bits.len()),
        None => bits.len(),
    };
    if search_end < start.saturating_add(16) {
        return None;
    }

    let mut shift_reg: u16 = 0;
    for bi in start..search_end {
        shift_reg = (shift_reg << 1) | bits[bi] as u16;
        if bi >= start + 15 && (shift_reg & mask) == value {
            return Some(SyncMatch {
                start: bi - 15,
                end: bi + 1,
                word: shift_reg,
            });
        }
    }
    None
}

fn find_run(bits: &BitStream, min_ones: usize, start: usize, limit: Option<usize>) -> Option<SyncMatch> {
    let min_ones = std::cmp::max(min_ones, 1);
    let limit = limit.unwrap_or(usize::MAX);
    let mut run = 0;

    for bi in start..bits.len() {
        if bits[bi] {
            run += 1;
            continue;
        }
        if run >= min_ones {
            return Some(SyncMatch {
                start: bi - run,
                end: bi,
                word: std::cmp::min(run, u16::MAX as usize) as u16,
            });
        }
        run = 0;
        if bi >= limit {
            return None;
        }
    }

    // A qualifying run may also end at the end of the stream.
    if run >= min_ones && bits.len() - run <= limit {
        return Some(SyncMatch {
            start: bits.len() - run,
            end: bits.len(),
            word: std::cmp::min(run, u16::MAX as usize) as u16,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_word() {
        let bits = BitStream::from_bytes(&[0xAA, 0xAA, 0x44, 0x89, 0x55], None);
        let found = find_sync(&bits, SyncPattern::word(0x4489), 0, None).unwrap();
        assert_eq!(found.start, 16);
        assert_eq!(found.end, 32);
        assert_eq!(found.word, 0x4489);

        assert_eq!(find_sync(&bits, SyncPattern::word(0x4489), 17, None), None);
    }

    #[test]
    fn test_find_word_unaligned() {
        // 0x4489 shifted right by 3 bits.
        let bits = BitStream::from_bytes(&[0x08, 0x91, 0x20], None);
        let found = find_sync(&bits, SyncPattern::word(0x4489), 0, None).unwrap();
        assert_eq!(found.start, 3);
    }

    #[test]
    fn test_find_word_masked() {
        let bits = BitStream::from_bytes(&[0x00, 0xF5, 0x6F], None);
        let found = find_sync(&bits, SyncPattern::masked(0xF56A, 0xFFFA), 0, None).unwrap();
        assert_eq!(found.start, 8);
        assert_eq!(found.word, 0xF56F);
    }

    #[test]
    fn test_find_word_limit() {
        let bits = BitStream::from_bytes(&[0xAA, 0xAA, 0x44, 0x89], None);
        assert!(find_sync(&bits, SyncPattern::word(0x4489), 0, Some(16)).is_some());
        assert!(find_sync(&bits, SyncPattern::word(0x4489), 0, Some(15)).is_none());
    }

    #[test]
    fn test_short_stream() {
        let bits = BitStream::from_bytes(&[0x44], None);
        assert!(find_sync(&bits, SyncPattern::word(0x4489), 0, None).is_none());
        let empty = BitStream::default();
        assert!(find_sync(&empty, SyncPattern::run(10), 0, None).is_none());
    }

    #[test]
    fn test_find_run() {
        // 9 ones, a zero, then 12 ones and a zero.
        let bits = BitStream::from_bytes(&[0xFF, 0x80, 0x7F, 0xF8], None);
        let found = find_sync(&bits, SyncPattern::run(10), 0, None).unwrap();
        assert_eq!(found.start, 17);
        assert_eq!(found.end, 29);
        assert_eq!(found.word, 12);

        assert!(find_sync(&bits, SyncPattern::run(10), 0, Some(16)).is_none());
        assert!(find_sync(&bits, SyncPattern::run(13), 0, None).is_none());
    }

    #[test]
    fn test_run_at_end() {
        let bits = BitStream::from_bytes(&[0x0F, 0xFF], None);
        let found = find_sync(&bits, SyncPattern::run(10), 0, None).unwrap();
        assert_eq!(found.start, 4);
        assert_eq!(found.end, 16);
    }
}
