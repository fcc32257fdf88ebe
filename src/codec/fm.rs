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

    src/codec/fm.rs

    FM byte encoding and decoding
*/
//! An FM byte occupies 16 bitcells, a clock bit followed by a data bit for each data bit. Normal
//! data is written with every clock bit set. Address marks are written with the clock pattern
//! `C7`, which cannot occur in normal data.

use bit_vec::BitVec;

use crate::codec::EncodingVariant;

pub const FM_BYTE_LEN: usize = 16;
pub const FM_DATA_CLOCK: u8 = 0xFF;
pub const FM_MARKER_CLOCK: u8 = 0xC7;

/// `FE` with clock `C7`.
pub const FM_IDAM_WORD: u16 = 0xF57E;
/// `FB` with clock `C7`.
pub const FM_DAM_WORD: u16 = 0xF56F;
/// `F8` with clock `C7`.
pub const FM_DDAM_WORD: u16 = 0xF56A;
/// Matches the data marks `F8` through `FB`, all written with clock `C7`.
pub const FM_DATA_MARK_MASK: u16 = 0xFFFA;

/// Extract the 8 data bits from a 16-bit FM word.
pub fn fm_decode_byte(word: u16) -> u8 {
    let mut byte = 0u8;
    for i in 0..8 {
        if word & (1 << (14 - 2 * i)) != 0 {
            byte |= 0x80 >> i;
        }
    }
    byte
}

/// Extract the 8 clock bits from a 16-bit FM word.
pub fn fm_decode_clock(word: u16) -> u8 {
    fm_decode_byte(word >> 1)
}

/// Interleave `clock` and `data` into a 16-bit FM word.
pub fn fm_encode_byte(data: u8, clock: u8) -> u16 {
    let mut word = 0u16;
    for i in 0..8 {
        let c = (clock >> (7 - i)) & 1;
        let d = (data >> (7 - i)) & 1;
        word = (word << 2) | ((c as u16) << 1) | d as u16;
    }
    word
}

/// Encode a run of bytes, appending the result to `bits`.
pub fn fm_encode(bits: &mut BitVec, data: &[u8], variant: EncodingVariant) {
    let clock = match variant {
        EncodingVariant::Data => FM_DATA_CLOCK,
        EncodingVariant::AddressMark => FM_MARKER_CLOCK,
    };
    for &byte in data {
        let word = fm_encode_byte(byte, clock);
        for i in (0..FM_BYTE_LEN).rev() {
            bits.push(word & (1 << i) != 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_words() {
        assert_eq!(fm_encode_byte(0xFE, FM_MARKER_CLOCK), FM_IDAM_WORD);
        assert_eq!(fm_encode_byte(0xFB, FM_MARKER_CLOCK), FM_DAM_WORD);
        assert_eq!(fm_encode_byte(0xF8, FM_MARKER_CLOCK), FM_DDAM_WORD);
        assert_eq!(fm_decode_byte(FM_IDAM_WORD), 0xFE);
        assert_eq!(fm_decode_clock(FM_IDAM_WORD), FM_MARKER_CLOCK);
    }

    #[test]
    fn test_data_mark_mask() {
        for mark in [0xF8u8, 0xF9, 0xFA, 0xFB] {
            let word = fm_encode_byte(mark, FM_MARKER_CLOCK);
            assert_eq!(word & FM_DATA_MARK_MASK, FM_DDAM_WORD);
        }
        assert_ne!(FM_IDAM_WORD & FM_DATA_MARK_MASK, FM_DDAM_WORD);
        assert_ne!(fm_encode_byte(0xFB, FM_DATA_CLOCK) & FM_DATA_MARK_MASK, FM_DDAM_WORD);
    }

    #[test]
    fn test_data_roundtrip() {
        for byte in 0..=255u8 {
            let word = fm_encode_byte(byte, FM_DATA_CLOCK);
            assert_eq!(fm_decode_byte(word), byte);
            assert_eq!(fm_decode_clock(word), FM_DATA_CLOCK);
        }
    }
}
