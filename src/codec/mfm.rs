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

    src/codec/mfm.rs

    MFM byte encoding and decoding
*/
//! An MFM byte occupies 16 bitcells: a clock bit followed by a data bit for each of its 8 data
//! bits. A clock bit is set only between two zero data bits.

use bit_vec::BitVec;

use crate::codec::EncodingVariant;

pub const MFM_BYTE_LEN: usize = 16;
/// The `A1` sync byte written with the clock bit between data bits 4 and 5 omitted.
pub const MFM_SYNC_WORD: u16 = 0x4489;
pub const MFM_SYNC_BYTE: u8 = 0xA1;

pub const MFM_IDAM: u8 = 0xFE;
pub const MFM_DAM: u8 = 0xFB;
pub const MFM_DDAM: u8 = 0xF8;

/// Extract the 8 data bits from a 16-bit MFM word. Clock bits are ignored.
pub fn mfm_decode_byte(word: u16) -> u8 {
    let mut byte = 0u8;
    for i in 0..8 {
        if word & (1 << (14 - 2 * i)) != 0 {
            byte |= 0x80 >> i;
        }
    }
    byte
}

/// Encode a single byte. `prev_bit` is the last data bit written before it.
pub fn mfm_encode_byte(byte: u8, prev_bit: bool) -> u16 {
    let mut word = 0u16;
    let mut previous = prev_bit;
    for i in 0..8 {
        let bit = byte & (0x80 >> i) != 0;
        let clock = !previous && !bit;
        word = (word << 2) | ((clock as u16) << 1) | bit as u16;
        previous = bit;
    }
    word
}

/// Encode a run of bytes, appending the result to `bits`. The previous data bit is taken from
/// the end of `bits`. For `AddressMark` each byte has its fourth clock bit suppressed, which
/// turns `A1` into the `4489` sync word.
pub fn mfm_encode(bits: &mut BitVec, data: &[u8], variant: EncodingVariant) {
    for &byte in data {
        let prev_bit = !bits.is_empty() && bits[bits.len() - 1];
        let mut word = mfm_encode_byte(byte, prev_bit);
        if let EncodingVariant::AddressMark = variant {
            // Clear the clock bit between data bits 4 and 5.
            word &= !(1 << 5);
        }
        for i in (0..MFM_BYTE_LEN).rev() {
            bits.push(word & (1 << i) != 0);
        }
    }
}
