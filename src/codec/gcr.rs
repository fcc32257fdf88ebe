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

    src/codec/gcr.rs

    Commodore 5-bit GCR
*/
//! Commodore drives record each 4-bit nibble as a 5-bit group chosen so that no more than two
//! zero bits ever appear in a row. Four data bytes become five disk bytes.

/// Sentinel returned by the decode table for 5-bit groups that encode no nibble.
pub const GCR_INVALID: u8 = 0xFF;
pub const GCR_BYTE_LEN: usize = 10;

pub const C64_GCR_ENCODE: [u8; 16] = [
    0x0A, 0x0B, 0x12, 0x13, 0x0E, 0x0F, 0x16, 0x17, 0x09, 0x19, 0x1A, 0x1B, 0x0D, 0x1D, 0x1E, 0x15,
];

const fn build_decode_table() -> [u8; 32] {
    let mut table = [GCR_INVALID; 32];
    let mut nibble = 0;
    while nibble < 16 {
        table[C64_GCR_ENCODE[nibble] as usize] = nibble as u8;
        nibble += 1;
    }
    table
}

pub const C64_GCR_DECODE: [u8; 32] = build_decode_table();

pub const C64_HEADER_ID: u8 = 0x08;
pub const C64_DATA_ID: u8 = 0x07;
pub const C64_SECTOR_SIZE: usize = 256;

/// Decode a 5-bit group. Only the low five bits of `code` are examined.
pub fn gcr_decode_nibble(code: u8) -> Option<u8> {
    match C64_GCR_DECODE[(code & 0x1F) as usize] {
        GCR_INVALID => None,
        nibble => Some(nibble),
    }
}

/// Decode a 10-bit pair of groups into a byte. Only the low ten bits of `code` are examined.
pub fn gcr_decode_byte(code: u16) -> Option<u8> {
    let hi = gcr_decode_nibble(((code >> 5) & 0x1F) as u8)?;
    let lo = gcr_decode_nibble((code & 0x1F) as u8)?;
    Some((hi << 4) | lo)
}

/// Encode a byte as a 10-bit pair of groups.
pub fn gcr_encode_byte(byte: u8) -> u16 {
    ((C64_GCR_ENCODE[(byte >> 4) as usize] as u16) << 5) | C64_GCR_ENCODE[(byte & 0x0F) as usize] as u16
}

/// XOR checksum used by both header and data blocks.
pub fn gcr_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table() {
        let valid = C64_GCR_DECODE.iter().filter(|&&v| v != GCR_INVALID).count();
        assert_eq!(valid, 16);
        assert_eq!(C64_GCR_DECODE[0x0A], 0x00);
        assert_eq!(C64_GCR_DECODE[0x15], 0x0F);
        assert_eq!(C64_GCR_DECODE[0x00], GCR_INVALID);
        assert_eq!(C64_GCR_DECODE[0x1F], GCR_INVALID);
    }

    #[test]
    fn test_invalid_group_is_rejected() {
        // 0x00 is not a valid group in either half.
        assert_eq!(gcr_decode_byte(0b00000_01010), None);
        assert_eq!(gcr_decode_byte(0b01010_00000), None);
        assert_eq!(gcr_decode_byte(0xFFFF), None);
        assert_eq!(gcr_decode_byte(0b01010_01010), Some(0x00));
    }

    #[test]
    fn test_byte_roundtrip() {
        for byte in 0..=255u8 {
            assert_eq!(gcr_decode_byte(gcr_encode_byte(byte)), Some(byte));
        }
    }

    #[test]
    fn test_no_long_zero_runs() {
        // No pair of adjacent groups produces more than two consecutive zeros.
        for a in C64_GCR_ENCODE {
            for b in C64_GCR_ENCODE {
                let pair = ((a as u16) << 5) | b as u16;
                let text = format!("{:010b}", pair);
                assert!(!text.contains("000"), "{}", text);
            }
        }
    }
}
