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

    src/codec/apple.rs

    Apple II disk nibbles: 6-and-2 and 4-and-4 encoding
*/
//! Apple II DOS 3.3 and ProDOS sectors are stored as "disk nibbles": 8-bit values with the high
//! bit set and no more than one pair of consecutive zero bits.
//!
//! Data fields use 6-and-2 encoding. A 256-byte sector is split into 256 six-bit values holding
//! the high bits of each byte, plus 86 six-bit values collecting the two low bits of each byte.
//! The 342 values are XOR-chained and mapped through a 64-entry translation table, followed by a
//! checksum nibble, for 343 disk nibbles in total.
//!
//! Address fields use 4-and-4 encoding, spreading each byte over two nibbles.

pub const APPLE_SECTOR_SIZE: usize = 256;
/// Number of auxiliary values carrying the low two bits of each data byte.
pub const APPLE_AUX_LEN: usize = 86;
/// Number of six-bit values in a data field, excluding the checksum.
pub const APPLE_VALUE_LEN: usize = APPLE_AUX_LEN + APPLE_SECTOR_SIZE;
/// Number of disk nibbles in a data field, including the checksum.
pub const APPLE_NIBBLE_LEN: usize = APPLE_VALUE_LEN + 1;

pub const APPLE_PROLOGUE: [u8; 2] = [0xD5, 0xAA];
pub const APPLE_ADDRESS_MARK: u8 = 0x96;
pub const APPLE_DATA_MARK: u8 = 0xAD;
pub const APPLE_EPILOGUE: [u8; 3] = [0xDE, 0xAA, 0xEB];
/// A self-sync nibble is `FF` followed by two zero bits.
pub const APPLE_SELF_SYNC: u8 = 0xFF;

pub const GCR62_INVALID: u8 = 0xFF;

pub const GCR62_ENCODE: [u8; 64] = [
    0x96, 0x97, 0x9A, 0x9B, 0x9D, 0x9E, 0x9F, 0xA6, 0xA7, 0xAB, 0xAC, 0xAD, 0xAE, 0xAF, 0xB2, 0xB3, //
    0xB4, 0xB5, 0xB6, 0xB7, 0xB9, 0xBA, 0xBB, 0xBC, 0xBD, 0xBE, 0xBF, 0xCB, 0xCD, 0xCE, 0xCF, 0xD3, //
    0xD6, 0xD7, 0xD9, 0xDA, 0xDB, 0xDC, 0xDD, 0xDE, 0xDF, 0xE5, 0xE6, 0xE7, 0xE9, 0xEA, 0xEB, 0xEC, //
    0xED, 0xEE, 0xEF, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0xFE, 0xFF, //
];

const fn build_decode_table() -> [u8; 256] {
    let mut table = [GCR62_INVALID; 256];
    let mut value = 0;
    while value < 64 {
        table[GCR62_ENCODE[value] as usize] = value as u8;
        value += 1;
    }
    table
}

pub const GCR62_DECODE: [u8; 256] = build_decode_table();

/// Translate a disk nibble into its six-bit value.
pub fn gcr62_decode(nibble: u8) -> Option<u8> {
    match GCR62_DECODE[nibble as usize] {
        GCR62_INVALID => None,
        value => Some(value),
    }
}

/// Combine a 4-and-4 nibble pair into a byte.
pub fn decode_44(odd: u8, even: u8) -> u8 {
    ((odd << 1) | 1) & even
}

/// Split a byte into a 4-and-4 nibble pair.
pub fn encode_44(value: u8) -> [u8; 2] {
    [(value >> 1) | 0xAA, value | 0xAA]
}

/// The result of decoding a 6-and-2 data field.
#[derive(Clone, Debug)]
pub struct Gcr62Field {
    pub data: Vec<u8>,
    /// The six-bit checksum value recorded on disk.
    pub stored_checksum: u8,
    /// The running XOR of all 342 values, which should equal the stored checksum.
    pub calculated_checksum: u8,
    /// Count of disk nibbles that were not valid 6-and-2 codes. Each is decoded as zero.
    pub invalid_nibbles: usize,
}

impl Gcr62Field {
    pub fn checksum_valid(&self) -> bool {
        self.invalid_nibbles == 0 && self.stored_checksum == self.calculated_checksum
    }
}

/// Split a sector into the 342 six-bit values stored in a data field. The auxiliary values come
/// first. Auxiliary value `k` holds the low two bits, swapped, of bytes `k`, `k + 86` and
/// `k + 172` in bit pairs 0-1, 2-3 and 4-5.
fn prenibble(data: &[u8]) -> [u8; APPLE_VALUE_LEN] {
    let mut values = [0u8; APPLE_VALUE_LEN];
    for (i, &byte) in data.iter().take(APPLE_SECTOR_SIZE).enumerate() {
        let swapped = ((byte & 0x01) << 1) | ((byte & 0x02) >> 1);
        values[i % APPLE_AUX_LEN] |= swapped << (2 * (i / APPLE_AUX_LEN));
        values[APPLE_AUX_LEN + i] = byte >> 2;
    }
    values
}

fn postnibble(values: &[u8; APPLE_VALUE_LEN]) -> Vec<u8> {
    (0..APPLE_SECTOR_SIZE)
        .map(|i| {
            let swapped = (values[i % APPLE_AUX_LEN] >> (2 * (i / APPLE_AUX_LEN))) & 0x03;
            let low = ((swapped & 0x01) << 1) | ((swapped & 0x02) >> 1);
            (values[APPLE_AUX_LEN + i] << 2) | low
        })
        .collect()
}

/// Encode a 256-byte sector into 343 disk nibbles. Short input is zero-padded.
pub fn gcr62_encode(data: &[u8]) -> Vec<u8> {
    let values = prenibble(data);
    let mut nibbles = Vec::with_capacity(APPLE_NIBBLE_LEN);
    let mut previous = 0u8;
    for &value in values.iter() {
        nibbles.push(GCR62_ENCODE[(value ^ previous) as usize]);
        previous = value;
    }
    nibbles.push(GCR62_ENCODE[previous as usize]);
    nibbles
}

/// Decode 343 disk nibbles into a 256-byte sector. Returns `None` only if `nibbles` is shorter
/// than a full field; invalid nibbles are counted and decoded as zero.
pub fn gcr62_decode_field(nibbles: &[u8]) -> Option<Gcr62Field> {
    if nibbles.len() < APPLE_NIBBLE_LEN {
        return None;
    }

    let mut invalid_nibbles = 0;
    let mut translate = |nibble: u8| {
        gcr62_decode(nibble).unwrap_or_else(|| {
            invalid_nibbles += 1;
            0
        })
    };

    let mut values = [0u8; APPLE_VALUE_LEN];
    let mut acc = 0u8;
    for (value, &nibble) in values.iter_mut().zip(nibbles) {
        acc ^= translate(nibble);
        *value = acc;
    }
    let stored_checksum = translate(nibbles[APPLE_VALUE_LEN]);

    Some(Gcr62Field {
        data: postnibble(&values),
        stored_checksum,
        calculated_checksum: acc,
        invalid_nibbles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_bijective() {
        let valid = GCR62_DECODE.iter().filter(|&&v| v != GCR62_INVALID).count();
        assert_eq!(valid, 64);
        for (value, &nibble) in GCR62_ENCODE.iter().enumerate() {
            assert!(nibble & 0x80 != 0);
            assert_eq!(gcr62_decode(nibble), Some(value as u8));
        }
        assert_eq!(gcr62_decode(0xD5), None);
        assert_eq!(gcr62_decode(0xAA), None);
    }

    #[test]
    fn test_44() {
        for value in 0..=255u8 {
            let [odd, even] = encode_44(value);
            assert_eq!(decode_44(odd, even), value);
        }
        assert_eq!(encode_44(0xFE), [0xFF, 0xFE]);
    }

    #[test]
    fn test_aux_bit_packing() {
        let mut data = [0u8; APPLE_SECTOR_SIZE];
        data[0] = 0x01;
        data[86] = 0x02;
        data[172] = 0x03;
        let values = prenibble(&data);
        // Low bits are swapped: 01 -> 10, 10 -> 01, 11 -> 11.
        assert_eq!(values[0], 0b11_01_10);
        assert_eq!(values[APPLE_AUX_LEN], 0);
    }

    #[test]
    fn test_field_roundtrip() {
        let data: Vec<u8> = (0..APPLE_SECTOR_SIZE).map(|i| (i * 7 + 3) as u8).collect();
        let nibbles = gcr62_encode(&data);
        assert_eq!(nibbles.len(), APPLE_NIBBLE_LEN);

        let field = gcr62_decode_field(&nibbles).unwrap();
        assert!(field.checksum_valid());
        assert_eq!(field.data, data);
    }

    #[test]
    fn test_field_corruption() {
        let data = vec![0x5Au8; APPLE_SECTOR_SIZE];
        let mut nibbles = gcr62_encode(&data);
        nibbles[100] = GCR62_ENCODE[(GCR62_DECODE[nibbles[100] as usize] ^ 0x01) as usize];
        let field = gcr62_decode_field(&nibbles).unwrap();
        assert!(!field.checksum_valid());
        assert_eq!(field.invalid_nibbles, 0);

        nibbles[5] = 0xD5;
        let field = gcr62_decode_field(&nibbles).unwrap();
        assert_eq!(field.invalid_nibbles, 1);
        assert!(!field.checksum_valid());

        assert!(gcr62_decode_field(&nibbles[..100]).is_none());
    }
}
