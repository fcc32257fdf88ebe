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

    src/codec/crc.rs

    CRC-16/IBM-3740 (CCITT polynomial 0x1021) used by MFM and FM sector fields
*/
const CRC16_POLY: u16 = 0x1021;
pub const CRC16_INIT: u16 = 0xFFFF;

/// The CRC of the three `A1` sync bytes that implicitly begin every MFM header and data field.
pub const MFM_SYNC_CRC: u16 = 0xCDB4;

const fn build_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            }
            else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC16_TABLE: [u16; 256] = build_crc16_table();

/// Calculate a CRC-16/IBM-3740 over `data`. If `start` is provided the calculation continues from
/// that value, otherwise it begins at 0xFFFF.
pub fn crc_ibm_3740(data: &[u8], start: Option<u16>) -> u16 {
    data.iter().fold(start.unwrap_or(CRC16_INIT), |crc, &byte| {
        (crc << 8) ^ CRC16_TABLE[((crc >> 8) as u8 ^ byte) as usize]
    })
}

/// Calculate the CRC of an MFM field, including the three implicit `A1` sync bytes.
pub fn crc_mfm_field(data: &[u8]) -> u16 {
    crc_ibm_3740(data, Some(MFM_SYNC_CRC))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc_ibm_3740(b"123456789", None), 0x29B1);
    }

    #[test]
    fn test_sync_prefix() {
        assert_eq!(crc_ibm_3740(&[0xA1, 0xA1, 0xA1], None), MFM_SYNC_CRC);
        assert_eq!(
            crc_mfm_field(&[0xFE, 0, 0, 1, 2]),
            crc_ibm_3740(&[0xA1, 0xA1, 0xA1, 0xFE, 0, 0, 1, 2], None)
        );
    }

    #[test]
    fn test_appended_crc_residue() {
        // A field followed by its own big-endian CRC leaves a zero remainder.
        let mut field = vec![0xFB, 0xE5, 0xE5, 0xE5, 0xE5];
        let crc = crc_ibm_3740(&field, None);
        field.extend_from_slice(&crc.to_be_bytes());
        assert_eq!(crc_ibm_3740(&field, None), 0);
    }
}
