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
*/

//! The IBM System 34 track schema, used by IBM PCs and compatibles and many other systems.
//!
//! The schema supports both MFM and FM track encodings. A sector consists of an ID address mark
//! (IDAM) followed by cylinder, head, sector and size code bytes and a CRC, then after a short gap
//! a data address mark (DAM, or DDAM for deleted data), the payload and a second CRC.
//!
//! In MFM each mark is preceded by three `A1` sync bytes written with a missing clock bit, and the
//! sync bytes are included in the CRC. In FM the mark bytes themselves carry a missing clock
//! pattern and there is no separate sync.

use crate::{
    bitstream::{BitCursor, BitStream},
    codec::{
        crc::{crc_ibm_3740, MFM_SYNC_CRC},
        fm::{fm_decode_byte, FM_DATA_MARK_MASK, FM_DDAM_WORD, FM_IDAM_WORD},
        mfm::{mfm_decode_byte, MFM_BYTE_LEN, MFM_DAM, MFM_DDAM, MFM_IDAM, MFM_SYNC_WORD},
    },
    sync::{SyncMatch, SyncPattern},
    track_schema::{FieldError, SectorData, SectorHeader},
    types::{chs::SectorId, structs::DiskStructureCrc},
};

pub const GAP_BYTE: u8 = 0x4E;
pub const GAP_BYTE_FM: u8 = 0xFF;
pub const SYNC_BYTE: u8 = 0;

pub const IBM_GAP1: usize = 50;
pub const IBM_GAP2: usize = 22;
pub const IBM_GAP3_DEFAULT: usize = 22;
pub const FM_GAP1: usize = 26;
pub const FM_GAP2: usize = 11;
pub const FM_GAP3_DEFAULT: usize = 27;
pub const SYNC_LEN: usize = 12;
pub const FM_SYNC_LEN: usize = 6;

/// Number of `A1` sync bytes preceding each MFM mark.
pub const MFM_SYNC_CT: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum System34Variant {
    Mfm,
    Fm,
}

pub struct System34Schema;

impl System34Schema {
    /// Bits searched after a header for its data mark. This spans a worst case gap of 43 bytes.
    pub const DATA_SYNC_WINDOW: usize = 43 * MFM_BYTE_LEN;

    pub fn header_sync(variant: System34Variant) -> SyncPattern {
        match variant {
            System34Variant::Mfm => SyncPattern::word(MFM_SYNC_WORD),
            System34Variant::Fm => SyncPattern::word(FM_IDAM_WORD),
        }
    }

    pub fn data_sync(variant: System34Variant) -> SyncPattern {
        match variant {
            System34Variant::Mfm => SyncPattern::word(MFM_SYNC_WORD),
            System34Variant::Fm => SyncPattern::masked(FM_DDAM_WORD, FM_DATA_MARK_MASK),
        }
    }

    pub fn payload_len(header: &SectorHeader) -> usize {
        header.id.n_size()
    }

    /// Position a cursor after the sync and return the mark byte that follows it. In MFM any
    /// further sync words are skipped first; in FM the sync word is the mark.
    fn read_mark<'a>(
        track: &'a BitStream,
        sync: &SyncMatch,
        variant: System34Variant,
    ) -> Result<(BitCursor<'a>, u8), FieldError> {
        let mut cursor = track.cursor(sync.end);
        match variant {
            System34Variant::Mfm => {
                while cursor.peek(16) == Some(MFM_SYNC_WORD as u32) {
                    cursor.advance(16);
                }
                let mark = Self::read_byte(&mut cursor, variant)?;
                Ok((cursor, mark))
            }
            System34Variant::Fm => Ok((cursor, fm_decode_byte(sync.word))),
        }
    }

    fn read_byte(cursor: &mut BitCursor, variant: System34Variant) -> Result<u8, FieldError> {
        let word = cursor.take(MFM_BYTE_LEN).ok_or(FieldError::Underflow)? as u16;
        Ok(match variant {
            System34Variant::Mfm => mfm_decode_byte(word),
            System34Variant::Fm => fm_decode_byte(word),
        })
    }

    fn read_bytes(cursor: &mut BitCursor, buf: &mut [u8], variant: System34Variant) -> Result<(), FieldError> {
        if cursor.remaining() < buf.len() * MFM_BYTE_LEN {
            return Err(FieldError::Underflow);
        }
        for byte in buf.iter_mut() {
            *byte = Self::read_byte(cursor, variant)?;
        }
        Ok(())
    }

    /// Read bytes into `buf` until it is full or the track ends. Returns the number of bytes read.
    fn read_available(cursor: &mut BitCursor, buf: &mut [u8], variant: System34Variant) -> usize {
        let mut read = 0;
        for byte in buf.iter_mut() {
            match Self::read_byte(cursor, variant) {
                Ok(value) => *byte = value,
                Err(_) => break,
            }
            read += 1;
        }
        read
    }

    /// Return the starting CRC value for a field introduced by `mark`.
    fn mark_crc(mark: u8, variant: System34Variant) -> u16 {
        match variant {
            System34Variant::Mfm => crc_ibm_3740(&[mark], Some(MFM_SYNC_CRC)),
            System34Variant::Fm => crc_ibm_3740(&[mark], None),
        }
    }

    pub fn read_header(
        track: &BitStream,
        sync: &SyncMatch,
        variant: System34Variant,
    ) -> Result<SectorHeader, FieldError> {
        let (mut cursor, mark) = Self::read_mark(track, sync, variant)?;
        if mark != MFM_IDAM {
            log::trace!(
                "System34Schema::read_header(): Mark {:02X} at bit {} is not an IDAM",
                mark,
                sync.start
            );
            return Err(FieldError::UnexpectedMark(mark));
        }

        // c, h, s, n, crc_hi, crc_lo
        let mut buf = [0u8; 6];
        Self::read_bytes(&mut cursor, &mut buf, variant)?;

        let stored = u16::from_be_bytes([buf[4], buf[5]]);
        let calculated = crc_ibm_3740(&buf[0..4], Some(Self::mark_crc(mark, variant)));
        let id = SectorId::new(buf[0] as u16, buf[1], buf[2], buf[3]);

        log::trace!(
            "System34Schema::read_header(): IDAM at bit {}: {} crc: {:04X}/{:04X}",
            sync.start,
            id,
            stored,
            calculated
        );

        Ok(SectorHeader {
            id,
            disk_id: None,
            crc: DiskStructureCrc::new(stored, calculated),
            start: sync.start,
            end: cursor.position(),
        })
    }

    pub fn read_data(
        track: &BitStream,
        sync: &SyncMatch,
        header: &SectorHeader,
        variant: System34Variant,
    ) -> Result<SectorData, FieldError> {
        let (mut cursor, mark) = Self::read_mark(track, sync, variant)?;
        let deleted = match (variant, mark) {
            (System34Variant::Mfm, MFM_DAM) => false,
            (System34Variant::Mfm, MFM_DDAM) => true,
            // FM data marks F8 through FB. F8 and F9 indicate deleted data.
            (System34Variant::Fm, 0xF8..=0xFB) => mark & 0x02 == 0,
            _ => {
                log::trace!(
                    "System34Schema::read_data(): Mark {:02X} at bit {} is not a data mark",
                    mark,
                    sync.start
                );
                return Err(FieldError::UnexpectedMark(mark));
            }
        };

        let mut data = vec![0u8; Self::payload_len(header)];
        let data_read = Self::read_available(&mut cursor, &mut data, variant);
        let mut crc_buf = [0u8; 2];
        let crc_read = Self::read_available(&mut cursor, &mut crc_buf, variant);
        let truncated = data_read < data.len() || crc_read < crc_buf.len();

        let stored = u16::from_be_bytes(crc_buf);
        let calculated = crc_ibm_3740(&data, Some(Self::mark_crc(mark, variant)));

        if truncated {
            log::trace!(
                "System34Schema::read_data(): Track ended after {} of {} bytes in data field at bit {}",
                data_read,
                data.len(),
                sync.start
            );
        }
        log::trace!(
            "System34Schema::read_data(): {} at bit {}: {} bytes crc: {:04X}/{:04X}",
            if deleted { "DDAM" } else { "DAM" },
            sync.start,
            data.len(),
            stored,
            calculated
        );

        Ok(SectorData {
            data,
            crc: DiskStructureCrc::new(stored, calculated),
            deleted,
            invalid_symbols: 0,
            truncated,
            start: sync.start,
            end: cursor.position(),
        })
    }
}
