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

//! The Apple II DOS 3.3 track schema, using 6-and-2 GCR.
//!
//! Address field: `D5 AA 96`, then volume, track, sector and checksum each as a 4-and-4 nibble
//! pair, then `DE AA EB`. The checksum is the XOR of volume, track and sector.
//!
//! Data field: `D5 AA AD`, 343 6-and-2 nibbles, then `DE AA EB`.
//!
//! The Disk II controller has no byte framing. Its shift register discards leading zero bits and
//! considers a byte complete once eight bits have been shifted in starting with a one. Disk
//! nibbles are read the same way here, which also absorbs the extra zero bits following each
//! self-sync byte.

use crate::{
    bitstream::{BitCursor, BitStream},
    codec::apple::{
        decode_44,
        gcr62_decode_field,
        APPLE_ADDRESS_MARK,
        APPLE_AUX_LEN,
        APPLE_DATA_MARK,
        APPLE_EPILOGUE,
        APPLE_NIBBLE_LEN,
        APPLE_SECTOR_SIZE,
        GCR62_ENCODE,
    },
    sync::{SyncMatch, SyncPattern},
    track_schema::{FieldError, SectorData, SectorHeader},
    types::{chs::SectorId, structs::DiskStructureCrc},
};

/// The `D5 AA` prologue shared by address and data fields.
pub const APPLE_PROLOGUE_WORD: u16 = 0xD5AA;

/// Read one disk nibble with controller latch semantics.
pub fn read_nibble(cursor: &mut BitCursor) -> Option<u8> {
    cursor.skip_while(false);
    cursor.take(8).map(|value| value as u8)
}

pub struct Apple2Schema;

impl Apple2Schema {
    /// Bits searched after an address field for its data prologue.
    pub const DATA_SYNC_WINDOW: usize = 1024;

    pub fn header_sync() -> SyncPattern {
        SyncPattern::word(APPLE_PROLOGUE_WORD)
    }

    pub fn data_sync() -> SyncPattern {
        SyncPattern::word(APPLE_PROLOGUE_WORD)
    }

    pub fn payload_len(_header: &SectorHeader) -> usize {
        APPLE_SECTOR_SIZE
    }

    fn read_mark(cursor: &mut BitCursor, expected: u8) -> Result<(), FieldError> {
        match read_nibble(cursor) {
            Some(mark) if mark == expected => Ok(()),
            Some(mark) => Err(FieldError::UnexpectedMark(mark)),
            None => Err(FieldError::Underflow),
        }
    }

    pub fn read_header(track: &BitStream, sync: &SyncMatch) -> Result<SectorHeader, FieldError> {
        let mut cursor = track.cursor(sync.end);
        Self::read_mark(&mut cursor, APPLE_ADDRESS_MARK)?;

        // volume, track, sector, checksum
        let mut fields = [0u8; 4];
        for field in fields.iter_mut() {
            let odd = read_nibble(&mut cursor).ok_or(FieldError::Underflow)?;
            let even = read_nibble(&mut cursor).ok_or(FieldError::Underflow)?;
            *field = decode_44(odd, even);
        }
        let end = cursor.position();

        let [volume, track_no, sector, stored] = fields;
        let calculated = volume ^ track_no ^ sector;
        let id = SectorId::new(track_no as u16, 0, sector, 1);

        let epilogue = [read_nibble(&mut cursor), read_nibble(&mut cursor)];
        if epilogue != [Some(APPLE_EPILOGUE[0]), Some(APPLE_EPILOGUE[1])] {
            log::trace!(
                "Apple2Schema::read_header(): Address field at bit {} has bad epilogue: {:02X?}",
                sync.start,
                epilogue
            );
        }

        log::trace!(
            "Apple2Schema::read_header(): Address field at bit {}: {} volume: {} checksum: {:02X}/{:02X}",
            sync.start,
            id,
            volume,
            stored,
            calculated
        );

        Ok(SectorHeader {
            id,
            disk_id: Some(volume as u16),
            crc: DiskStructureCrc::new(stored as u16, calculated as u16),
            start: sync.start,
            end,
        })
    }

    pub fn read_data(track: &BitStream, sync: &SyncMatch, _header: &SectorHeader) -> Result<SectorData, FieldError> {
        let mut cursor = track.cursor(sync.end);
        Self::read_mark(&mut cursor, APPLE_DATA_MARK)?;

        let mut nibbles = Vec::with_capacity(APPLE_NIBBLE_LEN);
        while nibbles.len() < APPLE_NIBBLE_LEN {
            let Some(nibble) = read_nibble(&mut cursor)
            else {
                break;
            };
            nibbles.push(nibble);
        }
        let nibbles_read = nibbles.len();
        let truncated = nibbles_read < APPLE_NIBBLE_LEN;
        // Padding nibbles decode as zero deltas and leave the running value unchanged.
        nibbles.resize(APPLE_NIBBLE_LEN, GCR62_ENCODE[0]);
        let mut field = gcr62_decode_field(&nibbles).ok_or(FieldError::Underflow)?;

        if truncated {
            // Byte i is complete once its six-bit value at nibble 86 + i has been read.
            let complete = nibbles_read.saturating_sub(APPLE_AUX_LEN).min(APPLE_SECTOR_SIZE);
            field.data[complete..].fill(0);
            log::trace!(
                "Apple2Schema::read_data(): Track ended after {} of {} nibbles in data field at bit {}",
                nibbles_read,
                APPLE_NIBBLE_LEN,
                sync.start
            );
        }

        log::trace!(
            "Apple2Schema::read_data(): Data field at bit {}: checksum: {:02X}/{:02X} invalid nibbles: {}",
            sync.start,
            field.stored_checksum,
            field.calculated_checksum,
            field.invalid_nibbles
        );

        Ok(SectorData {
            crc: DiskStructureCrc::new(field.stored_checksum as u16, field.calculated_checksum as u16),
            invalid_symbols: field.invalid_nibbles,
            data: field.data,
            deleted: false,
            truncated,
            start: sync.start,
            end: cursor.position(),
        })
    }
}
