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

//! The Commodore 1541 GCR track schema.
//!
//! Each sector has a header block and a data block, both introduced by a sync run of at least
//! ten one bits. Blocks are GCR encoded, four data bytes to five disk bytes.
//!
//! Header block: `08`, checksum, sector, track, id2, id1, `0F`, `0F`. The checksum is the XOR
//! of sector, track and both id bytes.
//!
//! Data block: `07`, 256 data bytes, checksum, `00`, `00`. The checksum is the XOR of the data.
//!
//! The 1541 writes outer tracks at a higher bit rate than inner tracks. [CommodoreZone] gives
//! the nominal bitcell and sector count for each track.

use strum::EnumIter;

use crate::{
    bitstream::{BitCursor, BitStream},
    codec::gcr::{gcr_checksum, gcr_decode_byte, C64_DATA_ID, C64_HEADER_ID, C64_SECTOR_SIZE, GCR_BYTE_LEN, GCR_INVALID},
    sync::{SyncMatch, SyncPattern},
    track_schema::{FieldError, SectorData, SectorHeader},
    types::{chs::SectorId, structs::DiskStructureCrc},
};

/// Minimum number of one bits in a sync run.
pub const C64_SYNC_MIN_BITS: usize = 10;
/// Number of one bits the 1541 writes for a sync.
pub const C64_SYNC_BITS: usize = 40;
/// Gap bytes between header and data block.
pub const C64_HEADER_GAP: usize = 9;
/// Gap bytes following a data block.
pub const C64_SECTOR_GAP: usize = 8;
pub const C64_GAP_BYTE: u8 = 0x55;

/// A 1541 speed zone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommodoreZone {
    /// Tracks 1-17
    Zone3,
    /// Tracks 18-24
    Zone2,
    /// Tracks 25-30
    Zone1,
    /// Tracks 31 and up
    Zone0,
}

impl CommodoreZone {
    /// Return the zone of a 1-based track number.
    pub fn for_track(track: u8) -> Self {
        match track {
            0..=17 => CommodoreZone::Zone3,
            18..=24 => CommodoreZone::Zone2,
            25..=30 => CommodoreZone::Zone1,
            _ => CommodoreZone::Zone0,
        }
    }

    pub fn bitcell_ns(&self) -> f64 {
        match self {
            CommodoreZone::Zone3 => 3_250.0,
            CommodoreZone::Zone2 => 3_500.0,
            CommodoreZone::Zone1 => 3_750.0,
            CommodoreZone::Zone0 => 4_000.0,
        }
    }

    pub fn sectors_per_track(&self) -> u8 {
        match self {
            CommodoreZone::Zone3 => 21,
            CommodoreZone::Zone2 => 19,
            CommodoreZone::Zone1 => 18,
            CommodoreZone::Zone0 => 17,
        }
    }
}

pub struct CommodoreSchema;

impl CommodoreSchema {
    /// Bits searched after a header for its data block sync.
    pub const DATA_SYNC_WINDOW: usize = 64 * 8;

    pub fn header_sync() -> SyncPattern {
        SyncPattern::run(C64_SYNC_MIN_BITS)
    }

    pub fn data_sync() -> SyncPattern {
        SyncPattern::run(C64_SYNC_MIN_BITS)
    }

    pub fn payload_len(_header: &SectorHeader) -> usize {
        C64_SECTOR_SIZE
    }

    /// Read one GCR byte. `None` inside the `Ok` marks an invalid group.
    fn read_byte(cursor: &mut BitCursor) -> Result<Option<u8>, FieldError> {
        let code = cursor.take(GCR_BYTE_LEN).ok_or(FieldError::Underflow)?;
        Ok(gcr_decode_byte(code as u16))
    }

    pub fn read_header(track: &BitStream, sync: &SyncMatch) -> Result<SectorHeader, FieldError> {
        let mut cursor = track.cursor(sync.end);

        match Self::read_byte(&mut cursor)? {
            Some(C64_HEADER_ID) => {}
            Some(other) => return Err(FieldError::UnexpectedMark(other)),
            None => return Err(FieldError::InvalidSymbol),
        }

        // checksum, sector, track, id2, id1
        let mut buf = [0u8; 5];
        for byte in buf.iter_mut() {
            *byte = Self::read_byte(&mut cursor)?.ok_or_else(|| {
                log::trace!(
                    "CommodoreSchema::read_header(): Invalid GCR group at bit {}",
                    cursor.position()
                );
                FieldError::InvalidSymbol
            })?;
        }

        let [stored, sector, track_no, id2, id1] = buf;
        let calculated = gcr_checksum(&buf[1..]);
        let id = SectorId::new(track_no as u16, 0, sector, 1);

        log::trace!(
            "CommodoreSchema::read_header(): Header at bit {}: {} id: {:02X}{:02X} checksum: {:02X}/{:02X}",
            sync.start,
            id,
            id2,
            id1,
            stored,
            calculated
        );

        Ok(SectorHeader {
            id,
            disk_id: Some(u16::from_be_bytes([id2, id1])),
            crc: DiskStructureCrc::new(stored as u16, calculated as u16),
            start: sync.start,
            end: cursor.position(),
        })
    }

    pub fn read_data(track: &BitStream, sync: &SyncMatch, header: &SectorHeader) -> Result<SectorData, FieldError> {
        let mut cursor = track.cursor(sync.end);

        match Self::read_byte(&mut cursor)? {
            Some(C64_DATA_ID) => {}
            Some(other) => return Err(FieldError::UnexpectedMark(other)),
            None => return Err(FieldError::InvalidSymbol),
        }

        let mut invalid_symbols = 0;
        let mut data_read = 0;
        let mut data = vec![0u8; Self::payload_len(header)];
        for byte in data.iter_mut() {
            let Ok(value) = Self::read_byte(&mut cursor)
            else {
                break;
            };
            *byte = value.unwrap_or_else(|| {
                invalid_symbols += 1;
                0
            });
            data_read += 1;
        }
        let mut truncated = data_read < data.len();
        let stored = match Self::read_byte(&mut cursor) {
            Ok(Some(value)) => value,
            Ok(None) => {
                invalid_symbols += 1;
                GCR_INVALID
            }
            Err(_) => {
                truncated = true;
                GCR_INVALID
            }
        };
        let calculated = gcr_checksum(&data);

        if truncated {
            log::trace!(
                "CommodoreSchema::read_data(): Track ended after {} of {} bytes in data block at bit {}",
                data_read,
                data.len(),
                sync.start
            );
        }
        if invalid_symbols > 0 {
            log::trace!(
                "CommodoreSchema::read_data(): {} invalid GCR groups in data block at bit {}",
                invalid_symbols,
                sync.start
            );
        }

        Ok(SectorData {
            data,
            crc: DiskStructureCrc::new(stored as u16, calculated as u16),
            deleted: false,
            invalid_symbols,
            truncated,
            start: sync.start,
            end: cursor.position(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_zones() {
        assert_eq!(CommodoreZone::for_track(1), CommodoreZone::Zone3);
        assert_eq!(CommodoreZone::for_track(17), CommodoreZone::Zone3);
        assert_eq!(CommodoreZone::for_track(18), CommodoreZone::Zone2);
        assert_eq!(CommodoreZone::for_track(30), CommodoreZone::Zone1);
        assert_eq!(CommodoreZone::for_track(35), CommodoreZone::Zone0);

        let total: u32 = (1..=35u8)
            .map(|t| CommodoreZone::for_track(t).sectors_per_track() as u32)
            .sum();
        assert_eq!(total, 683);

        let mut last = 0.0;
        for zone in CommodoreZone::iter() {
            assert!(zone.bitcell_ns() > last);
            last = zone.bitcell_ns();
        }
    }
}
