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

    src/track/sector.rs

    A sector recovered from a track
*/
use crate::types::{chs::SectorId, structs::DiskStructureCrc};

/// A sector recovered from a track.
///
/// The header and data checksums are reported independently. A sector with a bad header checksum
/// still has its data field read, and a sector with bad data is still returned so that partially
/// readable contents are not lost.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedSector {
    pub id: SectorId,
    /// Commodore disk id or Apple volume number, when the format records one.
    pub disk_id: Option<u16>,
    /// Payload bytes. The length always equals the size implied by the id's size code.
    pub data: Vec<u8>,
    pub id_crc_ok: bool,
    pub data_crc_ok: bool,
    pub deleted: bool,
    pub id_crc: DiskStructureCrc,
    pub data_crc: DiskStructureCrc,
    /// Number of undecodable GCR symbols in the data field.
    pub invalid_symbols: usize,
    /// The bitstream ended inside the data field. Bytes past the end are zero.
    pub truncated: bool,
    /// Bit offset of the sync introducing the header.
    pub id_offset: usize,
    /// Bit offset of the sync introducing the data field.
    pub data_offset: usize,
}

impl DecodedSector {
    pub fn cylinder(&self) -> u16 {
        self.id.c()
    }

    pub fn head(&self) -> u8 {
        self.id.h()
    }

    pub fn sector(&self) -> u8 {
        self.id.s()
    }

    pub fn size_code(&self) -> u8 {
        self.id.n()
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// True if both header and data checksums are valid.
    pub fn is_good(&self) -> bool {
        self.id_crc_ok && self.data_crc_ok
    }
}
