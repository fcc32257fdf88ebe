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

    src/types/structs.rs

    Defines common structs
*/
use crate::types::chs::SectorId;

/// A `DiskStructureCrc` represents a checksum related to a region of a track. It contains both
/// the stored value read from the disk and the value calculated over the decoded bytes.
///
/// Commodore and Apple checksums are 8 and 6 bits wide and are stored zero-extended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskStructureCrc {
    pub stored: u16,
    pub calculated: u16,
}

impl DiskStructureCrc {
    pub fn new(stored: u16, calculated: u16) -> Self {
        Self { stored, calculated }
    }

    /// Return true if the stored CRC value matches the calculated CRC value.
    pub fn valid(&self) -> bool {
        self.stored == self.calculated
    }
}

/// Attributes of a sector written by a [crate::track_builder::TrackBuilder]. The error flags
/// deliberately corrupt the recorded checksum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SectorAttributes {
    pub address_error: bool,
    pub data_error: bool,
    pub deleted_mark: bool,
    pub no_dam: bool,
}

/// A structure used to describe the parameters of a sector to be written by a
/// [crate::track_builder::TrackBuilder].
#[derive(Clone, Debug, Default)]
pub struct SectorDescriptor {
    pub id: SectorId,
    /// Commodore disk id (`id2 << 8 | id1`) or Apple volume number. Ignored by MFM and FM.
    pub disk_id: u16,
    pub data: Vec<u8>,
    pub attributes: SectorAttributes,
}

impl SectorDescriptor {
    pub fn new(id: SectorId, data: Vec<u8>) -> Self {
        Self {
            id,
            data,
            ..Default::default()
        }
    }

    pub fn with_disk_id(mut self, disk_id: u16) -> Self {
        self.disk_id = disk_id;
        self
    }

    pub fn with_attributes(mut self, attributes: SectorAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}
