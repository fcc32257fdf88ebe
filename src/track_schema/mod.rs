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

    src/track_schema/mod.rs

    Track schema definitions
*/
//! The `track_schema` module defines a `TrackSchema` enum that represents the layout of sectors on
//! a track: which sync patterns introduce header and data fields, how those fields are laid out,
//! and how they are checksummed.
//!
//! Every schema follows the same sequence of phases, driven generically by
//! [crate::track::TrackDecoder]: find a header sync, read and validate the header, find the data
//! sync within a bounded window, read and validate the data, and emit the sector. A schema only
//! supplies the pieces that differ.
//!
//! A `TrackSchema` contains no state.

mod dispatch;
pub mod apple2;
pub mod commodore;
pub mod system34;

use std::fmt::{self, Display, Formatter};

use crate::{
    bitstream::BitStream,
    sync::{SyncMatch, SyncPattern},
    types::{chs::SectorId, enums::TrackEncoding, structs::DiskStructureCrc},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackSchema {
    /// IBM System 34 layout, MFM encoded.
    System34Mfm,
    /// IBM System 34 (3740) layout, FM encoded.
    System34Fm,
    /// Commodore 1541 GCR layout.
    Commodore,
    /// Apple II DOS 3.3 6-and-2 GCR layout.
    Apple2,
}

impl Display for TrackSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TrackSchema::System34Mfm => write!(f, "IBM System34 (MFM)"),
            TrackSchema::System34Fm => write!(f, "IBM System34 (FM)"),
            TrackSchema::Commodore => write!(f, "Commodore GCR"),
            TrackSchema::Apple2 => write!(f, "Apple II GCR"),
        }
    }
}

impl TrackSchema {
    /// Return the schema for a concrete encoding, or `None` for `Auto`.
    pub fn from_encoding(encoding: TrackEncoding) -> Option<Self> {
        match encoding {
            TrackEncoding::Auto => None,
            TrackEncoding::Mfm => Some(TrackSchema::System34Mfm),
            TrackEncoding::Fm => Some(TrackSchema::System34Fm),
            TrackEncoding::GcrC64 => Some(TrackSchema::Commodore),
            TrackEncoding::GcrApple => Some(TrackSchema::Apple2),
        }
    }

    pub fn encoding(&self) -> TrackEncoding {
        match self {
            TrackSchema::System34Mfm => TrackEncoding::Mfm,
            TrackSchema::System34Fm => TrackEncoding::Fm,
            TrackSchema::Commodore => TrackEncoding::GcrC64,
            TrackSchema::Apple2 => TrackEncoding::GcrApple,
        }
    }
}

/// A decoded and checksummed sector header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SectorHeader {
    pub id: SectorId,
    /// Commodore disk id or Apple volume number, when the format records one.
    pub disk_id: Option<u16>,
    pub crc: DiskStructureCrc,
    /// Bit offset of the sync that introduced the header.
    pub start: usize,
    /// Bit offset following the last header bit read.
    pub end: usize,
}

/// A decoded and checksummed data field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectorData {
    pub data: Vec<u8>,
    pub crc: DiskStructureCrc,
    pub deleted: bool,
    /// Number of undecodable GCR symbols in the field. Each was replaced by a zero value.
    pub invalid_symbols: usize,
    /// The bitstream ended inside the field. `data` holds the bytes read before the end,
    /// zero-padded to the full payload length.
    pub truncated: bool,
    /// Bit offset of the sync that introduced the data field.
    pub start: usize,
    /// Bit offset following the last data field bit read.
    pub end: usize,
}

/// Reasons a header or data field could not be read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The bitstream ended inside a header, or before the mark of a data field was read.
    Underflow,
    /// The sync was followed by a mark byte of the wrong kind.
    UnexpectedMark(u8),
    /// A GCR symbol in a position that must be valid did not decode.
    InvalidSymbol,
}

pub trait TrackSchemaTrait {
    /// The sync pattern introducing a sector header.
    fn header_sync(&self) -> SyncPattern;
    /// The sync pattern introducing a data field.
    fn data_sync(&self) -> SyncPattern;
    /// The maximum distance, in bits, between the end of a header and the start of its data sync.
    fn data_sync_window(&self) -> usize;
    /// Read and checksum the header following `sync`.
    fn read_header(&self, track: &BitStream, sync: &SyncMatch) -> Result<SectorHeader, FieldError>;
    /// The number of payload bytes in the data field belonging to `header`.
    fn payload_len(&self, header: &SectorHeader) -> usize;
    /// Read and checksum the data field following `sync`. A field cut off by the end of the
    /// bitstream after its mark is returned with `truncated` set rather than as an error.
    fn read_data(&self, track: &BitStream, sync: &SyncMatch, header: &SectorHeader) -> Result<SectorData, FieldError>;
}
