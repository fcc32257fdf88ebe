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

    src/track/mod.rs

    Track aggregation: decoded tracks and the track decoder
*/
//! A [TrackDecoder] drives a decode from flux to sectors and collects the results into a
//! [DecodedTrack].

mod decoder;
mod sector;

use std::fmt::{self, Display, Formatter};

pub use decoder::TrackDecoder;
pub use sector::DecodedSector;

use crate::{
    bitstream::BitStream,
    flux::FluxStats,
    types::{enums::TrackEncoding, flags::TrackFlags},
    DecodeError,
};

/// The result of decoding one track.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedTrack {
    /// The encoding the track was decoded with, or `Auto` if none could be determined.
    pub encoding: TrackEncoding,
    /// Nominal bitcell duration the PLL was started with, in nanoseconds.
    pub bitcell_ns: f64,
    /// Measured bitcell rate in cells per second.
    pub avg_bitrate: f64,
    /// Length of the recovered bitstream in bits.
    pub bit_len: usize,
    /// Sectors in the order they were found.
    pub sectors: Vec<DecodedSector>,
    /// Sectors with both checksums valid.
    pub good_sectors: usize,
    pub bad_id_crc: usize,
    pub bad_data_crc: usize,
    /// Headers with no data field following them.
    pub missing_data: usize,
    /// Headers that could not be read at all because of an invalid GCR symbol.
    pub bad_headers: usize,
    /// Total undecodable GCR symbols seen, in headers and data.
    pub invalid_symbols: usize,
    /// Number of header syncs examined.
    pub sync_ct: usize,
    pub flags: TrackFlags,
    pub flux_stats: FluxStats,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_bits: Option<BitStream>,
}

impl Display for DecodedTrack {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} sectors ({} good, {} bad id, {} bad data, {} no data) {} bits",
            self.encoding,
            self.sectors.len(),
            self.good_sectors,
            self.bad_id_crc,
            self.bad_data_crc,
            self.missing_data,
            self.bit_len
        )
    }
}

impl DecodedTrack {
    pub fn sector_ct(&self) -> usize {
        self.sectors.len()
    }

    /// Return the first sector found with sector id `s`.
    pub fn sector(&self, s: u8) -> Option<&DecodedSector> {
        self.sectors.iter().find(|sector| sector.id.s() == s)
    }

    pub fn raw_bits(&self) -> Option<&BitStream> {
        self.raw_bits.as_ref()
    }

    /// Classify the outcome of the decode. A track with at least one sector is a success whatever
    /// the quality of its sectors. An empty track reports why the loop ended, or `NoSync`.
    pub fn status(&self) -> Result<(), DecodeError> {
        if !self.sectors.is_empty() {
            return Ok(());
        }
        if self.flags.contains(TrackFlags::CANCELLED) {
            Err(DecodeError::Cancelled)
        }
        else if self.flags.contains(TrackFlags::DEADLINE) {
            Err(DecodeError::DeadlineExceeded)
        }
        else {
            Err(DecodeError::NoSync)
        }
    }

    pub(crate) fn push_sector(&mut self, sector: DecodedSector) {
        if !sector.id_crc_ok {
            self.bad_id_crc += 1;
        }
        if !sector.data_crc_ok {
            self.bad_data_crc += 1;
        }
        if sector.is_good() {
            self.good_sectors += 1;
        }
        self.sectors.push(sector);
    }
}
