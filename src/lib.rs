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

    src/lib.rs

    Flux-to-sector decoding engine
*/
//! # fluxsector
//!
//! `fluxsector` converts raw flux transition captures from vintage floppy media into validated
//! sector data.
//!
//! A decode runs in stages. A software PLL ([flux::pll]) recovers a bitstream from transition
//! timestamps. A sync locator ([sync]) scans that bitstream for encoding-specific marks. One
//! generic track driver ([track::TrackDecoder]) then walks the track, reading header and data
//! fields through a per-encoding [track_schema::TrackSchema]. MFM, FM, Commodore GCR and Apple
//! 6-and-2 GCR are supported.
//!
//! Decoding is best-effort. Sectors with bad checksums are still returned with their validity
//! flags cleared, and per-sector failures are tallied on the [DecodedTrack] rather than aborting
//! the call.
//!
//! ```no_run
//! use fluxsector::prelude::*;
//!
//! # fn main() -> Result<(), DecodeError> {
//! let transitions: Vec<u32> = Vec::new(); // from a flux container reader
//! let flux = FluxCapture::new(transitions, 40_000_000.0)?;
//! let options = DecoderOptions::default().with_encoding(TrackEncoding::Mfm);
//!
//! let track = decode_track(&flux, &options)?;
//! for sector in &track.sectors {
//!     println!("{} id_crc: {} data_crc: {}", sector.id, sector.id_crc_ok, sector.data_crc_ok);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bitstream;
pub mod codec;
pub mod detect;
#[macro_use]
pub mod flux;
pub mod sync;
pub mod track;
pub mod track_builder;
pub mod track_schema;
pub mod types;

use thiserror::Error;

pub use crate::{
    bitstream::{BitCursor, BitStream},
    detect::{detect_encoding, EncodingDetection},
    flux::{capture::FluxCapture, pll::Pll, FluxStats},
    track::{DecodedSector, DecodedTrack, TrackDecoder},
    types::{
        chs::SectorId,
        enums::{TrackDensity, TrackEncoding},
        flags::TrackFlags,
        options::{CancelToken, DecoderOptions, EncodingBands, PllParams},
    },
};

/// Sector payloads are never larger than this, regardless of size code.
pub const MAXIMUM_SECTOR_SIZE: usize = 8192;
/// Default capacity of the recovered bit buffer, in bits.
pub const DEFAULT_MAX_TRACK_BITS: usize = 65_536 * 8;
/// Default upper bound on the number of sectors collected from one track.
pub const DEFAULT_MAX_SECTORS: usize = 64;

/// Error kinds of the decoding engine.
///
/// Only `NoSync`, `Invalid`, `Cancelled` and `DeadlineExceeded` are returned as errors. The
/// remaining kinds are non-fatal and are reported on the decoded track instead: `NoData` through
/// [DecodedTrack::missing_data], `BadCrc` through each sector's checksum flags, and `Overflow` and
/// `Underflow` through the `TRUNCATED` and `UNDERFLOW` [TrackFlags]. `WeakBits` is reserved.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("No synchronization pattern was found on the track")]
    NoSync,
    #[error("A sector header was decoded but no data field followed it")]
    NoData,
    #[error("A CRC or checksum error was detected")]
    BadCrc,
    /// Reserved for weak bit detection.
    #[error("Weak or unstable bits were detected")]
    WeakBits,
    #[error("The bit buffer capacity was exceeded")]
    Overflow,
    #[error("The bitstream ended inside a field")]
    Underflow,
    #[error("Invalid parameters were specified to a library function: {0}")]
    Invalid(String),
    #[error("The decode operation was cancelled")]
    Cancelled,
    #[error("The decode deadline elapsed")]
    DeadlineExceeded,
}

/// Decode one track of flux transitions into sectors.
///
/// This is a convenience wrapper around [TrackDecoder]. It returns `Err(DecodeError::NoSync)`
/// (or `Cancelled` / `DeadlineExceeded` if that is what stopped the loop) when no sector at all
/// could be decoded. Use [TrackDecoder::decode] directly to keep an empty or partial track.
pub fn decode_track(flux: &FluxCapture, options: &DecoderOptions) -> Result<DecodedTrack, DecodeError> {
    let decoder = TrackDecoder::new(options.clone())?;
    let track = decoder.decode(flux)?;
    track.status()?;
    Ok(track)
}

pub mod prelude {
    pub use crate::{
        bitstream::{BitCursor, BitStream},
        decode_track,
        detect::{detect_encoding, EncodingDetection},
        flux::{capture::FluxCapture, pll::Pll, FluxStats},
        track::{DecodedSector, DecodedTrack, TrackDecoder},
        track_builder::TrackBuilder,
        types::{
            chs::SectorId,
            enums::{TrackDensity, TrackEncoding},
            flags::TrackFlags,
            options::{CancelToken, DecoderOptions, EncodingBands, PllParams},
            structs::{SectorAttributes, SectorDescriptor},
        },
        DecodeError,
    };
}
