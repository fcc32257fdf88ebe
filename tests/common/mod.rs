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

    tests/common/mod.rs

    Common support routines for tests
*/
#![allow(dead_code)]

use fluxsector::prelude::*;

/// Sample rate used for synthesized captures. Every default bitcell is a whole number of ticks.
pub const SAMPLE_RATE: f64 = 40_000_000.0;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A recognizable fill pattern for sector `s`.
pub fn sector_pattern(s: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(7).wrapping_add(s)).collect()
}

/// Sector descriptors for a standard System 34 track: sectors 1..=count on cylinder `c`.
pub fn system34_sectors(c: u16, count: u8, n: u8) -> Vec<SectorDescriptor> {
    (1..=count)
        .map(|s| SectorDescriptor::new(SectorId::new(c, 0, s, n), sector_pattern(s, SectorId::n_to_bytes(n))))
        .collect()
}

/// Sector descriptors for a Commodore track: sectors 0..count on 1-based track `track`.
pub fn commodore_sectors(track: u16, count: u8, disk_id: u16) -> Vec<SectorDescriptor> {
    (0..count)
        .map(|s| SectorDescriptor::new(SectorId::new(track, 0, s, 1), sector_pattern(s, 256)).with_disk_id(disk_id))
        .collect()
}

/// Sector descriptors for an Apple DOS 3.3 track: sectors 0..16 on track `track`.
pub fn apple_sectors(track: u16, volume: u16) -> Vec<SectorDescriptor> {
    (0..16)
        .map(|s| SectorDescriptor::new(SectorId::new(track, 0, s, 1), sector_pattern(s, 256)).with_disk_id(volume))
        .collect()
}

/// Build a track from `sectors` and convert it to flux at the encoding's default bitcell.
pub fn build_flux(encoding: TrackEncoding, sectors: &[SectorDescriptor]) -> FluxCapture {
    let builder = TrackBuilder::from_sectors(encoding, sectors).unwrap();
    let bitcell_ns = encoding.default_bitcell_ns().unwrap();
    builder.to_flux(bitcell_ns, SAMPLE_RATE).unwrap()
}

/// Build the bitstream for `builder`, cut off after `len` bits.
pub fn cut_track(builder: &TrackBuilder, len: usize) -> BitStream {
    let mut bits = BitStream::from(builder.bits().clone());
    bits.truncate(len);
    bits
}

/// Join captures into a single multi-revolution capture, each revolution following the last.
pub fn join_revolutions(revolutions: &[FluxCapture]) -> FluxCapture {
    let mut transitions = Vec::new();
    let mut index_positions = Vec::new();
    let mut offset = 0u32;

    for (i, revolution) in revolutions.iter().enumerate() {
        if i > 0 {
            index_positions.push(transitions.len());
        }
        transitions.extend(revolution.transitions().iter().map(|t| t + offset));
        offset = transitions.last().copied().unwrap_or(offset);
    }
    FluxCapture::with_revolutions(transitions, SAMPLE_RATE, index_positions).unwrap()
}

/// Assert that `track` holds exactly `expected`, in order, all decoded cleanly.
pub fn assert_sectors_match(track: &DecodedTrack, expected: &[SectorDescriptor]) {
    assert_eq!(track.sector_ct(), expected.len(), "sector count mismatch: {}", track);
    assert_eq!(track.good_sectors, expected.len());
    for (decoded, sector) in track.sectors.iter().zip(expected) {
        assert!(decoded.is_good(), "sector {} bad", decoded.id);
        assert_eq!(decoded.sector(), sector.id.s());
        assert_eq!(decoded.cylinder(), sector.id.c());
        assert_eq!(decoded.data_size(), decoded.id.n_size());
        assert_eq!(&decoded.data[..sector.data.len()], &sector.data[..]);
    }
}
