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

    tests/mfm.rs

    Tests for MFM track decoding
*/
mod common;

use crate::common::*;
use fluxsector::{codec::crc::crc_mfm_field, prelude::*};

fn mfm_options() -> DecoderOptions {
    DecoderOptions::default().with_encoding(TrackEncoding::Mfm)
}

/// A single 256-byte sector whose IDAM sync begins at bit 128.
fn single_sector_track(corrupt_id_crc: bool) -> TrackBuilder {
    let mut builder = TrackBuilder::new(TrackEncoding::Mfm).unwrap();
    builder.add_gap(4);
    builder.add_bytes(&[0x00; 4]);
    assert_eq!(builder.len(), 128);

    let header = [0xFE, 0x00, 0x00, 0x01, 0x01];
    let mut crc = crc_mfm_field(&header);
    if corrupt_id_crc {
        crc ^= 0x0100;
    }
    builder.add_mark(0xFE);
    builder.add_bytes(&header[1..]);
    builder.add_bytes(&crc.to_be_bytes());
    builder.add_gap(22);
    builder.add_bytes(&[0x00; 12]);

    let mut field = vec![0xFB];
    field.extend(sector_pattern(1, 256));
    let crc = crc_mfm_field(&field);
    builder.add_mark(0xFB);
    builder.add_bytes(&field[1..]);
    builder.add_bytes(&crc.to_be_bytes());
    builder.add_gap(22);
    builder
}

#[test]
fn test_mfm_single_sector() {
    init();
    let flux = single_sector_track(false).to_flux(2_000.0, SAMPLE_RATE).unwrap();
    let track = decode_track(&flux, &mfm_options()).unwrap();

    assert_eq!(track.encoding, TrackEncoding::Mfm);
    assert_eq!(track.sector_ct(), 1);
    let sector = &track.sectors[0];
    assert_eq!(sector.id_offset, 128);
    assert_eq!(sector.id, SectorId::new(0, 0, 1, 1));
    assert_eq!(sector.data_size(), 256);
    assert!(sector.id_crc_ok);
    assert!(sector.data_crc_ok);
    assert!(!sector.deleted);
    assert_eq!(sector.data, sector_pattern(1, 256));
}

#[test]
fn test_mfm_bad_id_crc_reads_data() {
    init();
    let flux = single_sector_track(true).to_flux(2_000.0, SAMPLE_RATE).unwrap();
    let track = decode_track(&flux, &mfm_options()).unwrap();

    assert_eq!(track.sector_ct(), 1);
    let sector = &track.sectors[0];
    assert!(!sector.id_crc_ok);
    assert!(sector.data_crc_ok);
    assert_eq!(sector.data, sector_pattern(1, 256));
    assert_eq!(track.bad_id_crc, 1);
    assert_eq!(track.good_sectors, 0);
    assert_eq!(track.missing_data, 0);
}

#[test]
fn test_mfm_full_track() {
    init();
    let sectors = system34_sectors(3, 9, 2);
    let flux = build_flux(TrackEncoding::Mfm, &sectors);
    let track = decode_track(&flux, &mfm_options()).unwrap();

    assert_sectors_match(&track, &sectors);
    assert_eq!(track.bad_id_crc, 0);
    assert_eq!(track.bad_data_crc, 0);
    assert!(track.flags.is_empty());
    assert!(track.avg_bitrate > 490_000.0 && track.avg_bitrate < 510_000.0);
    assert!(track.raw_bits().is_none());
}

#[test]
fn test_mfm_high_density() {
    init();
    let sectors = system34_sectors(0, 18, 2);
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    let flux = builder.to_flux(1_000.0, SAMPLE_RATE).unwrap();

    let options = mfm_options().with_bitcell_ns(1_000.0);
    let track = decode_track(&flux, &options).unwrap();
    assert_sectors_match(&track, &sectors);
}

#[test]
fn test_mfm_payload_bit_flip() {
    init();
    let sectors = system34_sectors(0, 9, 2);
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    let layout = builder.layouts()[4];
    let mut bits = builder.build();
    // The data cell of the eleventh payload byte.
    bits.flip(layout.payload_offset.unwrap() + 10 * 16 + 1);

    let decoder = TrackDecoder::new(mfm_options()).unwrap();
    let track = decoder.decode_bitstream(bits, TrackEncoding::Mfm).unwrap();

    assert_eq!(track.sector_ct(), 9);
    assert_eq!(track.good_sectors, 8);
    assert_eq!(track.bad_data_crc, 1);
    assert_eq!(track.bad_id_crc, 0);
    for sector in &track.sectors {
        assert!(sector.id_crc_ok);
        assert_eq!(sector.data_crc_ok, sector.sector() != 5);
    }
}

#[test]
fn test_mfm_attributes() {
    init();
    let mut sectors = system34_sectors(0, 4, 1);
    sectors[1].attributes.deleted_mark = true;
    sectors[2].attributes.data_error = true;
    sectors[3].attributes.no_dam = true;

    let flux = build_flux(TrackEncoding::Mfm, &sectors);
    let track = decode_track(&flux, &mfm_options()).unwrap();

    assert_eq!(track.sector_ct(), 3);
    assert!(track.sectors[0].is_good());
    assert!(track.sectors[1].deleted);
    assert!(track.sectors[1].is_good());
    assert!(track.sectors[2].id_crc_ok);
    assert!(!track.sectors[2].data_crc_ok);
    assert_eq!(track.missing_data, 1);
}

#[test]
fn test_mfm_sector_limit() {
    init();
    let sectors = system34_sectors(0, 9, 2);
    let flux = build_flux(TrackEncoding::Mfm, &sectors);
    let options = mfm_options().with_max_sectors(4);

    let track = decode_track(&flux, &options).unwrap();
    assert_eq!(track.sector_ct(), 4);
    assert!(track.flags.contains(TrackFlags::SECTOR_LIMIT));

    // A limit equal to the number of sectors on the track drops nothing.
    let track = decode_track(&flux, &mfm_options().with_max_sectors(9)).unwrap();
    assert_eq!(track.sector_ct(), 9);
    assert!(track.flags.is_empty());
}

#[test]
fn test_mfm_track_ends_in_header() {
    init();
    let sectors = system34_sectors(0, 3, 2);
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    // Past the IDAM, before the end of the header bytes.
    let bits = cut_track(&builder, builder.layouts()[2].id_offset + 100);

    let decoder = TrackDecoder::new(mfm_options()).unwrap();
    let track = decoder.decode_bitstream(bits, TrackEncoding::Mfm).unwrap();

    assert_eq!(track.flags, TrackFlags::UNDERFLOW);
    assert_eq!(track.sector_ct(), 2);
    assert_eq!(track.good_sectors, 2);
    assert_eq!(track.missing_data, 0);
    assert_eq!(track.status(), Ok(()));
}

#[test]
fn test_mfm_track_ends_in_data() {
    init();
    let sectors = system34_sectors(0, 3, 2);
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    let bits = cut_track(&builder, builder.layouts()[2].payload_offset.unwrap() + 100 * 16);

    let decoder = TrackDecoder::new(mfm_options()).unwrap();
    let track = decoder.decode_bitstream(bits, TrackEncoding::Mfm).unwrap();

    assert_eq!(track.flags, TrackFlags::UNDERFLOW);
    assert_eq!(track.sector_ct(), 3);
    assert_eq!(track.good_sectors, 2);
    assert_eq!(track.bad_data_crc, 1);
    assert_eq!(track.missing_data, 0);

    let partial = &track.sectors[2];
    assert_eq!(partial.sector(), 3);
    assert!(partial.id_crc_ok);
    assert!(!partial.data_crc_ok);
    assert!(partial.truncated);
    assert_eq!(partial.data_size(), 512);
    assert_eq!(&partial.data[..100], &sectors[2].data[..100]);
    assert!(partial.data[100..].iter().all(|&b| b == 0));
    assert!(track.sectors[..2].iter().all(|s| !s.truncated));
}

#[test]
fn test_mfm_track_ends_in_data_bad_header() {
    init();
    let mut sectors = system34_sectors(0, 3, 2);
    sectors[2].attributes.address_error = true;
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    let bits = cut_track(&builder, builder.layouts()[2].payload_offset.unwrap() + 100 * 16);

    let decoder = TrackDecoder::new(mfm_options()).unwrap();
    let track = decoder.decode_bitstream(bits, TrackEncoding::Mfm).unwrap();

    assert!(track.flags.contains(TrackFlags::UNDERFLOW));
    assert_eq!(track.sector_ct(), 3);
    let partial = &track.sectors[2];
    assert!(!partial.id_crc_ok);
    assert!(partial.truncated);
    assert_eq!(&partial.data[..100], &sectors[2].data[..100]);
}

#[test]
fn test_mfm_keep_raw_bits() {
    init();
    let sectors = system34_sectors(0, 2, 2);
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    let flux = builder.to_flux(2_000.0, SAMPLE_RATE).unwrap();
    let written = builder.build();

    let track = decode_track(&flux, &mfm_options().with_keep_raw_bits(true)).unwrap();
    let raw = track.raw_bits().unwrap();
    assert_eq!(raw.len(), track.bit_len);
    // Zero cells after the final transition are not recoverable.
    assert!(raw.len() <= written.len() && raw.len() > written.len() - 16);
    assert!((0..raw.len()).all(|i| raw[i] == written[i]));
}

#[test]
fn test_mfm_revolution_select() {
    init();
    let rev0 = system34_sectors(0, 9, 2);
    let rev1 = system34_sectors(1, 9, 2);
    let flux = join_revolutions(&[build_flux(TrackEncoding::Mfm, &rev0), build_flux(TrackEncoding::Mfm, &rev1)]);
    assert_eq!(flux.revolution_ct(), 2);

    let track = decode_track(&flux, &mfm_options().with_revolution(1)).unwrap();
    assert_sectors_match(&track, &rev1);

    let track = decode_track(&flux, &mfm_options()).unwrap();
    assert_eq!(track.sector_ct(), 18);

    let result = decode_track(&flux, &mfm_options().with_revolution(2));
    assert!(matches!(result, Err(DecodeError::Invalid(_))));
}

#[test]
fn test_mfm_truncated_buffer() {
    init();
    let sectors = system34_sectors(0, 9, 2);
    let flux = build_flux(TrackEncoding::Mfm, &sectors);
    let options = mfm_options().with_max_track_bits(40_000);

    let track = decode_track(&flux, &options).unwrap();
    assert!(track.flags.contains(TrackFlags::TRUNCATED));
    assert_eq!(track.bit_len, 40_000);
    assert!(track.sector_ct() > 0 && track.sector_ct() < 9);
}

#[test]
fn test_mfm_cancelled() {
    init();
    let flux = build_flux(TrackEncoding::Mfm, &system34_sectors(0, 9, 2));
    let token = CancelToken::new();
    token.cancel();

    let options = mfm_options().with_cancel_token(token);
    assert_eq!(decode_track(&flux, &options).unwrap_err(), DecodeError::Cancelled);

    let track = TrackDecoder::new(options).unwrap().decode(&flux).unwrap();
    assert!(track.flags.contains(TrackFlags::CANCELLED));
    assert_eq!(track.sector_ct(), 0);
}

#[test]
fn test_mfm_deadline() {
    init();
    let flux = build_flux(TrackEncoding::Mfm, &system34_sectors(0, 9, 2));
    let options = mfm_options().with_timeout(std::time::Duration::ZERO);
    assert_eq!(decode_track(&flux, &options).unwrap_err(), DecodeError::DeadlineExceeded);
}

#[test]
fn test_empty_flux() {
    init();
    let flux = FluxCapture::new(Vec::new(), SAMPLE_RATE).unwrap();

    assert_eq!(decode_track(&flux, &mfm_options()).unwrap_err(), DecodeError::NoSync);
    assert_eq!(decode_track(&flux, &DecoderOptions::default()).unwrap_err(), DecodeError::NoSync);

    let track = TrackDecoder::new(mfm_options()).unwrap().decode(&flux).unwrap();
    assert_eq!(track.sector_ct(), 0);
    assert_eq!(track.bit_len, 0);
}

#[test]
fn test_invalid_options() {
    init();
    assert!(TrackDecoder::new(mfm_options().with_bitcell_ns(0.0)).is_err());
    assert!(TrackDecoder::new(mfm_options().with_max_sectors(0)).is_err());
    assert!(TrackDecoder::new(mfm_options().with_tolerance(f64::NAN)).is_err());
}
