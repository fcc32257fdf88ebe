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

    src/track_builder.rs

    Reference track encoders
*/
//! A [TrackBuilder] writes well-formed (or deliberately damaged) tracks in any supported
//! encoding. It produces the bitstream a drive would read back, and can convert that bitstream
//! into flux transitions at a chosen bitcell duration.
//!
//! ```
//! use fluxsector::prelude::*;
//!
//! let sectors: Vec<SectorDescriptor> = (1..=9)
//!     .map(|s| SectorDescriptor::new(SectorId::new(0, 0, s, 2), vec![s; 512]))
//!     .collect();
//! let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
//! let flux = builder.to_flux(2_000.0, 40_000_000.0).unwrap();
//!
//! let options = DecoderOptions::default().with_encoding(TrackEncoding::Mfm);
//! let track = decode_track(&flux, &options).unwrap();
//! assert_eq!(track.good_sectors, 9);
//! ```

use bit_vec::BitVec;

use crate::{
    bitstream::BitStream,
    codec::{
        apple::{encode_44, gcr62_encode, APPLE_ADDRESS_MARK, APPLE_DATA_MARK, APPLE_EPILOGUE, APPLE_PROLOGUE, APPLE_SECTOR_SIZE, APPLE_SELF_SYNC, GCR62_DECODE, GCR62_ENCODE},
        crc::{crc_ibm_3740, crc_mfm_field},
        fm::fm_encode,
        gcr::{gcr_checksum, gcr_encode_byte, C64_DATA_ID, C64_HEADER_ID, C64_SECTOR_SIZE},
        mfm::{mfm_encode, MFM_DAM, MFM_DDAM, MFM_IDAM, MFM_SYNC_BYTE},
        EncodingVariant,
    },
    flux::capture::FluxCapture,
    track_schema::{
        commodore::{C64_GAP_BYTE, C64_HEADER_GAP, C64_SECTOR_GAP, C64_SYNC_BITS},
        system34::{
            FM_GAP1, FM_GAP2, FM_GAP3_DEFAULT, FM_SYNC_LEN, GAP_BYTE, GAP_BYTE_FM, IBM_GAP1, IBM_GAP2,
            IBM_GAP3_DEFAULT, MFM_SYNC_CT, SYNC_BYTE, SYNC_LEN,
        },
    },
    types::{chs::SectorId, enums::TrackEncoding, structs::SectorDescriptor},
    DecodeError,
};

/// Self-sync nibbles written before each Apple address field.
const APPLE_GAP1: usize = 16;
/// Self-sync nibbles between an Apple address field and its data field.
const APPLE_GAP2: usize = 6;

/// Where the parts of a written sector landed in the bitstream.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SectorLayout {
    /// Bit offset of the first header sync.
    pub id_offset: usize,
    /// Bit offset of the first data field sync, if a data field was written.
    pub data_offset: Option<usize>,
    /// Bit offset of the first encoded payload bit, if a data field was written.
    pub payload_offset: Option<usize>,
    /// Bit offset following the sector.
    pub end: usize,
}

pub struct TrackBuilder {
    encoding: TrackEncoding,
    bits: BitVec,
    layouts: Vec<SectorLayout>,
}

impl TrackBuilder {
    pub fn new(encoding: TrackEncoding) -> Result<Self, DecodeError> {
        if encoding.is_auto() {
            return Err(DecodeError::Invalid("TrackBuilder requires a concrete encoding".to_string()));
        }
        Ok(TrackBuilder {
            encoding,
            bits: BitVec::new(),
            layouts: Vec::new(),
        })
    }

    /// Build a complete track: a leading gap, each sector in order, and a trailing gap.
    pub fn from_sectors(encoding: TrackEncoding, sectors: &[SectorDescriptor]) -> Result<Self, DecodeError> {
        let mut builder = TrackBuilder::new(encoding)?;
        let gap = builder.default_track_gap();
        builder.add_gap(gap);
        for sector in sectors {
            builder.add_sector(sector);
        }
        builder.add_gap(gap);
        Ok(builder)
    }

    pub fn encoding(&self) -> TrackEncoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn layouts(&self) -> &[SectorLayout] {
        &self.layouts
    }

    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    pub fn build(self) -> BitStream {
        BitStream::from(self.bits)
    }

    /// Convert the track written so far into flux transitions.
    pub fn to_flux(&self, bitcell_ns: f64, sample_rate: f64) -> Result<FluxCapture, DecodeError> {
        FluxCapture::from_bitstream(&BitStream::from(self.bits.clone()), bitcell_ns, sample_rate)
    }

    fn default_track_gap(&self) -> usize {
        match self.encoding {
            TrackEncoding::Fm => FM_GAP1,
            TrackEncoding::GcrC64 => C64_SECTOR_GAP,
            TrackEncoding::GcrApple => APPLE_GAP1,
            _ => IBM_GAP1,
        }
    }

    /// Append bits verbatim.
    pub fn add_raw_bits(&mut self, bits: &BitVec) -> &mut Self {
        self.bits.extend(bits.iter());
        self
    }

    /// Append `len` bits of `value`, most significant first.
    pub fn add_raw_word(&mut self, value: u32, len: usize) -> &mut Self {
        for i in (0..len.min(32)).rev() {
            self.bits.push(value & (1 << i) != 0);
        }
        self
    }

    /// Append a raw 16-bit sync word, such as the MFM `4489` sync.
    pub fn add_sync_word(&mut self, word: u16) -> &mut Self {
        self.add_raw_word(word as u32, 16)
    }

    /// Append data bytes in the track's encoding. MFM and FM bytes are clocked normally.
    /// Commodore bytes are GCR encoded in groups of four, zero-padding a final partial group.
    /// Apple bytes are written as raw disk nibbles.
    pub fn add_bytes(&mut self, data: &[u8]) -> &mut Self {
        match self.encoding {
            TrackEncoding::Mfm => mfm_encode(&mut self.bits, data, EncodingVariant::Data),
            TrackEncoding::Fm => fm_encode(&mut self.bits, data, EncodingVariant::Data),
            TrackEncoding::GcrC64 => {
                for group in data.chunks(4) {
                    let mut padded = [0u8; 4];
                    padded[..group.len()].copy_from_slice(group);
                    for byte in padded {
                        self.add_raw_word(gcr_encode_byte(byte) as u32, 10);
                    }
                }
            }
            TrackEncoding::GcrApple => {
                for &nibble in data {
                    self.add_raw_word(nibble as u32, 8);
                }
            }
            TrackEncoding::Auto => {}
        }
        self
    }

    /// Append an address mark. MFM marks are preceded by three `A1` syncs. FM marks are written
    /// with the `C7` clock pattern.
    pub fn add_mark(&mut self, mark: u8) -> &mut Self {
        match self.encoding {
            TrackEncoding::Mfm => {
                mfm_encode(&mut self.bits, &[MFM_SYNC_BYTE; MFM_SYNC_CT], EncodingVariant::AddressMark);
                mfm_encode(&mut self.bits, &[mark], EncodingVariant::Data);
            }
            TrackEncoding::Fm => fm_encode(&mut self.bits, &[mark], EncodingVariant::AddressMark),
            _ => {
                self.add_bytes(&[mark]);
            }
        }
        self
    }

    /// Append `len` bytes of the encoding's gap filler.
    pub fn add_gap(&mut self, len: usize) -> &mut Self {
        match self.encoding {
            TrackEncoding::Mfm => {
                self.add_bytes(&vec![GAP_BYTE; len]);
            }
            TrackEncoding::Fm => {
                self.add_bytes(&vec![GAP_BYTE_FM; len]);
            }
            TrackEncoding::GcrC64 => {
                for _ in 0..len {
                    self.add_raw_word(C64_GAP_BYTE as u32, 8);
                }
            }
            TrackEncoding::GcrApple => {
                // Self-sync: FF followed by two zero bits.
                for _ in 0..len {
                    self.add_raw_word((APPLE_SELF_SYNC as u32) << 2, 10);
                }
            }
            TrackEncoding::Auto => {}
        }
        self
    }

    /// Append a complete sector, returning where it was placed.
    pub fn add_sector(&mut self, sector: &SectorDescriptor) -> SectorLayout {
        let layout = match self.encoding {
            TrackEncoding::Mfm | TrackEncoding::Fm => self.add_system34_sector(sector),
            TrackEncoding::GcrC64 => self.add_commodore_sector(sector),
            TrackEncoding::GcrApple => self.add_apple_sector(sector),
            TrackEncoding::Auto => SectorLayout::default(),
        };
        log::trace!(
            "TrackBuilder::add_sector(): {} {} at bit {}",
            self.encoding,
            sector.id,
            layout.id_offset
        );
        self.layouts.push(layout);
        layout
    }

    fn payload(sector: &SectorDescriptor, len: usize) -> Vec<u8> {
        let mut data = sector.data.clone();
        data.resize(len, 0);
        data
    }

    fn add_system34_sector(&mut self, sector: &SectorDescriptor) -> SectorLayout {
        let mfm = self.encoding == TrackEncoding::Mfm;
        let (sync_len, gap2, gap3) = if mfm {
            (SYNC_LEN, IBM_GAP2, IBM_GAP3_DEFAULT)
        }
        else {
            (FM_SYNC_LEN, FM_GAP2, FM_GAP3_DEFAULT)
        };
        let field_crc = |field: &[u8]| {
            if mfm {
                crc_mfm_field(field)
            }
            else {
                crc_ibm_3740(field, None)
            }
        };
        let attributes = sector.attributes;
        let mut layout = SectorLayout::default();

        self.add_bytes(&vec![SYNC_BYTE; sync_len]);
        layout.id_offset = self.bits.len();
        let id = sector.id;
        let header = [MFM_IDAM, id.c() as u8, id.h(), id.s(), id.n()];
        let mut crc = field_crc(&header);
        if attributes.address_error {
            crc ^= 0xFFFF;
        }
        self.add_mark(MFM_IDAM);
        self.add_bytes(&header[1..]);
        self.add_bytes(&crc.to_be_bytes());
        self.add_gap(gap2);

        if !attributes.no_dam {
            self.add_bytes(&vec![SYNC_BYTE; sync_len]);
            layout.data_offset = Some(self.bits.len());
            let mark = if attributes.deleted_mark { MFM_DDAM } else { MFM_DAM };
            let mut field = vec![mark];
            field.extend(Self::payload(sector, SectorId::n_to_bytes(id.n())));
            let mut crc = field_crc(&field);
            if attributes.data_error {
                crc ^= 0xFFFF;
            }
            self.add_mark(mark);
            layout.payload_offset = Some(self.bits.len());
            self.add_bytes(&field[1..]);
            self.add_bytes(&crc.to_be_bytes());
        }
        self.add_gap(gap3);
        layout.end = self.bits.len();
        layout
    }

    fn add_commodore_sector(&mut self, sector: &SectorDescriptor) -> SectorLayout {
        let attributes = sector.attributes;
        let mut layout = SectorLayout::default();
        let [id2, id1] = sector.disk_id.to_be_bytes();
        let (track, sector_no) = (sector.id.c() as u8, sector.id.s());

        layout.id_offset = self.bits.len();
        self.add_raw_word(u32::MAX, C64_SYNC_BITS.min(32));
        self.add_raw_word(u32::MAX, C64_SYNC_BITS.saturating_sub(32));
        let mut checksum = gcr_checksum(&[sector_no, track, id2, id1]);
        if attributes.address_error {
            checksum ^= 0xFF;
        }
        self.add_bytes(&[C64_HEADER_ID, checksum, sector_no, track, id2, id1, 0x0F, 0x0F]);
        self.add_gap(C64_HEADER_GAP);

        if !attributes.no_dam {
            layout.data_offset = Some(self.bits.len());
            self.add_raw_word(u32::MAX, C64_SYNC_BITS.min(32));
            self.add_raw_word(u32::MAX, C64_SYNC_BITS.saturating_sub(32));
            layout.payload_offset = Some(self.bits.len() + 10);

            let data = Self::payload(sector, C64_SECTOR_SIZE);
            let mut checksum = gcr_checksum(&data);
            if attributes.data_error {
                checksum ^= 0xFF;
            }
            let mut block = Vec::with_capacity(C64_SECTOR_SIZE + 4);
            block.push(C64_DATA_ID);
            block.extend_from_slice(&data);
            block.extend_from_slice(&[checksum, 0x00, 0x00]);
            self.add_bytes(&block);
        }
        self.add_gap(C64_SECTOR_GAP);
        layout.end = self.bits.len();
        layout
    }

    fn add_apple_sector(&mut self, sector: &SectorDescriptor) -> SectorLayout {
        let attributes = sector.attributes;
        let mut layout = SectorLayout::default();
        let volume = sector.disk_id as u8;
        let (track, sector_no) = (sector.id.c() as u8, sector.id.s());

        layout.id_offset = self.bits.len();
        self.add_bytes(&APPLE_PROLOGUE);
        self.add_bytes(&[APPLE_ADDRESS_MARK]);
        let mut checksum = volume ^ track ^ sector_no;
        if attributes.address_error {
            checksum ^= 0x01;
        }
        for value in [volume, track, sector_no, checksum] {
            self.add_bytes(&encode_44(value));
        }
        self.add_bytes(&APPLE_EPILOGUE);
        self.add_gap(APPLE_GAP2);

        if !attributes.no_dam {
            layout.data_offset = Some(self.bits.len());
            self.add_bytes(&APPLE_PROLOGUE);
            self.add_bytes(&[APPLE_DATA_MARK]);
            layout.payload_offset = Some(self.bits.len());

            let mut nibbles = gcr62_encode(&Self::payload(sector, APPLE_SECTOR_SIZE));
            if attributes.data_error {
                if let Some(last) = nibbles.last_mut() {
                    *last = GCR62_ENCODE[((GCR62_DECODE[*last as usize] ^ 0x01) & 0x3F) as usize];
                }
            }
            self.add_bytes(&nibbles);
            self.add_bytes(&APPLE_EPILOGUE);
        }
        self.add_gap(APPLE_GAP1);
        layout.end = self.bits.len();
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::structs::SectorAttributes;

    #[test]
    fn test_requires_concrete_encoding() {
        assert!(TrackBuilder::new(TrackEncoding::Auto).is_err());
    }

    #[test]
    fn test_mfm_layout() {
        let sector = SectorDescriptor::new(SectorId::new(0, 0, 1, 1), vec![0xE5; 256]);
        let mut builder = TrackBuilder::new(TrackEncoding::Mfm).unwrap();
        let layout = builder.add_sector(&sector);

        assert_eq!(layout.id_offset, SYNC_LEN * 16);
        let bits = builder.build();
        let mut cursor = bits.cursor(layout.id_offset);
        assert_eq!(cursor.take(16), Some(0x4489));
        assert_eq!(cursor.take(16), Some(0x4489));
        assert_eq!(cursor.take(16), Some(0x4489));
        // FE after a 1 bit
        assert_eq!(cursor.take(16), Some(0x5554));

        let data_offset = layout.data_offset.unwrap();
        assert_eq!(layout.payload_offset, Some(data_offset + 4 * 16));
    }

    #[test]
    fn test_no_dam() {
        let sector = SectorDescriptor::new(SectorId::new(0, 0, 1, 1), vec![]).with_attributes(SectorAttributes {
            no_dam: true,
            ..Default::default()
        });
        for encoding in [TrackEncoding::Mfm, TrackEncoding::Fm, TrackEncoding::GcrC64, TrackEncoding::GcrApple] {
            let mut builder = TrackBuilder::new(encoding).unwrap();
            let layout = builder.add_sector(&sector);
            assert_eq!(layout.data_offset, None);
            assert_eq!(layout.payload_offset, None);
        }
    }

    #[test]
    fn test_commodore_block_sizes() {
        let sector = SectorDescriptor::new(SectorId::new(1, 0, 0, 1), vec![0; 256]);
        let mut builder = TrackBuilder::new(TrackEncoding::GcrC64).unwrap();
        let layout = builder.add_sector(&sector);
        let data_offset = layout.data_offset.unwrap();
        // Sync, 8 header bytes as 10 bits each, then the header gap.
        assert_eq!(data_offset, C64_SYNC_BITS + 80 + C64_HEADER_GAP * 8);
        // Sync, 260 data block bytes, then the trailing gap.
        assert_eq!(layout.end, data_offset + C64_SYNC_BITS + 2600 + C64_SECTOR_GAP * 8);
    }
}
