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

    src/track/decoder.rs

    The track decode driver
*/
use crate::{
    bitstream::BitStream,
    detect::detect_encoding_with,
    flux::{capture::FluxCapture, pll::Pll},
    format_ms,
    format_us,
    sync::find_sync,
    track::{DecodedSector, DecodedTrack},
    track_schema::{FieldError, TrackSchema, TrackSchemaTrait},
    types::{enums::TrackEncoding, flags::TrackFlags, options::DecoderOptions},
    DecodeError,
};

/// Decodes tracks according to a set of [DecoderOptions].
///
/// A `TrackDecoder` holds no per-track state and may be shared between threads decoding
/// different tracks.
#[derive(Clone, Debug)]
pub struct TrackDecoder {
    options: DecoderOptions,
}

impl TrackDecoder {
    pub fn new(options: DecoderOptions) -> Result<Self, DecodeError> {
        options.validate().map_err(|e| {
            log::error!("TrackDecoder::new(): {}", e);
            e
        })?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode a flux capture.
    ///
    /// Only invalid arguments produce an `Err`. Otherwise the decoded track is returned even if it
    /// holds no sectors; check [DecodedTrack::status] to classify the outcome.
    pub fn decode(&self, flux: &FluxCapture) -> Result<DecodedTrack, DecodeError> {
        let range = if self.options.decode_all_revolutions {
            0..flux.len()
        }
        else {
            flux.revolution_range(self.options.revolution).ok_or_else(|| {
                log::error!(
                    "TrackDecoder::decode(): Revolution {} out of range ({} revolutions)",
                    self.options.revolution,
                    flux.revolution_ct()
                );
                DecodeError::Invalid(format!("Revolution {} out of range", self.options.revolution))
            })?
        };

        let mut nominal_ns = self.options.bitcell_ns;
        let encoding = match self.options.encoding {
            TrackEncoding::Auto => {
                let detection = detect_encoding_with(flux, &self.options.bands);
                nominal_ns = nominal_ns.or(detection.nominal_bitcell_ns());
                detection.encoding
            }
            encoding => encoding,
        };

        let Some(schema) = TrackSchema::from_encoding(encoding)
        else {
            log::debug!("TrackDecoder::decode(): Encoding could not be determined");
            return Ok(DecodedTrack::default());
        };
        let nominal_ns = match nominal_ns.or(encoding.default_bitcell_ns()) {
            Some(nominal_ns) => nominal_ns,
            None => return Ok(DecodedTrack::default()),
        };

        let mut pll = Pll::new(nominal_ns, self.options.pll).with_tolerance(self.options.tolerance);
        let result = pll.decode(flux.deltas_ns(range), self.options.max_track_bits);

        let mut track = DecodedTrack {
            encoding,
            bitcell_ns: nominal_ns,
            avg_bitrate: result.flux_stats.avg_bitrate(),
            flux_stats: result.flux_stats,
            ..DecodedTrack::default()
        };
        if result.truncated {
            log::warn!(
                "TrackDecoder::decode(): Bit buffer full at {} bits, remaining flux dropped",
                result.bits.len()
            );
            track.flags |= TrackFlags::TRUNCATED;
        }

        self.scan(schema, &result.bits, &mut track);

        track.bit_len = result.bits.len();
        if self.options.keep_raw_bits {
            track.raw_bits = Some(result.bits);
        }
        log::debug!(
            "TrackDecoder::decode(): {} nominal bitcell: {} track time: {}",
            track,
            format_us!(nominal_ns),
            format_ms!(track.flux_stats.time_total)
        );
        Ok(track)
    }

    /// Decode an already recovered bitstream with a concrete encoding.
    pub fn decode_bitstream(&self, bits: BitStream, encoding: TrackEncoding) -> Result<DecodedTrack, DecodeError> {
        let schema = TrackSchema::from_encoding(encoding).ok_or_else(|| {
            log::error!("TrackDecoder::decode_bitstream(): A concrete encoding is required");
            DecodeError::Invalid("A concrete encoding is required to decode a bitstream".to_string())
        })?;

        let mut track = DecodedTrack {
            encoding,
            bitcell_ns: self
                .options
                .bitcell_ns
                .or(encoding.default_bitcell_ns())
                .unwrap_or_default(),
            bit_len: bits.len(),
            ..DecodedTrack::default()
        };
        self.scan(schema, &bits, &mut track);
        if self.options.keep_raw_bits {
            track.raw_bits = Some(bits);
        }
        log::debug!("TrackDecoder::decode_bitstream(): {}", track);
        Ok(track)
    }

    /// Walk the bitstream collecting sectors until no header sync remains or a limit is hit.
    fn scan(&self, schema: TrackSchema, bits: &BitStream, track: &mut DecodedTrack) {
        let mut cursor = 0;

        loop {
            if track.sectors.len() >= self.options.max_sectors {
                // Only a limit that left a header unread is reported.
                if find_sync(bits, schema.header_sync(), cursor, None).is_some() {
                    log::warn!(
                        "TrackDecoder::scan(): Sector limit of {} reached at bit {}",
                        self.options.max_sectors,
                        cursor
                    );
                    track.flags |= TrackFlags::SECTOR_LIMIT;
                }
                break;
            }
            if self.options.is_cancelled() {
                log::warn!("TrackDecoder::scan(): Cancelled at bit {}", cursor);
                track.flags |= TrackFlags::CANCELLED;
                break;
            }
            if self.options.deadline_passed() {
                log::warn!("TrackDecoder::scan(): Deadline passed at bit {}", cursor);
                track.flags |= TrackFlags::DEADLINE;
                break;
            }

            let Some(sync) = find_sync(bits, schema.header_sync(), cursor, None)
            else {
                break;
            };
            track.sync_ct += 1;

            let header = match schema.read_header(bits, &sync) {
                Ok(header) => header,
                Err(FieldError::Underflow) => {
                    log::trace!("TrackDecoder::scan(): Track ended inside header at bit {}", sync.start);
                    track.flags |= TrackFlags::UNDERFLOW;
                    break;
                }
                Err(FieldError::InvalidSymbol) => {
                    track.bad_headers += 1;
                    track.invalid_symbols += 1;
                    cursor = sync.end;
                    continue;
                }
                Err(FieldError::UnexpectedMark(_)) => {
                    cursor = sync.end;
                    continue;
                }
            };

            let limit = header.end + schema.data_sync_window();
            let data = match find_sync(bits, schema.data_sync(), header.end, Some(limit)) {
                Some(data_sync) => schema.read_data(bits, &data_sync, &header),
                None => {
                    log::trace!(
                        "TrackDecoder::scan(): No data sync within {} bits of header {}",
                        schema.data_sync_window(),
                        header.id
                    );
                    track.missing_data += 1;
                    cursor = header.end;
                    continue;
                }
            };

            let data = match data {
                Ok(data) => data,
                Err(FieldError::Underflow) => {
                    log::trace!("TrackDecoder::scan(): Track ended inside data mark of {}", header.id);
                    track.missing_data += 1;
                    track.flags |= TrackFlags::UNDERFLOW;
                    break;
                }
                Err(error) => {
                    log::trace!(
                        "TrackDecoder::scan(): No data field for {}: {:?}",
                        header.id,
                        error
                    );
                    if error == FieldError::InvalidSymbol {
                        track.invalid_symbols += 1;
                    }
                    track.missing_data += 1;
                    cursor = header.end;
                    continue;
                }
            };

            track.invalid_symbols += data.invalid_symbols;
            let sector = DecodedSector {
                id: header.id,
                disk_id: header.disk_id,
                id_crc_ok: header.crc.valid(),
                data_crc_ok: data.crc.valid() && data.invalid_symbols == 0 && !data.truncated,
                deleted: data.deleted,
                id_crc: header.crc,
                data_crc: data.crc,
                invalid_symbols: data.invalid_symbols,
                truncated: data.truncated,
                id_offset: header.start,
                data_offset: data.start,
                data: data.data,
            };
            log::trace!(
                "TrackDecoder::scan(): Sector {} id_crc: {} data_crc: {} deleted: {}",
                sector.id,
                sector.id_crc_ok,
                sector.data_crc_ok,
                sector.deleted
            );
            track.push_sector(sector);

            if data.truncated {
                log::trace!("TrackDecoder::scan(): Track ended inside data field of {}", header.id);
                track.flags |= TrackFlags::UNDERFLOW;
                // A damaged size code may have run the read past later sectors.
                if header.crc.valid() {
                    break;
                }
            }
            // The size code of a damaged header can't be trusted to skip the data field.
            cursor = if header.crc.valid() { data.end } else { header.end };
        }
    }
}
