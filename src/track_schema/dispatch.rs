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

    src/track_schema/dispatch.rs

    Dispatch of schema operations to the implementing schema
*/
use crate::{
    bitstream::BitStream,
    sync::{SyncMatch, SyncPattern},
    track_schema::{
        apple2::Apple2Schema,
        commodore::CommodoreSchema,
        system34::{System34Schema, System34Variant},
        FieldError,
        SectorData,
        SectorHeader,
        TrackSchema,
        TrackSchemaTrait,
    },
};

impl TrackSchemaTrait for TrackSchema {
    fn header_sync(&self) -> SyncPattern {
        match self {
            TrackSchema::System34Mfm => System34Schema::header_sync(System34Variant::Mfm),
            TrackSchema::System34Fm => System34Schema::header_sync(System34Variant::Fm),
            TrackSchema::Commodore => CommodoreSchema::header_sync(),
            TrackSchema::Apple2 => Apple2Schema::header_sync(),
        }
    }

    fn data_sync(&self) -> SyncPattern {
        match self {
            TrackSchema::System34Mfm => System34Schema::data_sync(System34Variant::Mfm),
            TrackSchema::System34Fm => System34Schema::data_sync(System34Variant::Fm),
            TrackSchema::Commodore => CommodoreSchema::data_sync(),
            TrackSchema::Apple2 => Apple2Schema::data_sync(),
        }
    }

    fn data_sync_window(&self) -> usize {
        match self {
            TrackSchema::System34Mfm | TrackSchema::System34Fm => System34Schema::DATA_SYNC_WINDOW,
            TrackSchema::Commodore => CommodoreSchema::DATA_SYNC_WINDOW,
            TrackSchema::Apple2 => Apple2Schema::DATA_SYNC_WINDOW,
        }
    }

    fn read_header(&self, track: &BitStream, sync: &SyncMatch) -> Result<SectorHeader, FieldError> {
        match self {
            TrackSchema::System34Mfm => System34Schema::read_header(track, sync, System34Variant::Mfm),
            TrackSchema::System34Fm => System34Schema::read_header(track, sync, System34Variant::Fm),
            TrackSchema::Commodore => CommodoreSchema::read_header(track, sync),
            TrackSchema::Apple2 => Apple2Schema::read_header(track, sync),
        }
    }

    fn payload_len(&self, header: &SectorHeader) -> usize {
        match self {
            TrackSchema::System34Mfm | TrackSchema::System34Fm => System34Schema::payload_len(header),
            TrackSchema::Commodore => CommodoreSchema::payload_len(header),
            TrackSchema::Apple2 => Apple2Schema::payload_len(header),
        }
    }

    fn read_data(&self, track: &BitStream, sync: &SyncMatch, header: &SectorHeader) -> Result<SectorData, FieldError> {
        match self {
            TrackSchema::System34Mfm => System34Schema::read_data(track, sync, header, System34Variant::Mfm),
            TrackSchema::System34Fm => System34Schema::read_data(track, sync, header, System34Variant::Fm),
            TrackSchema::Commodore => CommodoreSchema::read_data(track, sync, header),
            TrackSchema::Apple2 => Apple2Schema::read_data(track, sync, header),
        }
    }
}
