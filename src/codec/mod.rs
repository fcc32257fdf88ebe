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

    src/codec/mod.rs

    Byte-level codecs and checksums for the supported track encodings
*/
//! Each codec translates between data bytes and the bit patterns recorded on disk. None of them
//! search for structure; that is the job of [crate::sync] and [crate::track_schema].

pub mod apple;
pub mod crc;
pub mod fm;
pub mod gcr;
pub mod mfm;

/// When encoding data, an `EncodingVariant` specifies if the data should use the standard `Data`
/// encoding, or be written with the special clock pattern that makes it an `AddressMark`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncodingVariant {
    Data,
    AddressMark,
}
