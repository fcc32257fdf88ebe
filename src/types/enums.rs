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

    src/types/enums.rs

    Defines common enum types
*/
use std::fmt::{self, Display, Formatter};

use strum::EnumIter;

/// The encoding of a track. `Auto` requests detection from flux timing and is also reported
/// when detection could not reach a decision.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackEncoding {
    #[default]
    Auto,
    Mfm,
    Fm,
    GcrC64,
    GcrApple,
}

impl Display for TrackEncoding {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackEncoding::Auto => write!(f, "Auto"),
            TrackEncoding::Mfm => write!(f, "MFM"),
            TrackEncoding::Fm => write!(f, "FM"),
            TrackEncoding::GcrC64 => write!(f, "GCR (Commodore)"),
            TrackEncoding::GcrApple => write!(f, "GCR (Apple 6-and-2)"),
        }
    }
}

impl TrackEncoding {
    pub fn is_auto(&self) -> bool {
        matches!(self, TrackEncoding::Auto)
    }

    /// Return the nominal bitcell duration in nanoseconds used when the caller supplies none.
    /// MFM assumes double density; use [TrackDensity::mfm_bitcell_ns] for other densities.
    pub fn default_bitcell_ns(&self) -> Option<f64> {
        match self {
            TrackEncoding::Auto => None,
            TrackEncoding::Mfm => Some(2_000.0),
            TrackEncoding::Fm => Some(4_000.0),
            TrackEncoding::GcrC64 => Some(3_250.0),
            TrackEncoding::GcrApple => Some(4_000.0),
        }
    }

    /// Return the number of bitcells that represent one data bit. MFM and FM spend a clock bit
    /// for every data bit.
    pub fn cells_per_bit(&self) -> usize {
        match self {
            TrackEncoding::Mfm | TrackEncoding::Fm => 2,
            _ => 1,
        }
    }
}

/// Recording density as estimated from flux timing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackDensity {
    Standard,
    #[default]
    Double,
    High,
}

impl Display for TrackDensity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackDensity::Standard => write!(f, "Standard"),
            TrackDensity::Double => write!(f, "Double"),
            TrackDensity::High => write!(f, "High"),
        }
    }
}

impl TrackDensity {
    /// Nominal MFM bitcell duration in nanoseconds for this density.
    pub fn mfm_bitcell_ns(&self) -> f64 {
        match self {
            TrackDensity::Standard => 4_000.0,
            TrackDensity::Double => 2_000.0,
            TrackDensity::High => 1_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn concrete_encodings_have_bitcells() {
        for encoding in TrackEncoding::iter() {
            assert_eq!(encoding.default_bitcell_ns().is_none(), encoding.is_auto());
        }
    }
}
