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

    src/detect.rs

    Encoding auto-detection from flux timing
*/
use crate::{
    flux::{capture::FluxCapture, histogram::FluxHistogram},
    format_us,
    types::{
        enums::{TrackDensity, TrackEncoding},
        options::EncodingBands,
    },
};

/// The result of classifying a flux capture.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodingDetection {
    /// The detected encoding, or `Auto` if the capture was too short to classify.
    pub encoding: TrackEncoding,
    pub density: Option<TrackDensity>,
    /// Mean interval between consecutive transitions in the examined window, in nanoseconds.
    pub avg_interval_ns: Option<f64>,
    /// The shortest recurring interval, estimated by histogram, in nanoseconds.
    pub base_interval_ns: Option<f64>,
    /// Number of intervals examined.
    pub sample_ct: usize,
}

impl EncodingDetection {
    /// The nominal bitcell implied by the detected encoding and density.
    pub fn nominal_bitcell_ns(&self) -> Option<f64> {
        match (self.encoding, self.density) {
            (TrackEncoding::Mfm, Some(density)) => Some(density.mfm_bitcell_ns()),
            (encoding, _) => encoding.default_bitcell_ns(),
        }
    }
}

/// Classify the encoding of a capture using the default bands.
pub fn detect_encoding(flux: &FluxCapture) -> EncodingDetection {
    detect_encoding_with(flux, &EncodingBands::default())
}

/// Classify the encoding of a capture from the average interval between its leading transitions.
///
/// Averages below `mfm_hd_max_ns` are high density MFM, below `mfm_dd_max_ns` double density
/// MFM, below `fm_max_ns` FM, and anything slower Commodore GCR. Apple GCR is never detected and
/// must be requested explicitly.
pub fn detect_encoding_with(flux: &FluxCapture, bands: &EncodingBands) -> EncodingDetection {
    if flux.len() < bands.min_transitions {
        log::debug!(
            "detect_encoding(): Only {} transitions, need {}. Encoding undetermined.",
            flux.len(),
            bands.min_transitions
        );
        return EncodingDetection::default();
    }

    let window = std::cmp::min(flux.len(), bands.window);
    // The first interval, measured from time zero, is not a real transition interval.
    let deltas: Vec<f64> = flux.deltas_ns(0..window).skip(1).collect();
    if deltas.is_empty() {
        return EncodingDetection::default();
    }
    let avg = deltas.iter().sum::<f64>() / deltas.len() as f64;

    let (encoding, density) = if avg < bands.mfm_hd_max_ns {
        (TrackEncoding::Mfm, Some(TrackDensity::High))
    }
    else if avg < bands.mfm_dd_max_ns {
        (TrackEncoding::Mfm, Some(TrackDensity::Double))
    }
    else if avg < bands.fm_max_ns {
        (TrackEncoding::Fm, Some(TrackDensity::Standard))
    }
    else {
        (TrackEncoding::GcrC64, None)
    };

    let base_interval_ns = FluxHistogram::new(&deltas, 1.0).and_then(|mut histogram| histogram.base_transition_time());

    log::debug!(
        "detect_encoding(): Average interval {} over {} transitions: {} density: {:?} base interval: {:?}",
        format_us!(avg),
        deltas.len(),
        encoding,
        density,
        base_interval_ns
    );

    EncodingDetection {
        encoding,
        density,
        avg_interval_ns: Some(avg),
        base_interval_ns,
        sample_ct: deltas.len(),
    }
}
