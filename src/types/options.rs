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

    src/types/options.rs

    Decoder configuration
*/
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use web_time::Instant;

use crate::{types::enums::TrackEncoding, DecodeError, DEFAULT_MAX_SECTORS, DEFAULT_MAX_TRACK_BITS};

/// Tuning constants for the bit-cell recovery loop.
///
/// The period and cell count clamps are heuristics that matter a great deal on damaged or copy
/// protected media, so they are configurable rather than fixed.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PllParams {
    /// When false the period is held at nominal and no phase or frequency correction is applied.
    pub enabled: bool,
    pub phase_gain: f64,
    pub freq_gain: f64,
    /// Lower clamp of the period estimate, as a fraction of the nominal bitcell.
    pub min_period_factor: f64,
    /// Upper clamp of the period estimate, as a fraction of the nominal bitcell.
    pub max_period_factor: f64,
    /// Smallest number of cells a single transition interval may represent.
    pub min_cells: u32,
    /// Largest number of cells a single transition interval may represent.
    pub max_cells: u32,
}

impl Default for PllParams {
    fn default() -> Self {
        Self {
            enabled: true,
            phase_gain: 0.5,
            freq_gain: 0.02,
            min_period_factor: 0.8,
            max_period_factor: 1.2,
            min_cells: 1,
            max_cells: 8,
        }
    }
}

impl PllParams {
    pub fn validate(&self) -> Result<(), DecodeError> {
        if !self.phase_gain.is_finite() || !self.freq_gain.is_finite() {
            return Err(DecodeError::Invalid("PLL gains must be finite".to_string()));
        }
        if !(self.min_period_factor > 0.0
            && self.max_period_factor.is_finite()
            && self.min_period_factor <= 1.0
            && self.max_period_factor >= 1.0
            && self.min_period_factor < self.max_period_factor)
        {
            return Err(DecodeError::Invalid(format!(
                "PLL period clamp [{}, {}] must bracket 1.0",
                self.min_period_factor, self.max_period_factor
            )));
        }
        if self.min_cells == 0 || self.min_cells > self.max_cells {
            return Err(DecodeError::Invalid(format!(
                "PLL cell clamp [{}, {}] is invalid",
                self.min_cells, self.max_cells
            )));
        }
        Ok(())
    }
}

/// Average transition interval thresholds used by the encoding auto-detector, in nanoseconds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodingBands {
    /// Averages below this are classified as high density MFM.
    pub mfm_hd_max_ns: f64,
    /// Averages below this are classified as double density MFM.
    pub mfm_dd_max_ns: f64,
    /// Averages below this are classified as FM. Anything slower is Commodore GCR.
    pub fm_max_ns: f64,
    /// Captures with fewer transitions than this are left undetermined.
    pub min_transitions: usize,
    /// Number of leading transitions examined.
    pub window: usize,
}

impl Default for EncodingBands {
    fn default() -> Self {
        Self {
            mfm_hd_max_ns: 1_500.0,
            mfm_dd_max_ns: 3_000.0,
            fm_max_ns: 5_000.0,
            min_transitions: 100,
            window: 1000,
        }
    }
}

impl EncodingBands {
    pub fn validate(&self) -> Result<(), DecodeError> {
        if !(self.mfm_hd_max_ns < self.mfm_dd_max_ns && self.mfm_dd_max_ns < self.fm_max_ns) {
            return Err(DecodeError::Invalid("Encoding bands must be ascending".to_string()));
        }
        if self.window < 2 {
            return Err(DecodeError::Invalid("Detection window must be at least 2".to_string()));
        }
        Ok(())
    }
}

/// A cloneable flag used to cancel a decode in progress from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options controlling a track decode.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderOptions {
    /// The track encoding, or `Auto` to detect it from flux timing.
    pub encoding: TrackEncoding,
    /// Nominal bitcell duration in nanoseconds. `None` selects a default for the encoding.
    pub bitcell_ns: Option<f64>,
    /// Fraction of a bitcell a transition may deviate from an integral cell count before it is
    /// counted as out of window in the flux statistics.
    pub tolerance: f64,
    pub pll: PllParams,
    /// The revolution to decode when `decode_all_revolutions` is false.
    pub revolution: usize,
    pub decode_all_revolutions: bool,
    /// Retain the recovered bitstream on the decoded track.
    pub keep_raw_bits: bool,
    pub max_track_bits: usize,
    pub max_sectors: usize,
    pub bands: EncodingBands,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub deadline: Option<Instant>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cancel: Option<CancelToken>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            encoding: TrackEncoding::Auto,
            bitcell_ns: None,
            tolerance: 0.25,
            pll: PllParams::default(),
            revolution: 0,
            decode_all_revolutions: true,
            keep_raw_bits: false,
            max_track_bits: DEFAULT_MAX_TRACK_BITS,
            max_sectors: DEFAULT_MAX_SECTORS,
            bands: EncodingBands::default(),
            deadline: None,
            cancel: None,
        }
    }
}

impl DecoderOptions {
    pub fn with_encoding(mut self, encoding: TrackEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_bitcell_ns(mut self, bitcell_ns: f64) -> Self {
        self.bitcell_ns = Some(bitcell_ns);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_pll(mut self, pll: PllParams) -> Self {
        self.pll = pll;
        self
    }

    /// Decode only the specified revolution.
    pub fn with_revolution(mut self, revolution: usize) -> Self {
        self.revolution = revolution;
        self.decode_all_revolutions = false;
        self
    }

    pub fn with_keep_raw_bits(mut self, keep: bool) -> Self {
        self.keep_raw_bits = keep;
        self
    }

    pub fn with_max_track_bits(mut self, max_track_bits: usize) -> Self {
        self.max_track_bits = max_track_bits;
        self
    }

    pub fn with_max_sectors(mut self, max_sectors: usize) -> Self {
        self.max_sectors = max_sectors;
        self
    }

    pub fn with_bands(mut self, bands: EncodingBands) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn validate(&self) -> Result<(), DecodeError> {
        if let Some(bitcell) = self.bitcell_ns {
            if !bitcell.is_finite() || bitcell <= 0.0 {
                return Err(DecodeError::Invalid(format!("Invalid bitcell duration: {}", bitcell)));
            }
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 || self.tolerance > 0.5 {
            return Err(DecodeError::Invalid(format!(
                "Tolerance {} must be in (0, 0.5]",
                self.tolerance
            )));
        }
        if self.max_track_bits == 0 {
            return Err(DecodeError::Invalid("Bit buffer capacity must be non-zero".to_string()));
        }
        if self.max_sectors == 0 {
            return Err(DecodeError::Invalid("Sector limit must be non-zero".to_string()));
        }
        self.pll.validate()?;
        self.bands.validate()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|token| token.is_cancelled())
    }

    pub(crate) fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(DecoderOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_options() {
        assert!(DecoderOptions::default().with_bitcell_ns(0.0).validate().is_err());
        assert!(DecoderOptions::default().with_bitcell_ns(f64::NAN).validate().is_err());
        assert!(DecoderOptions::default().with_max_sectors(0).validate().is_err());
        assert!(DecoderOptions::default().with_max_track_bits(0).validate().is_err());

        let pll = PllParams {
            min_period_factor: 1.3,
            ..PllParams::default()
        };
        assert!(DecoderOptions::default().with_pll(pll).validate().is_err());

        let pll = PllParams {
            min_cells: 0,
            ..PllParams::default()
        };
        assert!(DecoderOptions::default().with_pll(pll).validate().is_err());
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let options = DecoderOptions::default().with_cancel_token(token.clone());
        assert!(!options.is_cancelled());
        token.cancel();
        assert!(options.is_cancelled());
    }
}
