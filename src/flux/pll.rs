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

    src/flux/pll.rs

    Software PLL bit-cell recovery
*/
//! The [Pll] turns flux transition intervals into bitcells. Each interval is divided by the
//! current period estimate and rounded to a whole number of cells `N`. That produces `N - 1` zero
//! bits followed by a one bit. The difference between the interval and `N` periods then nudges
//! the phase and period estimates, letting the loop follow drift in rotation speed.
//!
//! The period estimate is hard-clamped to a window around the nominal bitcell so that noise can
//! never pull the loop arbitrarily far from the expected data rate.

use crate::{
    bitstream::BitStream,
    flux::FluxStats,
    format_us,
    types::options::PllParams,
};

pub struct PllDecodeResult {
    pub bits: BitStream,
    pub flux_stats: FluxStats,
    /// Period estimate after the last transition, in nanoseconds.
    pub final_period: f64,
    /// True if the bit buffer filled before all transitions were consumed.
    pub truncated: bool,
}

#[derive(Clone, Debug)]
pub struct Pll {
    nominal_period: f64,
    period: f64,
    phase: f64,
    tolerance: f64,
    params: PllParams,
}

impl Pll {
    /// Create a PLL locked to a nominal bitcell of `nominal_ns` nanoseconds.
    pub fn new(nominal_ns: f64, params: PllParams) -> Self {
        Pll {
            nominal_period: nominal_ns,
            period: nominal_ns,
            phase: 0.0,
            tolerance: 0.25,
            params,
        }
    }

    /// Set the fraction of a cell an interval may stray from a whole cell count before it is
    /// counted as out of window.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn nominal_period(&self) -> f64 {
        self.nominal_period
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn min_period(&self) -> f64 {
        self.nominal_period * self.params.min_period_factor
    }

    pub fn max_period(&self) -> f64 {
        self.nominal_period * self.params.max_period_factor
    }

    /// Return the loop to its nominal period with zero phase error.
    pub fn reset(&mut self) {
        self.period = self.nominal_period;
        self.phase = 0.0;
    }

    /// Process one interval, returning the number of cells it spans.
    pub fn step(&mut self, delta_ns: f64, stats: &mut FluxStats) -> u32 {
        let raw_cells = if self.period > 0.0 { (delta_ns / self.period).round() } else { 0.0 };

        if delta_ns <= 0.0 {
            stats.zero_delta += 1;
        }
        let cells = if raw_cells < self.params.min_cells as f64 {
            stats.too_short += 1;
            self.params.min_cells
        }
        else if raw_cells > self.params.max_cells as f64 {
            stats.too_long += 1;
            self.params.max_cells
        }
        else {
            raw_cells as u32
        };

        let error = delta_ns - cells as f64 * self.period;
        if error.abs() > self.tolerance * self.period {
            stats.out_of_window += 1;
        }

        if self.params.enabled {
            self.phase += error * self.params.phase_gain;
            if self.phase.abs() > self.period {
                self.phase %= self.period;
            }
            self.period += error * self.params.freq_gain / cells as f64;
            self.period = self.period.clamp(self.min_period(), self.max_period());
        }

        stats.record(delta_ns, cells);
        stats.min_period = stats.min_period.min(self.period);
        stats.max_period = stats.max_period.max(self.period);
        cells
    }

    /// Recover bits from a sequence of intervals in nanoseconds. At most `capacity` bits are
    /// produced; transitions beyond that are dropped and the result is marked truncated.
    pub fn decode<I>(&mut self, deltas: I, capacity: usize) -> PllDecodeResult
    where
        I: IntoIterator<Item = f64>,
    {
        self.reset();
        let mut bits = BitStream::with_capacity(capacity);
        let mut flux_stats = FluxStats {
            min_period: self.period,
            max_period: self.period,
            ..FluxStats::default()
        };
        let mut truncated = false;

        'transitions: for delta_ns in deltas {
            if bits.is_full() {
                truncated = true;
                break;
            }
            let cells = self.step(delta_ns, &mut flux_stats);
            for _ in 1..cells {
                if !bits.push(false) {
                    truncated = true;
                    break 'transitions;
                }
            }
            if !bits.push(true) {
                truncated = true;
                break;
            }
        }

        log::debug!(
            "Pll::decode(): {} transitions -> {} bits, period: {} (nominal {}) truncated: {}",
            flux_stats.total,
            bits.len(),
            format_us!(self.period),
            format_us!(self.nominal_period),
            truncated
        );
        log::trace!("Pll::decode(): {}", flux_stats);

        PllDecodeResult {
            bits,
            flux_stats,
            final_period: self.period,
            truncated,
        }
    }
}
