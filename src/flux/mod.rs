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

    src/flux/mod.rs

    Flux capture handling and bit-cell recovery
*/
//! Flux timing is handled in nanoseconds throughout this module.

pub mod capture;
pub mod histogram;
pub mod pll;

use std::{
    fmt,
    fmt::{Display, Formatter},
};

pub use capture::FluxCapture;
pub use histogram::FluxHistogram;
pub use pll::{Pll, PllDecodeResult};

/// Format a duration in nanoseconds as microseconds.
#[doc(hidden)]
#[macro_export]
macro_rules! format_us {
    ($value:expr) => {
        format!("{:.4}μs", $value / 1_000.0)
    };
}

/// Format a duration in nanoseconds as milliseconds.
#[doc(hidden)]
#[macro_export]
macro_rules! format_ms {
    ($value:expr) => {
        format!("{:.4}ms", $value / 1_000_000.0)
    };
}

/// Statistics gathered while recovering bits from a run of flux transitions.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FluxStats {
    /// Number of transitions processed.
    pub total: u32,
    /// Number of transitions by cell count, indexed by `min(cells, 8) - 1`.
    pub cell_counts: [u32; 8],
    /// Transitions with a zero-length interval.
    pub zero_delta: u32,
    /// Transitions shorter than the minimum cell count, clamped up.
    pub too_short: u32,
    /// Transitions longer than the maximum cell count, clamped down.
    pub too_long: u32,
    /// Transitions further than the tolerance from an integral number of cells.
    pub out_of_window: u32,

    pub shortest_flux: f64,
    pub longest_flux: f64,
    /// Smallest and largest period estimate reached during recovery.
    pub min_period: f64,
    pub max_period: f64,
    /// Total recovered cells and the time they spanned, used for the average period.
    pub cell_total: u64,
    pub time_total: f64,
}

impl Display for FluxStats {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Total: {} Shortest: {} Longest: {} Too Short: {} Too Long: {} Out of window: {} Period: {}-{} avg {}",
            self.total,
            format_us!(self.shortest_flux),
            format_us!(self.longest_flux),
            self.too_short,
            self.too_long,
            self.out_of_window,
            format_us!(self.min_period),
            format_us!(self.max_period),
            format_us!(self.avg_period()),
        )
    }
}

impl FluxStats {
    /// Average recovered bitcell duration in nanoseconds, or 0 if nothing was recovered.
    pub fn avg_period(&self) -> f64 {
        if self.cell_total == 0 {
            0.0
        }
        else {
            self.time_total / self.cell_total as f64
        }
    }

    /// Measured bitcell rate in cells per second, or 0 if nothing was recovered.
    pub fn avg_bitrate(&self) -> f64 {
        let period = self.avg_period();
        if period > 0.0 {
            1_000_000_000.0 / period
        }
        else {
            0.0
        }
    }

    pub(crate) fn record(&mut self, delta_ns: f64, cells: u32) {
        if self.total == 0 {
            self.shortest_flux = delta_ns;
            self.longest_flux = delta_ns;
        }
        else {
            self.shortest_flux = self.shortest_flux.min(delta_ns);
            self.longest_flux = self.longest_flux.max(delta_ns);
        }
        self.total += 1;
        let idx = (cells.clamp(1, 8) - 1) as usize;
        self.cell_counts[idx] += 1;
        self.cell_total += cells as u64;
        self.time_total += delta_ns;
    }
}
