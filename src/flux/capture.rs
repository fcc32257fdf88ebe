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

    src/flux/capture.rs

    A capture of flux transition timestamps for one track
*/
use std::ops::Range;

use crate::{bitstream::BitStream, DecodeError};

/// An ordered list of flux transition timestamps for one track, with the sample clock that
/// produced them.
///
/// Timestamps are in ticks of the sample clock. They are expected to increase monotonically, but a
/// 32-bit counter rolling over is tolerated: intervals are computed with wrapping subtraction.
///
/// A capture may span several revolutions of the disk. `index_positions` holds the transition
/// index at which each revolution after the first begins.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FluxCapture {
    transitions: Vec<u32>,
    sample_rate: f64,
    index_positions: Vec<usize>,
}

impl FluxCapture {
    pub fn new(transitions: Vec<u32>, sample_rate: f64) -> Result<Self, DecodeError> {
        Self::with_revolutions(transitions, sample_rate, Vec::new())
    }

    pub fn with_revolutions(
        transitions: Vec<u32>,
        sample_rate: f64,
        index_positions: Vec<usize>,
    ) -> Result<Self, DecodeError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            log::error!("FluxCapture::new(): Invalid sample rate: {}", sample_rate);
            return Err(DecodeError::Invalid(format!("Invalid sample rate: {}", sample_rate)));
        }

        let mut last = 0;
        for &position in &index_positions {
            if position <= last || position > transitions.len() {
                log::error!("FluxCapture::new(): Invalid revolution boundary: {}", position);
                return Err(DecodeError::Invalid(format!(
                    "Invalid revolution boundary: {}",
                    position
                )));
            }
            last = position;
        }

        Ok(Self {
            transitions,
            sample_rate,
            index_positions,
        })
    }

    /// Synthesize a capture from a bitstream, placing a transition at the end of every cell
    /// holding a 1. The first cell begins at time 0.
    pub fn from_bitstream(bits: &BitStream, bitcell_ns: f64, sample_rate: f64) -> Result<Self, DecodeError> {
        if !bitcell_ns.is_finite() || bitcell_ns <= 0.0 {
            return Err(DecodeError::Invalid(format!("Invalid bitcell duration: {}", bitcell_ns)));
        }
        let ticks_per_cell = bitcell_ns * sample_rate / 1_000_000_000.0;
        let transitions = bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .map(|(i, _)| ((i + 1) as f64 * ticks_per_cell).round() as u64 as u32)
            .collect();
        Self::new(transitions, sample_rate)
    }

    /// Build a capture from a list of intervals in nanoseconds, accumulating them into
    /// timestamps beginning at time 0.
    pub fn from_deltas_ns(deltas: &[f64], sample_rate: f64) -> Result<Self, DecodeError> {
        let ticks_per_ns = sample_rate / 1_000_000_000.0;
        let mut time = 0.0;
        let transitions = deltas
            .iter()
            .map(|delta| {
                time += delta;
                (time * ticks_per_ns).round() as u64 as u32
            })
            .collect();
        Self::new(transitions, sample_rate)
    }

    pub fn transitions(&self) -> &[u32] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn ns_per_tick(&self) -> f64 {
        1_000_000_000.0 / self.sample_rate
    }

    pub fn revolution_ct(&self) -> usize {
        self.index_positions.len() + 1
    }

    /// Return the range of transition indices belonging to revolution `idx`.
    pub fn revolution_range(&self, idx: usize) -> Option<Range<usize>> {
        if idx > self.index_positions.len() {
            return None;
        }
        let start = if idx == 0 { 0 } else { self.index_positions[idx - 1] };
        let end = self.index_positions.get(idx).copied().unwrap_or(self.transitions.len());
        Some(start..end)
    }

    /// Iterate over the intervals, in nanoseconds, ending at each transition in `range`.
    ///
    /// The interval of the first transition is measured from the transition before the range, or
    /// from time 0 when the range begins the capture.
    pub fn deltas_ns(&self, range: Range<usize>) -> impl Iterator<Item = f64> + '_ {
        let end = std::cmp::min(range.end, self.transitions.len());
        let start = std::cmp::min(range.start, end);
        let origin = if start > 0 { self.transitions[start - 1] } else { 0 };
        let ns_per_tick = self.ns_per_tick();

        self.transitions[start..end].iter().scan(origin, move |previous, &time| {
            let delta = time.wrapping_sub(*previous);
            *previous = time;
            Some(delta as f64 * ns_per_tick)
        })
    }
}
