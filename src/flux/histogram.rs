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
*/

//! This module defines a [FluxHistogram] structure which is used to estimate the shortest
//! transition interval of a flux track. The encoding detector reports that estimate alongside
//! its classification so a caller can refine the nominal bitcell handed to the PLL.

use histogram::{Bucket, Histogram};

pub struct FluxHistogram {
    histogram: Histogram,
    maxima: Vec<(u64, std::ops::RangeInclusive<u64>)>,
    total_time: f64,
}

impl FluxHistogram {
    /// Produce a [FluxHistogram] over a fraction of the flux deltas in a capture.
    /// # Arguments
    /// * `deltas` - A slice of flux delta times in nanoseconds
    /// * `fraction` - The fraction of the deltas to use in the histogram
    pub fn new(deltas: &[f64], fraction: f64) -> Option<Self> {
        // Max value power of 2^15 = 32768 (32us), enough for the longest GCR interval.
        // Grouping power of 3 produces sharp spikes without false maxima
        let mut histogram = Histogram::new(3, 15).ok()?;

        let take_count = (deltas.len() as f64 * fraction.clamp(0.0, 1.0)).round() as usize;
        log::trace!("FluxHistogram::new(): Taking {} flux deltas", take_count);
        let mut total_time = 0.0;
        for delta_ns in deltas.iter().take(take_count) {
            total_time += delta_ns;
            _ = histogram.increment(delta_ns.max(0.0).round() as u64);
        }

        Some(FluxHistogram {
            histogram,
            maxima: Vec::new(),
            total_time,
        })
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Locate local maxima in a histogram by bucket.
    fn find_local_maxima(&mut self, threshold: Option<f64>) -> &Vec<(u64, std::ops::RangeInclusive<u64>)> {
        let mut peaks = vec![];
        let mut previous_bucket: Option<Bucket> = None;
        let mut current_bucket: Option<Bucket> = None;

        let total_count: u64 = self.histogram.into_iter().map(|bucket| bucket.count()).sum();
        let threshold = (total_count as f64 * threshold.unwrap_or(0.005)).round() as u64;

        for bucket in self.histogram.into_iter() {
            if let Some(curr) = current_bucket.as_ref() {
                let prev_count = previous_bucket.as_ref().map_or(0, |prev| prev.count());
                if curr.count() >= prev_count && curr.count() > bucket.count() && curr.count() >= threshold {
                    peaks.push((curr.count(), curr.start()..=curr.end()));
                }
            }
            previous_bucket = current_bucket.take();
            current_bucket = Some(bucket.clone());
        }

        self.maxima = peaks;
        &self.maxima
    }

    /// Return the located peaks as (count, nanosecond range) pairs, shortest first.
    pub fn peaks(&mut self) -> &[(u64, std::ops::RangeInclusive<u64>)] {
        if self.maxima.is_empty() {
            self.find_local_maxima(None);
        }
        &self.maxima
    }

    /// Attempt to calculate the base (short) transition time in nanoseconds.
    pub fn base_transition_time(&mut self) -> Option<f64> {
        let peaks = self.peaks();
        if peaks.len() < 2 {
            log::debug!("FluxHistogram::base_transition_time(): Not enough peaks found");
            return None;
        }

        let first_peak = &peaks[0].1;
        let range_median = (first_peak.start() + first_peak.end()) / 2;
        Some(range_median as f64)
    }
}
