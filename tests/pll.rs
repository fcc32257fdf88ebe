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

    tests/pll.rs

    Tests for PLL bit-cell recovery on jittered flux
*/
mod common;

use crate::common::*;
use fluxsector::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Intervals of 2 to 4 cells, each independently scaled by up to `jitter`.
fn jittered_mfm_deltas(rng: &mut StdRng, count: usize, bitcell_ns: f64, jitter: f64) -> Vec<f64> {
    (0..count)
        .map(|_| {
            let cells = rng.gen_range(2..=4) as f64;
            cells * bitcell_ns * (1.0 + rng.gen_range(-jitter..=jitter))
        })
        .collect()
}

#[test]
fn test_pll_period_bounded_under_jitter() {
    init();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let nominal = 2_000.0;
    let mut pll = Pll::new(nominal, PllParams::default());
    let mut stats = FluxStats::default();

    for delta in jittered_mfm_deltas(&mut rng, 10_000, nominal, 0.15) {
        pll.step(delta, &mut stats);
        assert!(pll.period() >= pll.min_period() && pll.period() <= pll.max_period());
    }
    assert_eq!(stats.total, 10_000);
}

#[test]
fn test_pll_period_bounded_under_drift() {
    init();
    let mut rng = StdRng::seed_from_u64(42);
    let nominal = 2_000.0;
    // A drive running 30% slow is outside the capture range of the loop.
    let deltas: Vec<f64> = jittered_mfm_deltas(&mut rng, 2_000, nominal * 1.3, 0.05);

    let mut pll = Pll::new(nominal, PllParams::default());
    let result = pll.decode(deltas, DecoderOptions::default().max_track_bits);
    assert!(result.flux_stats.max_period <= pll.max_period());
    assert!(result.flux_stats.min_period >= pll.min_period());
    assert!(result.final_period >= pll.min_period() && result.final_period <= pll.max_period());
}

#[test]
fn test_pll_tracks_slow_drive() {
    init();
    let mut rng = StdRng::seed_from_u64(7);
    let nominal = 2_000.0;
    let actual = nominal * 1.05;
    let deltas = jittered_mfm_deltas(&mut rng, 5_000, actual, 0.02);

    let mut pll = Pll::new(nominal, PllParams::default());
    let result = pll.decode(deltas, DecoderOptions::default().max_track_bits);
    assert!((result.final_period - actual).abs() < actual * 0.03);
}

#[test]
fn test_decode_jittered_track() {
    init();
    let sectors = system34_sectors(0, 9, 2);
    let builder = TrackBuilder::from_sectors(TrackEncoding::Mfm, &sectors).unwrap();
    let clean = builder.to_flux(2_000.0, SAMPLE_RATE).unwrap();

    let mut rng = StdRng::seed_from_u64(1234);
    let deltas: Vec<f64> = clean
        .deltas_ns(0..clean.len())
        .map(|delta| delta * (1.0 + rng.gen_range(-0.03..=0.03)))
        .collect();
    let flux = FluxCapture::from_deltas_ns(&deltas, SAMPLE_RATE).unwrap();

    let options = DecoderOptions::default().with_encoding(TrackEncoding::Mfm);
    let track = decode_track(&flux, &options).unwrap();
    assert_sectors_match(&track, &sectors);
    assert_eq!(track.flux_stats.total, flux.len() as u32);
    assert_eq!(track.flux_stats.too_long, 0);
}
