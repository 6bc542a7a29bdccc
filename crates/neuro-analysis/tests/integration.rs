//! Integration tests for neuro-analysis.
//!
//! Streams synthetic EEG-like signals with known spectral content through
//! the FFT processor in realistic batch sizes.

use std::f64::consts::PI;

use neuro_analysis::FftProcessor;
use neuro_core::{Channel, ChannelProcessor, FftSettings, Spectrum, Window};

const RATE: f64 = 128.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sine of `freq_hz` and `amplitude` for sample `n`.
fn sine(freq_hz: f64, amplitude: f64, n: usize) -> f64 {
    amplitude * (2.0 * PI * freq_hz * n as f64 / RATE).sin()
}

/// Runs `total` samples through `fft` in batches of `batch`.
fn stream(
    fft: &mut FftProcessor,
    total: usize,
    batch: usize,
    signal: impl Fn(usize) -> f64,
) -> Channel<Spectrum> {
    let mut input = Channel::new(1024);
    input.set_sample_rate(RATE);
    let mut output = [Channel::new(0)];
    assert!(fft.reinit(&[Some(&input)], &mut output));

    let mut n = 0;
    while n < total {
        input.begin_add_samples();
        output[0].begin_add_samples();
        for _ in 0..batch.min(total - n) {
            input.add_sample(signal(n));
            n += 1;
        }
        fft.update(&[Some(&input)], &mut output);
    }
    let [spectra] = output;
    spectra
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn alpha_peak_is_detected() {
    let settings = FftSettings {
        order: 7,
        window: Window::Hann,
        shift: 32,
        zero_padding: false,
    };
    let mut fft = FftProcessor::new(settings);
    let spectra = stream(&mut fft, 1024, 8, |n| sine(10.0, 1.0, n));

    assert!(!spectra.is_empty());
    for spectrum in spectra.iter() {
        assert_eq!(spectrum.num_bins(), 65);
        assert_eq!(spectrum.max_frequency, 64.0);
        let peak = spectrum.dominant_frequency(1.0, 40.0);
        assert_eq!(peak, Some(10.0));
    }
}

#[test]
fn on_bin_amplitude_is_preserved_with_rectangular_window() {
    let settings = FftSettings {
        order: 7,
        window: Window::Rectangular,
        shift: 0,
        zero_padding: false,
    };
    let mut fft = FftProcessor::new(settings);
    let spectra = stream(&mut fft, 512, 16, |n| sine(12.0, 0.5, n));

    let spectrum = spectra.last_sample().cloned().unwrap_or_default();
    let bin = spectrum.bin_index(12.0);
    assert!((spectrum.bin(bin) - 0.5).abs() < 1e-9, "got {}", spectrum.bin(bin));
}

#[test]
fn hop_count_matches_output_rate() {
    let settings = FftSettings {
        order: 6,
        window: Window::Hann,
        shift: 16,
        zero_padding: true,
    };
    let mut fft = FftProcessor::new(settings);
    let spectra = stream(&mut fft, 256, 4, |n| sine(5.0, 1.0, n));

    assert_eq!(spectra.sample_rate(), RATE / 16.0);
    assert_eq!(spectra.sample_counter(), 16);
    let times: Vec<f64> = spectra.iter().map(|s| s.time).collect();
    for pair in times.windows(2) {
        assert!((pair[1] - pair[0] - 16.0 / RATE).abs() < 1e-12);
    }
}

#[test]
fn ring_buffered_input_keeps_up_with_large_batches() {
    let settings = FftSettings {
        order: 8,
        window: Window::Rectangular,
        shift: 0,
        zero_padding: false,
    };
    let mut fft = FftProcessor::new(settings);
    let spectra = stream(&mut fft, 4096, 512, |_| 1.0);

    // the epoch ending at sample 0 is incomplete and skipped
    assert_eq!(spectra.sample_counter(), 15);
    for spectrum in spectra.iter() {
        assert!((spectrum.bin(0) - 256.0 / (129.0 * 2.0)).abs() < 1e-9);
    }
}
