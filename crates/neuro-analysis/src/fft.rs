//! Hop-based FFT channel processor.
//!
//! Turns a constant-rate scalar channel into a [`Spectrum`] channel. An
//! epoch is the `N = 2^order` samples ending at a position `p`:
//!
//! ```text
//! input:  ... [p-N+1 ............ p] ...
//!              \_____ epoch _____/
//! next:           p + shift
//! ```
//!
//! The first epoch ends at the oldest sample that is new when the processor
//! starts reading; every further epoch ends `shift` samples later (a shift of
//! zero means `N`). Epochs that reach back past the first sample, or past
//! what a ring-buffered input still stores, are skipped unless zero padding
//! is enabled, in which case the missing samples read as zero.
//!
//! # Scaling
//!
//! Each epoch is tapered with the configured [`Window`](neuro_core::Window)
//! and transformed. With `B = N/2 + 1` bins, the DC bin is scaled by
//! `1 / (2B)` and every other bin by `1 / (B - 1)`, so a rectangular-windowed
//! sine that lands exactly on a bin reports its amplitude.
//!
//! # Rates
//!
//! The output rate is `input_rate / shift` and the spectrum covers
//! `[0, input_rate / 2]`. Inputs without a constant rate suspend the
//! processor.

use std::sync::Arc;

use neuro_core::processor::{input, readers, sync_readers};
use neuro_core::{Channel, ChannelProcessor, ChannelReader, FftSettings, Inputs, Spectrum};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Scalar channel to spectrum channel.
pub struct FftProcessor {
    settings: FftSettings,
    planner: FftPlanner<f64>,
    fft: Option<Arc<dyn Fft<f64>>>,
    window: Vec<f64>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    readers: Vec<ChannelReader>,
    next_position: Option<u64>,
    max_frequency: f64,
    initialized: bool,
}

impl FftProcessor {
    /// Creates a suspended processor.
    pub fn new(settings: FftSettings) -> Self {
        Self {
            settings,
            planner: FftPlanner::new(),
            fft: None,
            window: Vec::new(),
            buffer: Vec::new(),
            scratch: Vec::new(),
            readers: readers(1),
            next_position: None,
            max_frequency: 0.0,
            initialized: false,
        }
    }

    /// Samples per epoch of the current plan.
    pub fn num_fft_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Highest frequency covered by emitted spectra.
    pub fn max_frequency(&self) -> f64 {
        self.max_frequency
    }

    fn transform(&mut self, source: &Channel<f64>, position: u64) -> Option<Spectrum> {
        let fft = self.fft.as_ref()?;
        let len = self.buffer.len();
        let oldest = source.min_sample_index()?;

        let first = (position + 1).checked_sub(len as u64);
        let complete = first.is_some_and(|first| first >= oldest);
        if !complete && !self.settings.zero_padding {
            return None;
        }

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let value = (position + 1 + i as u64)
                .checked_sub(len as u64)
                .and_then(|index| source.sample(index))
                .copied()
                .unwrap_or(0.0);
            *slot = Complex::new(value * self.window[i], 0.0);
        }
        fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let num_bins = len / 2 + 1;
        let mut spectrum = Spectrum::new(self.max_frequency, num_bins);
        let dc_scale = 1.0 / (num_bins as f64 * 2.0);
        let bin_scale = 1.0 / (num_bins - 1) as f64;
        for (i, bin) in spectrum.bins.iter_mut().enumerate() {
            let magnitude = self.buffer[i].norm();
            *bin = magnitude * if i == 0 { dc_scale } else { bin_scale };
        }
        spectrum.time = source.sample_time(position);
        Some(spectrum)
    }
}

impl ChannelProcessor for FftProcessor {
    type Settings = FftSettings;
    type Output = Spectrum;

    fn num_inputs(&self) -> usize {
        1
    }

    fn settings(&self) -> &FftSettings {
        &self.settings
    }

    fn setup(&mut self, settings: FftSettings) {
        self.settings = settings;
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<Spectrum>]) -> bool {
        self.initialized = false;
        let (Some(source), Some(output)) = (input(inputs, 0), outputs.first_mut()) else {
            return false;
        };
        let rate = source.sample_rate();
        if rate <= 0.0 {
            return false;
        }

        let len = self.settings.num_fft_samples();
        let fft = self.planner.plan_fft_forward(len);
        self.scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        self.buffer = vec![Complex::new(0.0, 0.0); len];
        self.window = self.settings.window.coefficients(len);
        self.fft = Some(fft);

        self.max_frequency = rate / 2.0;
        output.set_sample_rate(self.settings.output_sample_rate(rate));
        self.next_position = None;
        self.initialized = true;
        true
    }

    fn update(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<Spectrum>]) {
        if !self.initialized {
            return;
        }
        let Some(source) = input(inputs, 0) else {
            return;
        };
        let changes = sync_readers(&mut self.readers, inputs);
        if changes.sample_rate && !self.reinit(inputs, outputs) {
            return;
        }
        if changes.reset {
            self.next_position = None;
        }

        let reader = &mut self.readers[0];
        if self.next_position.is_none() {
            self.next_position = reader.sample_index(0);
        }
        reader.flush();

        let (Some(newest), Some(output)) = (source.max_sample_index(), outputs.first_mut()) else {
            return;
        };
        let shift = self.settings.effective_shift() as u64;
        while let Some(position) = self.next_position.filter(|&p| p <= newest) {
            if let Some(spectrum) = self.transform(source, position) {
                output.add_sample(spectrum);
            }
            self.next_position = Some(position + shift);
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        self.next_position = None;
        self.readers.iter_mut().for_each(ChannelReader::reset);
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::Window;

    fn settings(order: u32, shift: u32, window: Window, zero_padding: bool) -> FftSettings {
        FftSettings {
            order,
            window,
            shift,
            zero_padding,
        }
    }

    fn source(rate: f64) -> Channel<f64> {
        let mut channel = Channel::new(0);
        channel.set_sample_rate(rate);
        channel
    }

    #[test]
    fn test_suspends_on_event_input() {
        let mut fft = FftProcessor::new(FftSettings::default());
        let src = source(0.0);
        let mut out = [Channel::new(0)];
        assert!(!fft.reinit(&[Some(&src)], &mut out));
        assert!(!fft.reinit(&[None], &mut out));
    }

    #[test]
    fn test_output_rate_and_range() {
        let mut fft = FftProcessor::new(settings(4, 4, Window::Hann, false));
        let src = source(16.0);
        let mut out = [Channel::new(0)];
        assert!(fft.reinit(&[Some(&src)], &mut out));
        assert_eq!(out[0].sample_rate(), 4.0);
        assert_eq!(fft.max_frequency(), 8.0);
        assert_eq!(fft.num_fft_samples(), 16);
    }

    #[test]
    fn test_incomplete_epochs_skipped() {
        let mut fft = FftProcessor::new(settings(4, 4, Window::Rectangular, false));
        let mut src = source(16.0);
        let mut out = [Channel::new(0)];
        fft.reinit(&[Some(&src)], &mut out);

        for i in 0..16 {
            src.add_sample(f64::from(i));
        }
        fft.update(&[Some(&src)], &mut out);
        assert!(out[0].is_empty());

        src.begin_add_samples();
        for i in 16..20 {
            src.add_sample(f64::from(i));
        }
        fft.update(&[Some(&src)], &mut out);
        assert_eq!(out[0].num_samples(), 1);
    }

    #[test]
    fn test_zero_padding_emits_every_hop() {
        let mut fft = FftProcessor::new(settings(4, 4, Window::Rectangular, true));
        let mut src = source(16.0);
        let mut out = [Channel::new(0)];
        fft.reinit(&[Some(&src)], &mut out);
        for _ in 0..16 {
            src.add_sample(1.0);
        }
        fft.update(&[Some(&src)], &mut out);
        assert_eq!(out[0].num_samples(), 4);

        let first = out[0].sample(0).map(|s| s.bin(0)).unwrap_or(0.0);
        assert!((first - 1.0 / 18.0).abs() < 1e-12);
        let last = out[0].sample(3).map(|s| s.bin(0)).unwrap_or(0.0);
        assert!((last - 13.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_dc_scaling() {
        let mut fft = FftProcessor::new(settings(4, 0, Window::Rectangular, false));
        let mut src = source(16.0);
        let mut out = [Channel::new(0)];
        fft.reinit(&[Some(&src)], &mut out);
        src.add_sample(0.0);
        fft.update(&[Some(&src)], &mut out);
        src.begin_add_samples();
        for _ in 0..16 {
            src.add_sample(1.0);
        }
        fft.update(&[Some(&src)], &mut out);

        let spectrum = out[0].last_sample().cloned().unwrap_or_default();
        assert_eq!(spectrum.num_bins(), 9);
        assert!((spectrum.bin(0) - 16.0 / 18.0).abs() < 1e-12);
        assert!(spectrum.bins[1..].iter().all(|b| b.abs() < 1e-9));
    }

    #[test]
    fn test_spectrum_time_is_epoch_end() {
        let mut fft = FftProcessor::new(settings(2, 2, Window::Hann, true));
        let mut src = source(4.0);
        src.set_start_time(10.0);
        let mut out = [Channel::new(0)];
        fft.reinit(&[Some(&src)], &mut out);
        for _ in 0..4 {
            src.add_sample(0.5);
        }
        fft.update(&[Some(&src)], &mut out);
        let times: Vec<f64> = out[0].iter().map(|s| s.time).collect();
        assert_eq!(times, vec![10.25, 10.75]);
    }

    #[test]
    fn test_input_reset_restarts_epochs() {
        let mut fft = FftProcessor::new(settings(2, 0, Window::Rectangular, false));
        let mut src = source(4.0);
        let mut out = [Channel::new(0)];
        fft.reinit(&[Some(&src)], &mut out);
        for _ in 0..6 {
            src.add_sample(1.0);
        }
        fft.update(&[Some(&src)], &mut out);
        assert_eq!(out[0].num_samples(), 1);

        src.clear();
        for _ in 0..8 {
            src.add_sample(1.0);
        }
        fft.update(&[Some(&src)], &mut out);
        assert_eq!(out[0].num_samples(), 2);
    }
}
