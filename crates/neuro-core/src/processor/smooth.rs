//! Exponential smoothing.
//!
//! Each input sample moves the running value towards the sample by
//! `speed / sample_rate`:
//!
//! ```text
//! y[n] = y[n-1] + (x[n] - y[n-1]) * speed / rate
//! ```
//!
//! A speed at (or within `1e-5` of) one disables smoothing and forwards the
//! input unchanged. Event-based inputs (rate zero) use a weight of `speed`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::{ChannelProcessor, Inputs, input, readers, sync_readers};
use crate::channel::Channel;
use crate::math::linear_interpolate;
use crate::reader::ChannelReader;

const PASS_THROUGH_SPEED: f64 = 0.99999;

/// Smoothing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothSettings {
    /// Blend speed in `[0, 1]`; `1` passes the input through.
    pub speed: f64,
    /// Running value after re-init.
    pub start_value: f64,
}

impl Default for SmoothSettings {
    fn default() -> Self {
        Self {
            speed: 0.75,
            start_value: 0.0,
        }
    }
}

/// One-pole low pass over a scalar stream.
#[derive(Debug, Clone, Default)]
pub struct SmoothProcessor {
    settings: SmoothSettings,
    current: f64,
    delta_time: f64,
    readers: Vec<ChannelReader>,
    initialized: bool,
}

impl SmoothProcessor {
    /// Creates a suspended processor.
    pub fn new(settings: SmoothSettings) -> Self {
        Self {
            settings,
            current: settings.start_value,
            readers: readers(1),
            ..Self::default()
        }
    }

    /// Running value.
    pub fn current(&self) -> f64 {
        self.current
    }

    fn apply(&mut self, value: f64) -> f64 {
        if self.settings.speed < PASS_THROUGH_SPEED {
            self.current =
                linear_interpolate(self.current, value, self.settings.speed * self.delta_time);
        } else {
            self.current = value;
        }
        self.current
    }
}

impl ChannelProcessor for SmoothProcessor {
    type Settings = SmoothSettings;
    type Output = f64;

    fn num_inputs(&self) -> usize {
        1
    }

    fn settings(&self) -> &SmoothSettings {
        &self.settings
    }

    /// Speed changes apply from the next sample; the running value is kept.
    fn setup(&mut self, settings: SmoothSettings) {
        self.settings = settings;
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) -> bool {
        self.initialized = false;
        let (Some(source), Some(output)) = (input(inputs, 0), outputs.first_mut()) else {
            return false;
        };
        let rate = source.sample_rate();
        output.set_sample_rate(rate);
        self.delta_time = if rate > 0.0 { 1.0 / rate } else { 1.0 };
        self.current = self.settings.start_value;
        self.initialized = true;
        true
    }

    fn update(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) {
        if !self.initialized {
            return;
        }
        let Some(source) = input(inputs, 0) else {
            return;
        };
        sync_readers(&mut self.readers, inputs);
        let Some(output) = outputs.first_mut() else {
            return;
        };

        for _ in 0..self.readers[0].num_new_samples() {
            let Some(&value) = self.readers[0].pop_oldest(source) else {
                break;
            };
            let smoothed = self.apply(value);
            output.add_sample(smoothed);
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        self.current = self.settings.start_value;
        self.readers.iter_mut().for_each(ChannelReader::reset);
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(settings: SmoothSettings, rate: f64, values: &[f64]) -> Vec<f64> {
        let mut smooth = SmoothProcessor::new(settings);
        let mut src = Channel::new(0);
        src.set_sample_rate(rate);
        let mut out = [Channel::new(0)];
        assert!(smooth.reinit(&[Some(&src)], &mut out));
        src.begin_add_samples();
        for &v in values {
            src.add_sample(v);
        }
        smooth.update(&[Some(&src)], &mut out);
        out[0].iter().copied().collect()
    }

    #[test]
    fn test_full_speed_passes_through() {
        let settings = SmoothSettings {
            speed: 1.0,
            start_value: 0.0,
        };
        assert_eq!(run(settings, 10.0, &[1.0, -2.0, 3.0]), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_zero_speed_holds_start_value() {
        let settings = SmoothSettings {
            speed: 0.0,
            start_value: 0.25,
        };
        assert_eq!(run(settings, 10.0, &[1.0, 1.0]), vec![0.25, 0.25]);
    }

    #[test]
    fn test_step_response_approaches_input() {
        let settings = SmoothSettings {
            speed: 0.5,
            start_value: 0.0,
        };
        let out = run(settings, 1.0, &[1.0, 1.0, 1.0]);
        assert_eq!(out, vec![0.5, 0.75, 0.875]);
    }

    #[test]
    fn test_rate_scales_weight() {
        let settings = SmoothSettings {
            speed: 0.5,
            start_value: 0.0,
        };
        let out = run(settings, 2.0, &[1.0]);
        assert_eq!(out, vec![0.25]);
    }

    #[test]
    fn test_event_input_uses_speed_as_weight() {
        let settings = SmoothSettings {
            speed: 0.5,
            start_value: 0.0,
        };
        let out = run(settings, 0.0, &[2.0]);
        assert_eq!(out, vec![1.0]);
    }

    #[test]
    fn test_reset_restores_start_value() {
        let settings = SmoothSettings {
            speed: 0.5,
            start_value: 3.0,
        };
        let mut smooth = SmoothProcessor::new(settings);
        let mut src = Channel::new(0);
        src.set_sample_rate(1.0);
        let mut out = [Channel::new(0)];
        smooth.reinit(&[Some(&src)], &mut out);
        src.add_sample(5.0);
        smooth.update(&[Some(&src)], &mut out);
        assert_eq!(smooth.current(), 4.0);
        smooth.reset();
        assert_eq!(smooth.current(), 3.0);
    }
}
