//! Freeze after a fixed number of samples.
//!
//! Counts incoming samples. Sample number `delay` (zero-based) is captured
//! and replayed for every later input sample, whatever its value. Before
//! the freeze point the processor either passes input through or swallows
//! it; a swallowed sample still produces a `0.0` when the input runs at a
//! constant rate so the output keeps that rate.
//!
//! A freeze point given in seconds needs a constant input rate. Counting
//! samples works on event streams too.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::{ChannelProcessor, Inputs, input, readers, sync_readers};
use crate::channel::Channel;
use crate::reader::ChannelReader;

/// Freeze configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeSettings {
    /// Use `delay_seconds` (rounded to the input rate) instead of `delay_samples`.
    pub set_by_time: bool,
    /// Freeze point in seconds.
    pub delay_seconds: f64,
    /// Freeze point in samples.
    pub delay_samples: u32,
    /// Forward input until the freeze point.
    pub pass_through: bool,
}

impl Default for FreezeSettings {
    fn default() -> Self {
        Self {
            set_by_time: true,
            delay_seconds: 1.0,
            delay_samples: 100,
            pass_through: true,
        }
    }
}

impl FreezeSettings {
    /// Resolves the freeze point against `sample_rate`, returning `(samples, seconds)`.
    pub fn resolve(&self, sample_rate: f64) -> (u32, f64) {
        if self.set_by_time {
            if sample_rate > 0.0 {
                let samples = (self.delay_seconds * sample_rate + 0.5) as u32;
                (samples, f64::from(samples) / sample_rate)
            } else {
                (0, self.delay_seconds)
            }
        } else if sample_rate > 0.0 {
            (self.delay_samples, f64::from(self.delay_samples) / sample_rate)
        } else {
            (self.delay_samples, 0.0)
        }
    }
}

/// Captures one value and holds it forever.
#[derive(Debug, Clone, Default)]
pub struct FreezeProcessor {
    settings: FreezeSettings,
    delay: u32,
    counter: u64,
    frozen_value: f64,
    readers: Vec<ChannelReader>,
    initialized: bool,
}

impl FreezeProcessor {
    /// Creates a suspended processor.
    pub fn new(settings: FreezeSettings) -> Self {
        Self {
            settings,
            readers: readers(1),
            ..Self::default()
        }
    }

    /// Freeze point in samples resolved by the last re-init.
    pub fn delay_samples(&self) -> u32 {
        self.delay
    }

    /// Whether the freeze point has been reached.
    pub fn is_frozen(&self) -> bool {
        self.initialized && self.counter > u64::from(self.delay)
    }

    /// Changes pass-through without re-initializing.
    pub fn set_pass_through(&mut self, pass_through: bool) {
        self.settings.pass_through = pass_through;
    }
}

impl ChannelProcessor for FreezeProcessor {
    type Settings = FreezeSettings;
    type Output = f64;

    fn num_inputs(&self) -> usize {
        1
    }

    fn settings(&self) -> &FreezeSettings {
        &self.settings
    }

    fn setup(&mut self, settings: FreezeSettings) {
        self.settings = settings;
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) -> bool {
        self.initialized = false;
        let (Some(source), Some(output)) = (input(inputs, 0), outputs.first_mut()) else {
            return false;
        };
        if self.settings.set_by_time && !source.has_fixed_rate() {
            #[cfg(feature = "tracing")]
            tracing::trace!("freeze_reinit: duration needs a constant sample rate");
            return false;
        }
        output.set_sample_rate(source.sample_rate());
        self.delay = self.settings.resolve(source.sample_rate()).0;
        self.counter = 0;
        self.initialized = true;
        #[cfg(feature = "tracing")]
        tracing::trace!("freeze_reinit: freezing after {} samples at {} Hz", self.delay, source.sample_rate());
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

        let output_zeros = source.has_fixed_rate();
        let delay = u64::from(self.delay);
        let reader = &mut self.readers[0];

        for _ in 0..reader.num_new_samples() {
            let value = reader.pop_oldest(source).copied().unwrap_or(0.0);
            if self.counter == delay {
                self.frozen_value = value;
            }

            if self.counter >= delay {
                output.add_sample(self.frozen_value);
            } else if self.settings.pass_through {
                output.add_sample(value);
            } else if output_zeros {
                output.add_sample(0.0);
            }
            self.counter += 1;
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        self.counter = 0;
        self.frozen_value = 0.0;
        self.readers.iter_mut().for_each(ChannelReader::reset);
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_samples(delay: u32, pass_through: bool) -> FreezeSettings {
        FreezeSettings {
            set_by_time: false,
            delay_seconds: 0.0,
            delay_samples: delay,
            pass_through,
        }
    }

    fn run(settings: FreezeSettings, rate: f64, values: &[f64]) -> Vec<f64> {
        let mut freeze = FreezeProcessor::new(settings);
        let mut src = Channel::new(0);
        src.set_sample_rate(rate);
        let mut out = [Channel::new(0)];
        assert!(freeze.reinit(&[Some(&src)], &mut out));
        for &v in values {
            src.begin_add_samples();
            src.add_sample(v);
            freeze.update(&[Some(&src)], &mut out);
        }
        out[0].iter().copied().collect()
    }

    #[test]
    fn test_pass_through_then_freeze() {
        let out = run(by_samples(3, true), 10.0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_swallow_outputs_zeros_at_fixed_rate() {
        let out = run(by_samples(2, false), 10.0, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out, vec![0.0, 0.0, 3.0, 3.0]);
    }

    #[test]
    fn test_swallow_drops_event_samples() {
        let out = run(by_samples(2, false), 0.0, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out, vec![3.0, 3.0]);
    }

    #[test]
    fn test_zero_delay_freezes_first_sample() {
        let out = run(by_samples(0, true), 10.0, &[5.0, 6.0, 7.0]);
        assert_eq!(out, vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_duration_needs_constant_rate() {
        let mut freeze = FreezeProcessor::new(FreezeSettings::default());
        let mut src = Channel::new(0);
        let mut out = [Channel::new(0)];
        assert!(!freeze.reinit(&[Some(&src)], &mut out));

        src.begin_add_samples();
        src.add_sample(1.0);
        freeze.update(&[Some(&src)], &mut out);
        assert_eq!(out[0].sample_counter(), 0);
        assert!(!freeze.is_frozen());

        src.set_sample_rate(2.0);
        assert!(freeze.reinit(&[Some(&src)], &mut out));
        assert_eq!(freeze.delay_samples(), 2);
    }

    #[test]
    fn test_default_resolves_one_second() {
        let settings = FreezeSettings::default();
        assert_eq!(settings.resolve(128.0), (128, 1.0));
        assert_eq!(settings.resolve(0.0), (0, 1.0));
    }

    #[test]
    fn test_is_frozen_flag() {
        let mut freeze = FreezeProcessor::new(by_samples(1, true));
        let mut src = Channel::new(0);
        src.set_sample_rate(1.0);
        let mut out = [Channel::new(0)];
        freeze.reinit(&[Some(&src)], &mut out);
        src.add_sample(1.0);
        freeze.update(&[Some(&src)], &mut out);
        assert!(!freeze.is_frozen());
        src.begin_add_samples();
        src.add_sample(2.0);
        freeze.update(&[Some(&src)], &mut out);
        assert!(freeze.is_frozen());
    }
}
