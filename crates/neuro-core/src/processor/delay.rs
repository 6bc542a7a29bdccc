//! Fixed sample delay.
//!
//! Every input sample produces exactly one output sample. Until the output
//! has emitted `delay` samples the output is `0.0`; afterwards the input is
//! replayed in order, `delay` samples late.
//!
//! ```text
//! in:  s0 s1 s2 s3 s4 s5
//! out:  0  0  0 s0 s1 s2      (delay = 3)
//! ```
//!
//! The delay can be configured in seconds, in which case it is rounded to
//! whole samples against the input rate every time the processor is
//! re-initialized. The input must run at a constant rate; an event stream
//! suspends the processor in either mode.

#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

use super::{ChannelProcessor, Inputs, input, readers, sync_readers};
use crate::channel::Channel;
use crate::reader::ChannelReader;

/// Delay configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySettings {
    /// Use `delay_seconds` (rounded to the input rate) instead of `delay_samples`.
    pub set_by_time: bool,
    /// Delay in seconds.
    pub delay_seconds: f64,
    /// Delay in samples.
    pub delay_samples: u32,
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            set_by_time: true,
            delay_seconds: 0.0,
            delay_samples: 0,
        }
    }
}

impl DelaySettings {
    /// Resolves the delay against `sample_rate`, returning `(samples, seconds)`.
    ///
    /// By time: samples are `round(seconds * rate)` and seconds are snapped to
    /// that sample count. By samples: seconds are `samples / rate`. A zero rate
    /// keeps the configured seconds and yields no sample delay when set by time.
    pub fn resolve(&self, sample_rate: f64) -> (u32, f64) {
        if self.set_by_time {
            let samples = (self.delay_seconds * sample_rate + 0.5) as u32;
            let seconds = if sample_rate > 0.0 {
                f64::from(samples) / sample_rate
            } else {
                self.delay_seconds
            };
            (samples, seconds)
        } else {
            let seconds = if sample_rate > 0.0 {
                f64::from(self.delay_samples) / sample_rate
            } else {
                0.0
            };
            (self.delay_samples, seconds)
        }
    }
}

/// Delays a scalar stream by a whole number of samples.
#[derive(Debug, Clone, Default)]
pub struct DelayProcessor {
    settings: DelaySettings,
    delay: u32,
    readers: Vec<ChannelReader>,
    pending: VecDeque<f64>,
    initialized: bool,
}

impl DelayProcessor {
    /// Creates a suspended processor.
    pub fn new(settings: DelaySettings) -> Self {
        Self {
            settings,
            readers: readers(1),
            ..Self::default()
        }
    }

    /// Delay in samples resolved by the last re-init.
    pub fn delay_samples(&self) -> u32 {
        self.delay
    }
}

impl ChannelProcessor for DelayProcessor {
    type Settings = DelaySettings;
    type Output = f64;

    fn num_inputs(&self) -> usize {
        1
    }

    fn settings(&self) -> &DelaySettings {
        &self.settings
    }

    fn setup(&mut self, settings: DelaySettings) {
        self.settings = settings;
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) -> bool {
        self.initialized = false;
        let (Some(source), Some(output)) = (input(inputs, 0), outputs.first_mut()) else {
            return false;
        };
        if !source.has_fixed_rate() {
            #[cfg(feature = "tracing")]
            tracing::trace!("delay_reinit: input has no constant sample rate");
            return false;
        }
        output.set_sample_rate(source.sample_rate());
        self.delay = self.settings.resolve(source.sample_rate()).0;
        self.initialized = true;
        #[cfg(feature = "tracing")]
        tracing::trace!("delay_reinit: {} samples at {} Hz", self.delay, source.sample_rate());
        true
    }

    fn update(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) {
        if !self.initialized {
            return;
        }
        let Some(source) = input(inputs, 0) else {
            return;
        };

        let received = self.readers[0].num_samples_received();
        if sync_readers(&mut self.readers, inputs).sample_rate && !self.reinit(inputs, outputs) {
            return;
        }
        let arrived = self.readers[0].num_samples_received() - received;

        let Some(output) = outputs.first_mut() else {
            return;
        };
        let mut num_out = output.sample_counter();
        for _ in 0..arrived {
            if let Some(&value) = self.readers[0].pop_oldest(source) {
                self.pending.push_back(value);
            }
            let value = if num_out >= u64::from(self.delay) {
                self.pending.pop_front().unwrap_or(0.0)
            } else {
                0.0
            };
            output.add_sample(value);
            num_out += 1;
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.readers.iter_mut().for_each(ChannelReader::reset);
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(rate: f64) -> Channel<f64> {
        let mut c = Channel::new(0);
        c.set_sample_rate(rate);
        c
    }

    fn push(channel: &mut Channel<f64>, values: &[f64]) {
        channel.begin_add_samples();
        for &v in values {
            channel.add_sample(v);
        }
    }

    #[test]
    fn test_resolve_by_time_rounds() {
        let settings = DelaySettings {
            set_by_time: true,
            delay_seconds: 0.26,
            delay_samples: 0,
        };
        assert_eq!(settings.resolve(10.0), (3, 0.3));
        assert_eq!(settings.resolve(0.0), (0, 0.26));
    }

    #[test]
    fn test_resolve_by_samples() {
        let settings = DelaySettings {
            set_by_time: false,
            delay_seconds: 0.0,
            delay_samples: 5,
        };
        assert_eq!(settings.resolve(10.0), (5, 0.5));
        assert_eq!(settings.resolve(0.0), (5, 0.0));
    }

    #[test]
    fn test_suspended_without_input() {
        let mut delay = DelayProcessor::new(DelaySettings::default());
        let mut out = [Channel::new(0)];
        assert!(!delay.reinit(&[None], &mut out));
        delay.update(&[None], &mut out);
        assert!(out[0].is_empty());
    }

    #[test]
    fn test_shift_with_zero_fill() {
        let settings = DelaySettings {
            set_by_time: false,
            delay_seconds: 0.0,
            delay_samples: 3,
        };
        let mut delay = DelayProcessor::new(settings);
        let mut src = source(10.0);
        let mut out = [Channel::new(0)];
        assert!(delay.reinit(&[Some(&src)], &mut out));
        assert_eq!(out[0].sample_rate(), 10.0);

        push(&mut src, &[1.0, 2.0]);
        delay.update(&[Some(&src)], &mut out);
        push(&mut src, &[3.0, 4.0, 5.0, 6.0]);
        delay.update(&[Some(&src)], &mut out);

        let got: Vec<f64> = out[0].iter().copied().collect();
        assert_eq!(got, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zero_delay_passes_through() {
        let mut delay = DelayProcessor::new(DelaySettings::default());
        let mut src = source(4.0);
        let mut out = [Channel::new(0)];
        delay.reinit(&[Some(&src)], &mut out);
        push(&mut src, &[7.0, 8.0]);
        delay.update(&[Some(&src)], &mut out);
        let got: Vec<f64> = out[0].iter().copied().collect();
        assert_eq!(got, vec![7.0, 8.0]);
    }

    #[test]
    fn test_delay_by_time_uses_input_rate() {
        let settings = DelaySettings {
            set_by_time: true,
            delay_seconds: 0.5,
            delay_samples: 0,
        };
        let mut delay = DelayProcessor::new(settings);
        let src = source(8.0);
        let mut out = [Channel::new(0)];
        delay.reinit(&[Some(&src)], &mut out);
        assert_eq!(delay.delay_samples(), 4);
    }

    #[test]
    fn test_event_stream_suspends_in_both_modes() {
        let by_samples = DelaySettings {
            set_by_time: false,
            delay_seconds: 0.0,
            delay_samples: 2,
        };
        let by_time = DelaySettings {
            set_by_time: true,
            delay_seconds: 1.0,
            delay_samples: 0,
        };
        for settings in [by_samples, by_time] {
            let mut delay = DelayProcessor::new(settings);
            let mut src = source(0.0);
            let mut out = [Channel::new(0)];
            assert!(!delay.reinit(&[Some(&src)], &mut out));
            assert!(!delay.is_initialized());

            push(&mut src, &[1.0, 2.0, 3.0]);
            delay.update(&[Some(&src)], &mut out);
            assert_eq!(out[0].sample_counter(), 0);

            src.set_sample_rate(4.0);
            assert!(delay.reinit(&[Some(&src)], &mut out));
        }
    }

    #[test]
    fn test_reset_drops_pending() {
        let settings = DelaySettings {
            set_by_time: false,
            delay_seconds: 0.0,
            delay_samples: 2,
        };
        let mut delay = DelayProcessor::new(settings);
        let mut src = source(10.0);
        let mut out = [Channel::new(0)];
        delay.reinit(&[Some(&src)], &mut out);
        push(&mut src, &[1.0, 2.0, 3.0]);
        delay.update(&[Some(&src)], &mut out);
        delay.reset();
        assert!(!delay.is_initialized());
    }
}
