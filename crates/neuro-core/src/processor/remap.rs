//! Affine range remapping with modulated bounds.
//!
//! The primary input `x` is mapped from `[in_min, in_max]` onto
//! `[out_min, out_max]`. Each of the four bounds can be driven per sample by
//! its own input port; an unconnected bound port falls back to the static
//! value in [`RemapSettings`].
//!
//! | port | meaning  |
//! |------|----------|
//! | 0    | x        |
//! | 1    | in max   |
//! | 2    | in min   |
//! | 3    | out max  |
//! | 4    | out min  |
//!
//! All connected ports are consumed in lock step: an update processes as
//! many samples as the slowest connected port has ready.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::{ChannelProcessor, Inputs, input, min_new_samples, pop_or, readers, sync_readers};
use crate::channel::Channel;
use crate::math::{clamped_remap_range, remap_range};
use crate::reader::ChannelReader;

/// Port index of the primary input.
pub const PORT_X: usize = 0;
/// Port index of the `in_max` modulation input.
pub const PORT_IN_MAX: usize = 1;
/// Port index of the `in_min` modulation input.
pub const PORT_IN_MIN: usize = 2;
/// Port index of the `out_max` modulation input.
pub const PORT_OUT_MAX: usize = 3;
/// Port index of the `out_min` modulation input.
pub const PORT_OUT_MIN: usize = 4;

const NUM_PORTS: usize = 5;

/// Static remap bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemapSettings {
    /// Lower input bound.
    pub in_min: f64,
    /// Upper input bound.
    pub in_max: f64,
    /// Lower output bound.
    pub out_min: f64,
    /// Upper output bound.
    pub out_max: f64,
    /// Clamp results into the output interval.
    pub clamp: bool,
}

impl Default for RemapSettings {
    fn default() -> Self {
        Self {
            in_min: 0.0,
            in_max: 1.0,
            out_min: 0.0,
            out_max: 1.0,
            clamp: false,
        }
    }
}

impl RemapSettings {
    /// Maps one value with the static bounds.
    pub fn apply(&self, value: f64) -> f64 {
        remap(value, self.in_min, self.in_max, self.out_min, self.out_max, self.clamp)
    }
}

fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64, clamp: bool) -> f64 {
    if clamp {
        clamped_remap_range(value, in_min, in_max, out_min, out_max)
    } else {
        remap_range(value, in_min, in_max, out_min, out_max)
    }
}

/// Remaps a scalar stream with optionally modulated bounds.
#[derive(Debug, Clone, Default)]
pub struct RemapProcessor {
    settings: RemapSettings,
    readers: Vec<ChannelReader>,
    initialized: bool,
}

impl RemapProcessor {
    /// Creates a suspended processor.
    pub fn new(settings: RemapSettings) -> Self {
        Self {
            settings,
            readers: readers(NUM_PORTS),
            initialized: false,
        }
    }
}

impl ChannelProcessor for RemapProcessor {
    type Settings = RemapSettings;
    type Output = f64;

    fn num_inputs(&self) -> usize {
        NUM_PORTS
    }

    fn settings(&self) -> &RemapSettings {
        &self.settings
    }

    fn setup(&mut self, settings: RemapSettings) {
        self.settings = settings;
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) -> bool {
        self.initialized = false;
        let (Some(source), Some(output)) = (input(inputs, PORT_X), outputs.first_mut()) else {
            return false;
        };
        output.set_sample_rate(source.sample_rate());
        self.initialized = true;
        true
    }

    fn update(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) {
        if !self.initialized || input(inputs, PORT_X).is_none() {
            return;
        }
        sync_readers(&mut self.readers, inputs);
        let Some(output) = outputs.first_mut() else {
            return;
        };
        let count = min_new_samples(&self.readers, inputs).unwrap_or(0);
        let s = self.settings;

        for _ in 0..count {
            let x = pop_or(&mut self.readers, inputs, PORT_X, 0.0);
            let in_max = pop_or(&mut self.readers, inputs, PORT_IN_MAX, s.in_max);
            let in_min = pop_or(&mut self.readers, inputs, PORT_IN_MIN, s.in_min);
            let out_max = pop_or(&mut self.readers, inputs, PORT_OUT_MAX, s.out_max);
            let out_min = pop_or(&mut self.readers, inputs, PORT_OUT_MIN, s.out_min);
            output.add_sample(remap(x, in_min, in_max, out_min, out_max, s.clamp));
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        self.readers.iter_mut().for_each(ChannelReader::reset);
        self.initialized = false;
    }
}
