//! HSV to RGB conversion over scalar streams.
//!
//! Hue is required. Saturation and value are optional and default to `1.0`
//! when unconnected. Hue is clamped to `[0, 0.999]` so that a hue of one
//! does not wrap onto red, the others to `[0, 1]`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::{ChannelProcessor, Inputs, input, min_new_samples, pop_or, readers, sync_readers};
use crate::channel::Channel;
use crate::color::Color;
use crate::math::clamp;
use crate::reader::ChannelReader;

/// Port index of the hue input.
pub const PORT_HUE: usize = 0;
/// Port index of the saturation input.
pub const PORT_SATURATION: usize = 1;
/// Port index of the value input.
pub const PORT_VALUE: usize = 2;

const MAX_HUE: f64 = 0.999;

/// Splits an HSV stream into red, green and blue streams.
#[derive(Debug, Clone, Default)]
pub struct ColorWheelProcessor {
    color: Color,
    readers: Vec<ChannelReader>,
    initialized: bool,
}

impl ColorWheelProcessor {
    /// Creates a suspended processor.
    pub fn new() -> Self {
        Self {
            color: Color::BLACK,
            readers: readers(3),
            initialized: false,
        }
    }

    /// Color of the most recent sample.
    pub fn current_color(&self) -> Color {
        self.color
    }
}

impl ChannelProcessor for ColorWheelProcessor {
    type Settings = ();
    type Output = f64;

    fn num_inputs(&self) -> usize {
        3
    }

    fn num_outputs(&self) -> usize {
        3
    }

    fn settings(&self) -> &() {
        &()
    }

    fn setup(&mut self, (): ()) {}

    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) -> bool {
        self.initialized = false;
        let Some(hue) = input(inputs, PORT_HUE) else {
            return false;
        };
        if outputs.len() < 3 {
            return false;
        }
        for output in outputs.iter_mut() {
            output.set_sample_rate(hue.sample_rate());
        }
        self.initialized = true;
        true
    }

    fn update(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<f64>]) {
        if !self.initialized || input(inputs, PORT_HUE).is_none() || outputs.len() < 3 {
            return;
        }
        sync_readers(&mut self.readers, inputs);
        let count = min_new_samples(&self.readers, inputs).unwrap_or(0);

        for _ in 0..count {
            let h = pop_or(&mut self.readers, inputs, PORT_HUE, 0.0);
            let s = pop_or(&mut self.readers, inputs, PORT_SATURATION, 1.0);
            let v = pop_or(&mut self.readers, inputs, PORT_VALUE, 1.0);

            self.color = Color::hsv(
                clamp(h, 0.0, MAX_HUE) as f32,
                clamp(s, 0.0, 1.0) as f32,
                clamp(v, 0.0, 1.0) as f32,
            );
            outputs[0].add_sample(f64::from(self.color.r));
            outputs[1].add_sample(f64::from(self.color.g));
            outputs[2].add_sample(f64::from(self.color.b));
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        self.color = Color::BLACK;
        self.readers.iter_mut().for_each(ChannelReader::reset);
        self.initialized = false;
    }
}
