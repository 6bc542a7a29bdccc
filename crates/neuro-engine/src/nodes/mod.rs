//! Node variants.
//!
//! | node              | inputs                          | outputs          |
//! |-------------------|---------------------------------|------------------|
//! | [`InputNode`]     | host samples                    | y                |
//! | [`ParameterNode`] | host / actions                  | one per channel  |
//! | [`FeedbackNode`]  | one per channel                 | -                |
//! | [`DelayNode`]     | x                               | y                |
//! | [`FreezeNode`]    | x                               | y                |
//! | [`SmoothNode`]    | x                               | y                |
//! | [`RemapNode`]     | x, in max, in min, out max, out min | y            |
//! | [`ColorWheelNode`]| hue, sat, val                   | r, g, b          |
//! | [`FftNode`]       | x                               | spectrum         |
//! | [`CloudInputNode`]| host deposits                   | y                |

pub mod cloud_input;
pub mod color_wheel;
pub mod delay;
pub mod feedback;
pub mod fft;
pub mod freeze;
pub mod input;
pub mod parameter;
pub mod remap;
pub mod smooth;

pub use cloud_input::{
    CloudInputNode, CloudParameter, CloudRequest, CloudValue, RequestMode, StorageType,
    TimeRangeType,
};
pub use color_wheel::ColorWheelNode;
pub use delay::DelayNode;
pub use feedback::FeedbackNode;
pub use fft::FftNode;
pub use freeze::FreezeNode;
pub use input::InputNode;
pub use parameter::ParameterNode;
pub use remap::RemapNode;
pub use smooth::SmoothNode;

use neuro_core::{Channel, ChannelProcessor, Inputs};

use crate::node::Output;

/// A channel processor together with the output channels it writes.
///
/// Shared by every node that wraps a scalar processor.
pub(crate) struct Processed<P> {
    pub processor: P,
    pub outputs: Vec<Channel<f64>>,
}

impl<P: ChannelProcessor<Output = f64>> Processed<P> {
    pub fn new(processor: P, buffer_size: usize) -> Self {
        let outputs = (0..processor.num_outputs())
            .map(|_| Channel::new(buffer_size))
            .collect();
        Self { processor, outputs }
    }

    pub fn reinit(&mut self, inputs: &Inputs<'_>) -> bool {
        self.processor.reinit(inputs, &mut self.outputs)
    }

    pub fn update(&mut self, inputs: &Inputs<'_>) {
        self.processor.update(inputs, &mut self.outputs);
    }

    pub fn reset(&mut self) {
        self.processor.reset();
        self.outputs.iter_mut().for_each(Channel::clear);
    }

    pub fn begin_batch(&mut self, delta: f64) {
        for output in &mut self.outputs {
            output.begin_add_samples();
            output.update_activity(delta);
        }
    }

    pub fn output(&self, port: usize) -> Option<Output<'_>> {
        self.outputs.get(port).map(Output::Scalar)
    }
}

/// Port label of a resolved delay: whole samples or seconds.
pub(crate) fn delay_label(set_by_time: bool, samples: u32, seconds: f64) -> String {
    if set_by_time {
        format!("{seconds:.2}s")
    } else {
        format!("{samples} smpl")
    }
}

/// Opens a new batch on a standalone output channel.
pub(crate) fn begin_channel<T>(channel: &mut Channel<T>, delta: f64) {
    channel.begin_add_samples();
    channel.update_activity(delta);
}
