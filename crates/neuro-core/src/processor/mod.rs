//! Channel processors: the computational units inside graph nodes.
//!
//! A processor reads scalar input channels through one [`ChannelReader`]
//! per input port and writes into output channels it is handed each tick.
//! It never owns the channels on either side.
//!
//! # Lifecycle
//!
//! 1. [`setup`](ChannelProcessor::setup) stores a settings snapshot
//! 2. [`reinit`](ChannelProcessor::reinit) derives internal state from the
//!    settings and the connected inputs; returns `false` to suspend
//! 3. [`update`](ChannelProcessor::update) consumes new input samples and
//!    appends outputs; a no-op while suspended
//!
//! Suspension is the only failure mode: a processor with a missing
//! required input or an unusable sample rate simply produces nothing until
//! a later `reinit` succeeds.
//!
//! # Multi-input synchronization
//!
//! Processors with several inputs advance by the smallest number of new
//! samples across their connected inputs ([`min_new_samples`]). Faster
//! producers are buffered in their readers until the slowest catches up.
//!
//! # Implementations
//!
//! | processor                  | inputs             | outputs  |
//! |----------------------------|--------------------|----------|
//! | [`DelayProcessor`]         | x                  | y        |
//! | [`FreezeProcessor`]        | x                  | y        |
//! | [`SmoothProcessor`]        | x                  | y        |
//! | [`RemapProcessor`]         | x, 4 range inputs  | y        |
//! | [`ColorWheelProcessor`]    | hue, sat, val      | r, g, b  |

pub mod color_wheel;
pub mod delay;
pub mod freeze;
pub mod remap;
pub mod smooth;

pub use color_wheel::ColorWheelProcessor;
pub use delay::{DelayProcessor, DelaySettings};
pub use freeze::{FreezeProcessor, FreezeSettings};
pub use remap::{RemapProcessor, RemapSettings};
pub use smooth::{SmoothProcessor, SmoothSettings};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::channel::Channel;
use crate::reader::{ChannelReader, InputChanges};

/// Connected scalar inputs of a processor, indexed by port. `None` is unconnected.
pub type Inputs<'a> = [Option<&'a Channel<f64>>];

/// Shared contract of all channel processors.
pub trait ChannelProcessor {
    /// Parameter block, copied in by [`setup`](Self::setup).
    type Settings: Clone + PartialEq;
    /// Sample type of the output channels.
    type Output;

    /// Number of input ports.
    fn num_inputs(&self) -> usize;

    /// Number of output ports.
    fn num_outputs(&self) -> usize {
        1
    }

    /// Current settings.
    fn settings(&self) -> &Self::Settings;

    /// Replaces the settings. Derived state is refreshed by the next [`reinit`](Self::reinit).
    fn setup(&mut self, settings: Self::Settings);

    /// Re-derives internal state from settings and inputs.
    ///
    /// Configures output sample rates. Returns whether the processor can run.
    fn reinit(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<Self::Output>]) -> bool;

    /// Consumes new input samples and appends results to `outputs`.
    fn update(&mut self, inputs: &Inputs<'_>, outputs: &mut [Channel<Self::Output>]);

    /// Whether the last [`reinit`](Self::reinit) succeeded.
    fn is_initialized(&self) -> bool;

    /// Drops internal state and reader positions.
    fn reset(&mut self);
}

/// Pulls every connected input into its reader and merges the reported changes.
pub fn sync_readers(readers: &mut [ChannelReader], inputs: &Inputs<'_>) -> InputChanges {
    let mut merged = InputChanges::default();
    for (reader, input) in readers.iter_mut().zip(inputs) {
        if let Some(channel) = input {
            let changes = reader.update(*channel);
            merged.reset |= changes.reset;
            merged.sample_rate |= changes.sample_rate;
            merged.connection |= changes.connection;
        }
    }
    merged
}

/// Smallest new-sample count across connected inputs, `None` if none is connected.
pub fn min_new_samples(readers: &[ChannelReader], inputs: &Inputs<'_>) -> Option<usize> {
    readers
        .iter()
        .zip(inputs)
        .filter(|(_, input)| input.is_some())
        .map(|(reader, _)| reader.num_new_samples())
        .min()
}

/// Input channel at `port`, if connected.
pub fn input<'a>(inputs: &Inputs<'a>, port: usize) -> Option<&'a Channel<f64>> {
    inputs.get(port).copied().flatten()
}

/// Consumes the oldest sample on `port`, or returns `fallback` when unconnected.
pub fn pop_or(
    readers: &mut [ChannelReader],
    inputs: &Inputs<'_>,
    port: usize,
    fallback: f64,
) -> f64 {
    match (readers.get_mut(port), input(inputs, port)) {
        (Some(reader), Some(channel)) => reader.pop_oldest(channel).copied().unwrap_or(fallback),
        _ => fallback,
    }
}

/// Creates `count` fresh readers.
pub fn readers(count: usize) -> Vec<ChannelReader> {
    (0..count).map(|_| ChannelReader::new()).collect()
}
