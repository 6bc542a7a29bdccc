//! Named multi-channel value source.
//!
//! Holds one value per channel. The host and
//! [`ParameterAction`](crate::ParameterAction) change the values; the node
//! turns them into streams:
//!
//! - clocked (`sample_rate > 0`): one sample of the current value per clock tick
//! - event mode (`sample_rate == 0`): one sample whenever the value differs
//!   from the last emitted one, plus an initial sample
//!
//! Each output port is named after its channel's current value.

use neuro_core::{Attribute, AttributeSet, Channel, Clock, Inputs};

use super::begin_channel;
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Default clock rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 128.0;

fn value_label(value: f64) -> String {
    format!("{value:.2}")
}

/// Multi-channel parameter node.
pub struct ParameterNode {
    values: Vec<f64>,
    outputs: Vec<Channel<f64>>,
    clock: Clock,
    default_value: f64,
    sample_rate: f64,
    pending_rate: f64,
}

impl ParameterNode {
    pub(crate) fn new(channels: usize, buffer_size: usize) -> Self {
        Self {
            values: vec![0.0; channels],
            outputs: (0..channels).map(|_| Channel::new(buffer_size)).collect(),
            clock: Clock::new(DEFAULT_SAMPLE_RATE),
            default_value: 0.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            pending_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Current value of every channel.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.values.len()
    }

    /// Sets one channel. Returns `false` if `channel` is out of range.
    pub fn set_value(&mut self, channel: usize, value: f64, ports: &mut Ports) -> bool {
        let Some(slot) = self.values.get_mut(channel) else {
            return false;
        };
        *slot = value;
        ports.rename_output(channel, value_label(value));
        true
    }

    fn rename_all(&self, ports: &mut Ports) {
        for (i, &value) in self.values.iter().enumerate() {
            ports.rename_output(i, value_label(value));
        }
    }
}

impl NodeLifecycle for ParameterNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        attributes.add(Attribute::float("value", "Value", 0.0, f64::MIN, f64::MAX));
        attributes.add(Attribute::float(
            "sample_rate",
            "Sample Rate",
            DEFAULT_SAMPLE_RATE,
            0.0,
            f64::MAX,
        ));
        for &value in &self.values {
            ports.outputs.push(Port::scalar("y", value_label(value)));
        }
    }

    fn reinit(&mut self, _inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        for output in &mut self.outputs {
            output.set_sample_rate(self.sample_rate);
        }
        true
    }

    fn start(&mut self, elapsed: f64, ports: &mut Ports) {
        for output in &mut self.outputs {
            output.set_start_time(elapsed);
        }
        self.rename_all(ports);

        self.clock.reset();
        self.clock.set_frequency(self.sample_rate);
        if self.sample_rate > 0.0 {
            self.clock.start(elapsed);
        }
    }

    fn update(&mut self, _inputs: &Inputs<'_>, time: TickTime, _status: &mut NodeStatus) {
        self.clock.update(time.elapsed);
        let ticks = self.clock.num_new_ticks();
        self.clock.clear_new_ticks();

        let event_mode = self.sample_rate <= 0.0;
        for (output, &value) in self.outputs.iter_mut().zip(&self.values) {
            for _ in 0..ticks {
                output.add_sample(value);
            }
            if event_mode && output.last_sample() != Some(&value) {
                output.add_sample(value);
            }
        }
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let default_value = change.attributes().float("value");
        let rate = change.attributes().float("sample_rate");

        if rate != self.pending_rate {
            self.pending_rate = rate;
            change.reset_async();
        }
        if default_value != self.default_value {
            self.default_value = default_value;
            self.values.fill(default_value);
            self.rename_all(change.ports_mut());
        }
    }

    fn reset(&mut self) {
        self.sample_rate = self.pending_rate;
        self.values.fill(self.default_value);
        self.clock.reset();
        self.outputs.iter_mut().for_each(Channel::reset);
    }

    fn begin_batch(&mut self, delta: f64) {
        for output in &mut self.outputs {
            begin_channel(output, delta);
        }
    }

    fn output(&self, port: usize) -> Option<Output<'_>> {
        self.outputs.get(port).map(Output::Scalar)
    }
}
