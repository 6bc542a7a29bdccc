//! Externally fed scalar stream.
//!
//! The host queues samples with
//! [`SignalGraph::push_samples`](crate::SignalGraph::push_samples); the next
//! tick appends them to the output in arrival order.

use std::collections::VecDeque;

use neuro_core::{Attribute, AttributeSet, Channel, Inputs};

use super::begin_channel;
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Default output rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 128.0;

/// Host-fed source node.
pub struct InputNode {
    output: Channel<f64>,
    queued: VecDeque<f64>,
    sample_rate: f64,
    pending_rate: f64,
}

impl InputNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            output: Channel::new(buffer_size),
            queued: VecDeque::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            pending_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Queues samples for the next tick.
    pub fn push(&mut self, samples: &[f64]) {
        self.queued.extend(samples.iter().copied());
    }

    /// Samples waiting for the next tick.
    pub fn num_queued(&self) -> usize {
        self.queued.len()
    }

    /// Configured output rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl NodeLifecycle for InputNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        attributes.add(Attribute::float(
            "sample_rate",
            "Sample Rate",
            DEFAULT_SAMPLE_RATE,
            0.0,
            f64::MAX,
        ));
        ports.outputs.push(Port::scalar("y", "Out"));
    }

    fn reinit(&mut self, _inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        self.output.set_sample_rate(self.sample_rate);
        true
    }

    fn start(&mut self, elapsed: f64, _ports: &mut Ports) {
        self.output.set_start_time(elapsed);
    }

    fn update(&mut self, _inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        for value in self.queued.drain(..) {
            self.output.add_sample(value);
        }
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let rate = change.attributes().float("sample_rate");
        if rate != self.pending_rate {
            self.pending_rate = rate;
            change.reset_async();
        }
    }

    fn reset(&mut self) {
        self.sample_rate = self.pending_rate;
        self.output.reset();
    }

    fn begin_batch(&mut self, delta: f64) {
        begin_channel(&mut self.output, delta);
    }

    fn output(&self, port: usize) -> Option<Output<'_>> {
        (port == 0).then_some(Output::Scalar(&self.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_samples_flush_on_update() {
        let mut node = InputNode::new(0);
        let mut attributes = AttributeSet::new();
        let mut ports = Ports::default();
        node.init(&mut attributes, &mut ports);
        assert!(node.reinit(&[], &mut ports));

        node.push(&[1.0, 2.0]);
        assert_eq!(node.num_queued(), 2);
        node.begin_batch(0.1);
        node.update(&[], TickTime::default(), &mut NodeStatus::default());

        assert_eq!(node.num_queued(), 0);
        assert_eq!(node.output.num_new_samples(), 2);
        assert_eq!(node.output.sample_rate(), DEFAULT_SAMPLE_RATE);
    }
}
