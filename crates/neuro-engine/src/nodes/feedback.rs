//! Named sink read by conditions and actions.
//!
//! Each input port is one channel. The node keeps the newest sample of every
//! connected channel; unconnected or silent channels read `0.0`.

use neuro_core::{AttributeSet, Inputs};

use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Multi-channel feedback node.
pub struct FeedbackNode {
    values: Vec<f64>,
    received: bool,
}

impl FeedbackNode {
    pub(crate) fn new(channels: usize) -> Self {
        Self {
            values: vec![0.0; channels],
            received: false,
        }
    }

    /// Newest value of every channel.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Newest value of the first channel.
    pub fn current_value(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    /// Whether no sample has arrived since the last reset.
    pub fn is_empty(&self) -> bool {
        !self.received
    }
}

impl NodeLifecycle for FeedbackNode {
    fn init(&mut self, _attributes: &mut AttributeSet, ports: &mut Ports) {
        for i in 0..self.values.len() {
            ports.inputs.push(Port::scalar("x", format!("In {}", i + 1)));
        }
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        inputs.iter().any(Option::is_some)
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        for (value, input) in self.values.iter_mut().zip(inputs) {
            if let Some(&sample) = input.and_then(|c| c.last_sample()) {
                *value = sample;
                self.received = true;
            }
        }
    }

    fn on_attributes_changed(&mut self, _change: &mut AttributeChange<'_>) {}

    fn reset(&mut self) {
        self.values.fill(0.0);
        self.received = false;
    }

    fn begin_batch(&mut self, _delta: f64) {}

    fn output(&self, _port: usize) -> Option<Output<'_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::Channel;

    #[test]
    fn test_records_newest_sample_per_channel() {
        let mut node = FeedbackNode::new(2);
        let mut ports = Ports::default();
        node.init(&mut AttributeSet::new(), &mut ports);
        assert_eq!(ports.inputs.len(), 2);
        assert!(node.is_empty());

        let mut a = Channel::new(0);
        a.add_sample(1.0);
        a.add_sample(3.0);
        let inputs = [Some(&a), None];
        assert!(node.reinit(&inputs, &mut ports));
        node.update(&inputs, TickTime::default(), &mut NodeStatus::default());

        assert_eq!(node.values(), &[3.0, 0.0]);
        assert_eq!(node.current_value(), 3.0);
        assert!(!node.is_empty());

        node.reset();
        assert!(node.is_empty());
    }

    #[test]
    fn test_suspends_without_inputs() {
        let mut node = FeedbackNode::new(1);
        let mut ports = Ports::default();
        node.init(&mut AttributeSet::new(), &mut ports);
        assert!(!node.reinit(&[None], &mut ports));
    }
}
