//! Exponential smoothing. See [`SmoothProcessor`].

use neuro_core::{
    Attribute, AttributeSet, ChannelProcessor, Inputs, SmoothProcessor, SmoothSettings,
};

use super::Processed;
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Smooth node. Setting changes apply immediately without a reset.
pub struct SmoothNode {
    inner: Processed<SmoothProcessor>,
}

impl SmoothNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            inner: Processed::new(SmoothProcessor::new(SmoothSettings::default()), buffer_size),
        }
    }

    /// Running smoothed value.
    pub fn current(&self) -> f64 {
        self.inner.processor.current()
    }
}

impl NodeLifecycle for SmoothNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        let s = SmoothSettings::default();
        attributes.add(Attribute::float("speed", "Interpolation Speed", s.speed, 0.0, 1.0));
        attributes.add(Attribute::float(
            "start_value",
            "Start Value",
            s.start_value,
            f64::MIN,
            f64::MAX,
        ));
        ports.inputs.push(Port::scalar("x", "In"));
        ports.outputs.push(Port::scalar("y", "Out"));
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        self.inner.reinit(inputs)
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        self.inner.update(inputs);
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let settings = SmoothSettings {
            speed: change.attributes().float("speed"),
            start_value: change.attributes().float("start_value"),
        };
        if settings != *self.inner.processor.settings() {
            self.inner.processor.setup(settings);
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn begin_batch(&mut self, delta: f64) {
        self.inner.begin_batch(delta);
    }

    fn output(&self, port: usize) -> Option<Output<'_>> {
        self.inner.output(port)
    }
}
