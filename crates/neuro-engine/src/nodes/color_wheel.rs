//! HSV streams to R, G, B streams. See [`ColorWheelProcessor`].

use neuro_core::{AttributeSet, Color, ColorWheelProcessor, Inputs};

use super::Processed;
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Color wheel node.
pub struct ColorWheelNode {
    inner: Processed<ColorWheelProcessor>,
}

impl ColorWheelNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            inner: Processed::new(ColorWheelProcessor::new(), buffer_size),
        }
    }

    /// Color of the newest sample.
    pub fn current_color(&self) -> Color {
        self.inner.processor.current_color()
    }
}

impl NodeLifecycle for ColorWheelNode {
    fn init(&mut self, _attributes: &mut AttributeSet, ports: &mut Ports) {
        ports.inputs.push(Port::scalar("hue", "Hue"));
        ports.inputs.push(Port::scalar("sat", "Saturation"));
        ports.inputs.push(Port::scalar("val", "Value"));
        ports.outputs.push(Port::scalar("red", "R"));
        ports.outputs.push(Port::scalar("green", "G"));
        ports.outputs.push(Port::scalar("blue", "B"));
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        self.inner.reinit(inputs)
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        self.inner.update(inputs);
    }

    fn on_attributes_changed(&mut self, _change: &mut AttributeChange<'_>) {}

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
