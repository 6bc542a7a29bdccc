//! Range remap with modulated bounds. See [`RemapProcessor`].
//!
//! Static bounds apply immediately. The `x` input and the output port are
//! named after the configured input and output ranges.

use neuro_core::processor::remap::{PORT_IN_MAX, PORT_IN_MIN, PORT_OUT_MAX, PORT_OUT_MIN, PORT_X};
use neuro_core::{Attribute, AttributeSet, ChannelProcessor, Inputs, RemapProcessor, RemapSettings};

use super::Processed;
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

fn range_label(min: f64, max: f64) -> String {
    format!("[{min}, {max}]")
}

/// Remap node.
pub struct RemapNode {
    inner: Processed<RemapProcessor>,
}

impl RemapNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            inner: Processed::new(RemapProcessor::new(RemapSettings::default()), buffer_size),
        }
    }

    /// Active static bounds.
    pub fn settings(&self) -> &RemapSettings {
        self.inner.processor.settings()
    }
}

impl NodeLifecycle for RemapNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        let s = RemapSettings::default();
        for (id, name, default) in [
            ("input_min", "Input Min", s.in_min),
            ("input_max", "Input Max", s.in_max),
            ("output_min", "Output Min", s.out_min),
            ("output_max", "Output Max", s.out_max),
        ] {
            attributes.add(Attribute::float(id, name, default, f64::MIN, f64::MAX));
        }
        attributes.add(Attribute::boolean("clamp", "Clamp Output", s.clamp));

        let mut inputs = vec![Port::scalar("x", ""); 5];
        inputs[PORT_X] = Port::scalar("x", range_label(s.in_min, s.in_max));
        inputs[PORT_IN_MAX] = Port::scalar("x2", "In Max");
        inputs[PORT_IN_MIN] = Port::scalar("x3", "In Min");
        inputs[PORT_OUT_MAX] = Port::scalar("x4", "Out Max");
        inputs[PORT_OUT_MIN] = Port::scalar("x5", "Out Min");
        ports.inputs = inputs;
        ports
            .outputs
            .push(Port::scalar("y", range_label(s.out_min, s.out_max)));
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        self.inner.reinit(inputs)
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        self.inner.update(inputs);
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let a = change.attributes();
        let settings = RemapSettings {
            in_min: a.float("input_min"),
            in_max: a.float("input_max"),
            out_min: a.float("output_min"),
            out_max: a.float("output_max"),
            clamp: a.boolean("clamp"),
        };
        if settings == *self.inner.processor.settings() {
            return;
        }
        self.inner.processor.setup(settings);
        let ports = change.ports_mut();
        ports.rename_input(PORT_X, range_label(settings.in_min, settings.in_max));
        ports.rename_output(0, range_label(settings.out_min, settings.out_max));
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
