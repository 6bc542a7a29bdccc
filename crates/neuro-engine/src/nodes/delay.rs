//! Fixed delay over a scalar stream. See [`DelayProcessor`].

use neuro_core::{
    Attribute, AttributeSet, AttributeValue, ChannelProcessor, DelayProcessor, DelaySettings,
    Inputs,
};

use super::{Processed, delay_label};
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Delay node.
pub struct DelayNode {
    inner: Processed<DelayProcessor>,
    pending: DelaySettings,
    input_rate: f64,
}

impl DelayNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        let settings = DelaySettings::default();
        Self {
            inner: Processed::new(DelayProcessor::new(settings), buffer_size),
            pending: settings,
            input_rate: 0.0,
        }
    }

    /// Delay in samples resolved against the current input rate.
    pub fn delay_samples(&self) -> u32 {
        self.inner.processor.delay_samples()
    }

    /// Active settings.
    pub fn settings(&self) -> &DelaySettings {
        self.inner.processor.settings()
    }
}

impl NodeLifecycle for DelayNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        let s = self.pending;
        attributes.add(Attribute::boolean("set_by_time", "Set by Time", s.set_by_time));
        attributes.add(Attribute::float(
            "delay_seconds",
            "Delay (Seconds)",
            s.delay_seconds,
            0.0,
            f64::MAX,
        ));
        attributes.add(
            Attribute::int(
                "delay_samples",
                "Delay (Samples)",
                s.delay_samples as i32,
                0,
                i32::MAX,
            )
            .hidden(),
        );
        ports.inputs.push(Port::scalar("x", "In"));
        ports.outputs.push(Port::scalar("y", "Out"));
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, ports: &mut Ports) -> bool {
        self.input_rate = inputs.first().copied().flatten().map_or(0.0, |c| c.sample_rate());
        if !self.inner.reinit(inputs) {
            return false;
        }
        let settings = self.settings();
        let (samples, seconds) = settings.resolve(self.input_rate);
        ports.rename_output(0, delay_label(settings.set_by_time, samples, seconds));
        true
    }

    fn requires_constant_rate(&self) -> bool {
        true
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        self.inner.update(inputs);
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let a = change.attributes();
        let mut settings = DelaySettings {
            set_by_time: a.boolean("set_by_time"),
            delay_seconds: a.float("delay_seconds"),
            delay_samples: a.int("delay_samples").max(0) as u32,
        };

        // the inactive unit mirrors the active one once the input rate is known
        if self.input_rate > 0.0 {
            let (samples, seconds) = settings.resolve(self.input_rate);
            let synced = if settings.set_by_time {
                settings.delay_samples = samples;
                change.set(
                    "delay_samples",
                    AttributeValue::Int(i32::try_from(samples).unwrap_or(i32::MAX)),
                )
            } else {
                settings.delay_seconds = seconds;
                change.set("delay_seconds", AttributeValue::Float(seconds))
            };
            if let Err(e) = synced {
                tracing::warn!("delay: cannot sync inactive delay unit: {e}");
            }
        }

        if settings == self.pending {
            return;
        }
        self.pending = settings;
        change.set_visible("delay_seconds", settings.set_by_time);
        change.set_visible("delay_samples", !settings.set_by_time);
        change.reset_async();
    }

    fn reset(&mut self) {
        self.inner.processor.setup(self.pending);
        self.inner.reset();
    }

    fn begin_batch(&mut self, delta: f64) {
        self.inner.begin_batch(delta);
    }

    fn output(&self, port: usize) -> Option<Output<'_>> {
        self.inner.output(port)
    }
}
