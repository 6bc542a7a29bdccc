//! Capture-and-hold over a scalar stream. See [`FreezeProcessor`].

use neuro_core::{
    Attribute, AttributeSet, ChannelProcessor, FreezeProcessor, FreezeSettings, Inputs,
};

use super::{Processed, delay_label};
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// Labels of the `delay_type` attribute.
pub const DELAY_TYPES: &[&str] = &["Duration", "Sample Count"];

const DELAY_TYPE_DURATION: usize = 0;
const DELAY_TYPE_SAMPLES: usize = 1;

/// Freeze node.
pub struct FreezeNode {
    inner: Processed<FreezeProcessor>,
    pending: FreezeSettings,
}

impl FreezeNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        let settings = FreezeSettings::default();
        Self {
            inner: Processed::new(FreezeProcessor::new(settings), buffer_size),
            pending: settings,
        }
    }

    /// Whether the held value has been captured.
    pub fn is_frozen(&self) -> bool {
        self.inner.processor.is_frozen()
    }

    /// Active settings.
    pub fn settings(&self) -> &FreezeSettings {
        self.inner.processor.settings()
    }
}

impl NodeLifecycle for FreezeNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        let s = self.pending;
        let delay_type = if s.set_by_time {
            DELAY_TYPE_DURATION
        } else {
            DELAY_TYPE_SAMPLES
        };
        attributes.add(Attribute::choice("delay_type", "Delay Type", DELAY_TYPES, delay_type));
        attributes.add(Attribute::float(
            "freeze_seconds",
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
        attributes.add(Attribute::boolean("pass_through", "Pass Through", s.pass_through));
        ports.inputs.push(Port::scalar("x", "In"));
        ports.outputs.push(Port::scalar("y", "Out"));
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, ports: &mut Ports) -> bool {
        if !self.inner.reinit(inputs) {
            return false;
        }
        let rate = inputs.first().copied().flatten().map_or(0.0, |c| c.sample_rate());
        let settings = self.settings();
        let (samples, seconds) = settings.resolve(rate);
        ports.rename_output(0, delay_label(settings.set_by_time, samples, seconds));
        true
    }

    fn requires_constant_rate(&self) -> bool {
        self.settings().set_by_time
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        self.inner.update(inputs);
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let a = change.attributes();
        let settings = FreezeSettings {
            set_by_time: a.choice("delay_type") == DELAY_TYPE_DURATION,
            delay_seconds: a.float("freeze_seconds"),
            delay_samples: a.int("delay_samples").max(0) as u32,
            pass_through: a.boolean("pass_through"),
        };

        if settings.pass_through != self.pending.pass_through {
            self.pending.pass_through = settings.pass_through;
            self.inner.processor.set_pass_through(settings.pass_through);
        }
        if settings == self.pending {
            return;
        }
        self.pending = settings;
        change.set_visible("freeze_seconds", settings.set_by_time);
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
