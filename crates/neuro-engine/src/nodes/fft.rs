//! Spectral transform of a scalar stream. See [`FftProcessor`].
//!
//! The only node with a [`Spectrum`] output. Every setting change goes
//! through a deferred reset because it replaces the transform plan.

use neuro_analysis::FftProcessor;
use neuro_core::{
    Attribute, AttributeSet, Channel, ChannelProcessor, FftSettings, Inputs, MAX_FFT_ORDER,
    MIN_FFT_ORDER, Spectrum, Window,
};

use super::begin_channel;
use crate::node::{AttributeChange, NodeLifecycle, NodeStatus, Output, Port, Ports, TickTime};

/// FFT node.
pub struct FftNode {
    processor: FftProcessor,
    output: [Channel<Spectrum>; 1],
    pending: FftSettings,
}

impl FftNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        let settings = FftSettings::default();
        Self {
            processor: FftProcessor::new(settings),
            output: [Channel::new(buffer_size)],
            pending: settings,
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &FftSettings {
        self.processor.settings()
    }

    /// Highest frequency covered by the output spectra.
    pub fn max_frequency(&self) -> f64 {
        self.processor.max_frequency()
    }
}

impl NodeLifecycle for FftNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        let s = self.pending;
        attributes.add(Attribute::int(
            "order",
            "FFT Order",
            s.order as i32,
            MIN_FFT_ORDER as i32,
            MAX_FFT_ORDER as i32,
        ));
        attributes.add(Attribute::choice("window", "Window Function", &Window::NAMES, s.window.index()));
        attributes.add(Attribute::int("shift", "Window Shift", s.shift as i32, 0, i32::MAX));
        attributes.add(Attribute::boolean("zero_padding", "Zero Padding", s.zero_padding));
        ports.inputs.push(Port::scalar("x", "In"));
        ports.outputs.push(Port::spectrum("y", "Spectrum"));
    }

    fn reinit(&mut self, inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        self.processor.reinit(inputs, &mut self.output)
    }

    fn update(&mut self, inputs: &Inputs<'_>, _time: TickTime, _status: &mut NodeStatus) {
        self.processor.update(inputs, &mut self.output);
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let a = change.attributes();
        let settings = FftSettings {
            order: a.int("order").max(0) as u32,
            window: Window::from_index(a.choice("window")).unwrap_or_default(),
            shift: a.int("shift").max(0) as u32,
            zero_padding: a.boolean("zero_padding"),
        };
        if settings != self.pending {
            self.pending = settings;
            change.reset_async();
        }
    }

    fn reset(&mut self) {
        self.processor.setup(self.pending);
        self.processor.reset();
        self.output[0].clear();
    }

    fn begin_batch(&mut self, delta: f64) {
        begin_channel(&mut self.output[0], delta);
    }

    fn output(&self, port: usize) -> Option<Output<'_>> {
        (port == 0).then_some(Output::Spectrum(&self.output[0]))
    }
}
