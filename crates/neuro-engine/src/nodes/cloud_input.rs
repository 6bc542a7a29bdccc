//! Parameter history loaded asynchronously by the host.
//!
//! The node never blocks. When it starts it publishes a [`CloudRequest`]
//! describing what it wants; the host takes pending requests with
//! [`SignalGraph::take_cloud_requests`](crate::SignalGraph::take_cloud_requests),
//! fetches the values however it likes, and hands them back with
//! [`SignalGraph::deposit_cloud_values`](crate::SignalGraph::deposit_cloud_values)
//! or [`SignalGraph::load_cloud_parameters`](crate::SignalGraph::load_cloud_parameters).
//!
//! # Output
//!
//! - continuous (`sample_rate > 0`): a clock emits one sample per tick. Tick
//!   `i` outputs received value `i % n`, so a short history repeats. Before
//!   anything arrives every tick outputs `default_value`.
//! - otherwise: every received value is forwarded exactly once and then
//!   dropped from the node.

use neuro_core::{Attribute, AttributeSet, Channel, Clock, Inputs};

use super::begin_channel;
use crate::node::{
    AttributeChange, NodeLifecycle, NodeStatus, NodeWarning, Output, Port, Ports, TickTime,
};
use crate::NodeId;

/// Default clock rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 128.0;

/// Labels of the `storage_type` attribute.
pub const STORAGE_TYPES: &[&str] = &["User Parameter", "Classifier Parameter"];
/// Labels of the `request_mode` attribute.
pub const REQUEST_MODES: &[&str] = &[
    "Current Value (no history)",
    "Previous Values",
    "All Values",
    "Time Range",
];
/// Labels of the `time_range_type` attribute.
pub const TIME_RANGE_TYPES: &[&str] = &[
    "Custom Range",
    "One Hour",
    "One Day",
    "One Week",
    "One Month",
    "One Year",
];

const HOUR: f64 = 3600.0;
const DAY: f64 = 24.0 * HOUR;

/// Where the parameter is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// Per-user value.
    User,
    /// Per-classifier value.
    Classifier,
}

impl StorageType {
    fn from_index(index: usize) -> Self {
        if index == 1 { Self::Classifier } else { Self::User }
    }
}

/// Which values the node asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestMode {
    /// Only the newest value.
    Current,
    /// The newest `count` values.
    Count,
    /// Every stored value.
    All,
    /// Values inside a time window.
    TimeRange,
}

impl RequestMode {
    fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Count,
            2 => Self::All,
            3 => Self::TimeRange,
            _ => Self::Current,
        }
    }
}

/// Length of the requested time window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeRangeType {
    /// `time_range` seconds.
    Custom,
    /// One hour.
    Hour,
    /// One day.
    Day,
    /// Seven days.
    Week,
    /// Thirty days.
    Month,
    /// 365 days.
    Year,
}

impl TimeRangeType {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Custom,
            1 => Self::Hour,
            3 => Self::Week,
            4 => Self::Month,
            5 => Self::Year,
            _ => Self::Day,
        }
    }

    /// Window length in seconds. `custom` is used for [`TimeRangeType::Custom`].
    pub fn seconds(self, custom: f64) -> f64 {
        match self {
            Self::Custom => custom,
            Self::Hour => HOUR,
            Self::Day => DAY,
            Self::Week => 7.0 * DAY,
            Self::Month => 30.0 * DAY,
            Self::Year => 365.0 * DAY,
        }
    }
}

/// A fetch the host should perform.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudRequest {
    /// Requesting node.
    pub node: NodeId,
    /// Parameter name (the node name).
    pub name: String,
    /// Where the parameter lives.
    pub storage: StorageType,
    /// Which values to fetch.
    pub mode: RequestMode,
    /// Window length for [`RequestMode::TimeRange`].
    pub time_range_seconds: f64,
    /// Value count for [`RequestMode::Count`].
    pub count: u32,
}

/// Typed value of a stored parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum CloudValue {
    /// Number.
    Float(f64),
    /// Integer.
    Int(i64),
    /// Free text.
    Text(String),
}

/// One stored parameter value as returned by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudParameter {
    /// Parameter name.
    pub name: String,
    /// Stored value.
    pub value: CloudValue,
}

impl CloudParameter {
    /// Float parameter.
    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: CloudValue::Float(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct RequestSettings {
    sample_rate: f64,
    storage: StorageType,
    mode: RequestMode,
    time_range_type: TimeRangeType,
    time_range: f64,
    count: u32,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            storage: StorageType::User,
            mode: RequestMode::Current,
            time_range_type: TimeRangeType::Day,
            time_range: 1800.0,
            count: 10,
        }
    }
}

/// Cloud input node.
pub struct CloudInputNode {
    output: Channel<f64>,
    received: Vec<f64>,
    updated: bool,
    clock: Clock,
    default_value: f64,
    active: RequestSettings,
    pending: RequestSettings,
    request_pending: bool,
}

impl CloudInputNode {
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            output: Channel::new(buffer_size),
            received: Vec::new(),
            updated: false,
            clock: Clock::new(DEFAULT_SAMPLE_RATE),
            default_value: 0.0,
            active: RequestSettings::default(),
            pending: RequestSettings::default(),
            request_pending: false,
        }
    }

    /// Whether the clock drives the output.
    pub fn is_continuous(&self) -> bool {
        self.active.sample_rate > 0.0
    }

    /// Values held for output. In event mode only values not yet forwarded.
    pub fn received(&self) -> &[f64] {
        &self.received
    }

    /// Appends host-delivered values.
    pub fn deposit(&mut self, values: &[f64]) {
        self.received.extend_from_slice(values);
        self.updated |= !values.is_empty();
    }

    /// Replaces the received values with the float parameters named `name`.
    ///
    /// Returns the number of matching values.
    pub fn load(&mut self, name: &str, parameters: &[CloudParameter]) -> usize {
        self.received.clear();
        self.output.clear();
        self.clock.clear_new_ticks();
        for parameter in parameters.iter().filter(|p| p.name == name) {
            if let CloudValue::Float(value) = parameter.value {
                self.received.push(value);
            }
        }
        self.updated = !self.received.is_empty();
        self.received.len()
    }

    /// Hands out the request published by the last start, once.
    pub(crate) fn take_request(&mut self, node: NodeId, name: &str) -> Option<CloudRequest> {
        if !std::mem::take(&mut self.request_pending) {
            return None;
        }
        let s = self.active;
        Some(CloudRequest {
            node,
            name: name.to_string(),
            storage: s.storage,
            mode: s.mode,
            time_range_seconds: s.time_range_type.seconds(s.time_range),
            count: s.count,
        })
    }
}

impl NodeLifecycle for CloudInputNode {
    fn init(&mut self, attributes: &mut AttributeSet, ports: &mut Ports) {
        let s = self.pending;
        attributes.add(Attribute::float(
            "default_value",
            "Default Value",
            0.0,
            f64::MIN,
            f64::MAX,
        ));
        attributes.add(Attribute::float("sample_rate", "Sample Rate", s.sample_rate, 0.0, f64::MAX));
        attributes.add(Attribute::choice("storage_type", "Type", STORAGE_TYPES, 0));
        attributes.add(Attribute::choice("request_mode", "Request Mode", REQUEST_MODES, 0));
        attributes.add(Attribute::choice("time_range_type", "Time Range", TIME_RANGE_TYPES, 2).hidden());
        attributes.add(
            Attribute::float("time_range", "Time Range (Seconds)", s.time_range, 0.0, f64::MAX)
                .hidden(),
        );
        attributes.add(
            Attribute::int("sample_range", "Number of Values", s.count as i32, 0, i32::MAX).hidden(),
        );
        ports.outputs.push(Port::scalar("y", "Out"));
    }

    fn reinit(&mut self, _inputs: &Inputs<'_>, _ports: &mut Ports) -> bool {
        true
    }

    fn start(&mut self, elapsed: f64, _ports: &mut Ports) {
        let rate = self.active.sample_rate;
        self.output.set_sample_rate(rate);
        self.output.set_start_time(elapsed);

        self.clock.reset();
        if rate > 0.0 {
            self.clock.set_frequency(rate);
            self.clock.start(elapsed);
        }
        self.request_pending = true;
    }

    fn update(&mut self, _inputs: &Inputs<'_>, time: TickTime, status: &mut NodeStatus) {
        if !self.updated {
            status.set_warning(NodeWarning::NotUpdated, "Not Updated.");
        } else {
            status.clear_warning(NodeWarning::NotUpdated);
        }

        if !self.is_continuous() {
            for value in self.received.drain(..) {
                self.output.add_sample(value);
            }
            return;
        }

        self.clock.update(time.elapsed);
        if self.received.is_empty() {
            for _ in 0..self.clock.num_new_ticks() {
                self.output.add_sample(self.default_value);
            }
            self.clock.clear_new_ticks();
            return;
        }
        let n = self.received.len() as u64;
        while let Some(tick) = self.clock.pop_oldest_tick() {
            self.output.add_sample(self.received[(tick % n) as usize]);
        }
    }

    fn on_attributes_changed(&mut self, change: &mut AttributeChange<'_>) {
        let a = change.attributes();
        self.default_value = a.float("default_value");
        let settings = RequestSettings {
            sample_rate: a.float("sample_rate"),
            storage: StorageType::from_index(a.choice("storage_type")),
            mode: RequestMode::from_index(a.choice("request_mode")),
            time_range_type: TimeRangeType::from_index(a.choice("time_range_type")),
            time_range: a.float("time_range"),
            count: a.int("sample_range").max(0) as u32,
        };
        if settings == self.pending {
            return;
        }
        self.pending = settings;
        let time_range = settings.mode == RequestMode::TimeRange;
        change.set_visible("sample_range", settings.mode == RequestMode::Count);
        change.set_visible("time_range_type", time_range);
        change.set_visible(
            "time_range",
            time_range && settings.time_range_type == TimeRangeType::Custom,
        );
        change.reset_async();
    }

    fn reset(&mut self) {
        self.active = self.pending;
        self.clock.reset();
        self.output.reset();
        self.received.clear();
        self.updated = false;
        self.request_pending = false;
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

    fn started(rate: f64) -> CloudInputNode {
        let mut node = CloudInputNode::new(0);
        let mut ports = Ports::default();
        node.init(&mut AttributeSet::new(), &mut ports);
        node.pending.sample_rate = rate;
        node.reset();
        assert!(node.reinit(&[], &mut ports));
        node.start(0.0, &mut ports);
        node
    }

    fn tick(node: &mut CloudInputNode, elapsed: f64, status: &mut NodeStatus) {
        node.begin_batch(0.0);
        node.update(&[], TickTime { elapsed, delta: 0.0 }, status);
    }

    #[test]
    fn test_continuous_outputs_default_until_values_arrive() {
        let mut node = started(10.0);
        let mut status = NodeStatus::default();
        node.default_value = 7.0;
        tick(&mut node, 0.3, &mut status);
        assert_eq!(node.output.iter().copied().collect::<Vec<_>>(), vec![7.0; 3]);
        assert_eq!(status.warning(NodeWarning::NotUpdated), Some("Not Updated."));

        node.deposit(&[1.0, 2.0]);
        tick(&mut node, 0.6, &mut status);
        assert_eq!(node.output.iter().copied().collect::<Vec<_>>()[3..], [2.0, 1.0, 2.0]);
        assert!(!status.has_warning());
    }

    #[test]
    fn test_event_mode_forwards_once() {
        let mut node = started(0.0);
        let mut status = NodeStatus::default();
        node.deposit(&[4.0, 5.0]);
        tick(&mut node, 1.0, &mut status);
        tick(&mut node, 2.0, &mut status);
        assert_eq!(node.output.iter().copied().collect::<Vec<_>>(), vec![4.0, 5.0]);
    }

    #[test]
    fn test_event_mode_drops_forwarded_values() {
        let mut node = started(0.0);
        let mut status = NodeStatus::default();
        node.deposit(&[4.0, 5.0]);
        tick(&mut node, 1.0, &mut status);
        assert!(node.received().is_empty());
        assert!(!status.has_warning());

        node.deposit(&[6.0]);
        assert_eq!(node.received(), &[6.0]);
        tick(&mut node, 2.0, &mut status);
        assert!(node.received().is_empty());
        assert!(!status.has_warning());
        assert_eq!(node.output.iter().copied().collect::<Vec<_>>(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_request_published_once_per_start() {
        let mut node = started(10.0);
        let request = node.take_request(NodeId(3), "focus");
        assert!(matches!(
            request,
            Some(CloudRequest { mode: RequestMode::Current, count: 10, .. })
        ));
        assert_eq!(node.take_request(NodeId(3), "focus"), None);
    }

    #[test]
    fn test_load_filters_by_name_and_type() {
        let mut node = started(0.0);
        let parameters = [
            CloudParameter::float("focus", 1.0),
            CloudParameter::float("calm", 2.0),
            CloudParameter {
                name: "focus".into(),
                value: CloudValue::Text("x".into()),
            },
            CloudParameter::float("focus", 3.0),
        ];
        assert_eq!(node.load("focus", &parameters), 2);
        assert_eq!(node.received(), &[1.0, 3.0]);
    }

    #[test]
    fn test_time_ranges() {
        assert_eq!(TimeRangeType::Custom.seconds(12.0), 12.0);
        assert_eq!(TimeRangeType::Hour.seconds(0.0), 3600.0);
        assert_eq!(TimeRangeType::Week.seconds(0.0), 604_800.0);
        assert_eq!(TimeRangeType::Month.seconds(0.0), 2_592_000.0);
        assert_eq!(TimeRangeType::Year.seconds(0.0), 31_536_000.0);
    }
}
