//! Boolean predicates over a feedback value, used by state transitions.

use std::fmt;

use neuro_core::{
    Attribute, AttributeError, AttributeSet, AttributeValue, EPSILON, in_range, is_close,
};

use crate::context::{Classifier, EngineEvent};

/// Comparison applied to `(feedback, test_value, range_value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionFunction {
    /// `feedback > test`
    #[default]
    Greater,
    /// `feedback >= test`
    GreaterEqual,
    /// `feedback < test`
    Less,
    /// `feedback <= test`
    LessEqual,
    /// `|feedback - test| > EPSILON`
    NotEqual,
    /// `|feedback - test| <= EPSILON`
    Equal,
    /// Between test and range value, inclusive, in either order.
    InRange,
    /// Outside the inclusive interval spanned by test and range value.
    NotInRange,
}

impl ConditionFunction {
    /// Every function, in attribute option order.
    pub const ALL: [Self; 8] = [
        Self::Greater,
        Self::GreaterEqual,
        Self::Less,
        Self::LessEqual,
        Self::NotEqual,
        Self::Equal,
        Self::InRange,
        Self::NotInRange,
    ];

    /// Option labels of the `test_function` attribute.
    pub const LABELS: [&'static str; 8] = [
        "feedback > testValue",
        "feedback >= testValue",
        "feedback < testValue",
        "feedback <= testValue",
        "feedback != testValue",
        "feedback == testValue",
        "feedback INRANGE [testValue..rangeValue]",
        "feedback NOT INRANGE [testValue..rangeValue]",
    ];

    /// Function at option index `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether the function reads the range value.
    pub fn uses_range(self) -> bool {
        matches!(self, Self::InRange | Self::NotInRange)
    }

    /// Evaluates the function.
    pub fn test(self, feedback: f64, test: f64, range: f64) -> bool {
        let (lo, hi) = if test <= range { (test, range) } else { (range, test) };
        match self {
            Self::Greater => feedback > test,
            Self::GreaterEqual => feedback >= test,
            Self::Less => feedback < test,
            Self::LessEqual => feedback <= test,
            Self::NotEqual => !is_close(feedback, test, EPSILON),
            Self::Equal => is_close(feedback, test, EPSILON),
            Self::InRange => in_range(feedback, lo, hi),
            Self::NotInRange => !in_range(feedback, lo, hi),
        }
    }
}

impl fmt::Display for ConditionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::LABELS[*self as usize])
    }
}

/// Transition condition comparing a named feedback node against a value.
///
/// Missing classifier, unknown feedback node and a node that has not
/// received any sample yet all read as "not satisfied".
#[derive(Debug, Clone)]
pub struct StateTransitionFeedbackCondition {
    attributes: AttributeSet,
    events: Vec<EngineEvent>,
}

impl Default for StateTransitionFeedbackCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTransitionFeedbackCondition {
    /// Creates a `feedback > 0` condition with no feedback node bound.
    pub fn new() -> Self {
        let attributes = AttributeSet::new()
            .with(Attribute::text("feedback", "Feedback Node Name", ""))
            .with(Attribute::float("test_value", "Test Value", 0.0, f64::MIN, f64::MAX))
            .with(Attribute::float("range_value", "Range Value", 0.0, f64::MIN, f64::MAX).hidden())
            .with(Attribute::choice(
                "test_function",
                "Test Function",
                &ConditionFunction::LABELS,
                ConditionFunction::Greater as usize,
            ));
        Self {
            attributes,
            events: Vec::new(),
        }
    }

    /// Current attributes.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Writes one attribute. Selecting a range function shows `range_value`.
    pub fn set_attribute(&mut self, id: &str, value: AttributeValue) -> Result<bool, AttributeError> {
        let changed = self.attributes.set(id, value)?;
        if changed && self.attributes.set_visible("range_value", self.function().uses_range()) {
            self.events.push(EngineEvent::AttributeUpdated {
                node: None,
                attribute: "range_value",
            });
        }
        Ok(changed)
    }

    /// Takes every `AttributeUpdated` event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Name of the feedback node under test.
    pub fn feedback_name(&self) -> &str {
        self.attributes.text("feedback")
    }

    /// Selected comparison.
    pub fn function(&self) -> ConditionFunction {
        ConditionFunction::from_index(self.attributes.choice("test_function")).unwrap_or_default()
    }

    /// Evaluates the condition against the running graph.
    pub fn test(&self, classifier: Option<&dyn Classifier>) -> bool {
        let Some(reading) = classifier.and_then(|c| c.feedback(self.feedback_name())) else {
            return false;
        };
        if reading.is_empty {
            return false;
        }
        self.function().test(
            reading.current_value(),
            self.attributes.float("test_value"),
            self.attributes.float("range_value"),
        )
    }
}
