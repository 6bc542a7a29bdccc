//! Parameter updates driven by state-machine actions.
//!
//! A parameter action addresses one channel of a named [`ParameterNode`]
//! and rewrites it with one of the [`ParameterFunction`]s. Every check
//! (classifier present, node found, channel index in range, feedback node
//! found) happens before anything is written, so a failed action never
//! leaves a partial update behind. The one exception is
//! [`ParameterFunction::MultiFeedback`], which copies as many channels as
//! both nodes have and silently ignores the rest.
//!
//! [`ParameterNode`]: crate::nodes::ParameterNode

use neuro_core::{Attribute, AttributeSet};
use rand::{Rng, RngCore};

use crate::context::Classifier;
use crate::error::ActionError;

/// How a parameter action computes the new channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterFunction {
    /// Replace with `value`.
    #[default]
    Set,
    /// Add `value`.
    Increase,
    /// Subtract `value`.
    Decrease,
    /// Multiply by `value`.
    Scale,
    /// Uniform random number between `rand_min` and `rand_max`.
    Random,
    /// Copy one channel of a feedback node.
    Feedback,
    /// Copy every channel of a feedback node.
    MultiFeedback,
}

impl ParameterFunction {
    /// Every function, in attribute option order.
    pub const ALL: [Self; 7] = [
        Self::Set,
        Self::Increase,
        Self::Decrease,
        Self::Scale,
        Self::Random,
        Self::Feedback,
        Self::MultiFeedback,
    ];

    /// Option labels of the `function` attribute.
    pub const LABELS: [&'static str; 7] = [
        "Set to Value",
        "Increase by Value",
        "Decrease by Value",
        "Scale by Value",
        "Set Random [MinValue, MaxValue]",
        "Set to Feedback Value ",
        "Set to Feedback Value (all channels)",
    ];

    /// Function at option index `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }

    /// Whether the function reads a feedback node.
    pub fn uses_feedback(self) -> bool {
        matches!(self, Self::Feedback | Self::MultiFeedback)
    }
}

/// Registers the parameter action attributes.
pub(crate) fn register(attributes: &mut AttributeSet) {
    attributes.add(Attribute::text("parameter_name", "Parameter Name", ""));
    attributes.add(Attribute::int(
        "parameter_channel_index",
        "Parameter Channel Index",
        0,
        0,
        i32::MAX,
    ));
    attributes.add(Attribute::choice(
        "function",
        "Function",
        &ParameterFunction::LABELS,
        ParameterFunction::Set as usize,
    ));
    attributes.add(Attribute::float("value", "Value", 1.0, f64::MIN, f64::MAX));
    attributes.add(Attribute::text("feedback_name", "Feedback Name", "").hidden());
    attributes.add(
        Attribute::int(
            "feedback_channel_index",
            "Feedback Channel Index",
            0,
            0,
            i32::MAX,
        )
        .hidden(),
    );
    attributes.add(Attribute::float("rand_min", "Random Min Value", 0.0, f64::MIN, f64::MAX).hidden());
    attributes.add(Attribute::float("rand_max", "Random Max Value", 1.0, f64::MIN, f64::MAX).hidden());
}

/// Visibility of every function-dependent attribute.
pub(crate) fn visibility(function: ParameterFunction) -> [(&'static str, bool); 6] {
    use ParameterFunction::{Feedback, MultiFeedback, Random};
    [
        ("value", !matches!(function, Random | Feedback | MultiFeedback)),
        ("rand_min", function == Random),
        ("rand_max", function == Random),
        ("feedback_name", function.uses_feedback()),
        ("feedback_channel_index", function == Feedback),
        ("parameter_channel_index", function != MultiFeedback),
    ]
}

/// Function selected in `attributes`.
pub(crate) fn function(attributes: &AttributeSet) -> ParameterFunction {
    ParameterFunction::from_index(attributes.choice("function")).unwrap_or_default()
}

fn index(attributes: &AttributeSet, id: &str) -> usize {
    usize::try_from(attributes.int(id)).unwrap_or(0)
}

/// Applies the configured update to the classifier's parameter node.
pub(crate) fn execute(
    attributes: &AttributeSet,
    classifier: Option<&mut (dyn Classifier + '_)>,
    rng: &mut dyn RngCore,
) -> Result<(), ActionError> {
    let name = attributes.text("parameter_name");
    let channel = index(attributes, "parameter_channel_index");
    let function = function(attributes);

    let Some(classifier) = classifier else {
        return Err(ActionError::NoClassifier(name.to_string()));
    };

    let current = {
        let values = classifier
            .parameter_values(name)
            .ok_or_else(|| ActionError::ParameterNotFound(name.to_string()))?;
        if channel >= values.len() {
            return Err(ActionError::ParameterChannel {
                name: name.to_string(),
                index: channel,
                len: values.len(),
            });
        }
        values[channel]
    };

    let feedback = if function.uses_feedback() {
        let feedback_name = attributes.text("feedback_name");
        let reading = classifier
            .feedback(feedback_name)
            .ok_or_else(|| ActionError::FeedbackNotFound {
                parameter: name.to_string(),
                feedback: feedback_name.to_string(),
            })?;
        let feedback_channel = index(attributes, "feedback_channel_index");
        if feedback_channel >= reading.values.len() {
            return Err(ActionError::FeedbackChannel {
                parameter: name.to_string(),
                feedback: feedback_name.to_string(),
                index: feedback_channel,
                len: reading.values.len(),
            });
        }
        (reading.values.to_vec(), feedback_channel)
    } else {
        (Vec::new(), 0)
    };

    let value = attributes.float("value");
    let new_value = match function {
        ParameterFunction::Set => value,
        ParameterFunction::Increase => current + value,
        ParameterFunction::Decrease => current - value,
        ParameterFunction::Scale => current * value,
        ParameterFunction::Random => {
            let (a, b) = (attributes.float("rand_min"), attributes.float("rand_max"));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            lo + rng.r#gen::<f64>() * (hi - lo)
        }
        ParameterFunction::Feedback => feedback.0[feedback.1],
        ParameterFunction::MultiFeedback => {
            let num_channels = classifier
                .parameter_values(name)
                .map_or(0, <[f64]>::len)
                .min(feedback.0.len());
            for (i, &v) in feedback.0.iter().take(num_channels).enumerate() {
                classifier.set_parameter_value(name, i, v);
                tracing::debug!(
                    "action_parameter: {name}[{i}] = {v:.2} from '{}'",
                    attributes.text("feedback_name")
                );
            }
            return Ok(());
        }
    };

    classifier.set_parameter_value(name, channel, new_value);
    tracing::debug!("action_parameter: {name}[{channel}] = {new_value}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FeedbackReading;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct Fake {
        parameters: Vec<(String, Vec<f64>)>,
        feedback: Vec<(String, Vec<f64>)>,
    }

    impl Classifier for Fake {
        fn feedback_names(&self) -> Vec<String> {
            self.feedback.iter().map(|(n, _)| n.clone()).collect()
        }

        fn feedback(&self, name: &str) -> Option<FeedbackReading<'_>> {
            self.feedback
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| FeedbackReading {
                    values: v,
                    is_empty: false,
                })
        }

        fn parameter_values(&self, name: &str) -> Option<&[f64]> {
            self.parameters
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_slice())
        }

        fn set_parameter_value(&mut self, name: &str, channel: usize, value: f64) -> bool {
            self.parameters
                .iter_mut()
                .find(|(n, _)| n == name)
                .and_then(|(_, v)| v.get_mut(channel))
                .map(|slot| *slot = value)
                .is_some()
        }
    }

    fn fake() -> Fake {
        Fake {
            parameters: vec![("gain".into(), vec![2.0, 3.0])],
            feedback: vec![("score".into(), vec![0.25, 0.5, 0.75])],
        }
    }

    fn attrs(function: ParameterFunction) -> AttributeSet {
        let mut a = AttributeSet::new();
        register(&mut a);
        a.set("parameter_name", "gain".into()).unwrap();
        a.set("function", neuro_core::AttributeValue::Choice(function as usize))
            .unwrap();
        a
    }

    fn run(a: &AttributeSet, c: &mut Fake) -> Result<(), ActionError> {
        let mut rng = StdRng::seed_from_u64(7);
        execute(a, Some(c), &mut rng)
    }

    #[test]
    fn test_arithmetic_functions_read_target_channel() {
        let mut c = fake();
        let mut a = attrs(ParameterFunction::Increase);
        a.set("parameter_channel_index", 1.into()).unwrap();
        a.set("value", 0.5.into()).unwrap();
        run(&a, &mut c).unwrap();
        assert_eq!(c.parameters[0].1, vec![2.0, 3.5]);

        a.set("function", neuro_core::AttributeValue::Choice(3)).unwrap();
        run(&a, &mut c).unwrap();
        assert_eq!(c.parameters[0].1, vec![2.0, 1.75]);
    }

    #[test]
    fn test_random_stays_within_swapped_bounds() {
        let mut c = fake();
        let mut a = attrs(ParameterFunction::Random);
        a.set("rand_min", 10.0.into()).unwrap();
        a.set("rand_max", 5.0.into()).unwrap();
        for _ in 0..20 {
            run(&a, &mut c).unwrap();
            let v = c.parameters[0].1[0];
            assert!((5.0..=10.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn test_feedback_copy_and_multi_copy() {
        let mut c = fake();
        let mut a = attrs(ParameterFunction::Feedback);
        a.set("feedback_name", "score".into()).unwrap();
        a.set("feedback_channel_index", 2.into()).unwrap();
        run(&a, &mut c).unwrap();
        assert_eq!(c.parameters[0].1, vec![0.75, 3.0]);

        a.set("function", neuro_core::AttributeValue::Choice(6)).unwrap();
        run(&a, &mut c).unwrap();
        assert_eq!(c.parameters[0].1, vec![0.25, 0.5]);
    }

    #[test]
    fn test_failures_leave_values_untouched() {
        let mut c = fake();
        let mut a = attrs(ParameterFunction::Set);
        a.set("parameter_channel_index", 5.into()).unwrap();
        assert_eq!(
            run(&a, &mut c),
            Err(ActionError::ParameterChannel {
                name: "gain".into(),
                index: 5,
                len: 2
            })
        );

        let mut a = attrs(ParameterFunction::Feedback);
        a.set("feedback_name", "missing".into()).unwrap();
        assert!(matches!(run(&a, &mut c), Err(ActionError::FeedbackNotFound { .. })));

        a.set("parameter_name", "nope".into()).unwrap();
        assert!(matches!(run(&a, &mut c), Err(ActionError::ParameterNotFound(_))));
        assert_eq!(c.parameters[0].1, vec![2.0, 3.0]);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            execute(&a, None, &mut rng),
            Err(ActionError::NoClassifier(_))
        ));
    }

    #[test]
    fn test_visibility_per_function() {
        let v = visibility(ParameterFunction::MultiFeedback);
        assert!(v.contains(&("value", false)));
        assert!(v.contains(&("feedback_name", true)));
        assert!(v.contains(&("feedback_channel_index", false)));
        assert!(v.contains(&("parameter_channel_index", false)));

        let v = visibility(ParameterFunction::Random);
        assert!(v.contains(&("rand_min", true)));
        assert!(v.contains(&("value", false)));
    }
}
