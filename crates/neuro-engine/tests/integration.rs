//! Integration tests for neuro-engine.
//!
//! Builds small session graphs, drives them tick by tick and fires actions
//! and conditions against the running graph through its classifier view.

use neuro_engine::{
    Action, ActionContext, ActionError, ActionKind, AssetRegistry, Classifier, ConditionFunction,
    EngineEvent, GraphError, NodeError, NodeId, NodeType, SignalGraph,
    StateTransitionFeedbackCondition,
};
use neuro_core::AttributeValue;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// input -> remap [0, 10] -> [0, 1] -> feedback "focus"
fn focus_graph() -> (SignalGraph, NodeId, NodeId, NodeId) {
    let mut graph = SignalGraph::with_buffer_size(0);
    let input = graph.add(NodeType::Input, "eeg");
    let remap = graph.add(NodeType::Remap, "scale");
    let feedback = graph.add(NodeType::Feedback, "focus");
    graph
        .set_attribute(remap, "input_max", AttributeValue::Float(10.0))
        .unwrap();
    graph.connect(input, 0, remap, 0).unwrap();
    graph.connect(remap, 0, feedback, 0).unwrap();
    (graph, input, remap, feedback)
}

fn fire(action: &mut Action, graph: &mut SignalGraph) -> (Result<(), ActionError>, Vec<EngineEvent>) {
    let mut assets = AssetRegistry::new();
    let mut events: Vec<EngineEvent> = Vec::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut ctx = ActionContext {
        assets: &mut assets,
        events: &mut events,
        classifier: Some(graph as &mut dyn Classifier),
        rng: &mut rng,
    };
    let result = action.execute(&mut ctx);
    (result, events)
}

// ============================================================================
// 1. Streaming through the graph
// ============================================================================

#[test]
fn samples_flow_from_input_to_feedback_in_one_tick() {
    let (mut graph, input, remap, _) = focus_graph();
    graph.push_samples(input, &[2.0, 5.0, 8.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();

    let scaled: Vec<f64> = graph.scalar_output(remap, 0).unwrap().iter().copied().collect();
    assert_eq!(scaled.len(), 3);
    assert!((scaled[2] - 0.8).abs() < 1e-12);

    let focus = graph.feedback("focus").unwrap();
    assert!(!focus.is_empty);
    assert!((focus.current_value() - 0.8).abs() < 1e-12);
}

#[test]
fn remap_port_name_tracks_output_range() {
    let (mut graph, _, remap, _) = focus_graph();
    graph
        .set_attribute(remap, "output_max", AttributeValue::Float(100.0))
        .unwrap();
    let node = graph.node(remap).unwrap();
    assert_eq!(node.ports().outputs[0].name, "[0, 100]");
}

#[test]
fn removing_upstream_node_empties_feedback() {
    let (mut graph, input, remap, feedback) = focus_graph();
    graph.push_samples(input, &[5.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();
    assert!(!graph.feedback("focus").unwrap().is_empty);

    graph.remove_node(remap).unwrap();
    assert_eq!(graph.edge_count(), 0);
    graph.tick(0.2, 0.1).unwrap();

    assert!(graph.feedback("focus").unwrap().is_empty);
    assert!(!graph.node(feedback).unwrap().is_initialized());
}

#[test]
fn connect_errors_leave_graph_unchanged() {
    let (mut graph, input, remap, feedback) = focus_graph();
    let before = graph.edge_count();

    assert!(matches!(
        graph.connect(input, 0, remap, 0),
        Err(GraphError::DuplicateEdge(..))
    ));
    assert!(matches!(
        graph.connect(feedback, 0, input, 0),
        Err(GraphError::PortNotFound { .. })
    ));
    assert!(matches!(
        graph.connect(feedback, 0, remap, 0),
        Err(GraphError::PortNotFound { .. })
    ));
    let other = graph.add(NodeType::Input, "eeg2");
    assert!(matches!(
        graph.connect(other, 0, feedback, 0),
        Err(GraphError::InputAlreadyConnected { .. })
    ));
    let fft = graph.add(NodeType::Fft, "fft");
    graph.connect(input, 0, fft, 0).unwrap();
    assert!(matches!(
        graph.connect(fft, 0, feedback, 0),
        Err(GraphError::PortTypeMismatch { .. })
    ));
    assert!(matches!(
        graph.connect(remap, 0, input, 0),
        Err(GraphError::PortNotFound { .. })
    ));
    assert_eq!(graph.edge_count(), before + 1);
}

#[test]
fn fft_node_emits_spectra() {
    let mut graph = SignalGraph::with_buffer_size(0);
    let input = graph.add(NodeType::Input, "eeg");
    let fft = graph.add(NodeType::Fft, "fft");
    graph
        .set_attribute(fft, "zero_padding", AttributeValue::Bool(true))
        .unwrap();
    graph.connect(input, 0, fft, 0).unwrap();

    let signal: Vec<f64> = (0..256)
        .map(|i| (2.0 * std::f64::consts::PI * 16.0 * f64::from(i) / 128.0).sin())
        .collect();
    graph.push_samples(input, &signal).unwrap();
    graph.tick(2.0, 2.0).unwrap();

    assert!(graph.spectrum_output(fft, 0).unwrap().num_samples() > 0);
    assert!(graph.scalar_output(fft, 0).is_none());
}

/// Input running as an event stream (0 Hz) into a fresh `node_type` node.
fn event_stream_into(node_type: NodeType) -> (SignalGraph, NodeId, NodeId) {
    let mut graph = SignalGraph::with_buffer_size(0);
    let input = graph.add(NodeType::Input, "events");
    let node = graph.add(node_type, "held");
    graph
        .set_attribute(input, "sample_rate", AttributeValue::Float(0.0))
        .unwrap();
    graph.connect(input, 0, node, 0).unwrap();
    (graph, input, node)
}

/// Ticks an event stream into `node`, checks it is suspended and flagged,
/// then gives the input a rate and checks the node comes back.
fn assert_suspends_until_rate_is_valid(
    mut graph: SignalGraph,
    input: NodeId,
    node: NodeId,
    resumed_port: &str,
) {
    graph.push_samples(input, &[1.0, 2.0, 3.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();

    let suspended = graph.node(node).unwrap();
    assert!(!suspended.is_initialized());
    assert_eq!(
        suspended.status().error(NodeError::InputConstantSampleRate),
        Some("Input must have a valid sample rate.")
    );
    assert_eq!(graph.scalar_output(node, 0).unwrap().sample_counter(), 0);

    graph
        .set_attribute(input, "sample_rate", AttributeValue::Float(128.0))
        .unwrap();
    graph.push_samples(input, &[4.0]).unwrap();
    graph.tick(0.2, 0.1).unwrap();

    let resumed = graph.node(node).unwrap();
    assert!(resumed.is_initialized());
    assert!(!resumed.status().has_error());
    assert_eq!(resumed.ports().outputs[0].name, resumed_port);
    assert_eq!(graph.scalar_output(node, 0).unwrap().sample_rate(), 128.0);
}

#[test]
fn delay_by_time_suspends_on_event_stream() {
    let (mut graph, input, delay) = event_stream_into(NodeType::Delay);
    graph
        .set_attribute(delay, "delay_seconds", AttributeValue::Float(1.0))
        .unwrap();
    assert_suspends_until_rate_is_valid(graph, input, delay, "1.00s");
}

#[test]
fn delay_by_samples_suspends_on_event_stream() {
    let (mut graph, input, delay) = event_stream_into(NodeType::Delay);
    graph
        .set_attribute(delay, "set_by_time", AttributeValue::Bool(false))
        .unwrap();
    graph
        .set_attribute(delay, "delay_samples", AttributeValue::Int(2))
        .unwrap();
    assert_suspends_until_rate_is_valid(graph, input, delay, "2 smpl");
}

#[test]
fn freeze_by_time_suspends_on_event_stream() {
    let (graph, input, freeze) = event_stream_into(NodeType::Freeze);
    assert_suspends_until_rate_is_valid(graph, input, freeze, "1.00s");
}

#[test]
fn freeze_by_sample_count_runs_on_event_stream() {
    let (mut graph, input, freeze) = event_stream_into(NodeType::Freeze);
    graph
        .set_attribute(freeze, "delay_type", AttributeValue::Choice(1))
        .unwrap();
    graph
        .set_attribute(freeze, "delay_samples", AttributeValue::Int(2))
        .unwrap();
    graph.push_samples(input, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();

    let node = graph.node(freeze).unwrap();
    assert!(node.is_initialized());
    assert!(!node.status().has_error());
    let out: Vec<f64> = graph.scalar_output(freeze, 0).unwrap().iter().copied().collect();
    assert_eq!(out, vec![1.0, 2.0, 3.0, 3.0]);
}

// ============================================================================
// 2. Actions against the running graph
// ============================================================================

#[test]
fn parameter_action_sets_parameter_node_channel() {
    let mut graph = SignalGraph::with_buffer_size(0);
    let gain = graph.add_with_channels(NodeType::Parameter, "gain", 2);

    let mut action = Action::new(ActionKind::Parameter);
    action.set_attribute("parameter_name", "gain".into()).unwrap();
    action.set_attribute("parameter_channel_index", 1.into()).unwrap();
    action.set_attribute("value", 0.7.into()).unwrap();

    let (result, events) = fire(&mut action, &mut graph);
    assert!(result.is_ok());
    assert!(events.is_empty());
    assert_eq!(graph.parameter_values("gain"), Some(&[0.0, 0.7][..]));
    assert_eq!(graph.node(gain).unwrap().ports().outputs[1].name, "0.70");

    action.set_attribute("parameter_channel_index", 2.into()).unwrap();
    let (result, _) = fire(&mut action, &mut graph);
    assert!(matches!(
        result,
        Err(ActionError::ParameterChannel { index: 2, len: 2, .. })
    ));
}

#[test]
fn parameter_action_copies_feedback_value() {
    let (mut graph, input, _, _) = focus_graph();
    graph.add(NodeType::Parameter, "target");
    graph.push_samples(input, &[5.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();

    let mut action = Action::new(ActionKind::Parameter);
    action.set_attribute("parameter_name", "target".into()).unwrap();
    action
        .set_attribute("function", "Set to Feedback Value ".into())
        .unwrap();
    action.set_attribute("feedback_name", "focus".into()).unwrap();

    let (result, _) = fire(&mut action, &mut graph);
    assert!(result.is_ok());
    assert_eq!(graph.parameter_values("target"), Some(&[0.5][..]));
}

#[test]
fn show_text_reads_feedback_from_graph() {
    let (mut graph, input, _, _) = focus_graph();
    graph.push_samples(input, &[3.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();

    let mut action = Action::new(ActionKind::ShowText);
    action
        .set_attribute("text", "Focus: ${focus}".into())
        .unwrap();
    let (_, events) = fire(&mut action, &mut graph);
    assert!(matches!(
        &events[..],
        [EngineEvent::ShowText { text, .. }] if text == "Focus: 0.30"
    ));
}

// ============================================================================
// 3. Conditions
// ============================================================================

#[test]
fn condition_follows_feedback_over_ticks() {
    let (mut graph, input, _, _) = focus_graph();
    let mut condition = StateTransitionFeedbackCondition::new();
    condition.set_attribute("feedback", "focus".into()).unwrap();
    condition
        .set_attribute(
            "test_function",
            AttributeValue::Choice(ConditionFunction::InRange as usize),
        )
        .unwrap();
    condition.set_attribute("test_value", 0.9.into()).unwrap();
    condition.set_attribute("range_value", 0.4.into()).unwrap();

    assert!(!condition.test(Some(&graph)));

    graph.push_samples(input, &[6.0]).unwrap();
    graph.tick(0.1, 0.1).unwrap();
    assert!(condition.test(Some(&graph)));

    graph.push_samples(input, &[1.0]).unwrap();
    graph.tick(0.2, 0.1).unwrap();
    assert!(!condition.test(Some(&graph)));
}
