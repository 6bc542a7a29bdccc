//! Property-based tests for neuro-engine.
//!
//! Covers condition function symmetries and graph structure invariants
//! under randomized connection attempts.

use neuro_engine::{ConditionFunction, NodeType, SignalGraph};
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f64> {
    -1.0e6f64..1.0e6f64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Range tests do not depend on which bound is entered first.
    #[test]
    fn in_range_is_bound_order_independent(v in finite(), a in finite(), b in finite()) {
        for f in [ConditionFunction::InRange, ConditionFunction::NotInRange] {
            prop_assert_eq!(f.test(v, a, b), f.test(v, b, a));
        }
    }

    /// In-range and not-in-range always disagree.
    #[test]
    fn range_functions_are_complementary(v in finite(), a in finite(), b in finite()) {
        prop_assert_ne!(
            ConditionFunction::InRange.test(v, a, b),
            ConditionFunction::NotInRange.test(v, a, b)
        );
    }

    /// Equal and not-equal always disagree, and equality is symmetric.
    #[test]
    fn equality_is_symmetric(a in finite(), offset in -1.0e-5f64..1.0e-5) {
        let b = a + offset;
        let eq = ConditionFunction::Equal.test(a, b, 0.0);
        prop_assert_eq!(eq, ConditionFunction::Equal.test(b, a, 0.0));
        prop_assert_ne!(eq, ConditionFunction::NotEqual.test(a, b, 0.0));
    }

    /// Whatever connections are attempted, the graph stays acyclic: every
    /// edge runs forward in the topological order.
    #[test]
    fn random_connections_keep_graph_acyclic(
        pairs in prop::collection::vec((0usize..6, 0usize..6), 0..30),
    ) {
        let mut graph = SignalGraph::with_buffer_size(0);
        let ids: Vec<_> = (0..6)
            .map(|i| graph.add(NodeType::Smooth, format!("s{i}")))
            .collect();
        for (from, to) in pairs {
            let _ = graph.connect(ids[from], 0, ids[to], 0);
        }

        let order = graph.topological_order().unwrap();
        prop_assert_eq!(order.len(), ids.len());
        let position = |id| order.iter().position(|&o| o == id);
        for (_, edge) in graph.edges() {
            prop_assert!(position(edge.from) < position(edge.to));
        }
    }
}
