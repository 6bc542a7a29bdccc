//! Validate a graph file and print its structure.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use neuro_config::GraphConfig;
use neuro_engine::{NodeError, NodeId};

/// Validate a session graph.
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the graph TOML file
    pub graph: PathBuf,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = GraphConfig::load(&args.graph)?;
    let mut built = config
        .build()
        .with_context(|| format!("invalid graph '{}'", args.graph.display()))?;

    let labels: HashMap<NodeId, &str> = built
        .node_ids
        .iter()
        .map(|(label, &id)| (id, label.as_str()))
        .collect();
    let label = |id: NodeId| labels.get(&id).copied().unwrap_or("?");

    println!("{}", config.name);
    println!("{}", "=".repeat(config.name.len()));
    if let Some(description) = &config.description {
        println!("{description}");
    }
    println!();

    println!("Nodes ({}):", built.graph.node_count());
    for node_config in &config.nodes {
        let Some(node) = built.node(&node_config.id).and_then(|id| built.graph.node(id)) else {
            continue;
        };
        let inputs: Vec<&str> = node.ports().inputs.iter().map(|p| p.name.as_str()).collect();
        let outputs: Vec<&str> = node.ports().outputs.iter().map(|p| p.name.as_str()).collect();
        println!(
            "  {:12} {:12} {:16} in: [{}]  out: [{}]",
            node_config.id,
            node.node_type(),
            node.name(),
            inputs.join(", "),
            outputs.join(", ")
        );
        if let Some(message) = node.status().error(NodeError::DuplicateName) {
            println!("  {:12} error: {message}", "");
        }
    }
    println!();

    println!("Connections ({}):", built.graph.edge_count());
    for (_, edge) in built.graph.edges() {
        println!(
            "  {}:{} -> {}:{}",
            label(edge.from),
            edge.from_port,
            label(edge.to),
            edge.to_port
        );
    }
    println!();

    let order = built.graph.topological_order()?;
    let order: Vec<&str> = order.into_iter().map(label).collect();
    println!("Processing order: {}", order.join(" -> "));
    println!();

    if !built.actions.is_empty() {
        println!("Actions ({}):", built.actions.len());
        for (i, action) in built.actions.iter().enumerate() {
            println!("  [{i}] {}", action.kind());
        }
        println!();
    }

    if !built.conditions.is_empty() {
        println!("Conditions ({}):", built.conditions.len());
        for (i, condition) in built.conditions.iter().enumerate() {
            let attributes = condition.attributes();
            let function = condition.function();
            if function.uses_range() {
                println!(
                    "  [{i}] {}: {} ({}, {})",
                    condition.feedback_name(),
                    function,
                    attributes.float("test_value"),
                    attributes.float("range_value")
                );
            } else {
                println!(
                    "  [{i}] {}: {} ({})",
                    condition.feedback_name(),
                    function,
                    attributes.float("test_value")
                );
            }
        }
        println!();
    }

    println!("OK");
    Ok(())
}
