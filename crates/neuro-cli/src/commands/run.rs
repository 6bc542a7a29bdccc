//! Drive a session graph with a synthetic signal.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use neuro_config::GraphConfig;
use neuro_engine::{
    ActionContext, AssetRegistry, Classifier, EngineEvent, NodeId, NodeType, SignalGraph,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Run a session graph.
#[derive(Args)]
pub struct RunArgs {
    /// Path to the graph TOML file
    pub graph: PathBuf,

    /// Session length in seconds
    #[arg(long, default_value = "10.0")]
    pub duration: f64,

    /// Engine ticks per second
    #[arg(long, default_value = "10.0")]
    pub tick_rate: f64,

    /// Frequency of the synthetic signal's slow modulation in Hz
    #[arg(long, default_value = "0.1")]
    pub frequency: f64,

    /// Center value of the synthetic signal
    #[arg(long, default_value = "20.0")]
    pub offset: f64,

    /// Modulation depth of the synthetic signal
    #[arg(long, default_value = "15.0")]
    pub amplitude: f64,

    /// Peak amplitude of uniform noise added to every sample
    #[arg(long, default_value = "2.0")]
    pub noise: f64,

    /// Random seed for noise, cloud values and randomized actions
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Slowly modulated sine with uniform noise.
struct SyntheticSignal {
    frequency: f64,
    offset: f64,
    amplitude: f64,
    noise: f64,
}

impl SyntheticSignal {
    fn sample(&self, t: f64, rng: &mut impl Rng) -> f64 {
        let noise = if self.noise > 0.0 {
            rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        self.offset + self.amplitude * (std::f64::consts::TAU * self.frequency * t).sin() + noise
    }
}

/// An input node and how many samples it has been fed.
struct Feed {
    node: NodeId,
    sample_rate: f64,
    emitted: u64,
}

/// Run the run command.
pub fn run(args: RunArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.tick_rate > 0.0,
        "tick rate must be positive, got {}",
        args.tick_rate
    );

    let config = GraphConfig::load(&args.graph)?;
    let mut built = config
        .build()
        .with_context(|| format!("invalid graph '{}'", args.graph.display()))?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut assets = AssetRegistry::new();

    let signal = SyntheticSignal {
        frequency: args.frequency,
        offset: args.offset,
        amplitude: args.amplitude,
        noise: args.noise,
    };
    let mut feeds: Vec<Feed> = built
        .graph
        .nodes()
        .filter(|node| node.node_type() == NodeType::Input)
        .map(|node| Feed {
            node: node.id(),
            sample_rate: node.attributes().float("sample_rate"),
            emitted: 0,
        })
        .collect();
    if feeds.is_empty() {
        tracing::warn!("graph has no input nodes; only parameters and cloud inputs will produce data");
    }

    tracing::info!(
        graph = %config.name,
        duration = args.duration,
        tick_rate = args.tick_rate,
        "session started"
    );

    for (i, action) in built.actions.iter_mut().enumerate() {
        let mut events: Vec<EngineEvent> = Vec::new();
        let mut ctx = ActionContext {
            assets: &mut assets,
            events: &mut events,
            classifier: Some(&mut built.graph as &mut dyn Classifier),
            rng: &mut rng,
        };
        if let Err(e) = action.execute(&mut ctx) {
            println!("action [{i}] {} skipped: {e}", action.kind());
        }
        for event in events {
            println!("{:7.2}s  action [{i}]  {}", 0.0, describe(&event));
        }
    }

    let delta = 1.0 / args.tick_rate;
    let ticks = (args.duration * args.tick_rate).round().max(0.0) as u64;
    let mut states = vec![false; built.conditions.len()];

    for tick in 1..=ticks {
        let elapsed = tick as f64 * delta;

        for feed in &mut feeds {
            let due = (elapsed * feed.sample_rate).floor().max(0.0) as u64;
            let block: Vec<f64> = (feed.emitted..due)
                .map(|n| signal.sample(n as f64 / feed.sample_rate, &mut rng))
                .collect();
            feed.emitted = due;
            if !block.is_empty() {
                built.graph.push_samples(feed.node, &block)?;
            }
        }

        serve_cloud_requests(&mut built.graph, &mut rng)?;
        built.graph.tick(elapsed, delta)?;

        for event in built.graph.drain_events() {
            tracing::debug!(?event, "graph event");
        }

        for (i, condition) in built.conditions.iter().enumerate() {
            let satisfied = condition.test(Some(&built.graph));
            if satisfied != states[i] {
                states[i] = satisfied;
                println!(
                    "{elapsed:7.2}s  condition [{i}] {} {}: {}",
                    condition.feedback_name(),
                    condition.function(),
                    if satisfied { "met" } else { "not met" }
                );
            }
        }
    }

    println!();
    println!("Feedback after {:.2}s:", ticks as f64 * delta);
    for name in built.graph.feedback_names() {
        match built.graph.feedback(&name) {
            Some(reading) if !reading.is_empty => {
                let values: Vec<String> = reading.values.iter().map(|v| format!("{v:.3}")).collect();
                println!("  {name:16} {}", values.join(", "));
            }
            _ => println!("  {name:16} (no data)"),
        }
    }

    tracing::info!(ticks, "session finished");
    Ok(())
}

/// Answers every pending cloud request with uniform values in `[0, 1]`.
fn serve_cloud_requests(graph: &mut SignalGraph, rng: &mut impl Rng) -> anyhow::Result<()> {
    for request in graph.take_cloud_requests() {
        let count = request.count.max(1) as usize;
        let values: Vec<f64> = (0..count).map(|_| rng.r#gen::<f64>()).collect();
        tracing::debug!(name = %request.name, count, "serving cloud request");
        graph.deposit_cloud_values(request.node, &values)?;
    }
    Ok(())
}

fn describe(event: &EngineEvent) -> String {
    match event {
        EngineEvent::ShowText { text, color } => {
            format!("show text \"{text}\" in {}", color.to_hex_string())
        }
        EngineEvent::SetBackgroundColor { color } => {
            format!("background {}", color.to_hex_string())
        }
        EngineEvent::PlayAudio {
            url,
            num_loops,
            volume,
            ..
        } => format!("play audio {url} (loops {num_loops}, volume {volume:.2})"),
        EngineEvent::Command(command) => format!("command {command}"),
        other => format!("{other:?}"),
    }
}
