//! Neuro CLI - run and inspect neurofeedback session graphs.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuro")]
#[command(author, version, about = "Neurofeedback signal graph CLI", long_about = None)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session graph on a synthetic signal
    Run(commands::run::RunArgs),

    /// Validate a session graph and print its structure
    Check(commands::check::CheckArgs),

    /// Print color mapping presets and unique colors
    Colors(commands::colors::ColorsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Colors(args) => commands::colors::run(args),
    }
}
