//! Print color mapping presets and the unique color sequence.

use anyhow::anyhow;
use clap::Args;
use neuro_core::{Color, ColorMapper, ColorMapping};

/// Print color mappings.
#[derive(Args)]
pub struct ColorsArgs {
    /// Only print this mapping (e.g. "Rainbow", "Grey-Scale")
    #[arg(long)]
    pub mapping: Option<String>,

    /// Number of evenly spaced samples per mapping
    #[arg(long, default_value = "11")]
    pub steps: usize,

    /// Also print the first N unique channel colors
    #[arg(long, default_value = "0")]
    pub unique: u32,
}

/// Run the colors command.
pub fn run(args: ColorsArgs) -> anyhow::Result<()> {
    let mappings: Vec<ColorMapping> = match &args.mapping {
        Some(name) => vec![
            ColorMapping::from_name(name).ok_or_else(|| anyhow!("unknown color mapping: {name}"))?,
        ],
        None => ColorMapping::ALL.to_vec(),
    };
    let steps = args.steps.max(2);

    for mapping in mappings {
        let mapper = ColorMapper::with_mapping(mapping);
        println!("{}", mapping.name());
        println!("{}", "-".repeat(mapping.name().len()));
        for line in gradient(&mapper, steps) {
            println!("  {line}");
        }
        println!();
    }

    if args.unique > 0 {
        println!("Unique colors");
        println!("-------------");
        for i in 0..args.unique {
            println!("  {i:3}  {}", Color::unique(i).to_hex_string());
        }
    }

    Ok(())
}

/// `steps` rows of `value  #RRGGBB` covering `[0, 1]`.
fn gradient(mapper: &ColorMapper, steps: usize) -> Vec<String> {
    (0..steps)
        .map(|i| {
            let value = i as f64 / (steps - 1) as f64;
            format!("{value:.2}  {}", mapper.calc_color(value).to_hex_string())
        })
        .collect()
}
