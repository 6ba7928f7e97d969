//! VectorKit command-line converter
//!
//! # Commands
//!
//! - `vectorkit convert --from <fmt> --to <fmt> <input> <output>`
//! - `vectorkit inspect --from <fmt> <input>`

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use vectorkit::{init_logging, read_job, write_job, Config, Format, VERSION};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// Converter between additive-manufacturing vector formats
#[derive(Parser)]
#[command(name = "vectorkit")]
#[command(version = VERSION)]
#[command(long_version = LONG_VERSION)]
struct Cli {
    /// Configuration file (.toml or .json); defaults to the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file from one format to another
    Convert(ConvertArgs),

    /// Print a summary of a file
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input format
    #[arg(long, value_enum)]
    from: Format,
    /// Output format
    #[arg(long, value_enum)]
    to: Format,
    /// Input file or container directory
    input: PathBuf,
    /// Output file or container directory
    output: PathBuf,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Input format
    #[arg(long, value_enum)]
    from: Format,
    /// Input file or container directory
    input: PathBuf,
}

fn convert(args: ConvertArgs, config: &Config) -> Result<()> {
    let job = read_job(args.from, &args.input, config)?;
    write_job(args.to, &job, &args.output, config)?;
    println!(
        "{} ({}) -> {} ({}): {} planes",
        args.input.display(),
        args.from,
        args.output.display(),
        args.to,
        job.num_work_planes
    );
    Ok(())
}

fn inspect(args: InspectArgs, config: &Config) -> Result<()> {
    let job = read_job(args.from, &args.input, config)?;

    println!("Job:            {}", job.metadata.job_name);
    if !job.metadata.version.is_empty() {
        println!("Version:        {}", job.metadata.version);
    }
    println!("Work planes:    {}", job.num_work_planes);
    println!("Blocks:         {}", job.blocks().count());
    println!("Params entries: {}", job.marking_params_map.len());
    if let Some(thickness) = job.layer_thickness() {
        println!("Layer spacing:  {thickness} mm");
    }
    if let Some(bounds) = job.bounds() {
        println!(
            "Bounds:         [{}, {}, {}] - [{}, {}, {}]",
            bounds.min[0], bounds.min[1], bounds.min[2], bounds.max[0], bounds.max[1], bounds.max[2]
        );
    }

    let mut variants: BTreeMap<&str, usize> = BTreeMap::new();
    for block in job.blocks() {
        *variants.entry(block.data.variant_name()).or_default() += 1;
    }
    if !variants.is_empty() {
        println!();
        println!("BLOCKS");
        for (variant, count) in variants {
            println!("  {variant:<16} {count}");
        }
    }

    if !job.parts_map.is_empty() {
        println!();
        println!("PARTS");
        for (key, part) in &job.parts_map {
            println!(
                "  {key:>4}  {:<24} {} mm",
                part.name, part.geometry.build_height_in_mm
            );
        }
    }

    println!();
    println!("MARKING PARAMS");
    for (key, params) in &job.marking_params_map {
        println!(
            "  {key:>4}  {} W, {} mm/s{}",
            params.laser_power_in_w,
            params.laser_speed_in_mm_per_s,
            if params.name.is_empty() {
                String::new()
            } else {
                format!(" ({})", params.name)
            }
        );
    }

    if let Err(err) = job.validate() {
        tracing::warn!(%err, "job violates a model invariant");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Convert(args) => convert(args, &config),
        Commands::Inspect(args) => inspect(args, &config),
    }
}
