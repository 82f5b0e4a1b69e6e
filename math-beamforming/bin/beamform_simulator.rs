//! Acoustic propagation and delay-and-sum imaging
//!
//! Usage:
//!   cargo run --release --bin beamform_simulator -- --config scenario.json --output field.json
//!   cargo run --release --bin beamform_simulator -- --help

use clap::Parser;
use math_audio_beamforming::{PeakImage, ScenarioConfig, create_output_json};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "beamform-simulator")]
#[command(about = "Simulate emitters and receivers, then image the source with delay-and-sum", long_about = None)]
struct Args {
    /// Path to JSON scenario file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON file path
    #[arg(short, long, default_value = "field.json")]
    output: PathBuf,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Write the default scenario to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(path) = &args.dump_config {
        ScenarioConfig::default().to_file(path)?;
        println!("Default scenario written to: {}", path.display());
        return Ok(());
    }

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
        println!("Using {} threads\n", threads);
    }

    let config = if let Some(config_path) = &args.config {
        println!("Loading scenario from: {}", config_path.display());
        ScenarioConfig::from_file(config_path)?
    } else {
        println!("No scenario file specified, using default line array");
        ScenarioConfig::default()
    };

    print_config_summary(&config);

    let scenario = config.to_scenario()?;

    println!("\n=== Forward Simulation ===");
    let start = Instant::now();
    let recorded = scenario.simulate()?;
    println!("  {} receivers recorded in {:.2?}", recorded.len(), start.elapsed());

    println!("\n=== Beamforming ===");
    let start = Instant::now();
    let field = scenario.reconstruct(&recorded)?;
    let (rows, cols, samples) = field.shape();
    println!(
        "  {} x {} grid, {} samples per point in {:.2?}",
        rows,
        cols,
        samples,
        start.elapsed()
    );

    let image = PeakImage::from_field(&field);
    println!(
        "  Peak at ({:.4}, {:.4}) [row {}, col {}], amplitude {:.4e}",
        image.peak.x, image.peak.y, image.peak.row, image.peak.col, image.peak.amplitude
    );

    println!("\nSaving results to: {}", args.output.display());
    let output = create_output_json(&scenario, &config.metadata, &field);
    fs::write(&args.output, serde_json::to_string_pretty(&output)?)?;
    println!("Done!");

    Ok(())
}

fn print_config_summary(config: &ScenarioConfig) {
    println!("\n=== Scenario Summary ===");
    if !config.metadata.description.is_empty() {
        println!("  {}", config.metadata.description);
    }
    println!("  Speed of sound: {} m/s", config.speed_of_sound);
    println!(
        "  Time axis: {} samples, step {:.3e} s, start {} s",
        config.time_axis.num_samples, config.time_axis.step, config.time_axis.start
    );
    println!("  Emitters: {}", config.emitters.len());
    for emitter in &config.emitters {
        println!(
            "    '{}' at ({}, {}): {} cycles at {} Hz, amplitude {}",
            emitter.name,
            emitter.x,
            emitter.y,
            emitter.waveform.n_cycles,
            emitter.waveform.center_frequency,
            emitter.waveform.amplitude
        );
    }
    println!("  Receivers: {}", config.receivers.len());
    println!(
        "  Grid: {} x {} over x [{}, {}], y [{}, {}]",
        config.grid.ny,
        config.grid.nx,
        config.grid.x_min,
        config.grid.x_max,
        config.grid.y_min,
        config.grid.y_max
    );
}
