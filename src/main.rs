use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod api;
mod config;
mod domain;
mod geojson;
mod geometry;
mod runner;

use api::fetch_plates;
use config::FileConfig;
use domain::PlateSet;
use geojson::{load_plates, parse_plates};
use geometry::Bounds;
use runner::{BenchOptions, BenchReport, Benchmark, ExecMode};

/// Benchmark sequential vs parallel area computation over plate-boundary polygons
///
/// Examples:
///   # Fetch the default plate-boundary dataset and run with all CPUs
///   platebench
///
///   # Use a local GeoJSON dataset with 4 workers
///   platebench -i data/PB2002_plates.json -w 4
///
///   # Disable the synthetic per-polygon latency and print every area
///   platebench -i plates.json --latency-ms 0 --show-areas
///
///   # Use a config file
///   platebench --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "platebench")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches platebench.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a local GeoJSON dataset of plate polygons
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Fetch the dataset from this URL instead of the configured mirrors
    #[arg(long)]
    url: Option<String>,

    /// Number of parallel workers (defaults to available CPUs)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Synthetic per-polygon latency in milliseconds, 0 to disable
    #[arg(long, default_value = "200")]
    latency_ms: u64,

    /// Abort a benchmark phase that runs longer than this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the computed area of every plate
    #[arg(long)]
    show_areas: bool,

    /// Print per-polygon timing diagnostics to stderr
    #[arg(long)]
    per_unit_timing: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let input = args
        .input
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.input.clone()));
    let url = args
        .url
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.url.clone()));
    let workers = args
        .workers
        .or_else(|| file_config.as_ref().and_then(|c| c.workers))
        .unwrap_or_else(|| num_cpus::get().max(1));
    let latency_ms = if args.latency_ms != 200 {
        args.latency_ms
    } else {
        file_config.as_ref().map(|c| c.latency_ms).unwrap_or(200)
    };
    let timeout_secs = args
        .timeout_secs
        .or_else(|| file_config.as_ref().and_then(|c| c.timeout_secs));
    let show_areas =
        args.show_areas || file_config.as_ref().map(|c| c.show_areas).unwrap_or(false);
    let per_unit_timing = args.per_unit_timing
        || file_config
            .as_ref()
            .map(|c| c.per_unit_timing)
            .unwrap_or(false);
    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);

    let mut source_config = file_config
        .as_ref()
        .and_then(|c| c.source.clone())
        .unwrap_or_default();
    if let Some(override_url) = url {
        source_config.urls = vec![override_url];
    }

    if workers == 0 {
        bail!("--workers must be at least 1");
    }

    println!("platebench - Plate Polygon Area Benchmark");
    println!("==========================================");
    println!();

    if verbose {
        println!("Configuration:");
        if let Some(ref path) = input {
            println!("  Input: {}", path.display());
        } else {
            println!("  Source mirrors: {}", source_config.urls.len());
        }
        println!("  Workers: {}", workers);
        println!("  Latency: {}ms", latency_ms);
        if let Some(secs) = timeout_secs {
            println!("  Timeout: {}s", secs);
        }
        println!();
    }

    let plates = if let Some(ref path) = input {
        let spinner = create_spinner("Loading plate polygons...");
        let start = Instant::now();
        let set = load_plates(path).context("Failed to load plate dataset")?;
        spinner.finish_with_message(format!(
            "Loaded {} plate polygons [{:.1}s]",
            set.len(),
            start.elapsed().as_secs_f32()
        ));
        set
    } else {
        let spinner = create_spinner("Fetching plate polygons...");
        let start = Instant::now();
        let collection =
            fetch_plates(&source_config).context("Failed to fetch plate dataset")?;
        let parsed = parse_plates(&collection);
        if parsed.is_empty() {
            bail!("No usable plate polygons in fetched dataset");
        }
        let set = PlateSet::new(parsed);
        spinner.finish_with_message(format!(
            "Fetched {} plate polygons [{:.1}s]",
            set.len(),
            start.elapsed().as_secs_f32()
        ));
        set
    };

    println!("CPUs available: {}", num_cpus::get());
    println!("Plates to compute: {}", plates.len());

    if verbose && let Some(bounds) = Bounds::from_plates(&plates) {
        println!(
            "  Dataset extent: {:.1} x {:.1} ({:.1}..{:.1}, {:.1}..{:.1})",
            bounds.width(),
            bounds.height(),
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y
        );
    }
    println!();

    let opts = BenchOptions {
        workers,
        latency: Duration::from_millis(latency_ms),
        deadline: timeout_secs.map(Duration::from_secs),
        per_unit_timing: per_unit_timing || verbose,
    };

    let plates = Arc::new(plates);
    let benchmark = Benchmark::new(plates.clone(), &opts);

    let spinner = create_spinner("Computing areas sequentially...");
    let sequential = benchmark
        .run_phase(ExecMode::Sequential)
        .context("Sequential run failed")?;
    spinner.finish_with_message(format!(
        "Sequential run finished [{:.2}s]",
        sequential.elapsed.as_secs_f32()
    ));

    let spinner = create_spinner(format!("Computing areas with {} workers...", workers));
    let parallel = benchmark
        .run_phase(ExecMode::Parallel)
        .context("Parallel run failed")?;
    spinner.finish_with_message(format!(
        "Parallel run finished [{:.2}s]",
        parallel.elapsed.as_secs_f32()
    ));

    let report = BenchReport::from_phases(sequential, parallel)
        .context("Sequential and parallel runs disagree")?;

    println!();
    println!("Results");
    println!("-------");
    println!(
        "  Sequential: {:.3}s",
        report.sequential.elapsed.as_secs_f64()
    );
    println!(
        "  Parallel:   {:.3}s ({} workers)",
        report.parallel.elapsed.as_secs_f64(),
        workers
    );
    println!("  Speedup:    {:.2}x", report.speedup());

    if show_areas {
        println!();
        println!("Plate areas (squared dataset units):");
        for (plate, area) in plates.iter().zip(report.areas()) {
            println!("  {:<28} {:>18.4}", plate.name, area);
        }
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
