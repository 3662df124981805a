//! Command-line interface for the lab plotting tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "sensor-lab")]
#[command(about = "Plot lab CSV captures: grids, solar power and IMU orientation", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory containing the CSV captures
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for the generated images
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot every capture in the data directory on one grid
    Grid {
        /// Number of grid columns
        #[arg(long)]
        columns: Option<usize>,
    },

    /// Estimate solar panel power from voltage/current capture pairs
    Solar {
        /// Column holding the measured value
        #[arg(long)]
        value_column: Option<usize>,
    },

    /// Animate a cube rotated by integrated IMU gyroscope data (GIF)
    ImuCube {
        /// Delay between animation frames in milliseconds
        #[arg(long)]
        frame_delay: Option<u32>,
    },

    /// Plot roll, pitch and yaw integrated from three gyroscope captures
    ImuAngles {
        /// Fixed time step in seconds (overrides timestamps)
        #[arg(long)]
        dt: Option<f64>,
    },

    /// Write the default configuration to a YAML file
    InitConfig {
        /// Output YAML path
        #[arg(default_value = "sensor-lab.yaml")]
        path: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Create a bar for animation frames
fn create_frame_bar(len: usize, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} frames") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(message.to_string());
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Directories for one run after applying command-line overrides.
struct RunPaths {
    data_dir: PathBuf,
    output_dir: PathBuf,
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    let paths = RunPaths {
        data_dir: cli.data_dir.unwrap_or_else(|| config.data.directory.clone()),
        output_dir: cli.output_dir.unwrap_or_else(|| config.data.output_dir.clone()),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Grid { columns } => cmd_grid(&paths, columns, config),
        Commands::Solar { value_column } => cmd_solar(&paths, value_column, config),
        Commands::ImuCube { frame_delay } => cmd_imu_cube(&paths, frame_delay, config),
        Commands::ImuAngles { dt } => cmd_imu_angles(&paths, dt, config),
        Commands::InitConfig { path } => cmd_init_config(&path),
    }
}

fn fail(context: &str, spinner: Option<&ProgressBar>, e: anyhow::Error) -> ! {
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    error!("{}: {:#}", context, e);
    std::process::exit(1);
}

fn cmd_grid(paths: &RunPaths, columns: Option<usize>, mut config: PipelineConfig) {
    use crate::processors::grid;
    use crate::visualization;

    let start = Instant::now();
    if let Some(columns) = columns {
        config.grid.columns = columns;
    }

    println!("Plotting CSV grid...");
    println!("Data directory: {}", paths.data_dir.display());

    let spinner = create_spinner("Loading CSV files...");
    let cells = match grid::load_grid_cells(&paths.data_dir, &config.grid) {
        Ok(cells) => cells,
        Err(e) => fail("Grid plot failed", Some(&spinner), e.into()),
    };

    spinner.set_message("Drawing grid...");
    let output_path = paths.output_dir.join("csv_grid.png");
    let layout = match visualization::plot_grid(&output_path, &cells, &config.grid)
        .with_context(|| format!("writing {}", output_path.display()))
    {
        Ok(layout) => layout,
        Err(e) => fail("Grid plot failed", Some(&spinner), e),
    };
    spinner.finish_and_clear();

    let unavailable = cells.iter().filter(|cell| !cell.is_loaded()).count();
    print_summary(
        "CSV Grid Complete",
        &[
            ("Data directory", paths.data_dir.display().to_string()),
            ("Files", cells.len().to_string()),
            ("Unavailable", unavailable.to_string()),
            ("Grid", format!("{} x {}", layout.rows, layout.cols)),
            ("Hidden cells", layout.hidden().to_string()),
            ("Output PNG", output_path.display().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_solar(paths: &RunPaths, value_column: Option<usize>, mut config: PipelineConfig) {
    use crate::processors::solar;
    use crate::visualization;

    let start = Instant::now();
    if let Some(column) = value_column {
        config.solar.value_column = column;
    }

    println!("Estimating solar panel power...");
    println!("Data directory: {}", paths.data_dir.display());

    let spinner = create_spinner("Pairing voltage and current captures...");
    let series = match solar::estimate_directory(&paths.data_dir, &config.solar) {
        Ok(series) => series,
        Err(e) => fail("Power estimation failed", Some(&spinner), e.into()),
    };

    if series.is_empty() {
        spinner.finish_and_clear();
        warn!("No complete voltage/current pairs in {}", paths.data_dir.display());
        print_summary(
            "Solar Power Complete",
            &[
                ("Data directory", paths.data_dir.display().to_string()),
                ("Groups plotted", "0".to_string()),
                ("Duration", format!("{:.2?}", start.elapsed())),
            ],
        );
        return;
    }

    spinner.set_message("Drawing power plots...");
    let output_path = paths.output_dir.join("solar_power.png");
    let layout = match visualization::plot_power_grid(&output_path, &series, &config.solar)
        .with_context(|| format!("writing {}", output_path.display()))
    {
        Ok(layout) => layout,
        Err(e) => fail("Power plot failed", Some(&spinner), e),
    };
    spinner.finish_and_clear();

    let mut items = vec![
        ("Data directory", paths.data_dir.display().to_string()),
        ("Groups", series.len().to_string()),
        ("Groups plotted", layout.used.to_string()),
    ];
    items.extend(series.iter().map(|s| ("Total power", format!("{} = {:.3} W", s.key, s.total()))));
    items.push(("Output PNG", output_path.display().to_string()));
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Solar Power Complete", &items);
}

fn cube_output_path(output_dir: &Path, key: &str) -> PathBuf {
    let key = if key.is_empty() { "imu" } else { key };
    output_dir.join(format!("orientation_{}.gif", key))
}

fn cmd_imu_cube(paths: &RunPaths, frame_delay: Option<u32>, mut config: PipelineConfig) {
    use crate::processors::{discovery, imu};
    use crate::visualization;

    let start = Instant::now();
    if let Some(delay) = frame_delay {
        config.imu.frame_delay_ms = delay;
    }

    println!("Visualizing IMU orientation...");
    println!("Data directory: {}", paths.data_dir.display());

    let spinner = create_spinner("Finding accelerometer and gyroscope captures...");
    let pairs = match discovery::find_imu_files(&paths.data_dir, &config.imu) {
        Ok(files) => discovery::pair_imu_files(&files, &config.imu),
        Err(e) => fail("IMU visualization failed", Some(&spinner), e.into()),
    };
    spinner.finish_and_clear();

    let (recordings, skipped) = match imu::load_recordings(&pairs, &config.imu) {
        Ok(result) => result,
        Err(e) => fail("IMU visualization failed", None, e.into()),
    };

    let mut outputs = Vec::with_capacity(recordings.len());
    let mut frames = 0usize;

    for recording in &recordings {
        let key = &recording.pair.key;
        let output_path = cube_output_path(&paths.output_dir, key);
        let bar = create_frame_bar(recording.samples.len(), key);
        match visualization::render_cube_animation(&output_path, recording, &config.imu, |_| bar.inc(1))
            .with_context(|| format!("writing {}", output_path.display()))
        {
            Ok(count) => {
                bar.finish_and_clear();
                info!("{}: {} frames -> {}", key, count, output_path.display());
                frames += count;
                outputs.push(output_path);
            }
            Err(e) => fail("IMU visualization failed", Some(&bar), e),
        }
    }

    let output_files: Vec<String> = outputs.iter().map(|p| p.display().to_string()).collect();
    print_summary(
        "IMU Orientation Complete",
        &[
            ("Data directory", paths.data_dir.display().to_string()),
            ("Pairs", pairs.len().to_string()),
            ("Pairs skipped", skipped.to_string()),
            ("Frames", frames.to_string()),
            ("Frame delay", format!("{} ms", config.imu.frame_delay_ms)),
            ("Output files", output_files.join(", ")),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_imu_angles(paths: &RunPaths, dt: Option<f64>, mut config: PipelineConfig) {
    use crate::processors::imu;
    use crate::visualization;

    let start = Instant::now();
    if dt.is_some() {
        config.imu_angles.dt = dt;
    }

    println!("Integrating gyroscope channels...");
    println!("Data directory: {}", paths.data_dir.display());

    let spinner = create_spinner("Loading gyroscope channels...");
    let (angles, dt) = match imu::compute_angles(&paths.data_dir, &config.imu_angles) {
        Ok(result) => result,
        Err(e) => fail("Angle integration failed", Some(&spinner), e.into()),
    };

    spinner.set_message("Drawing roll, pitch and yaw...");
    let output_path = paths.output_dir.join("imu_angles.png");
    if let Err(e) = visualization::plot_euler_angles(&output_path, &angles, dt, &config.imu_angles)
        .with_context(|| format!("writing {}", output_path.display()))
    {
        fail("Angle plot failed", Some(&spinner), e);
    }
    spinner.finish_and_clear();

    let final_angle = |axis: &[f64]| {
        axis.last()
            .map(|&a| format!("{:.2} deg", crate::core::transforms::rad_to_deg(a)))
            .unwrap_or_default()
    };

    print_summary(
        "IMU Angles Complete",
        &[
            ("Data directory", paths.data_dir.display().to_string()),
            ("Samples", angles.len().to_string()),
            ("Time step", format!("{:.6} s", dt)),
            ("Final roll", final_angle(&angles.roll)),
            ("Final pitch", final_angle(&angles.pitch)),
            ("Final yaw", final_angle(&angles.yaw)),
            ("Output PNG", output_path.display().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_init_config(path: &Path) {
    match write_default_config(path) {
        Ok(()) => print_summary(
            "Config Written",
            &[("Config file", path.display().to_string())],
        ),
        Err(e) => fail("Writing config failed", None, e),
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    PipelineConfig::default()
        .to_yaml(path)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("writing {}", path.display()))
}
