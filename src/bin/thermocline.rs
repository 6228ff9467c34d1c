//! Thermocline detection CLI
//!
//! Reads one or more temperature-depth profiles, detects the thermocline in
//! each and prints one report line per input:
//!
//! ```text
//! detected thermocline location in data1.xlsx: -8.5~-14 m
//! ```
//!
//! # Usage
//!
//! ```text
//! thermocline data1.xlsx
//! thermocline --filter lowpass data2.xlsx --export data2_detection.txt
//! thermocline --json --rows 473 data1.xlsx data2.xlsx
//! ```
//!
//! Exit code 1 if any input could not be processed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

use thermocline_rs::{
    DetectionConfig, DetectionError, SheetLayout, SmoothingMode, ThermoclineDetector, load_profile,
    write_detection_file,
};

/// Detect the thermocline in temperature-depth profiles
#[derive(Parser)]
#[command(name = "thermocline")]
#[command(version)]
#[command(about = "Detect the thermocline in temperature-depth profiles")]
struct Cli {
    /// Profile files (.xlsx, .xls, .ods, or text/CSV)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Temperature smoothing: none or lowpass
    #[arg(short, long, default_value = "none")]
    filter: SmoothingMode,

    /// Worksheet name (defaults to Sheet1)
    #[arg(long)]
    sheet: Option<String>,

    /// Read the first worksheet instead of a named one
    #[arg(long, conflicts_with = "sheet")]
    first_sheet: bool,

    /// Depth column, 1-based
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    depth_column: u32,

    /// Temperature column, 1-based
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    temperature_column: u32,

    /// First data row, 1-based
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    first_row: u32,

    /// Number of data rows (default: up to the first empty row)
    #[arg(long)]
    rows: Option<usize>,

    /// Write depth/temperature/gradient/flag columns here (one input only)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print results as JSON instead of report lines
    #[arg(long)]
    json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn layout(&self) -> SheetLayout {
        let mut layout = SheetLayout {
            depth_column: self.depth_column as usize - 1,
            temperature_column: self.temperature_column as usize - 1,
            first_row: self.first_row as usize - 1,
            row_count: self.rows,
            ..SheetLayout::default()
        };
        if let Some(sheet) = &self.sheet {
            layout = layout.with_sheet(sheet.clone());
        } else if self.first_sheet {
            layout = layout.first_sheet();
        }
        layout
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.export.is_some() && cli.inputs.len() > 1 {
        eprintln!("--export accepts a single input file");
        return ExitCode::FAILURE;
    }

    let layout = cli.layout();
    let detector = ThermoclineDetector::new(DetectionConfig::default().with_smoothing(cli.filter));

    let mut failed = false;
    for input in &cli.inputs {
        if let Err(message) = run(&cli, &detector, &layout, input) {
            error!(input = %input.display(), "{}", message);
            eprintln!("{}: {}", input.display(), message);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(
    cli: &Cli,
    detector: &ThermoclineDetector,
    layout: &SheetLayout,
    input: &Path,
) -> Result<(), String> {
    let profile = load_profile(input, layout).map_err(|e| e.to_string())?;

    let result = match detector.detect(&profile) {
        Ok(result) => result,
        Err(DetectionError::NoThermocline) => {
            println!("{}", no_thermocline_output(profile.name().unwrap_or("profile"), cli.json));
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        println!("{}", result.report());
    }

    if let Some(path) = &cli.export {
        write_detection_file(path, &result)
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Output for a profile with no flagged gradient sample.
fn no_thermocline_output(source: &str, json: bool) -> String {
    if json {
        serde_json::json!({ "source": source, "thermocline": null }).to_string()
    } else {
        format!("no thermocline detected in {}", source)
    }
}
