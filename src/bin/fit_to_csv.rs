use std::fs;
use std::path::PathBuf;
use clap::Parser;
use log::{error, info};
use daicho::errors::DaichoError::InvalidArgumentError;
use daicho::errors::DaichoResult;
use daicho::services::tracker::export_to_csv;

/// Transform fitness tracker export data to CSV.
#[derive(Parser)]
#[command(name = "fit_to_csv", version)]
struct Args {
    /// Tracker export file (JSON array of records)
    input: PathBuf,
    /// Output CSV path. Defaults to the input path with a .csv extension.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> DaichoResult<()> {
    let export = fs::read_to_string(&args.input)
        .map_err(|e| InvalidArgumentError(format!("Cannot read {}: {}", args.input.display(), e)))?;

    let csv = export_to_csv(&export)?;

    let output = args.output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("csv"));
    fs::write(&output, csv)
        .map_err(|e| InvalidArgumentError(format!("Cannot write {}: {}", output.display(), e)))?;
    info!("Wrote {}", output.display());

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
