//! CLI tool to plan a survey mission from a JSON snapshot.
//!
//! Reads a mission request, runs the planner on a blocking worker with a
//! deadline, and prints a summary or a JSON report. An expired deadline ends
//! the process without waiting for the abandoned planner.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use survey_cli::{load_request, render_summary, run_with_deadline, CliConfig, MissionReport};
use survey_core::{plan_mission, Algorithm};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Plan an aerial survey mission
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Mission request JSON file
    #[arg(long)]
    mission: PathBuf,

    /// Override the route algorithm (nearest-neighbor, christofides, brute-force)
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Override the scan heading in degrees clockwise from north
    #[arg(long)]
    direction: Option<f64>,

    /// Print the JSON report instead of the summary
    #[arg(long)]
    json: bool,

    /// Write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Planning deadline in seconds (defaults to SURVEY_TIMEOUT_SECS or 30)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("survey_cli=info".parse()?)
                .add_directive("survey_core=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = CliConfig::from_env();
    let rules = config.rules();

    let mut request = load_request(&args.mission)?;
    if let Some(algorithm) = args.algorithm {
        request.algorithm = algorithm;
    }
    if args.direction.is_some() {
        request.direction_deg = args.direction;
    }

    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.timeout_secs));
    tracing::info!(
        "Planning {} with {} (deadline {}s)",
        args.mission.display(),
        request.algorithm,
        timeout.as_secs()
    );

    let plan = run_with_deadline(timeout, move || plan_mission(&request, &rules))??;

    let report = MissionReport::new(&plan);
    if let Some(path) = &args.output {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", render_summary(&plan));
    }

    Ok(())
}
