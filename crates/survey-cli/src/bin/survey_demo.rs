//! Random survey scenario comparing the route algorithms.
//!
//! Plans the same area with every algorithm and prints route length,
//! duration and planning time side by side.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use survey_cli::{create_demo_scenario, CliConfig};
use survey_core::{plan_mission, Algorithm, PlanError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Compare route algorithms on a random survey area
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Center latitude
    #[arg(long, default_value_t = 39.0)]
    lat: f64,

    /// Center longitude
    #[arg(long, default_value_t = -119.5)]
    lon: f64,

    /// Approximate area diameter in meters
    #[arg(long, default_value_t = 400.0)]
    size_m: f64,

    /// Seed for a reproducible scenario
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("survey_cli=info".parse()?)
                .add_directive("survey_core=warn".parse()?),
        )
        .init();

    let args = Args::parse();
    let rules = CliConfig::from_env().rules();
    let scenario = create_demo_scenario(args.lat, args.lon, args.size_m, args.seed);

    println!("=== {} ===", scenario.name);
    println!("  Center: ({}, {}), size {} m", args.lat, args.lon, args.size_m);
    println!("  Area vertices: {}", scenario.request.area.len());
    if let (Some(camera), Some(aircraft)) = (&scenario.request.camera, &scenario.request.aircraft) {
        println!(
            "  Camera: {} (fov {:.0}°, {}x{})",
            camera.name, camera.fov_x_deg, camera.resolution_x, camera.resolution_y
        );
        println!(
            "  Aircraft: {} ({:.1} m/s, {} s endurance)",
            aircraft.name, aircraft.flight_speed_mps, aircraft.flight_duration_s
        );
    }
    println!(
        "  Altitude: {:.0} m, overlap {:.0}%",
        scenario.request.altitude_m,
        scenario.request.overlap * 100.0
    );
    println!("  Reproduce with --seed {}", scenario.seed);
    println!();

    for algorithm in Algorithm::ALL {
        let mut request = scenario.request.clone();
        request.algorithm = algorithm;

        let started = Instant::now();
        let result = plan_mission(&request, &rules);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(plan) => {
                println!(
                    "{:<22} photos={:<4} route={:>8.1} m  duration={:>6.0} s  violations={}  ({:.1} ms)",
                    algorithm.as_str(),
                    plan.metrics.photo_count,
                    plan.metrics.route_length_m,
                    plan.metrics.duration_s,
                    plan.violations.len(),
                    elapsed_ms
                );
            }
            Err(PlanError::ComplexityLimitExceeded { requested, limit }) => {
                println!(
                    "{:<22} skipped: {} waypoints above the limit of {} (set SURVEY_BRUTE_FORCE_LIMIT)",
                    algorithm.as_str(),
                    requested,
                    limit
                );
            }
            Err(e) => {
                eprintln!("{:<22} failed: {}", algorithm.as_str(), e);
            }
        }
    }

    Ok(())
}
