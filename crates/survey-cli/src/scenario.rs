//! Mission snapshots: loading from JSON and generating random demo scenarios.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use survey_core::{offset_by_bearing, Aircraft, Algorithm, Camera, GeoPoint, MissionRequest};

/// Read a `MissionRequest` snapshot from a JSON file.
pub fn load_request(path: &Path) -> Result<MissionRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read mission file {}", path.display()))?;
    parse_request(&raw).with_context(|| format!("invalid mission file {}", path.display()))
}

pub fn parse_request(raw: &str) -> Result<MissionRequest> {
    serde_json::from_str(raw).context("mission JSON does not match the request schema")
}

/// A named random survey with the seed that reproduces it.
pub struct DemoScenario {
    pub name: String,
    pub seed: u64,
    pub request: MissionRequest,
}

/// Build a random survey around (center_lat, center_lon).
///
/// The area is a star-shaped polygon about `size_m` across; camera and
/// aircraft are drawn from plausible catalog ranges. The same seed always
/// yields the same scenario.
pub fn create_demo_scenario(
    center_lat: f64,
    center_lon: f64,
    size_m: f64,
    seed: Option<u64>,
) -> DemoScenario {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let area = random_area(&mut rng, center_lat, center_lon, size_m);
    let camera = random_camera(&mut rng);
    let aircraft = random_aircraft(&mut rng);
    let altitude_m = rng.random_range(aircraft.min_altitude_m..aircraft.max_altitude_m.min(150.0));

    let (start_lat, start_lon) =
        offset_by_bearing(center_lat, center_lon, size_m * 0.75, 225.0_f64.to_radians());

    DemoScenario {
        name: format!("random-{}", seed),
        seed,
        request: MissionRequest {
            area,
            camera: Some(camera),
            aircraft: Some(aircraft),
            altitude_m,
            overlap: rng.random_range(0.2..0.5),
            start: GeoPoint::new(start_lat, start_lon),
            algorithm: Algorithm::default(),
            direction_deg: None,
            launch_altitude_m: 0.0,
            return_to_launch: true,
        },
    }
}

fn random_area(rng: &mut StdRng, center_lat: f64, center_lon: f64, size_m: f64) -> Vec<GeoPoint> {
    let vertices = rng.random_range(5..9);
    let sector = 360.0 / vertices as f64;
    (0..vertices)
        .map(|k| {
            // One vertex per sector keeps the ring simple.
            let bearing = (k as f64 + rng.random_range(0.15..0.85)) * sector;
            let radius = size_m * rng.random_range(0.3..0.5);
            let (lat, lon) = offset_by_bearing(center_lat, center_lon, radius, bearing.to_radians());
            GeoPoint::new(lat, lon)
        })
        .collect()
}

fn random_camera(rng: &mut StdRng) -> Camera {
    Camera::new(
        format!("Fake Camera {}", rng.random_range(1..100)),
        rng.random_range(100..1000),
        rng.random_range(30.0..120.0),
        rng.random_range(1000..6000),
        rng.random_range(800..4000),
    )
}

fn random_aircraft(rng: &mut StdRng) -> Aircraft {
    Aircraft::new(
        format!("Fake Drone {}", rng.random_range(1..100)),
        rng.random_range(500..2000),
        rng.random_range(10 * 60..30 * 60),
        rng.random_range(5.0..15.0),
        rng.random_range(10.0..25.0),
        rng.random_range(10.0..50.0),
        rng.random_range(100.0..500.0),
    )
}
