//! Core data models for survey mission planning.

use crate::error::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic coordinate in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Point in the mission's planar frame, meters (easting, northing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Camera reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    /// Mass in grams
    #[serde(alias = "mass")]
    pub mass_g: u64,
    /// Horizontal field of view in degrees
    #[serde(alias = "fov_x")]
    pub fov_x_deg: f64,
    pub resolution_x: u16,
    pub resolution_y: u16,
}

impl Camera {
    pub fn new(
        name: impl Into<String>,
        mass_g: u64,
        fov_x_deg: f64,
        resolution_x: u16,
        resolution_y: u16,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            mass_g,
            fov_x_deg,
            resolution_x,
            resolution_y,
        }
    }

    pub fn validate(&self) -> PlanResult<()> {
        if !self.fov_x_deg.is_finite() || self.fov_x_deg <= 0.0 || self.fov_x_deg >= 180.0 {
            return Err(PlanError::InvalidParameters(format!(
                "camera '{}' field of view {}° must lie in (0°, 180°)",
                self.name, self.fov_x_deg
            )));
        }
        if self.resolution_x == 0 || self.resolution_y == 0 {
            return Err(PlanError::InvalidParameters(format!(
                "camera '{}' resolution {}x{} must be non-zero",
                self.name, self.resolution_x, self.resolution_y
            )));
        }
        Ok(())
    }
}

/// Aircraft (UAV) reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    /// Maximum payload in grams
    #[serde(alias = "max_payload_mass")]
    pub max_payload_mass_g: u64,
    /// Rated flight endurance in seconds
    #[serde(alias = "flight_duration")]
    pub flight_duration_s: u64,
    /// Vertical speed used for climb and descent, m/s
    #[serde(alias = "takeoff_speed")]
    pub takeoff_speed_mps: f64,
    /// Cruise speed, m/s
    #[serde(alias = "flight_speed")]
    pub flight_speed_mps: f64,
    #[serde(alias = "min_altitude")]
    pub min_altitude_m: f64,
    #[serde(alias = "max_altitude")]
    pub max_altitude_m: f64,
}

impl Aircraft {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        max_payload_mass_g: u64,
        flight_duration_s: u64,
        takeoff_speed_mps: f64,
        flight_speed_mps: f64,
        min_altitude_m: f64,
        max_altitude_m: f64,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            max_payload_mass_g,
            flight_duration_s,
            takeoff_speed_mps,
            flight_speed_mps,
            min_altitude_m,
            max_altitude_m,
        }
    }

    pub fn validate(&self) -> PlanResult<()> {
        let speeds = [
            ("takeoff", self.takeoff_speed_mps),
            ("flight", self.flight_speed_mps),
        ];
        for (label, speed) in speeds {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(PlanError::InvalidParameters(format!(
                    "aircraft '{}' {} speed {} m/s must be positive",
                    self.name, label, speed
                )));
            }
        }
        if !self.min_altitude_m.is_finite()
            || !self.max_altitude_m.is_finite()
            || self.min_altitude_m > self.max_altitude_m
        {
            return Err(PlanError::InvalidParameters(format!(
                "aircraft '{}' altitude range [{}, {}] is invalid",
                self.name, self.min_altitude_m, self.max_altitude_m
            )));
        }
        Ok(())
    }

    pub fn altitude_in_range(&self, altitude_m: f64) -> bool {
        altitude_m >= self.min_altitude_m && altitude_m <= self.max_altitude_m
    }
}

/// Route ordering strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Greedy nearest unvisited waypoint
    #[default]
    NearestNeighbor,
    /// MST + matching approximation, optional strategy
    ChristofidesAlgorithm,
    /// Exact permutation search, bounded by a node ceiling
    BruteForce,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::NearestNeighbor,
        Algorithm::ChristofidesAlgorithm,
        Algorithm::BruteForce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::NearestNeighbor => "NearestNeighbor",
            Algorithm::ChristofidesAlgorithm => "ChristofidesAlgorithm",
            Algorithm::BruteForce => "BruteForce",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "nearestneighbor" | "nn" => Ok(Algorithm::NearestNeighbor),
            "christofidesalgorithm" | "christofides" => Ok(Algorithm::ChristofidesAlgorithm),
            "bruteforce" | "exact" => Ok(Algorithm::BruteForce),
            other => Err(format!("unknown algorithm '{}'", other)),
        }
    }
}

/// Full parameter snapshot for one planning request.
///
/// Camera and aircraft are optional because the selection layer stages them
/// independently; planning fails with `InvalidParameters` while either is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRequest {
    /// Polygon ring; a closing vertex equal to the first is accepted
    pub area: Vec<GeoPoint>,
    #[serde(default)]
    pub camera: Option<Camera>,
    #[serde(default)]
    pub aircraft: Option<Aircraft>,
    pub altitude_m: f64,
    /// Image overlap fraction in [0, 1)
    pub overlap: f64,
    pub start: GeoPoint,
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Scan heading in degrees clockwise from grid north; longest edge when unset
    #[serde(default)]
    pub direction_deg: Option<f64>,
    /// Altitude of the launch point the climb starts from
    #[serde(default)]
    pub launch_altitude_m: f64,
    /// Fly back to the start point and descend after the last capture
    #[serde(default)]
    pub return_to_launch: bool,
}

/// Action performed at a mission waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionAction {
    TakeOff,
    TakePhoto,
    Land,
}

/// Route vertex annotated for the flight controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionWaypoint {
    pub position: GeoPoint,
    pub altitude_m: f64,
    pub action: MissionAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new("Survey Cam", 250, 60.0, 4000, 3000)
    }

    fn aircraft() -> Aircraft {
        Aircraft::new("Quad", 1200, 1500, 5.0, 12.0, 20.0, 120.0)
    }

    #[test]
    fn test_camera_validation_bounds() {
        assert!(camera().validate().is_ok());

        let mut wide = camera();
        wide.fov_x_deg = 180.0;
        assert!(matches!(wide.validate(), Err(PlanError::InvalidParameters(_))));

        let mut blind = camera();
        blind.resolution_y = 0;
        assert!(matches!(blind.validate(), Err(PlanError::InvalidParameters(_))));
    }

    #[test]
    fn test_aircraft_validation_bounds() {
        assert!(aircraft().validate().is_ok());

        let mut stalled = aircraft();
        stalled.flight_speed_mps = 0.0;
        assert!(stalled.validate().is_err());

        let mut inverted = aircraft();
        inverted.min_altitude_m = 200.0;
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!(
            "NearestNeighbor".parse::<Algorithm>(),
            Ok(Algorithm::NearestNeighbor)
        );
        assert_eq!(
            "christofides".parse::<Algorithm>(),
            Ok(Algorithm::ChristofidesAlgorithm)
        );
        assert_eq!("brute-force".parse::<Algorithm>(), Ok(Algorithm::BruteForce));
        assert!("dijkstra".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_catalog_records_accept_legacy_field_names() {
        let json = r#"{
            "id": 3, "name": "Fake Drone 7", "max_payload_mass": 900,
            "flight_duration": 1200, "takeoff_speed": 6.5, "flight_speed": 40.0,
            "min_altitude": 15.0, "max_altitude": 300.0
        }"#;
        let uav: Aircraft = serde_json::from_str(json).unwrap();
        assert_eq!(uav.flight_duration_s, 1200);
        assert_eq!(uav.max_altitude_m, 300.0);
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{
            "area": [{"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 0.001}, {"lat": 0.001, "lon": 0.0}],
            "altitude_m": 50.0, "overlap": 0.3, "start": {"lat": -0.001, "lon": 0.0}
        }"#;
        let request: MissionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.algorithm, Algorithm::NearestNeighbor);
        assert!(request.camera.is_none());
        assert!(!request.return_to_launch);
    }
}
