//! Mission metrics and physical constraint checks.

use crate::models::{Aircraft, Algorithm, Camera};
use crate::route_engine::Route;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived figures for a planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionMetrics {
    /// Open-path length from the start through every waypoint, meters
    pub route_length_m: f64,
    /// Last waypoint back to the start, zero unless returning to launch
    pub return_leg_m: f64,
    pub climb_s: f64,
    pub cruise_s: f64,
    pub descent_s: f64,
    /// climb + cruise + descent
    pub duration_s: f64,
    pub photo_count: usize,
}

/// Physical or planning limit the mission does not meet.
///
/// Violations are reported next to a complete plan; they never abort it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintViolation {
    AltitudeOutOfRange {
        altitude_m: f64,
        min_altitude_m: f64,
        max_altitude_m: f64,
    },
    EnduranceExceeded {
        duration_s: f64,
        endurance_s: u64,
    },
    PayloadExceeded {
        camera_mass_g: u64,
        max_payload_mass_g: u64,
    },
    /// BruteForce was requested above its ceiling and `fallback` ran instead.
    ComplexityLimitExceeded {
        requested: usize,
        limit: usize,
        fallback: Algorithm,
    },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::AltitudeOutOfRange {
                altitude_m,
                min_altitude_m,
                max_altitude_m,
            } => write!(
                f,
                "altitude {:.1} m outside aircraft range [{:.1}, {:.1}] m",
                altitude_m, min_altitude_m, max_altitude_m
            ),
            ConstraintViolation::EnduranceExceeded {
                duration_s,
                endurance_s,
            } => write!(
                f,
                "estimated duration {:.0} s exceeds endurance {} s",
                duration_s, endurance_s
            ),
            ConstraintViolation::PayloadExceeded {
                camera_mass_g,
                max_payload_mass_g,
            } => write!(
                f,
                "camera mass {} g exceeds max payload {} g",
                camera_mass_g, max_payload_mass_g
            ),
            ConstraintViolation::ComplexityLimitExceeded {
                requested,
                limit,
                fallback,
            } => write!(
                f,
                "{} waypoints exceed the brute force limit of {}; planned with {}",
                requested, limit, fallback
            ),
        }
    }
}

/// Flight profile inputs that are not part of the route itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightProfile {
    pub altitude_m: f64,
    pub launch_altitude_m: f64,
    pub return_to_launch: bool,
}

/// Compute length, timing and photo count for `route` flown by `aircraft`.
pub fn compute_metrics(route: &Route, aircraft: &Aircraft, profile: FlightProfile) -> MissionMetrics {
    let route_length_m = route.length_m;
    let return_leg_m = match (profile.return_to_launch, route.points.first(), route.points.last()) {
        (true, Some(start), Some(last)) => last.distance_to(start),
        _ => 0.0,
    };

    let vertical_s = (profile.altitude_m - profile.launch_altitude_m).abs() / aircraft.takeoff_speed_mps;
    let climb_s = vertical_s;
    let descent_s = if profile.return_to_launch { vertical_s } else { 0.0 };
    let cruise_s = (route_length_m + return_leg_m) / aircraft.flight_speed_mps;

    MissionMetrics {
        route_length_m,
        return_leg_m,
        climb_s,
        cruise_s,
        descent_s,
        duration_s: climb_s + cruise_s + descent_s,
        photo_count: route.points.len().saturating_sub(1),
    }
}

/// Check the plan against the aircraft's limits.
pub fn check_constraints(
    metrics: &MissionMetrics,
    aircraft: &Aircraft,
    camera: &Camera,
    altitude_m: f64,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    if !aircraft.altitude_in_range(altitude_m) {
        violations.push(ConstraintViolation::AltitudeOutOfRange {
            altitude_m,
            min_altitude_m: aircraft.min_altitude_m,
            max_altitude_m: aircraft.max_altitude_m,
        });
    }

    if metrics.duration_s > aircraft.flight_duration_s as f64 {
        violations.push(ConstraintViolation::EnduranceExceeded {
            duration_s: metrics.duration_s,
            endurance_s: aircraft.flight_duration_s,
        });
    }

    if camera.mass_g > aircraft.max_payload_mass_g {
        violations.push(ConstraintViolation::PayloadExceeded {
            camera_mass_g: camera.mass_g,
            max_payload_mass_g: aircraft.max_payload_mass_g,
        });
    }

    violations
}
