//! End-to-end mission planning from a parameter snapshot.
//!
//! Stages run in a fixed order: projection, polygon validation, footprint,
//! discretization, route optimization, metrics. Every input check happens
//! before route optimization starts.

use crate::discretize::discretize_area;
use crate::error::{PlanError, PlanResult};
use crate::footprint::{compute_footprint, Footprint};
use crate::metrics::{check_constraints, compute_metrics, ConstraintViolation, FlightProfile, MissionMetrics};
use crate::models::{
    Algorithm, GeoPoint, MissionAction, MissionRequest, MissionWaypoint, PlanarPoint,
};
use crate::projection::{Projection, UtmZone};
use crate::route_engine::{self, Route};
use crate::rules::PlannerRules;
use crate::spatial::{normalize_ring, validate_polygon};
use serde::{Deserialize, Serialize};

/// Complete result of one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPlan {
    pub zone: UtmZone,
    pub footprint: Footprint,
    /// Heading the scan lines were laid along, degrees clockwise from grid north
    pub scan_heading_deg: f64,
    /// Capture positions in boustrophedon order (planar)
    pub waypoints: Vec<PlanarPoint>,
    pub waypoints_geo: Vec<GeoPoint>,
    pub route: Route,
    /// Route vertices in flight order (geographic)
    pub route_geo: Vec<GeoPoint>,
    pub actions: Vec<MissionWaypoint>,
    /// Algorithm that produced the route; differs from the request on fallback
    pub algorithm: Algorithm,
    pub metrics: MissionMetrics,
    pub violations: Vec<ConstraintViolation>,
}

impl MissionPlan {
    /// True when no physical or planning limit is violated.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Plan a coverage mission for `request`.
pub fn plan_mission(request: &MissionRequest, rules: &PlannerRules) -> PlanResult<MissionPlan> {
    let area = normalize_ring(&request.area);
    if area.len() < 3 {
        return Err(PlanError::InvalidGeometry(format!(
            "area needs at least 3 distinct vertices, got {}",
            area.len()
        )));
    }

    let projection = Projection::for_area(&area, rules.zone_overrun_tolerance_deg)?;
    let polygon = projection.to_planar_all(&area)?;
    let start = projection.to_planar(request.start)?;
    validate_polygon(&polygon)?;

    let camera = request
        .camera
        .as_ref()
        .ok_or_else(|| PlanError::InvalidParameters("no camera selected".to_string()))?;
    let aircraft = request
        .aircraft
        .as_ref()
        .ok_or_else(|| PlanError::InvalidParameters("no aircraft selected".to_string()))?;
    aircraft.validate()?;
    if !request.launch_altitude_m.is_finite() {
        return Err(PlanError::InvalidParameters(format!(
            "launch altitude {} m is not finite",
            request.launch_altitude_m
        )));
    }
    if let Some(direction) = request.direction_deg.filter(|d| !d.is_finite()) {
        return Err(PlanError::InvalidParameters(format!(
            "scan direction {} is not finite",
            direction
        )));
    }

    let footprint = compute_footprint(camera, request.altitude_m, request.overlap)?;
    let grid = discretize_area(&polygon, &footprint, request.direction_deg)?;
    let waypoints = grid.waypoints();

    let (route, algorithm, fallback) = route_with_fallback(start, &waypoints, request.algorithm, rules)?;

    let metrics = compute_metrics(
        &route,
        aircraft,
        FlightProfile {
            altitude_m: request.altitude_m,
            launch_altitude_m: request.launch_altitude_m,
            return_to_launch: request.return_to_launch,
        },
    );
    let mut violations = check_constraints(&metrics, aircraft, camera, request.altitude_m);
    violations.extend(fallback);
    for violation in &violations {
        tracing::warn!("Mission constraint violated: {}", violation);
    }

    let route_geo = projection.to_geographic_all(&route.points);
    let actions = build_actions(request, &route_geo);

    tracing::info!(
        "Planned mission in zone {}: {} waypoints, {:.0} m, {:.0} s with {}",
        projection.zone(),
        waypoints.len(),
        metrics.route_length_m + metrics.return_leg_m,
        metrics.duration_s,
        algorithm
    );

    Ok(MissionPlan {
        zone: projection.zone(),
        footprint,
        scan_heading_deg: grid.heading_deg,
        waypoints_geo: projection.to_geographic_all(&waypoints),
        waypoints,
        route,
        route_geo,
        actions,
        algorithm,
        metrics,
        violations,
    })
}

/// Run the requested algorithm, substituting `rules.complexity_fallback`
/// when BruteForce is over its ceiling.
fn route_with_fallback(
    start: PlanarPoint,
    waypoints: &[PlanarPoint],
    algorithm: Algorithm,
    rules: &PlannerRules,
) -> PlanResult<(Route, Algorithm, Option<ConstraintViolation>)> {
    match route_engine::plan(start, waypoints, algorithm, rules) {
        Ok(route) => Ok((route, algorithm, None)),
        Err(PlanError::ComplexityLimitExceeded { requested, limit }) => {
            let Some(fallback) = rules
                .complexity_fallback
                .filter(|a| *a != Algorithm::BruteForce)
            else {
                return Err(PlanError::ComplexityLimitExceeded { requested, limit });
            };
            tracing::warn!(
                "{} waypoints exceed brute force limit {}; falling back to {}",
                requested,
                limit,
                fallback
            );
            let route = route_engine::plan(start, waypoints, fallback, rules)?;
            Ok((
                route,
                fallback,
                Some(ConstraintViolation::ComplexityLimitExceeded {
                    requested,
                    limit,
                    fallback,
                }),
            ))
        }
        Err(e) => Err(e),
    }
}

/// TakeOff at the start, TakePhoto at each capture point, Land back at the
/// start when returning to launch.
fn build_actions(request: &MissionRequest, route_geo: &[GeoPoint]) -> Vec<MissionWaypoint> {
    let mut actions = Vec::with_capacity(route_geo.len() + 1);
    let Some((&start, captures)) = route_geo.split_first() else {
        return actions;
    };

    actions.push(MissionWaypoint {
        position: start,
        altitude_m: request.launch_altitude_m,
        action: MissionAction::TakeOff,
    });
    actions.extend(captures.iter().map(|&position| MissionWaypoint {
        position,
        altitude_m: request.altitude_m,
        action: MissionAction::TakePhoto,
    }));
    if request.return_to_launch {
        actions.push(MissionWaypoint {
            position: start,
            altitude_m: request.launch_altitude_m,
            action: MissionAction::Land,
        });
    }
    actions
}
