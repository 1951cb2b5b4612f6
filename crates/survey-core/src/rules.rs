//! Planner tunables.

use crate::models::Algorithm;
use serde::{Deserialize, Serialize};

/// Configuration for the planning engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerRules {
    /// Maximum waypoint count (start excluded) accepted by BruteForce
    pub brute_force_limit: usize,
    /// Largest odd-vertex set solved exactly by the matching step
    pub exact_matching_limit: usize,
    /// How far past the 3° half-width of a UTM zone a point may lie (degrees)
    pub zone_overrun_tolerance_deg: f64,
    /// Distance under which the start point counts as coinciding with a waypoint (meters)
    pub coincidence_tolerance_m: f64,
    /// Algorithm used instead of BruteForce when the ceiling is exceeded.
    /// `None` turns the ceiling into a hard error.
    pub complexity_fallback: Option<Algorithm>,
}

impl Default for PlannerRules {
    fn default() -> Self {
        Self {
            brute_force_limit: 10,
            exact_matching_limit: 18,
            zone_overrun_tolerance_deg: 1.0,
            coincidence_tolerance_m: 1e-3,
            complexity_fallback: None,
        }
    }
}
