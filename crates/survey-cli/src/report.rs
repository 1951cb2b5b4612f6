//! Human-readable and JSON mission reports.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use survey_core::MissionPlan;

/// JSON report written by plan_mission.
#[derive(Debug, Serialize)]
pub struct MissionReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub feasible: bool,
    pub plan: &'a MissionPlan,
}

impl<'a> MissionReport<'a> {
    pub fn new(plan: &'a MissionPlan) -> Self {
        Self {
            generated_at: Utc::now(),
            feasible: plan.is_feasible(),
            plan,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Multi-line summary of a plan for terminal output.
pub fn render_summary(plan: &MissionPlan) -> String {
    let metrics = &plan.metrics;
    let footprint = &plan.footprint;
    let mut out = String::new();

    let _ = writeln!(out, "Mission plan ({})", plan.algorithm);
    let _ = writeln!(out, "  UTM zone:        {}", plan.zone);
    let _ = writeln!(
        out,
        "  Footprint:       {:.1} m x {:.1} m ({:.2} cm/px)",
        footprint.width_m,
        footprint.height_m,
        footprint.ground_sampling_m * 100.0
    );
    let _ = writeln!(
        out,
        "  Spacing:         {:.1} m along, {:.1} m across (heading {:.1}°)",
        footprint.along_track_spacing_m, footprint.cross_track_spacing_m, plan.scan_heading_deg
    );
    let _ = writeln!(out, "  Photos:          {}", metrics.photo_count);
    let _ = writeln!(out, "  Route length:    {:.1} m", metrics.route_length_m);
    if metrics.return_leg_m > 0.0 {
        let _ = writeln!(out, "  Return leg:      {:.1} m", metrics.return_leg_m);
    }
    let _ = writeln!(
        out,
        "  Duration:        {:.0} s (climb {:.0} s, cruise {:.0} s, descent {:.0} s)",
        metrics.duration_s, metrics.climb_s, metrics.cruise_s, metrics.descent_s
    );

    if plan.violations.is_empty() {
        let _ = writeln!(out, "  Constraints:     ok");
    } else {
        let _ = writeln!(out, "  Violations:");
        for violation in &plan.violations {
            let _ = writeln!(out, "    - {}", violation);
        }
    }
    out
}
