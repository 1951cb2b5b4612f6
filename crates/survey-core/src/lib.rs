pub mod christofides;
pub mod discretize;
pub mod error;
pub mod footprint;
pub mod matching;
pub mod metrics;
pub mod mission;
pub mod models;
pub mod projection;
pub mod route_engine;
pub mod rules;
pub mod spatial;

pub use discretize::{discretize_area, longest_edge_heading, ScanGrid};
pub use error::{PlanError, PlanResult};
pub use footprint::{compute_footprint, Footprint};
pub use matching::min_weight_perfect_matching;
pub use metrics::{check_constraints, compute_metrics, ConstraintViolation, FlightProfile, MissionMetrics};
pub use mission::{plan_mission, MissionPlan};
pub use models::{
    Aircraft, Algorithm, Camera, GeoPoint, MissionAction, MissionRequest, MissionWaypoint,
    PlanarPoint,
};
pub use projection::{Projection, UtmZone};
pub use route_engine::{plan, Route};
pub use rules::PlannerRules;
pub use spatial::offset_by_bearing;
