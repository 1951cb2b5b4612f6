//! Typed planning failures.

use thiserror::Error;

/// Reasons a planning request is rejected.
///
/// All of these are raised before any route optimization starts, except
/// `ComplexityLimitExceeded`, which is raised by the BruteForce optimizer
/// before it begins its permutation search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Polygon with fewer than 3 distinct vertices, self-intersection or zero area.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Altitude, overlap, camera or aircraft values that make planning undefined.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Coordinates that cannot be projected into a single planar zone.
    #[error("projection error: {0}")]
    Projection(String),
    /// BruteForce requested for more waypoints than the configured ceiling.
    #[error("brute force is limited to {limit} waypoints, request has {requested}")]
    ComplexityLimitExceeded { requested: usize, limit: usize },
}

pub type PlanResult<T> = Result<T, PlanError>;
