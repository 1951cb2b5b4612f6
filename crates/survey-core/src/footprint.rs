//! Ground footprint of a single photograph and the capture spacing it implies.

use crate::error::{PlanError, PlanResult};
use crate::models::Camera;
use serde::{Deserialize, Serialize};

/// Footprint dimensions and capture spacing for one camera/altitude/overlap setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Ground width across the image x axis, meters
    pub width_m: f64,
    /// Ground height across the image y axis, meters
    pub height_m: f64,
    /// Distance between captures along a scan line, meters
    pub along_track_spacing_m: f64,
    /// Distance between neighbouring scan lines, meters
    pub cross_track_spacing_m: f64,
    /// Ground sampling distance, meters per pixel
    pub ground_sampling_m: f64,
}

/// Compute the ground footprint of `camera` at `altitude_m` with the given overlap.
///
/// Width follows the pinhole projection of the horizontal field of view;
/// height is scaled from width by the sensor aspect ratio.
pub fn compute_footprint(camera: &Camera, altitude_m: f64, overlap: f64) -> PlanResult<Footprint> {
    if !altitude_m.is_finite() || altitude_m <= 0.0 {
        return Err(PlanError::InvalidParameters(format!(
            "altitude {} m must be positive",
            altitude_m
        )));
    }
    if !overlap.is_finite() || !(0.0..1.0).contains(&overlap) {
        return Err(PlanError::InvalidParameters(format!(
            "overlap {} must lie in [0, 1)",
            overlap
        )));
    }
    camera.validate()?;

    let half_fov = (camera.fov_x_deg / 2.0).to_radians();
    let width_m = 2.0 * altitude_m * half_fov.tan();
    let height_m = width_m * f64::from(camera.resolution_y) / f64::from(camera.resolution_x);

    Ok(Footprint {
        width_m,
        height_m,
        along_track_spacing_m: height_m * (1.0 - overlap),
        cross_track_spacing_m: width_m * (1.0 - overlap),
        ground_sampling_m: width_m / f64::from(camera.resolution_x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new("Survey Cam", 250, 60.0, 4000, 3000)
    }

    #[test]
    fn test_reference_footprint() {
        let footprint = compute_footprint(&camera(), 50.0, 0.3).unwrap();
        assert!((footprint.width_m - 57.735).abs() < 1e-3);
        assert!((footprint.height_m - 43.301).abs() < 1e-3);
        assert!((footprint.cross_track_spacing_m - 40.415).abs() < 1e-3);
        assert!((footprint.along_track_spacing_m - 30.311).abs() < 1e-3);
        assert!((footprint.ground_sampling_m - 0.014_434).abs() < 1e-5);
    }

    #[test]
    fn test_zero_overlap_spacing_equals_footprint() {
        let footprint = compute_footprint(&camera(), 100.0, 0.0).unwrap();
        assert_eq!(footprint.cross_track_spacing_m, footprint.width_m);
        assert_eq!(footprint.along_track_spacing_m, footprint.height_m);
    }

    #[test]
    fn test_rejects_undefined_spacing() {
        assert!(matches!(
            compute_footprint(&camera(), 0.0, 0.3),
            Err(PlanError::InvalidParameters(_))
        ));
        assert!(matches!(
            compute_footprint(&camera(), 50.0, 1.0),
            Err(PlanError::InvalidParameters(_))
        ));
        assert!(matches!(
            compute_footprint(&camera(), 50.0, -0.1),
            Err(PlanError::InvalidParameters(_))
        ));

        let mut fisheye = camera();
        fisheye.fov_x_deg = 190.0;
        assert!(compute_footprint(&fisheye, 50.0, 0.3).is_err());
    }
}
