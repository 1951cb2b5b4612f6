//! Spatial math for survey areas: planar polygon predicates and distances.

use crate::error::{PlanError, PlanResult};
use crate::models::{GeoPoint, PlanarPoint};

/// Epsilon in meters. Used on projected coordinates to absorb floating-point
/// error from projection and arithmetic.
pub const EPS_M: f64 = 1e-6;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate great-circle distance between two points in meters (Haversine formula).
#[cfg(test)]
pub(crate) fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Destination point `distance_m` from (lat, lon) along `bearing_rad`
/// (clockwise from north) on a spherical earth.
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;
    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_ad, cos_ad) = angular_distance.sin_cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lon2 = (lon + y.atan2(x).to_degrees() + 180.0).rem_euclid(360.0) - 180.0;
    (lat2.to_degrees(), lon2)
}

/// Drop repeated consecutive vertices and an explicit closing vertex.
pub fn normalize_ring(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    const EPS_DEG: f64 = 1e-12;
    let same = |a: &GeoPoint, b: &GeoPoint| {
        (a.lat - b.lat).abs() <= EPS_DEG && (a.lon - b.lon).abs() <= EPS_DEG
    };

    let mut out: Vec<GeoPoint> = Vec::with_capacity(ring.len());
    for point in ring {
        if out.last().is_some_and(|last| same(last, point)) {
            continue;
        }
        out.push(*point);
    }
    while out.len() > 1 && same(&out[0], &out[out.len() - 1]) {
        out.pop();
    }
    out
}

/// Shoelace area; positive for counter-clockwise rings.
pub fn signed_area(polygon: &[PlanarPoint]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Ray casting point-in-polygon test (even-odd rule).
pub fn point_in_polygon(point: PlanarPoint, polygon: &[PlanarPoint]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Minimum distance from a point to a segment.
pub fn distance_to_segment(point: PlanarPoint, start: PlanarPoint, end: PlanarPoint) -> f64 {
    let sx = end.x - start.x;
    let sy = end.y - start.y;
    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq < EPS_M * EPS_M {
        return point.distance_to(&start);
    }

    // Project point onto segment line: t = ((P-A) · (B-A)) / |B-A|²
    let t = (((point.x - start.x) * sx + (point.y - start.y) * sy) / seg_len_sq).clamp(0.0, 1.0);
    point.distance_to(&PlanarPoint::new(start.x + t * sx, start.y + t * sy))
}

/// Inside test that also accepts points within `tolerance_m` of an edge.
pub fn point_in_or_on_polygon(point: PlanarPoint, polygon: &[PlanarPoint], tolerance_m: f64) -> bool {
    if point_in_polygon(point, polygon) {
        return true;
    }
    let n = polygon.len();
    (0..n).any(|i| distance_to_segment(point, polygon[i], polygon[(i + 1) % n]) <= tolerance_m)
}

fn orient(p: PlanarPoint, q: PlanarPoint, r: PlanarPoint) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

fn within(a: f64, b: f64, value: f64) -> bool {
    let min = a.min(b) - EPS_M;
    let max = a.max(b) + EPS_M;
    value >= min && value <= max
}

fn on_segment(p: PlanarPoint, q: PlanarPoint, r: PlanarPoint) -> bool {
    within(p.x, q.x, r.x) && within(p.y, q.y, r.y)
}

/// True when segments a1-a2 and b1-b2 cross, touch or overlap.
pub fn segments_intersect_2d(
    a1: PlanarPoint,
    a2: PlanarPoint,
    b1: PlanarPoint,
    b2: PlanarPoint,
) -> bool {
    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_M && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_M && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_M && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_M && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_M && o2 < -EPS_M) || (o1 < -EPS_M && o2 > EPS_M);
    let b_crosses = (o3 > EPS_M && o4 < -EPS_M) || (o3 < -EPS_M && o4 > EPS_M);
    a_crosses && b_crosses
}

/// Check that a projected ring is a simple polygon with non-zero area.
pub fn validate_polygon(polygon: &[PlanarPoint]) -> PlanResult<()> {
    let n = polygon.len();
    if n < 3 {
        return Err(PlanError::InvalidGeometry(format!(
            "polygon needs at least 3 distinct vertices, got {}",
            n
        )));
    }

    let area = signed_area(polygon).abs();
    if area <= EPS_M {
        return Err(PlanError::InvalidGeometry(
            "polygon encloses zero area".to_string(),
        ));
    }

    for i in 0..n {
        let a1 = polygon[i];
        let a2 = polygon[(i + 1) % n];

        // Adjacent edges only share their common vertex; folding back onto the
        // previous edge is an overlap.
        let next = polygon[(i + 2) % n];
        if orient(a1, a2, next).abs() <= EPS_M {
            let dot = (a2.x - a1.x) * (next.x - a2.x) + (a2.y - a1.y) * (next.y - a2.y);
            if dot < 0.0 {
                return Err(PlanError::InvalidGeometry(format!(
                    "edges {} and {} fold back onto each other",
                    i,
                    (i + 1) % n
                )));
            }
        }

        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = polygon[j];
            let b2 = polygon[(j + 1) % n];
            if segments_intersect_2d(a1, a2, b1, b2) {
                return Err(PlanError::InvalidGeometry(format!(
                    "polygon self-intersects between edges {} and {}",
                    i, j
                )));
            }
        }
    }

    Ok(())
}
