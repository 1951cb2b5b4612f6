//! Area discretization into capture waypoints.
//!
//! The polygon is covered with a boustrophedon ("lawnmower") scan: parallel
//! scan lines along a heading, spaced by the cross-track spacing, each
//! clipped to the polygon interior and sampled at the along-track spacing.
//! Successive lines run in opposite directions so the end of one line is
//! close to the start of the next.
//!
//! Each line is responsible for the strip within half a cross-track spacing
//! of it. Where the polygon reaches further along that strip than the line's
//! own interior interval (edges nearly parallel to the scan, acute corners),
//! extra capture points are placed inside the polygon to close the gap.

use crate::error::{PlanError, PlanResult};
use crate::footprint::Footprint;
use crate::models::PlanarPoint;
use crate::spatial::{validate_polygon, EPS_M};
use serde::{Deserialize, Serialize};

/// Capture waypoints grouped by scan line, in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanGrid {
    /// Scan heading in degrees clockwise from grid north
    pub heading_deg: f64,
    pub lines: Vec<Vec<PlanarPoint>>,
}

impl ScanGrid {
    fn empty(heading_deg: f64) -> Self {
        Self {
            heading_deg,
            lines: Vec::new(),
        }
    }

    /// All waypoints flattened line by line.
    pub fn waypoints(&self) -> Vec<PlanarPoint> {
        self.lines.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rotation between the planar frame and a scan frame whose +u axis points
/// along the scan heading.
#[derive(Debug, Clone, Copy)]
struct ScanFrame {
    origin: PlanarPoint,
    cos: f64,
    sin: f64,
}

impl ScanFrame {
    fn new(origin: PlanarPoint, heading_deg: f64) -> Self {
        let theta = (90.0 - heading_deg).to_radians();
        Self {
            origin,
            cos: theta.cos(),
            sin: theta.sin(),
        }
    }

    fn to_scan(&self, p: PlanarPoint) -> PlanarPoint {
        let x = p.x - self.origin.x;
        let y = p.y - self.origin.y;
        PlanarPoint::new(x * self.cos + y * self.sin, y * self.cos - x * self.sin)
    }

    fn to_planar(&self, u: f64, v: f64) -> PlanarPoint {
        PlanarPoint::new(
            self.origin.x + u * self.cos - v * self.sin,
            self.origin.y + u * self.sin + v * self.cos,
        )
    }
}

/// Heading of the polygon's longest edge, degrees clockwise from grid north in [0, 360).
pub fn longest_edge_heading(polygon: &[PlanarPoint]) -> f64 {
    let n = polygon.len();
    let mut best_len = 0.0;
    let mut heading = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let len = a.distance_to(&b);
        if len > best_len {
            best_len = len;
            heading = (b.x - a.x).atan2(b.y - a.y).to_degrees().rem_euclid(360.0);
        }
    }
    heading
}

/// Discretize `polygon` into capture waypoints.
///
/// `heading_deg` overrides the scan heading; by default the scan runs along
/// the longest edge. A polygon that fits inside one capture cell along both
/// scan axes yields an empty grid.
pub fn discretize_area(
    polygon: &[PlanarPoint],
    footprint: &Footprint,
    heading_deg: Option<f64>,
) -> PlanResult<ScanGrid> {
    validate_polygon(polygon)?;

    let heading_deg = match heading_deg {
        Some(h) if h.is_finite() => h.rem_euclid(360.0),
        Some(h) => {
            return Err(PlanError::InvalidParameters(format!(
                "scan direction {} is not finite",
                h
            )))
        }
        None => longest_edge_heading(polygon),
    };

    let count = polygon.len() as f64;
    let origin = polygon.iter().fold(PlanarPoint::new(0.0, 0.0), |acc, p| {
        PlanarPoint::new(acc.x + p.x / count, acc.y + p.y / count)
    });
    let frame = ScanFrame::new(origin, heading_deg);
    let local: Vec<PlanarPoint> = polygon.iter().map(|p| frame.to_scan(*p)).collect();

    let (min_u, max_u, min_v, max_v) = local.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(u0, u1, v0, v1), p| (u0.min(p.x), u1.max(p.x), v0.min(p.y), v1.max(p.y)),
    );

    let cross = footprint.cross_track_spacing_m;
    let along = footprint.along_track_spacing_m;
    if max_u - min_u < along && max_v - min_v < cross {
        tracing::debug!(
            "Area extent {:.1} x {:.1} m fits in one capture cell ({:.1} x {:.1} m); no waypoints",
            max_u - min_u,
            max_v - min_v,
            along,
            cross
        );
        return Ok(ScanGrid::empty(heading_deg));
    }

    let strip = StripGeometry {
        half_width: cross / 2.0,
        along,
        reach: footprint.height_m / 2.0,
    };
    let transposed: Vec<PlanarPoint> = local.iter().map(|p| PlanarPoint::new(p.y, p.x)).collect();

    let mut lines = Vec::new();
    for v in centered_offsets(min_v, max_v, cross) {
        let mut line: Vec<PlanarPoint> = line_stations(&local, &transposed, v, &strip)
            .into_iter()
            .map(|(u, v)| frame.to_planar(u, v))
            .collect();
        if line.is_empty() {
            continue;
        }
        if lines.len() % 2 == 1 {
            line.reverse();
        }
        lines.push(line);
    }

    let grid = ScanGrid { heading_deg, lines };
    tracing::debug!(
        "Discretized area into {} waypoints on {} scan lines (heading {:.1}°)",
        grid.len(),
        grid.lines.len(),
        heading_deg
    );
    Ok(grid)
}

/// Spacing and reach of the strip each scan line covers (scan frame).
#[derive(Debug, Clone, Copy)]
struct StripGeometry {
    /// Half the cross-track spacing
    half_width: f64,
    along: f64,
    /// Half the footprint length along the line
    reach: f64,
}

/// Capture positions (u, v) for the scan line at `v`, sorted along the line.
///
/// Points on the line's own interior intervals come first; any part of the
/// strip `v ± half_width` they leave out of reach gets points on the closest
/// interior position to the line at that `u`.
fn line_stations(
    polygon: &[PlanarPoint],
    transposed: &[PlanarPoint],
    v: f64,
    strip: &StripGeometry,
) -> Vec<(f64, f64)> {
    let mut stations: Vec<(f64, f64)> = scan_intervals(polygon, v)
        .into_iter()
        .flat_map(|(u0, u1)| centered_offsets(u0, u1, strip.along))
        .map(|u| (u, v))
        .collect();
    let primary: Vec<f64> = stations.iter().map(|&(u, _)| u).collect();

    let (lo, hi) = (v - strip.half_width, v + strip.half_width);
    for (s0, s1) in strip_extent(polygon, lo, hi) {
        for (g0, g1) in uncovered_spans(s0, s1, &primary, strip.reach) {
            for u in centered_offsets(g0, g1, strip.along) {
                // Vertical intervals of the polygon at `u`, clipped to the strip.
                for (a, b) in scan_intervals(transposed, u) {
                    let (a, b) = (a.max(lo), b.min(hi));
                    if b > a {
                        stations.push((u, v.clamp(a, b)));
                    }
                }
            }
        }
    }

    stations.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    stations
}

/// Projection onto the u axis of the polygon clipped to `lo <= v <= hi`,
/// as sorted disjoint intervals.
fn strip_extent(polygon: &[PlanarPoint], lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let mut ranges = scan_intervals(polygon, lo);
    ranges.extend(scan_intervals(polygon, hi));

    let n = polygon.len();
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        if a.y.max(b.y) < lo || a.y.min(b.y) > hi {
            continue;
        }
        let dv = b.y - a.y;
        let (t0, t1) = if dv.abs() <= f64::EPSILON {
            (0.0, 1.0)
        } else {
            let (t_lo, t_hi) = ((lo - a.y) / dv, (hi - a.y) / dv);
            (t_lo.min(t_hi).max(0.0), t_lo.max(t_hi).min(1.0))
        };
        let u0 = a.x + t0 * (b.x - a.x);
        let u1 = a.x + t1 * (b.x - a.x);
        ranges.push((u0.min(u1), u0.max(u1)));
    }

    ranges.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Parts of [s0, s1] farther than `reach` from every position in `covered`
/// (sorted ascending).
fn uncovered_spans(s0: f64, s1: f64, covered: &[f64], reach: f64) -> Vec<(f64, f64)> {
    let mut spans = Vec::new();
    let mut cursor = s0;
    for &u in covered {
        if u + reach <= cursor {
            continue;
        }
        if u - reach > cursor {
            let end = (u - reach).min(s1);
            if end - cursor > EPS_M {
                spans.push((cursor, end));
            }
        }
        cursor = cursor.max(u + reach);
        if cursor >= s1 {
            return spans;
        }
    }
    if s1 - cursor > EPS_M {
        spans.push((cursor, s1));
    }
    spans
}

/// Evenly spaced positions covering [lo, hi], centered on the span.
///
/// The count is ⌈span / spacing⌉ (at least one), so consecutive positions are
/// exactly `spacing` apart and every position lies inside the span.
fn centered_offsets(lo: f64, hi: f64, spacing: f64) -> Vec<f64> {
    let span = (hi - lo).max(0.0);
    // Absorb rounding so an exact multiple of the spacing does not add a step.
    let steps = ((span / spacing) - 1e-9).ceil().max(1.0) as usize;
    let first = lo + (span - (steps - 1) as f64 * spacing) / 2.0;
    (0..steps).map(|k| first + k as f64 * spacing).collect()
}

/// Inside intervals of the horizontal line `v` against `polygon` (scan frame).
///
/// Uses the half-open crossing rule, so a line through a vertex counts each
/// edge once and the crossing count stays even.
fn scan_intervals(polygon: &[PlanarPoint], v: f64) -> Vec<(f64, f64)> {
    let n = polygon.len();
    let mut crossings = Vec::new();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[j], polygon[i]);
        if (a.y > v) != (b.y > v) {
            crossings.push(a.x + (v - a.y) * (b.x - a.x) / (b.y - a.y));
        }
        j = i;
    }
    crossings.sort_by(|a, b| a.total_cmp(b));

    crossings
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|(u0, u1)| u1 - u0 > EPS_M)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::compute_footprint;
    use crate::models::Camera;
    use crate::spatial::{point_in_or_on_polygon, point_in_polygon};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn reference_footprint() -> Footprint {
        compute_footprint(&Camera::new("Survey Cam", 250, 60.0, 4000, 3000), 50.0, 0.3).unwrap()
    }

    fn square(size: f64) -> Vec<PlanarPoint> {
        vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(size, 0.0),
            PlanarPoint::new(size, size),
            PlanarPoint::new(0.0, size),
        ]
    }

    #[test]
    fn test_reference_square_point_count() {
        let grid = discretize_area(&square(100.0), &reference_footprint(), None).unwrap();
        assert_eq!(grid.lines.len(), 3);
        assert!(grid.lines.iter().all(|line| line.len() == 4));
        assert_eq!(grid.len(), 12);
    }

    #[test]
    fn test_points_inside_polygon() {
        let polygon = square(100.0);
        let grid = discretize_area(&polygon, &reference_footprint(), Some(33.0)).unwrap();
        assert!(!grid.is_empty());
        for point in grid.waypoints() {
            assert!(point_in_or_on_polygon(point, &polygon, 1e-6), "{:?}", point);
        }
    }

    #[test]
    fn test_lines_alternate_direction() {
        let grid = discretize_area(&square(100.0), &reference_footprint(), Some(90.0)).unwrap();
        // Heading east: even lines run west to east, odd lines east to west.
        let first = &grid.lines[0];
        let second = &grid.lines[1];
        assert!(first[0].x < first[first.len() - 1].x);
        assert!(second[0].x > second[second.len() - 1].x);
        // The turn between lines is one cross-track step, not a full line length.
        let turn = first[first.len() - 1].distance_to(&second[0]);
        assert!((turn - reference_footprint().cross_track_spacing_m).abs() < 1e-6);
    }

    #[test]
    fn test_spacing_along_and_across() {
        let footprint = reference_footprint();
        let grid = discretize_area(&square(100.0), &footprint, Some(0.0)).unwrap();
        let line = &grid.lines[0];
        let step = line[0].distance_to(&line[1]);
        assert!((step - footprint.along_track_spacing_m).abs() < 1e-6);
        let across = (grid.lines[0][0].x - grid.lines[1][0].x).abs();
        assert!((across - footprint.cross_track_spacing_m).abs() < 1e-6);
    }

    #[test]
    fn test_concave_polygon_splits_scan_line() {
        // U-shape: two 40 m prongs separated by a 120 m wide notch.
        let polygon = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(200.0, 0.0),
            PlanarPoint::new(200.0, 200.0),
            PlanarPoint::new(160.0, 200.0),
            PlanarPoint::new(160.0, 60.0),
            PlanarPoint::new(40.0, 60.0),
            PlanarPoint::new(40.0, 200.0),
            PlanarPoint::new(0.0, 200.0),
        ];
        let grid = discretize_area(&polygon, &reference_footprint(), Some(90.0)).unwrap();
        for point in grid.waypoints() {
            assert!(point_in_or_on_polygon(point, &polygon, 1e-6), "{:?}", point);
            let in_notch = point.x > 40.0 && point.x < 160.0 && point.y > 60.0;
            assert!(!in_notch, "waypoint inside the notch: {:?}", point);
        }
    }

    /// Interior samples of `polygon` that no capture footprint contains.
    fn uncovered_samples(polygon: &[PlanarPoint], grid: &ScanGrid, footprint: &Footprint) -> usize {
        let (min_x, max_x, min_y, max_y) = polygon.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
        );
        let waypoints = grid.waypoints();
        let mut rng = StdRng::seed_from_u64(31);
        let mut uncovered = 0;
        let mut sampled = 0;
        while sampled < 20_000 {
            let sample = PlanarPoint::new(
                rng.random_range(min_x..max_x),
                rng.random_range(min_y..max_y),
            );
            if !point_in_polygon(sample, polygon) {
                continue;
            }
            sampled += 1;
            let covered = waypoints.iter().any(|w| {
                // Sample in the footprint's own frame: u along the scan, v across.
                let local = ScanFrame::new(*w, grid.heading_deg).to_scan(sample);
                local.x.abs() <= footprint.height_m / 2.0 + 1e-9
                    && local.y.abs() <= footprint.width_m / 2.0 + 1e-9
            });
            if !covered {
                uncovered += 1;
            }
        }
        uncovered
    }

    #[test]
    fn test_acute_triangle_fully_covered() {
        // Longest edge is the hypotenuse; both acute corners reach past the
        // interior intervals of the nearest scan line.
        let polygon = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(1000.0, 0.0),
            PlanarPoint::new(0.0, 100.0),
        ];
        let footprint = reference_footprint();
        let grid = discretize_area(&polygon, &footprint, None).unwrap();
        for point in grid.waypoints() {
            assert!(point_in_or_on_polygon(point, &polygon, 1e-6), "{:?}", point);
        }
        assert_eq!(uncovered_samples(&polygon, &grid, &footprint), 0);
    }

    #[test]
    fn test_sawtooth_fully_covered_at_any_heading() {
        let polygon = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(400.0, 0.0),
            PlanarPoint::new(400.0, 200.0),
            PlanarPoint::new(360.0, 200.0),
            PlanarPoint::new(350.0, 30.0),
            PlanarPoint::new(300.0, 200.0),
            PlanarPoint::new(250.0, 35.0),
            PlanarPoint::new(200.0, 200.0),
            PlanarPoint::new(150.0, 25.0),
            PlanarPoint::new(100.0, 200.0),
            PlanarPoint::new(50.0, 40.0),
            PlanarPoint::new(0.0, 200.0),
        ];
        let footprint = reference_footprint();
        for heading in [None, Some(0.0), Some(45.0)] {
            let grid = discretize_area(&polygon, &footprint, heading).unwrap();
            for point in grid.waypoints() {
                assert!(point_in_or_on_polygon(point, &polygon, 1e-6), "{:?}", point);
            }
            assert_eq!(uncovered_samples(&polygon, &grid, &footprint), 0, "{:?}", heading);
        }
    }

    #[test]
    fn test_thin_corridor_gets_waypoints() {
        // 500 m x 2 m: less area than one cell, but far longer than one.
        let polygon = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(500.0, 0.0),
            PlanarPoint::new(500.0, 2.0),
            PlanarPoint::new(0.0, 2.0),
        ];
        let footprint = reference_footprint();
        let grid = discretize_area(&polygon, &footprint, None).unwrap();
        assert_eq!(grid.lines.len(), 1);
        assert_eq!(grid.len(), 17);
        assert_eq!(uncovered_samples(&polygon, &grid, &footprint), 0);
    }

    #[test]
    fn test_non_finite_heading_rejected() {
        for heading in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                discretize_area(&square(100.0), &reference_footprint(), Some(heading)),
                Err(PlanError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_uncovered_spans() {
        assert!(uncovered_spans(0.0, 10.0, &[5.0], 6.0).is_empty());
        assert_eq!(uncovered_spans(0.0, 30.0, &[10.0], 5.0), vec![(0.0, 5.0), (15.0, 30.0)]);
        assert_eq!(uncovered_spans(0.0, 10.0, &[], 5.0), vec![(0.0, 10.0)]);
    }

    #[test]
    fn test_strip_extent_reaches_past_the_line() {
        // Triangle apex at u = 100 sits between v = 0 and the line at v = 5.
        let polygon = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(100.0, 1.0),
            PlanarPoint::new(0.0, 10.0),
        ];
        let at_line = scan_intervals(&polygon, 5.0);
        assert_eq!(at_line.len(), 1);
        assert!(at_line[0].1 < 60.0);
        let extent = strip_extent(&polygon, 0.0, 10.0);
        assert_eq!(extent.len(), 1);
        assert!((extent[0].0 - 0.0).abs() < 1e-9);
        assert!((extent[0].1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_area_yields_no_waypoints() {
        let grid = discretize_area(&square(10.0), &reference_footprint(), None).unwrap();
        assert!(grid.is_empty());
        assert!(grid.waypoints().is_empty());
    }

    #[test]
    fn test_longest_edge_heading() {
        let polygon = vec![
            PlanarPoint::new(0.0, 0.0),
            PlanarPoint::new(10.0, 0.0),
            PlanarPoint::new(10.0, 300.0),
            PlanarPoint::new(0.0, 300.0),
        ];
        assert!((longest_edge_heading(&polygon) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_centered_offsets_exact_multiple() {
        let offsets = centered_offsets(0.0, 30.0, 10.0);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0] - 5.0).abs() < 1e-9);
        assert!((offsets[2] - 25.0).abs() < 1e-9);
    }
}
