//! Geographic ⇄ planar conversion for one mission.
//!
//! Points are projected with Universal Transverse Mercator on the WGS84
//! ellipsoid using the 4th-order Krüger series. The zone is chosen once from
//! the area's vertex centroid and then held fixed for every point of the
//! mission (polygon, waypoints, start point); distances are only meaningful
//! between points projected in the same zone.

use crate::error::{PlanError, PlanResult};
use crate::models::{GeoPoint, PlanarPoint};
use serde::{Deserialize, Serialize};

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const FALSE_EASTING_M: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;
const ZONE_HALF_WIDTH_DEG: f64 = 3.0;
const MAX_UTM_LAT_DEG: f64 = 84.0;

/// UTM zone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmZone {
    pub number: u8,
    pub north: bool,
}

impl UtmZone {
    /// Zone containing the given position.
    pub fn containing(point: GeoPoint) -> Self {
        let number = (((point.lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        Self {
            number,
            north: point.lat >= 0.0,
        }
    }

    pub fn central_meridian_deg(&self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }
}

impl std::fmt::Display for UtmZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.number, if self.north { 'N' } else { 'S' })
    }
}

/// Krüger series coefficients for the WGS84 ellipsoid.
#[derive(Debug, Clone)]
struct KruegerSeries {
    /// Rectifying radius
    a_rect: f64,
    /// First eccentricity
    e: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

impl KruegerSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        Self {
            a_rect: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            e: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
                61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
                49_561.0 * n4 / 161_280.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
                n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
                17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
                4397.0 * n4 / 161_280.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
                56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
                4279.0 * n4 / 630.0,
            ],
        }
    }
}

/// Fixed-zone projection for one mission.
#[derive(Debug, Clone)]
pub struct Projection {
    zone: UtmZone,
    central_meridian_deg: f64,
    max_offset_deg: f64,
    series: KruegerSeries,
}

impl Projection {
    /// Build a projection for an explicit zone.
    pub fn new(zone: UtmZone, zone_overrun_tolerance_deg: f64) -> Self {
        Self {
            zone,
            central_meridian_deg: zone.central_meridian_deg(),
            max_offset_deg: ZONE_HALF_WIDTH_DEG + zone_overrun_tolerance_deg.max(0.0),
            series: KruegerSeries::wgs84(),
        }
    }

    /// Select the zone from the centroid of the area's vertices and verify
    /// every vertex projects within tolerance of that zone.
    pub fn for_area(area: &[GeoPoint], zone_overrun_tolerance_deg: f64) -> PlanResult<Self> {
        if area.is_empty() {
            return Err(PlanError::Projection("area has no vertices".to_string()));
        }
        for point in area {
            check_coordinate(*point)?;
        }

        let centroid = vertex_centroid(area);
        let projection = Self::new(UtmZone::containing(centroid), zone_overrun_tolerance_deg);
        for point in area {
            projection.check_zone(*point)?;
        }

        tracing::debug!(
            "Selected UTM zone {} for centroid {:.6}, {:.6}",
            projection.zone,
            centroid.lat,
            centroid.lon
        );
        Ok(projection)
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Project a geographic point into the mission's planar frame.
    pub fn to_planar(&self, point: GeoPoint) -> PlanResult<PlanarPoint> {
        check_coordinate(point)?;
        self.check_zone(point)?;

        let s = &self.series;
        let phi = point.lat.to_radians();
        let dlambda = wrap_lon(point.lon - self.central_meridian_deg).to_radians();

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - s.e * (s.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dlambda.cos());
        let eta_p = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in s.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        Ok(PlanarPoint {
            x: FALSE_EASTING_M + UTM_K0 * s.a_rect * eta,
            y: self.false_northing() + UTM_K0 * s.a_rect * xi,
        })
    }

    /// Inverse of `to_planar` for points of this mission.
    pub fn to_geographic(&self, point: PlanarPoint) -> GeoPoint {
        let s = &self.series;
        let xi = (point.y - self.false_northing()) / (UTM_K0 * s.a_rect);
        let eta = (point.x - FALSE_EASTING_M) / (UTM_K0 * s.a_rect);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in s.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).clamp(-1.0, 1.0).asin();
        let mut phi = chi;
        for (j, delta) in s.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += delta * (k * chi).sin();
        }

        let dlambda = eta_p.sinh().atan2(xi_p.cos());
        GeoPoint {
            lat: phi.to_degrees(),
            lon: wrap_lon(self.central_meridian_deg + dlambda.to_degrees()),
        }
    }

    /// Project a sequence, failing on the first unprojectable point.
    pub fn to_planar_all(&self, points: &[GeoPoint]) -> PlanResult<Vec<PlanarPoint>> {
        points.iter().map(|p| self.to_planar(*p)).collect()
    }

    pub fn to_geographic_all(&self, points: &[PlanarPoint]) -> Vec<GeoPoint> {
        points.iter().map(|p| self.to_geographic(*p)).collect()
    }

    fn false_northing(&self) -> f64 {
        if self.zone.north {
            0.0
        } else {
            FALSE_NORTHING_SOUTH_M
        }
    }

    fn check_zone(&self, point: GeoPoint) -> PlanResult<()> {
        let offset = wrap_lon(point.lon - self.central_meridian_deg).abs();
        if offset > self.max_offset_deg {
            return Err(PlanError::Projection(format!(
                "point {:.6}, {:.6} lies {:.2}° from the central meridian of zone {} (limit {:.2}°)",
                point.lat, point.lon, offset, self.zone, self.max_offset_deg
            )));
        }
        Ok(())
    }
}

fn check_coordinate(point: GeoPoint) -> PlanResult<()> {
    if !point.is_finite() {
        return Err(PlanError::Projection(format!(
            "coordinate {}, {} is not finite",
            point.lat, point.lon
        )));
    }
    if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
        return Err(PlanError::Projection(format!(
            "coordinate {}, {} is out of range",
            point.lat, point.lon
        )));
    }
    if point.lat.abs() > MAX_UTM_LAT_DEG {
        return Err(PlanError::Projection(format!(
            "latitude {} is outside the UTM band (±{}°)",
            point.lat, MAX_UTM_LAT_DEG
        )));
    }
    Ok(())
}

/// Mean latitude and circular-mean longitude of the vertices.
fn vertex_centroid(points: &[GeoPoint]) -> GeoPoint {
    let count = points.len() as f64;
    let (sum_lat, sum_sin, sum_cos) = points.iter().fold((0.0, 0.0, 0.0), |acc, p| {
        let lon = p.lon.to_radians();
        (acc.0 + p.lat, acc.1 + lon.sin(), acc.2 + lon.cos())
    });
    GeoPoint {
        lat: sum_lat / count,
        lon: sum_sin.atan2(sum_cos).to_degrees(),
    }
}

/// Wrap a longitude or longitude difference into [-180, 180).
fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::haversine_distance;

    const ROUND_TRIP_TOLERANCE_DEG: f64 = 1e-6;

    #[test]
    fn test_zone_selection() {
        let zone = UtmZone::containing(GeoPoint::new(33.6846, -117.8265));
        assert_eq!(zone.number, 11);
        assert!(zone.north);
        assert_eq!(zone.central_meridian_deg(), -117.0);

        let south = UtmZone::containing(GeoPoint::new(-33.9, 151.2));
        assert_eq!(south.number, 56);
        assert!(!south.north);
    }

    #[test]
    fn test_origin_of_zone_maps_to_false_easting() {
        let projection = Projection::new(UtmZone { number: 31, north: true }, 1.0);
        let planar = projection.to_planar(GeoPoint::new(0.0, 3.0)).unwrap();
        assert!((planar.x - 500_000.0).abs() < 1e-6);
        assert!(planar.y.abs() < 1e-6);
    }

    #[test]
    fn test_central_meridian_northing_matches_meridian_arc() {
        // Meridian arc from the equator to 45°N on WGS84 is 4 984 944.378 m.
        let projection = Projection::new(UtmZone { number: 31, north: true }, 1.0);
        let planar = projection.to_planar(GeoPoint::new(45.0, 3.0)).unwrap();
        assert!((planar.y - 4_984_944.378 * UTM_K0).abs() < 1.0, "{}", planar.y);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let samples = [
            GeoPoint::new(33.6846, -117.8265),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(64.1466, -21.9426),
            GeoPoint::new(0.0001, 9.0),
            GeoPoint::new(-0.5, -78.5),
        ];
        for point in samples {
            let projection = Projection::for_area(&[point], 1.0).unwrap();
            let back = projection.to_geographic(projection.to_planar(point).unwrap());
            assert!((back.lat - point.lat).abs() < ROUND_TRIP_TOLERANCE_DEG, "{:?}", back);
            assert!((back.lon - point.lon).abs() < ROUND_TRIP_TOLERANCE_DEG, "{:?}", back);
        }
    }

    #[test]
    fn test_round_trip_near_zone_edge() {
        let projection = Projection::new(UtmZone { number: 11, north: true }, 1.0);
        let point = GeoPoint::new(45.0, -120.9);
        let back = projection.to_geographic(projection.to_planar(point).unwrap());
        assert!((back.lat - point.lat).abs() < ROUND_TRIP_TOLERANCE_DEG);
        assert!((back.lon - point.lon).abs() < ROUND_TRIP_TOLERANCE_DEG);
    }

    #[test]
    fn test_planar_distance_agrees_with_haversine() {
        let a = GeoPoint::new(33.6846, -117.8265);
        let b = GeoPoint::new(33.6946, -117.8065);
        let projection = Projection::for_area(&[a, b], 1.0).unwrap();
        let planar = projection
            .to_planar(a)
            .unwrap()
            .distance_to(&projection.to_planar(b).unwrap());
        let great_circle = haversine_distance(a.lat, a.lon, b.lat, b.lon);
        assert!((planar - great_circle).abs() / great_circle < 0.01);
    }

    #[test]
    fn test_rejects_non_finite_vertex() {
        let area = [GeoPoint::new(10.0, 10.0), GeoPoint::new(f64::NAN, 10.0)];
        assert!(matches!(
            Projection::for_area(&area, 1.0),
            Err(PlanError::Projection(_))
        ));
    }

    #[test]
    fn test_rejects_area_spanning_zones() {
        let area = [
            GeoPoint::new(10.0, 0.5),
            GeoPoint::new(10.0, 12.0),
            GeoPoint::new(11.0, 6.0),
        ];
        assert!(matches!(
            Projection::for_area(&area, 1.0),
            Err(PlanError::Projection(_))
        ));
    }

    #[test]
    fn test_antimeridian_area_uses_wrapped_offsets() {
        let area = [
            GeoPoint::new(-17.0, 179.99),
            GeoPoint::new(-17.0, -179.99),
            GeoPoint::new(-17.01, 179.995),
        ];
        let projection = Projection::for_area(&area, 1.0).unwrap();
        let a = projection.to_planar(area[0]).unwrap();
        let b = projection.to_planar(area[1]).unwrap();
        // 0.02° of longitude at 17°S is roughly 2.1 km.
        assert!(a.distance_to(&b) < 2_500.0);
    }
}
