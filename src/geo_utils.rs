//! # Geographic Utilities
//!
//! Measurements over decoded routes, used when exporting overlays.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`route_length`] | Total length of a decoded route in meters |
//! | [`compute_bounds`] | Bounding box of a route, `None` when empty |
//! | [`merge_bounds`] | Bounding box enclosing several routes |
//! | [`to_line_string`] | Convert a route into a `geo::LineString` (x = lng, y = lat) |
//!
//! All functions expect WGS84 latitude/longitude in degrees.

use geo::{Coord, Distance, Haversine, LineString, Point};
use crate::{Bounds, GpsPoint};

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two GPS points in meters.
///
/// ```rust
/// use activity_routes::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 5000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a route in meters.
///
/// Sums the haversine distance between consecutive points. Empty and
/// single-point routes have zero length.
pub fn route_length(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Bounding box of a route.
///
/// ```rust
/// use activity_routes::{GpsPoint, geo_utils};
///
/// let route = vec![
///     GpsPoint::new(38.5, -120.2),
///     GpsPoint::new(40.7, -120.95),
///     GpsPoint::new(43.252, -126.453),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&route).unwrap();
/// assert_eq!(bounds.min_lat, 38.5);
/// assert_eq!(bounds.max_lng, -120.2);
/// assert!(geo_utils::compute_bounds(&[]).is_none());
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    Bounds::from_points(points)
}

/// Smallest bounding box enclosing every non-empty route.
pub fn merge_bounds<'a, I>(routes: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a [GpsPoint]>,
{
    routes
        .into_iter()
        .filter_map(compute_bounds)
        .reduce(|a, b| a.union(&b))
}

/// Convert a route to a `geo` line string.
pub fn to_line_string(points: &[GpsPoint]) -> LineString<f64> {
    points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect::<Vec<_>>()
        .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
