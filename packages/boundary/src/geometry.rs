//! `GeoJSON` geometry conversion.

use geo::{Centroid as _, MultiPolygon, Point};

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
///
/// Handles both `Polygon` and `MultiPolygon` geometry types. Anything else
/// (points, lines, collections) yields `None`.
#[must_use]
pub fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Returns the point a map label for this region should be anchored at.
///
/// Uses the area-weighted centroid; `None` for an empty geometry.
#[must_use]
pub fn label_point(geometry: &MultiPolygon<f64>) -> Option<Point<f64>> {
    geometry.centroid()
}
