//! Planar geometry helpers for spawn-region matching.

use crate::events::model::Location;

/// Euclidean distance in game-world units.
pub fn distance(a: Location, b: Location) -> f64 {
    let dx = a.lon - b.lon;
    let dy = a.lat - b.lat;
    (dx * dx + dy * dy).sqrt()
}

/// Ray-cast point-in-polygon test: cast a horizontal ray from the point
/// and count edge crossings; an odd count means inside.
pub fn point_in_polygon(point: Location, polygon: &[Location]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        let crosses = (pi.lat > point.lat) != (pj.lat > point.lat)
            && point.lon
                < (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}
