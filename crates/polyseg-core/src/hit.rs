//! Hit testing: image point → polygon / vertex lookup.
//!
//! When polygons overlap the one with the smallest area wins, so a hole
//! drawn inside a cell outline is picked before the outline itself.

use crate::geometry::{find_closest_segment, find_closest_vertex, point_in_polygon, polygon_area};
use crate::id::PolygonId;
use crate::model::{Point, Polygon};
use serde::Serialize;

/// A vertex of a specific polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VertexRef {
    pub polygon_id: PolygonId,
    pub vertex_index: usize,
}

/// Find the innermost polygon containing `p`.
/// Returns `None` if the point is on empty canvas.
pub fn hit_test_polygon(polygons: &[Polygon], p: Point) -> Option<PolygonId> {
    let mut best: Option<(PolygonId, f64)> = None;
    // Walk in reverse so that, on equal area, the last drawn polygon wins.
    for polygon in polygons.iter().rev() {
        if !point_in_polygon(p, &polygon.points) {
            continue;
        }
        let area = polygon_area(&polygon.points);
        if best.is_none_or(|(_, best_area)| area < best_area) {
            best = Some((polygon.id, area));
        }
    }
    best.map(|(id, _)| id)
}

/// Find the vertex of `polygon` nearest to `p` within `radius` (image units).
pub fn hit_test_vertex(polygon: &Polygon, p: Point, radius: f64) -> Option<VertexRef> {
    find_closest_vertex(p, &polygon.points, Some(radius)).map(|m| VertexRef {
        polygon_id: polygon.id,
        vertex_index: m.index,
    })
}

/// Find the edge of `polygon` nearest to `p` within `radius`, returning the
/// edge's start index and the projected point on it.
pub fn hit_test_edge(polygon: &Polygon, p: Point, radius: f64) -> Option<(usize, Point)> {
    find_closest_segment(p, &polygon.points, Some(radius)).map(|m| (m.start_index, m.projected_point))
}
