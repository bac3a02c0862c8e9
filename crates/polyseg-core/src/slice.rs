//! Polygon slicing along a cut line.
//!
//! The two cut points define an infinite line. The line must cross the
//! polygon outline at exactly two distinct points; the ring is split
//! there into two closed loops, each of which must keep at least three
//! vertices and a positive area.

use crate::error::SliceRejection;
use crate::geometry::{AREA_EPSILON, infinite_line_segment_parameters, polygon_area};
use crate::id::PolygonId;
use crate::model::{MIN_VERTICES, Point, Polygon};
use smallvec::SmallVec;

/// Crossings closer than this are the same crossing (the line passing
/// through a shared vertex hits both adjacent edges).
const SAME_POINT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Crossing {
    /// Edge `(edge, edge + 1 mod n)` the crossing lies on.
    edge: usize,
    /// Position along that edge, `[0, 1]`.
    along: f64,
    point: Point,
}

fn find_crossings(points: &[Point], a: Point, b: Point) -> SmallVec<[Crossing; 4]> {
    let n = points.len();
    let mut crossings: SmallVec<[Crossing; 4]> = SmallVec::new();
    for edge in 0..n {
        let (start, end) = (points[edge], points[(edge + 1) % n]);
        let Some((point, along)) = infinite_line_segment_parameters(a, b, start, end) else {
            continue;
        };
        if crossings
            .iter()
            .any(|c| c.point.distance(point) <= SAME_POINT_EPSILON)
        {
            continue;
        }
        crossings.push(Crossing { edge, along, point });
    }
    crossings.sort_by(|l, r| l.edge.cmp(&r.edge).then(l.along.total_cmp(&r.along)));
    crossings
}

/// Remove consecutive (and wrap-around) duplicates left where a crossing
/// landed exactly on a vertex.
fn dedup_ring(ring: &mut Vec<Point>) {
    ring.dedup_by(|next, prev| next.distance(*prev) <= SAME_POINT_EPSILON);
    while ring.len() > 1 && ring[0].distance(ring[ring.len() - 1]) <= SAME_POINT_EPSILON {
        ring.pop();
    }
}

fn split_rings(points: &[Point], a: Point, b: Point) -> Result<(Vec<Point>, Vec<Point>), SliceRejection> {
    if !a.is_finite() || !b.is_finite() || a.distance(b) <= SAME_POINT_EPSILON {
        return Err(SliceRejection::DegenerateLine);
    }
    if points.len() < MIN_VERTICES || !points.iter().all(|p| p.is_finite()) {
        return Err(SliceRejection::DegeneratePolygon);
    }

    let crossings = find_crossings(points, a, b);
    let [first, second] = crossings.as_slice() else {
        return Err(SliceRejection::CrossingCount(crossings.len()));
    };

    // first → vertices after it up to second's edge → second
    let mut left = Vec::with_capacity(points.len() + 2);
    left.push(first.point);
    left.extend_from_slice(&points[first.edge + 1..=second.edge]);
    left.push(second.point);

    // second → remaining vertices, wrapping round → first
    let mut right = Vec::with_capacity(points.len() + 2);
    right.push(second.point);
    right.extend_from_slice(&points[second.edge + 1..]);
    right.extend_from_slice(&points[..=first.edge]);
    right.push(first.point);

    dedup_ring(&mut left);
    dedup_ring(&mut right);

    for ring in [&left, &right] {
        if ring.len() < MIN_VERTICES || polygon_area(ring) <= AREA_EPSILON {
            return Err(SliceRejection::DegeneratePiece);
        }
    }
    Ok((left, right))
}

/// Check a cut line without building the resulting polygons.
pub fn validate_slice_line(polygon: &Polygon, a: Point, b: Point) -> Result<(), SliceRejection> {
    split_rings(&polygon.points, a, b).map(|_| ())
}

/// Split `polygon` along the line through `a` and `b`.
///
/// Both halves get fresh ids and inherit the original's type, confidence
/// and color. `None` when the cut is not valid.
pub fn slice_polygon(polygon: &Polygon, a: Point, b: Point) -> Option<(Polygon, Polygon)> {
    match split_rings(&polygon.points, a, b) {
        Ok((left, right)) => Some((
            polygon.derive(PolygonId::fresh(), left),
            polygon.derive(PolygonId::fresh(), right),
        )),
        Err(reason) => {
            log::debug!("slice of {} rejected: {reason}", polygon.id);
            None
        }
    }
}
