//! Arc replacement on polygon rings.
//!
//! Two boundary vertices split a ring into two arcs. Insertion and
//! removal both build one candidate ring per arc and choose between them
//! by perimeter: insertion keeps the longer result, removal the shorter.

use crate::geometry::polygon_perimeter;
use crate::model::Point;

/// The two rings obtained by replacing either arc between `lo` and `hi`
/// (`lo < hi`) with `bridge`, where `bridge` runs from `lo` towards `hi`.
fn candidates(points: &[Point], lo: usize, hi: usize, bridge: &[Point]) -> (Vec<Point>, Vec<Point>) {
    // Replace the arc lo+1..hi-1.
    let mut inner = Vec::with_capacity(points.len() + bridge.len());
    inner.extend_from_slice(&points[..=lo]);
    inner.extend_from_slice(bridge);
    inner.extend_from_slice(&points[hi..]);

    // Replace the wrapping arc hi+1..n-1, 0..lo-1; the bridge is walked hi→lo.
    let mut outer = Vec::with_capacity(hi - lo + 1 + bridge.len());
    outer.extend_from_slice(&points[lo..=hi]);
    outer.extend(bridge.iter().rev().copied());

    (inner, outer)
}

fn valid_pair(points: &[Point], start: usize, end: usize) -> bool {
    start != end && start < points.len() && end < points.len()
}

/// Splice `new_points` into the ring between vertices `start_idx` and
/// `end_idx`, in the order the user placed them (starting at `start_idx`).
///
/// Of the two possible rings the one with the larger perimeter wins.
/// Clicking A→B and B→A with mirrored intermediate points gives the same
/// ring. Invalid indices return the ring unchanged.
pub fn insert_vertices_between(
    points: &[Point],
    start_idx: usize,
    end_idx: usize,
    new_points: &[Point],
) -> Vec<Point> {
    if !valid_pair(points, start_idx, end_idx) {
        return points.to_vec();
    }
    let (lo, hi) = (start_idx.min(end_idx), start_idx.max(end_idx));
    let bridge: Vec<Point> = if start_idx > end_idx {
        new_points.iter().rev().copied().collect()
    } else {
        new_points.to_vec()
    };

    let (inner, outer) = candidates(points, lo, hi, &bridge);
    if polygon_perimeter(&outer) > polygon_perimeter(&inner) {
        outer
    } else {
        inner
    }
}

/// Drop every vertex strictly between `start_idx` and `end_idx` along
/// whichever arc leaves the shorter perimeter. Adjacent indices are a no-op.
pub fn remove_vertices_between(points: &[Point], start_idx: usize, end_idx: usize) -> Vec<Point> {
    if !valid_pair(points, start_idx, end_idx) {
        return points.to_vec();
    }
    let (lo, hi) = (start_idx.min(end_idx), start_idx.max(end_idx));
    let adjacent = hi - lo == 1 || (lo == 0 && hi == points.len() - 1);
    if adjacent {
        return points.to_vec();
    }

    let (inner, outer) = candidates(points, lo, hi, &[]);
    if polygon_perimeter(&outer) < polygon_perimeter(&inner) {
        outer
    } else {
        inner
    }
}
