//! Geometry kernel: pure functions over points and polygon rings.
//!
//! Nothing here panics on bad input. Degenerate rings, zero-length
//! segments and non-finite coordinates produce a sentinel (`None`,
//! `false` or `0.0`) that callers read as "not applicable".

use crate::model::{MIN_VERTICES, Point, Vec2};
use kurbo::{Line, ParamCurve, ParamCurveNearest};
use serde::Serialize;

/// Determinants at or below this magnitude are treated as parallel lines.
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// Areas at or below this are treated as degenerate rings.
pub const AREA_EPSILON: f64 = 1e-9;

/// Result of [`find_closest_vertex`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VertexMatch {
    pub index: usize,
    pub distance: f64,
}

/// Result of [`find_closest_segment`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentMatch {
    pub start_index: usize,
    pub end_index: usize,
    pub distance: f64,
    pub projected_point: Point,
}

fn all_finite(points: &[Point]) -> bool {
    points.iter().all(|p| p.is_finite())
}

// ─── Containment & distance ──────────────────────────────────────────────

/// Even-odd ray casting. Degenerate (zero-area) rings contain nothing.
pub fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < MIN_VERTICES || !p.is_finite() || !all_finite(points) {
        return false;
    }
    if polygon_area(points) <= AREA_EPSILON {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_intersection = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_intersection {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Tolerance handed to kurbo's nearest-point solver. Exact for lines.
const NEAREST_ACCURACY: f64 = 1e-9;

/// Closest point to `p` on segment `a→b`. A zero-length or non-finite
/// segment projects onto `a`.
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    if !(p.is_finite() && a.is_finite() && b.is_finite()) || a == b {
        return a;
    }
    let segment = Line::new(a, b);
    let nearest = segment.nearest(p, NEAREST_ACCURACY);
    segment.eval(nearest.t)
}

/// Euclidean distance from `p` to segment `a→b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    p.distance(project_onto_segment(p, a, b))
}

/// Nearest vertex, optionally limited to `max_distance`.
pub fn find_closest_vertex(
    p: Point,
    points: &[Point],
    max_distance: Option<f64>,
) -> Option<VertexMatch> {
    if !p.is_finite() {
        return None;
    }
    let best = points
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(index, v)| VertexMatch {
            index,
            distance: p.distance(*v),
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;

    match max_distance {
        Some(limit) if best.distance > limit => None,
        _ => Some(best),
    }
}

/// Nearest edge `(i, i+1 mod n)`, with the clamped projection onto it.
pub fn find_closest_segment(
    p: Point,
    points: &[Point],
    max_distance: Option<f64>,
) -> Option<SegmentMatch> {
    if points.len() < 2 || !p.is_finite() {
        return None;
    }
    let n = points.len();
    let mut best: Option<SegmentMatch> = None;
    for start_index in 0..n {
        let end_index = (start_index + 1) % n;
        let (a, b) = (points[start_index], points[end_index]);
        if !a.is_finite() || !b.is_finite() {
            continue;
        }
        let projected_point = project_onto_segment(p, a, b);
        let distance = p.distance(projected_point);
        if best.is_none_or(|m| distance < m.distance) {
            best = Some(SegmentMatch {
                start_index,
                end_index,
                distance,
                projected_point,
            });
        }
    }

    match (best, max_distance) {
        (Some(m), Some(limit)) if m.distance > limit => None,
        (best, _) => best,
    }
}

// ─── Measures ────────────────────────────────────────────────────────────

fn signed_area_doubled(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].to_vec2().cross(points[(i + 1) % n].to_vec2()))
        .sum()
}

/// Shoelace area (always non-negative). Rings under three points have no area.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < MIN_VERTICES {
        return 0.0;
    }
    let area = signed_area_doubled(points).abs() / 2.0;
    if area.is_finite() { area } else { 0.0 }
}

/// Sum of edge lengths including the closing edge.
pub fn polygon_perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let perimeter: f64 = (0..n)
        .map(|i| points[i].distance(points[(i + 1) % n]))
        .sum();
    if perimeter.is_finite() { perimeter } else { 0.0 }
}

/// Winding test via `Σ (x₂ − x₁)(y₂ + y₁)`. Positive means clockwise in
/// a y-up frame.
pub fn is_clockwise(points: &[Point]) -> bool {
    let n = points.len();
    if n < MIN_VERTICES {
        return false;
    }
    let sum: f64 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            (b.x - a.x) * (b.y + a.y)
        })
        .sum();
    sum > 0.0
}

/// Vertex mean (not area-weighted). The origin for an empty ring.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    let c = (sum / points.len() as f64).to_point();
    if c.is_finite() { c } else { Point::ZERO }
}

// ─── Intersections ───────────────────────────────────────────────────────

/// Solve `p1 + t·(p2−p1) = p3 + u·(p4−p3)` for `(t, u)`.
fn line_parameters(first: Line, second: Line) -> Option<(f64, f64)> {
    if !(first.p0.is_finite() && first.p1.is_finite() && second.p0.is_finite() && second.p1.is_finite()) {
        return None;
    }
    let r = first.p1 - first.p0;
    let s = second.p1 - second.p0;
    let det = r.cross(s);
    if det.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let qp = second.p0 - first.p0;
    Some((qp.cross(s) / det, qp.cross(r) / det))
}

/// Intersection of segments `p1→p2` and `p3→p4`.
pub fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let line = Line::new(p1, p2);
    let (t, u) = line_parameters(line, Line::new(p3, p4))?;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(line.eval(t))
    } else {
        None
    }
}

/// Intersection of the infinite line through `p1, p2` with segment `p3→p4`.
pub fn infinite_line_segment_intersection(
    p1: Point,
    p2: Point,
    p3: Point,
    p4: Point,
) -> Option<Point> {
    infinite_line_segment_parameters(p1, p2, p3, p4).map(|(point, _)| point)
}

/// Like [`infinite_line_segment_intersection`] but also returns `u`, the
/// position along the segment.
pub(crate) fn infinite_line_segment_parameters(
    p1: Point,
    p2: Point,
    p3: Point,
    p4: Point,
) -> Option<(Point, f64)> {
    let line = Line::new(p1, p2);
    let (t, u) = line_parameters(line, Line::new(p3, p4))?;
    if (0.0..=1.0).contains(&u) {
        Some((line.eval(t), u))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn square_containment() {
        let sq = square();
        assert!(point_in_polygon(Point::new(50.0, 50.0), &sq));
        assert!(!point_in_polygon(Point::new(150.0, 50.0), &sq));
    }

    #[test]
    fn concave_containment() {
        // U shape: the notch between the arms is outside.
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 20.0), &u));
        assert!(!point_in_polygon(Point::new(15.0, 20.0), &u));
        assert!(point_in_polygon(Point::new(15.0, 5.0), &u));
    }

    #[test]
    fn collinear_ring_contains_nothing() {
        let line = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 10.0)];
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &line));
        assert!(!point_in_polygon(Point::new(3.0, 4.0), &line));
    }

    #[test]
    fn nan_point_is_outside() {
        assert!(!point_in_polygon(Point::new(f64::NAN, 50.0), &square()));
    }

    #[test]
    fn distance_to_segment_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(approx(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0));
        assert!(approx(distance_to_segment(Point::new(-4.0, 3.0), a, b), 5.0));
        assert!(approx(distance_to_segment(Point::new(13.0, 4.0), a, b), 5.0));
    }

    #[test]
    fn distance_to_zero_length_segment() {
        let a = Point::new(2.0, 2.0);
        assert!(approx(distance_to_segment(Point::new(5.0, 6.0), a, a), 5.0));
    }

    #[test]
    fn closest_vertex_within_limit() {
        let ring = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let m = find_closest_vertex(Point::new(1.0, 1.0), &ring, Some(5.0)).unwrap();
        assert_eq!(m.index, 0);
        assert!((m.distance - 2f64.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn closest_vertex_outside_limit() {
        let ring = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert_eq!(find_closest_vertex(Point::new(5.0, 5.0), &ring, Some(2.0)), None);
        assert!(find_closest_vertex(Point::new(5.0, 5.0), &ring, None).is_some());
        assert_eq!(find_closest_vertex(Point::new(5.0, 5.0), &[], None), None);
    }

    #[test]
    fn closest_segment_includes_closing_edge() {
        let sq = square();
        let m = find_closest_segment(Point::new(-3.0, 40.0), &sq, None).unwrap();
        assert_eq!((m.start_index, m.end_index), (3, 0));
        assert!(approx(m.distance, 3.0));
        assert!(approx(m.projected_point.x, 0.0) && approx(m.projected_point.y, 40.0));
        assert_eq!(find_closest_segment(Point::new(-3.0, 40.0), &sq, Some(1.0)), None);
    }

    #[test]
    fn area_perimeter_centroid() {
        let sq = square();
        assert!(approx(polygon_area(&sq), 10_000.0));
        assert!(approx(polygon_perimeter(&sq), 400.0));
        assert_eq!(centroid(&sq), Point::new(50.0, 50.0));
        assert_eq!(polygon_area(&sq[..2]), 0.0);
        assert_eq!(centroid(&[]), Point::ZERO);
    }

    #[test]
    fn winding_flips_when_reversed() {
        let sq = square();
        let mut rev = sq.clone();
        rev.reverse();
        assert_ne!(is_clockwise(&sq), is_clockwise(&rev));
        // (0,0)→(100,0)→(100,100)→(0,100) is counter-clockwise with y up.
        assert!(!is_clockwise(&sq));
    }

    #[test]
    fn segments_cross() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(hit, Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn segments_that_would_meet_beyond_their_ends() {
        let miss = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(miss, None);
        let hit = infinite_line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(hit, Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        );
        assert_eq!(p, None);
        let degenerate = segment_intersection(
            Point::new(3.0, 3.0),
            Point::new(3.0, 3.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        );
        assert_eq!(degenerate, None);
    }

    #[test]
    fn infinite_values_are_rejected() {
        let p = infinite_line_segment_intersection(
            Point::new(f64::INFINITY, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, -1.0),
            Point::new(5.0, 1.0),
        );
        assert_eq!(p, None);
        assert_eq!(polygon_perimeter(&[Point::new(f64::INFINITY, 0.0), Point::ZERO]), 0.0);
    }
}
