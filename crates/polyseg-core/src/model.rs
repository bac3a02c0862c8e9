//! Polygon data model.
//!
//! Points are image-space coordinates (pixels of the source image).
//! A committed polygon always has at least [`MIN_VERTICES`] points; the
//! ring is stored open (the closing edge from the last point back to the
//! first is implicit).

use crate::id::PolygonId;
use serde::{Deserialize, Serialize};

/// Fewest vertices a committed polygon may have.
pub const MIN_VERTICES: usize = 3;

// ─── Point ───────────────────────────────────────────────────────────────

/// An image-space coordinate. Serializes as `{"x": .., "y": ..}`.
pub use kurbo::Point;
/// Offsets between image-space points (drag offsets, pan deltas).
pub use kurbo::Vec2;

// ─── Polygon ─────────────────────────────────────────────────────────────

/// Whether a polygon is an outer boundary or a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonKind {
    #[default]
    External,
    Internal,
}

/// One annotated region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub id: PolygonId,
    pub points: Vec<Point>,
    #[serde(rename = "type", default)]
    pub kind: PolygonKind,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Polygon {
    /// A hand-drawn external polygon with full confidence.
    pub fn new(id: PolygonId, points: Vec<Point>) -> Self {
        Self {
            id,
            points,
            kind: PolygonKind::External,
            confidence: 1.0,
            color: None,
        }
    }

    pub fn with_kind(mut self, kind: PolygonKind) -> Self {
        self.kind = kind;
        self
    }

    /// Copy every attribute except id and points onto a new ring.
    pub fn derive(&self, id: PolygonId, points: Vec<Point>) -> Self {
        Self {
            id,
            points,
            kind: self.kind,
            confidence: self.confidence,
            color: self.color.clone(),
        }
    }

    /// True if the ring can be committed.
    pub fn has_min_vertices(&self) -> bool {
        self.points.len() >= MIN_VERTICES
    }
}

/// Find a polygon's position in the list.
pub fn position_of(polygons: &[Polygon], id: PolygonId) -> Option<usize> {
    polygons.iter().position(|p| p.id == id)
}

/// Look up a polygon by id.
pub fn find(polygons: &[Polygon], id: PolygonId) -> Option<&Polygon> {
    polygons.iter().find(|p| p.id == id)
}

// ─── Ring normalization ──────────────────────────────────────────────────

/// Clean up a ring received from outside the editor: drops non-finite
/// points, consecutive duplicates, and an explicit closing point that
/// repeats the first vertex.
pub fn normalize_ring(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if !p.is_finite() {
            continue;
        }
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Normalize every inbound polygon, dropping those that end up with
/// fewer than [`MIN_VERTICES`] vertices.
pub fn normalize_polygons(polygons: Vec<Polygon>) -> Vec<Polygon> {
    polygons
        .into_iter()
        .filter_map(|mut polygon| {
            polygon.points = normalize_ring(&polygon.points);
            if polygon.has_min_vertices() {
                Some(polygon)
            } else {
                log::warn!(
                    "dropping polygon {} with {} usable vertices",
                    polygon.id,
                    polygon.points.len()
                );
                None
            }
        })
        .collect()
}

// ─── Image ───────────────────────────────────────────────────────────────

/// Pixel dimensions of the image under annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: f64,
    pub height: f64,
}

/// Everything the editor needs to start working on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

impl ImageData {
    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions {
            width: self.width,
            height: self.height,
        }
    }
}
