//! Error types shared by the core and the editor.

use crate::id::PolygonId;
use thiserror::Error;

/// Why a cut line cannot slice a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SliceRejection {
    #[error("the two cut points must be distinct, finite coordinates")]
    DegenerateLine,
    #[error("the polygon has too few vertices to slice")]
    DegeneratePolygon,
    #[error("the cut line crosses the polygon outline {0} times; it must cross exactly twice")]
    CrossingCount(usize),
    #[error("the cut would leave a piece without area")]
    DegeneratePiece,
}

/// A rejected editing operation. The editor state is unchanged when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("no polygon with id {0}")]
    UnknownPolygon(PolygonId),
    #[error("a polygon needs at least {min} vertices (would be left with {remaining})")]
    TooFewVertices { min: usize, remaining: usize },
    #[error("vertex {index} is out of range for polygon {polygon} ({len} vertices)")]
    VertexOutOfRange {
        polygon: PolygonId,
        index: usize,
        len: usize,
    },
    #[error("this operation needs a selected polygon")]
    NoSelection,
    #[error("the edit would leave a polygon without area")]
    DegenerateResult,
    #[error("cannot slice: {0}")]
    Slice(#[from] SliceRejection),
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("no image is loaded")]
    NoImage,
    #[error("save failed: {0}")]
    Backend(String),
}

/// Editor configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid editor config: {0}")]
    Invalid(String),
}
