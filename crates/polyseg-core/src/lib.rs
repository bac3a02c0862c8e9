pub mod config;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod model;
pub mod ring;
pub mod slice;
pub mod transform;

pub use config::EditorConfig;
pub use error::{ConfigError, EditError, SaveError, SliceRejection};
pub use hit::VertexRef;
pub use id::PolygonId;
pub use model::*;
pub use ring::{insert_vertices_between, remove_vertices_between};
pub use slice::{slice_polygon, validate_slice_line};
pub use transform::{Transform, Viewport, ZoomLimits, fit_to_view, wheel_zoom_factor};
