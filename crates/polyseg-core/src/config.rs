//! Editor tuning parameters.
//!
//! Radii and distances are in canvas pixels; the editor divides them by
//! the current zoom before comparing against image-space geometry.

use crate::error::ConfigError;
use crate::transform::ZoomLimits;
use serde::{Deserialize, Serialize};

/// Configuration for an editing session.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per unit of wheel `deltaY`.
    pub wheel_sensitivity: f64,
    /// Bounds on the zoom factor a single wheel event may apply.
    pub wheel_factor_min: f64,
    pub wheel_factor_max: f64,
    /// Factor used by the keyboard zoom in/out shortcuts.
    pub zoom_step: f64,
    /// Padding around the image on initial fit.
    pub fit_padding: f64,
    /// How close a click must be to a vertex to grab it.
    pub vertex_hit_radius: f64,
    /// How close a click must be to the first point to close a new polygon.
    pub close_radius: f64,
    /// Minimum spacing between points sampled while Shift is held.
    pub auto_sample_distance: f64,
    /// Maximum number of history entries kept. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            wheel_sensitivity: 0.001,
            wheel_factor_min: 0.5,
            wheel_factor_max: 2.0,
            zoom_step: 1.2,
            fit_padding: 20.0,
            vertex_hit_radius: 10.0,
            close_radius: 10.0,
            auto_sample_distance: 5.0,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, filling unspecified fields with defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the JSON is malformed or the values are
    /// inconsistent (e.g. `min_zoom > max_zoom`).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is not a positive, ordered range",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.wheel_factor_min > 0.0 && self.wheel_factor_min <= self.wheel_factor_max) {
            return Err(ConfigError::Invalid(
                "wheel factor bounds must be positive and ordered".to_string(),
            ));
        }
        if self.zoom_step <= 1.0 {
            return Err(ConfigError::Invalid("zoom_step must be greater than 1".to_string()));
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }
}
