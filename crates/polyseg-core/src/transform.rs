//! Canvas ↔ image coordinate mapping and zoom/pan math.
//!
//! A canvas point `c` and an image point `i` are related by
//! `c = i · zoom + translate`. Every operation returns a new `Transform`;
//! callers own the current state.

use crate::model::{ImageDimensions, Point, Vec2};
use kurbo::Affine;
use serde::{Deserialize, Serialize};

/// Zoom at or above which panning is left unconstrained.
pub const DEEP_ZOOM: f64 = 2.0;

/// Canvas (viewport) size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

/// Pan/zoom state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub zoom: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(zoom: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            zoom,
            translate_x,
            translate_y,
        }
    }

    /// Zoom 1, no pan.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Image → canvas as an affine map (uniform scale, then translate).
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation()) * Affine::scale(self.zoom)
    }

    pub fn canvas_to_image(&self, canvas: Point) -> Point {
        self.to_affine().inverse() * canvas
    }

    pub fn image_to_canvas(&self, image: Point) -> Point {
        self.to_affine() * image
    }

    /// Convert a length in canvas pixels to image units at this zoom.
    pub fn canvas_length_to_image(&self, length: f64) -> f64 {
        length / self.zoom
    }

    pub fn pan_by(&self, dx: f64, dy: f64) -> Transform {
        Transform::new(self.zoom, self.translate_x + dx, self.translate_y + dy)
    }

    /// Scale by `factor` while keeping the image point under `anchor`
    /// (a canvas point) visually fixed.
    pub fn zoom_at_fixed_point(&self, anchor: Point, factor: f64, limits: ZoomLimits) -> Transform {
        let new_zoom = limits.clamp(self.zoom * factor);
        if new_zoom == self.zoom || !anchor.is_finite() {
            return *self;
        }
        let image = self.canvas_to_image(anchor);
        Transform::new(
            new_zoom,
            anchor.x - image.x * new_zoom,
            anchor.y - image.y * new_zoom,
        )
    }

    /// Clamp zoom, then bound the translation according to zoom tier.
    ///
    /// - `zoom >= DEEP_ZOOM`: translation is free.
    /// - `1 <= zoom < DEEP_ZOOM`: the image may leave the canvas by up to
    ///   three canvas spans, keeping 50 px reachable.
    /// - `zoom < 1`: up to 0.8 canvas spans, keeping 100 px reachable.
    pub fn constrain(&self, image: ImageDimensions, canvas: Viewport, limits: ZoomLimits) -> Transform {
        let zoom = limits.clamp(self.zoom);
        let tx = if self.translate_x.is_finite() { self.translate_x } else { 0.0 };
        let ty = if self.translate_y.is_finite() { self.translate_y } else { 0.0 };
        if zoom >= DEEP_ZOOM {
            return Transform::new(zoom, tx, ty);
        }

        let span = canvas.width.max(canvas.height);
        let (margin, min_visible): (f64, f64) = if zoom >= 1.0 {
            (3.0 * span, 50.0)
        } else {
            (0.8 * span, 100.0)
        };

        let bound = |translate: f64, scaled: f64, canvas_len: f64| {
            let visible = min_visible.min(scaled);
            let lo = visible - scaled - margin;
            let hi = canvas_len - visible + margin;
            if lo <= hi { translate.clamp(lo, hi) } else { (lo + hi) / 2.0 }
        };

        Transform::new(
            zoom,
            bound(tx, image.width * zoom, canvas.width),
            bound(ty, image.height * zoom, canvas.height),
        )
    }
}

/// Initial transform: fit the image inside the canvas with `padding` on
/// every side, never scaling above 100%, centered.
pub fn fit_to_view(image: ImageDimensions, canvas: Viewport, padding: f64) -> Transform {
    if !(image.width > 0.0 && image.height > 0.0) {
        return Transform::identity();
    }
    let zoom = ((canvas.width - 2.0 * padding) / image.width)
        .min((canvas.height - 2.0 * padding) / image.height)
        .min(1.0);
    if !(zoom > 0.0) || !zoom.is_finite() {
        return Transform::identity();
    }
    Transform::new(
        zoom,
        (canvas.width - image.width * zoom) / 2.0,
        (canvas.height - image.height * zoom) / 2.0,
    )
}

/// Zoom factor for one wheel event: `1 − delta_y · sensitivity`, bounded
/// to `[min, max]` so a single large delta cannot flip or explode the
/// zoom. The resulting zoom level is clamped by the caller.
pub fn wheel_zoom_factor(delta_y: f64, sensitivity: f64, min: f64, max: f64) -> f64 {
    let factor = 1.0 - delta_y * sensitivity;
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: ZoomLimits = ZoomLimits { min: 0.1, max: 10.0 };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn dims(width: f64, height: f64) -> ImageDimensions {
        ImageDimensions { width, height }
    }

    #[test]
    fn canvas_image_roundtrip() {
        let t = Transform::new(2.5, 40.0, -12.0);
        let p = Point::new(123.0, 45.5);
        let back = t.canvas_to_image(t.image_to_canvas(p));
        assert!(approx(back.x, p.x) && approx(back.y, p.y));
    }

    #[test]
    fn affine_is_scale_then_translate() {
        let t = Transform::new(2.0, 5.0, 7.0);
        assert_eq!(t.image_to_canvas(Point::new(10.0, 20.0)), Point::new(25.0, 47.0));
        assert_eq!(t.canvas_to_image(Point::new(25.0, 47.0)), Point::new(10.0, 20.0));
        assert_eq!(t.translation(), Vec2::new(5.0, 7.0));
    }

    #[test]
    fn fit_to_view_scales_down_and_centers() {
        let t = fit_to_view(dims(1000.0, 800.0), Viewport { width: 800.0, height: 600.0 }, 20.0);
        assert!(approx(t.zoom, 0.7));
        assert!(approx(t.translate_x, (800.0 - 700.0) / 2.0));
        assert!(approx(t.translate_y, (600.0 - 560.0) / 2.0));
    }

    #[test]
    fn fit_to_view_never_upscales() {
        let t = fit_to_view(dims(100.0, 50.0), Viewport { width: 800.0, height: 600.0 }, 20.0);
        assert_eq!(t.zoom, 1.0);
        assert!(approx(t.translate_x, 350.0));
        assert!(approx(t.translate_y, 275.0));
    }

    #[test]
    fn fit_to_view_with_empty_image_is_identity() {
        assert_eq!(fit_to_view(dims(0.0, 10.0), Viewport::default(), 20.0), Transform::identity());
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let t = Transform::new(1.0, 50.0, 30.0);
        let anchor = Point::new(150.0, 120.0);
        let before = t.canvas_to_image(anchor);
        let zoomed = t.zoom_at_fixed_point(anchor, 2.0, LIMITS);
        assert_eq!(zoomed.zoom, 2.0);
        let after = zoomed.canvas_to_image(anchor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }

    #[test]
    fn zoom_is_clamped_and_noop_at_limit() {
        let t = Transform::new(8.0, 0.0, 0.0);
        let zoomed = t.zoom_at_fixed_point(Point::new(10.0, 10.0), 2.0, LIMITS);
        assert_eq!(zoomed.zoom, 10.0);
        let again = zoomed.zoom_at_fixed_point(Point::new(10.0, 10.0), 2.0, LIMITS);
        assert_eq!(again, zoomed);
    }

    #[test]
    fn wheel_factor() {
        assert!(approx(wheel_zoom_factor(100.0, 0.001, 0.5, 2.0), 0.9));
        assert!(approx(wheel_zoom_factor(-100.0, 0.001, 0.5, 2.0), 1.1));
        assert_eq!(wheel_zoom_factor(5000.0, 0.001, 0.5, 2.0), 0.5);
    }

    #[test]
    fn constrain_always_clamps_zoom() {
        let canvas = Viewport::default();
        for zoom in [0.0, 0.01, 0.5, 1.5, 3.0, 50.0, f64::NAN] {
            let t = Transform::new(zoom, 0.0, 0.0).constrain(dims(640.0, 480.0), canvas, LIMITS);
            assert!(t.zoom >= LIMITS.min && t.zoom <= LIMITS.max, "zoom {zoom} → {}", t.zoom);
        }
    }

    #[test]
    fn constrain_leaves_deep_zoom_free() {
        let t = Transform::new(4.0, -1.0e6, 1.0e6);
        assert_eq!(t.constrain(dims(640.0, 480.0), Viewport::default(), LIMITS), t);
    }

    #[test]
    fn constrain_pulls_image_back_at_low_zoom() {
        let canvas = Viewport::default();
        let t = Transform::new(0.5, 1.0e6, -1.0e6).constrain(dims(640.0, 480.0), canvas, LIMITS);
        // Right edge bound: canvas width − 100 + 0.8 · 800.
        assert!(approx(t.translate_x, 800.0 - 100.0 + 640.0));
        // Top edge bound: 100 − 240 − 640.
        assert!(approx(t.translate_y, 100.0 - 240.0 - 640.0));
    }

    #[test]
    fn constrain_mid_zoom_is_more_generous() {
        let canvas = Viewport::default();
        let far = Transform::new(1.5, 3000.0, 0.0).constrain(dims(640.0, 480.0), canvas, LIMITS);
        assert_eq!(far.translate_x, 3000.0);
        let too_far = Transform::new(1.5, 5000.0, 0.0).constrain(dims(640.0, 480.0), canvas, LIMITS);
        assert!(approx(too_far.translate_x, 800.0 - 50.0 + 2400.0));
    }
}
