//! Interaction controller.
//!
//! `Editor` owns the authoritative editing state: the polygon list, its
//! history, the mode machine, the canvas transform and every piece of
//! transient gesture state. Input events are dispatched by
//! [`Editor::handle`]; mode-specific pointer-down handlers live in
//! `tools`, the image/save lifecycle in `session`.
//!
//! After every event the selection invariant is re-checked, and a mode
//! change always discards temp points and interaction state.

use crate::history::History;
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::mode::{EditMode, ModeMachine, Transition};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::SliceSlot;
use polyseg_core::geometry::{AREA_EPSILON, point_in_polygon, polygon_area};
use polyseg_core::hit::{VertexRef, hit_test_vertex};
use polyseg_core::model::{self, ImageDimensions, MIN_VERTICES, Point, Polygon, PolygonKind, Vec2};
use polyseg_core::{
    EditError, EditorConfig, PolygonId, Transform, Viewport, fit_to_view, remove_vertices_between,
    wheel_zoom_factor,
};
use serde::Serialize;

// ─── Outputs ─────────────────────────────────────────────────────────────

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// Visible state changed.
    pub repaint: bool,
    /// A new history entry was written.
    pub committed: bool,
    /// The user asked to save (Ctrl/⌘+S).
    pub save_requested: bool,
}

impl Response {
    pub const NONE: Response = Response {
        repaint: false,
        committed: false,
        save_requested: false,
    };

    pub const REPAINT: Response = Response {
        repaint: true,
        ..Response::NONE
    };

    pub const COMMITTED: Response = Response {
        repaint: true,
        committed: true,
        save_requested: false,
    };

    pub fn repaint_if(changed: bool) -> Self {
        Response {
            repaint: changed,
            ..Response::NONE
        }
    }

    pub fn merge(self, other: Response) -> Self {
        Response {
            repaint: self.repaint || other.repaint,
            committed: self.committed || other.committed,
            save_requested: self.save_requested || other.save_requested,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user (toast, status bar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

// ─── Transient state ─────────────────────────────────────────────────────

/// Per-gesture state. Never enters history; reset to its default on mode
/// change, Escape, undo and redo.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InteractionState {
    pub is_dragging_vertex: bool,
    pub is_panning: bool,
    /// Canvas position at the previous pan frame.
    pub pan_start: Option<Point>,
    pub dragged_vertex: Option<VertexRef>,
    pub original_vertex_position: Option<Point>,
    /// Image-space offset of the dragged vertex from its original position.
    pub drag_offset: Vec2,
    pub slice_start_point: Option<Point>,
    pub add_point_start_vertex: Option<usize>,
    pub add_point_end_vertex: Option<usize>,
    pub is_adding_points: bool,
}

/// Image currently being edited.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoadedImage {
    pub id: String,
    pub dimensions: ImageDimensions,
}

/// Read-only projection for the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct EditorView<'a> {
    pub polygons: &'a [Polygon],
    pub transform: Transform,
    pub interaction: &'a InteractionState,
    pub temp_points: &'a [Point],
    pub hovered_vertex: Option<VertexRef>,
    pub selected_polygon_id: Option<PolygonId>,
    pub mode: EditMode,
    pub has_unsaved_changes: bool,
}

// ─── Editor ──────────────────────────────────────────────────────────────

/// The editing session for one image at a time.
pub struct Editor {
    pub(crate) polygons: Vec<Polygon>,
    pub(crate) history: History,
    pub(crate) modes: ModeMachine,
    pub(crate) transform: Transform,
    pub(crate) canvas: Viewport,
    pub(crate) image: Option<LoadedImage>,
    /// Bumped on every image load so stale save tickets are recognised.
    pub(crate) image_epoch: u64,
    pub(crate) config: EditorConfig,
    pub(crate) interaction: InteractionState,
    pub(crate) temp_points: Vec<Point>,
    pub(crate) hovered_vertex: Option<VertexRef>,
    pub(crate) notices: Vec<Notice>,
    pub(crate) slice_slot: SliceSlot,
}

impl Editor {
    pub fn new(config: EditorConfig, canvas: Viewport) -> Self {
        Self {
            polygons: Vec::new(),
            history: History::new(Vec::new(), config.history_limit),
            modes: ModeMachine::new(),
            transform: Transform::identity(),
            canvas,
            image: None,
            image_epoch: 0,
            config,
            interaction: InteractionState::default(),
            temp_points: Vec::new(),
            hovered_vertex: None,
            notices: Vec::new(),
            slice_slot: SliceSlot::default(),
        }
    }

    // ── Accessors ──

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        model::find(&self.polygons, id)
    }

    pub fn mode(&self) -> EditMode {
        self.modes.mode()
    }

    pub fn selected(&self) -> Option<PolygonId> {
        self.modes.selected()
    }

    pub fn selected_polygon(&self) -> Option<&Polygon> {
        self.modes.selected().and_then(|id| self.polygon(id))
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn canvas(&self) -> Viewport {
        self.canvas
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn temp_points(&self) -> &[Point] {
        &self.temp_points
    }

    pub fn hovered_vertex(&self) -> Option<VertexRef> {
        self.hovered_vertex
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image.as_ref().map(|img| img.id.as_str())
    }

    /// Drain queued user-facing messages.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Where the dragged vertex should be drawn right now.
    pub fn drag_preview(&self) -> Option<(VertexRef, Point)> {
        let vertex = self.interaction.dragged_vertex?;
        let original = self.interaction.original_vertex_position?;
        Some((vertex, original + self.interaction.drag_offset))
    }

    pub fn view(&self) -> EditorView<'_> {
        EditorView {
            polygons: &self.polygons,
            transform: self.transform,
            interaction: &self.interaction,
            temp_points: &self.temp_points,
            hovered_vertex: self.hovered_vertex,
            selected_polygon_id: self.modes.selected(),
            mode: self.modes.mode(),
            has_unsaved_changes: self.has_unsaved_changes(),
        }
    }

    // ── Shared helpers ──

    /// Convert a canvas-pixel radius from the config to image units.
    pub(crate) fn image_radius(&self, canvas_px: f64) -> f64 {
        self.transform.canvas_length_to_image(canvas_px)
    }

    /// Drop every piece of uncommitted gesture state.
    pub(crate) fn reset_gesture(&mut self) {
        self.interaction = InteractionState::default();
        self.temp_points.clear();
        self.hovered_vertex = None;
    }

    /// Apply the side effects of a mode transition. Returns whether the
    /// mode changed.
    pub(crate) fn apply_transition(&mut self, transition: Transition) -> bool {
        if transition.changed() {
            self.reset_gesture();
        }
        transition.changed()
    }

    /// Write the current polygon list to history.
    pub(crate) fn commit(&mut self) -> Response {
        self.history.commit(self.polygons.clone());
        Response::COMMITTED
    }

    /// Queue a warning for a rejected operation and hand the error back.
    pub(crate) fn reject<T>(&mut self, err: EditError) -> Result<T, EditError> {
        log::warn!("rejected: {err}");
        self.notices.push(Notice::warning(err.to_string()));
        Err(err)
    }

    pub(crate) fn index_of(&self, id: PolygonId) -> Option<usize> {
        model::position_of(&self.polygons, id)
    }

    /// Re-bound the transform against the loaded image, if any.
    pub(crate) fn set_transform(&mut self, transform: Transform) -> bool {
        let next = match &self.image {
            Some(image) => transform.constrain(image.dimensions, self.canvas, self.config.zoom_limits()),
            None => Transform::new(
                self.config.zoom_limits().clamp(transform.zoom),
                transform.translate_x,
                transform.translate_y,
            ),
        };
        let changed = next != self.transform;
        self.transform = next;
        changed
    }

    pub(crate) fn start_pan(&mut self, canvas: Point) -> Response {
        self.interaction.is_panning = true;
        self.interaction.pan_start = Some(canvas);
        Response::NONE
    }

    // ── Dispatch ──

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent) -> Response {
        let response = match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(*x, *y), *button, *modifiers),
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Wheel { x, y, delta_y } => self.wheel(Point::new(*x, *y), *delta_y),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        };

        let healed = self.modes.enforce();
        let healed = self.apply_transition(healed);
        response.merge(Response::repaint_if(healed))
    }

    fn pointer_down(&mut self, canvas: Point, button: PointerButton, modifiers: Modifiers) -> Response {
        if !canvas.is_finite() {
            return Response::NONE;
        }
        match button {
            PointerButton::Secondary => return self.step_back(),
            PointerButton::Middle => return self.start_pan(canvas),
            PointerButton::Primary if modifiers.alt || modifiers.space => {
                return self.start_pan(canvas);
            }
            PointerButton::Primary => {}
        }

        let p = self.transform.canvas_to_image(canvas);
        log::trace!("pointer down {:?} at {p:?}", self.modes.mode());
        match self.modes.mode() {
            EditMode::View => self.view_pointer_down(canvas, p),
            EditMode::CreatePolygon => self.create_pointer_down(p),
            EditMode::EditVertices => self.edit_vertices_pointer_down(canvas, p, modifiers),
            EditMode::AddPoints => self.add_points_pointer_down(p),
            EditMode::Slice => self.slice_pointer_down(p),
            EditMode::DeletePolygon => self.delete_pointer_down(p),
        }
    }

    /// Right-click: undo one level of local gesture state.
    fn step_back(&mut self) -> Response {
        match self.modes.mode() {
            EditMode::View => Response::NONE,
            EditMode::Slice => {
                if !self.temp_points.is_empty() || self.interaction.slice_start_point.is_some() {
                    self.temp_points.clear();
                    self.interaction.slice_start_point = None;
                } else if self.modes.selected().is_some() {
                    let t = self.modes.deselect();
                    self.apply_transition(t);
                } else {
                    let t = self.modes.set_mode(EditMode::View);
                    self.apply_transition(t);
                }
                Response::REPAINT
            }
            _ => {
                let t = self.modes.set_mode(EditMode::View);
                self.apply_transition(t);
                self.reset_gesture();
                Response::REPAINT
            }
        }
    }

    fn pointer_move(&mut self, canvas: Point, modifiers: Modifiers) -> Response {
        if !canvas.is_finite() {
            return Response::NONE;
        }

        if self.interaction.is_panning {
            let Some(last) = self.interaction.pan_start else {
                return Response::NONE;
            };
            let delta = canvas - last;
            self.interaction.pan_start = Some(canvas);
            let changed = self.set_transform(self.transform.pan_by(delta.x, delta.y));
            return Response::repaint_if(changed);
        }

        let p = self.transform.canvas_to_image(canvas);

        if self.interaction.is_dragging_vertex {
            let Some(original) = self.interaction.original_vertex_position else {
                return Response::NONE;
            };
            self.interaction.drag_offset = p - original;
            return Response::REPAINT;
        }

        let mut response = Response::NONE;
        if modifiers.shift {
            response = response.merge(self.auto_sample(p));
        }
        if self.modes.mode().is_vertex_sensitive() {
            response = response.merge(self.update_hover(p));
        }
        response
    }

    /// Shift-drag freehand: drop a point whenever the cursor has moved far
    /// enough from the previous one.
    fn auto_sample(&mut self, p: Point) -> Response {
        let last = match self.modes.mode() {
            EditMode::CreatePolygon => self.temp_points.last().copied(),
            EditMode::AddPoints => match self.interaction.add_point_start_vertex {
                Some(start) => self.temp_points.last().copied().or_else(|| {
                    self.selected_polygon()
                        .and_then(|poly| poly.points.get(start).copied())
                }),
                None => None,
            },
            _ => None,
        };
        let Some(last) = last else {
            return Response::NONE;
        };
        if last.distance(p) > self.image_radius(self.config.auto_sample_distance) {
            self.temp_points.push(p);
            return Response::REPAINT;
        }
        Response::NONE
    }

    fn update_hover(&mut self, p: Point) -> Response {
        let radius = self.image_radius(self.config.vertex_hit_radius);
        let hovered = self
            .selected_polygon()
            .and_then(|poly| hit_test_vertex(poly, p, radius));
        let changed = hovered != self.hovered_vertex;
        self.hovered_vertex = hovered;
        Response::repaint_if(changed)
    }

    fn pointer_up(&mut self) -> Response {
        let mut response = Response::NONE;
        if self.interaction.is_panning {
            self.interaction.is_panning = false;
            self.interaction.pan_start = None;
        }
        if self.interaction.is_dragging_vertex {
            response = self.finish_vertex_drag();
        }
        response
    }

    /// The only place a drag touches committed state.
    fn finish_vertex_drag(&mut self) -> Response {
        let preview = self.drag_preview();
        let offset = self.interaction.drag_offset;
        self.interaction.is_dragging_vertex = false;
        self.interaction.dragged_vertex = None;
        self.interaction.original_vertex_position = None;
        self.interaction.drag_offset = Vec2::ZERO;

        let Some((vertex, target)) = preview else {
            return Response::REPAINT;
        };
        if offset == Vec2::ZERO || !target.is_finite() {
            return Response::REPAINT;
        }
        let Some(index) = self.index_of(vertex.polygon_id) else {
            return Response::REPAINT;
        };
        let Some(slot) = self.polygons[index].points.get_mut(vertex.vertex_index) else {
            return Response::REPAINT;
        };
        *slot = target;
        log::debug!("moved vertex {} of {}", vertex.vertex_index, vertex.polygon_id);
        self.commit()
    }

    fn wheel(&mut self, canvas: Point, delta_y: f64) -> Response {
        let factor = wheel_zoom_factor(
            delta_y,
            self.config.wheel_sensitivity,
            self.config.wheel_factor_min,
            self.config.wheel_factor_max,
        );
        let zoomed = self
            .transform
            .zoom_at_fixed_point(canvas, factor, self.config.zoom_limits());
        Response::repaint_if(self.set_transform(zoomed))
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) -> Response {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Response::NONE;
        };
        log::trace!("shortcut {action:?}");
        match action {
            ShortcutAction::SetMode(mode) => {
                let before = self.modes.mode();
                Response::repaint_if(self.set_mode(mode) != before)
            }
            ShortcutAction::Cancel => {
                self.escape();
                Response::REPAINT
            }
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Save => Response {
                save_requested: true,
                ..Response::NONE
            },
            ShortcutAction::DeleteVertex => {
                let Some(vertex) = self.hovered_vertex else {
                    return Response::NONE;
                };
                self.delete_vertex(vertex.polygon_id, vertex.vertex_index)
                    .unwrap_or(Response::REPAINT)
            }
            ShortcutAction::ZoomIn => self.zoom_step(self.config.zoom_step),
            ShortcutAction::ZoomOut => self.zoom_step(1.0 / self.config.zoom_step),
            ShortcutAction::ResetView => Response::repaint_if(self.reset_view()),
        }
    }

    // ── View operations ──

    /// Zoom around the canvas centre.
    pub fn zoom_step(&mut self, factor: f64) -> Response {
        let zoomed =
            self.transform
                .zoom_at_fixed_point(self.canvas.center(), factor, self.config.zoom_limits());
        Response::repaint_if(self.set_transform(zoomed))
    }

    /// Fit the loaded image to the canvas again. Returns whether anything moved.
    pub fn reset_view(&mut self) -> bool {
        let fitted = match &self.image {
            Some(image) => fit_to_view(image.dimensions, self.canvas, self.config.fit_padding),
            None => Transform::identity(),
        };
        let changed = fitted != self.transform;
        self.transform = fitted;
        changed
    }

    /// The canvas element was resized.
    pub fn set_canvas_size(&mut self, canvas: Viewport) -> Response {
        self.canvas = canvas;
        Response::repaint_if(self.set_transform(self.transform))
    }

    // ── Mode & selection ──

    /// Request a mode. Returns the mode actually entered.
    pub fn set_mode(&mut self, mode: EditMode) -> EditMode {
        let t = self.modes.set_mode(mode);
        self.apply_transition(t);
        self.modes.mode()
    }

    /// Cancel the current gesture.
    pub fn escape(&mut self) {
        let t = self.modes.escape();
        self.apply_transition(t);
        self.reset_gesture();
    }

    pub fn select_polygon(&mut self, id: PolygonId) -> Result<(), EditError> {
        if self.index_of(id).is_none() {
            return self.reject(EditError::UnknownPolygon(id));
        }
        if self.modes.selected() != Some(id) {
            self.reset_gesture();
        }
        let t = self.modes.select(id);
        self.apply_transition(t);
        Ok(())
    }

    pub fn deselect(&mut self) {
        let t = self.modes.deselect();
        self.apply_transition(t);
        self.hovered_vertex = None;
    }

    // ── History ──

    pub fn undo(&mut self) -> Response {
        let Some(snapshot) = self.history.undo() else {
            return Response::NONE;
        };
        self.polygons = snapshot.to_vec();
        self.after_history_jump();
        Response::REPAINT
    }

    pub fn redo(&mut self) -> Response {
        let Some(snapshot) = self.history.redo() else {
            return Response::NONE;
        };
        self.polygons = snapshot.to_vec();
        self.after_history_jump();
        Response::REPAINT
    }

    fn after_history_jump(&mut self) {
        self.reset_gesture();
        if let Some(id) = self.modes.selected()
            && self.index_of(id).is_none()
        {
            let t = self.modes.deselect();
            self.apply_transition(t);
        }
    }

    // ── Polygon edits (each is one history entry) ──
    //
    // Edits renumber vertices, so any gesture holding vertex indices
    // (drag, add-points sequence, hover) is dropped when one succeeds.

    /// Remove a single vertex. Rejected if the polygon would drop below
    /// three vertices or lose its area.
    pub fn delete_vertex(&mut self, id: PolygonId, index: usize) -> Result<Response, EditError> {
        let Some(pos) = self.index_of(id) else {
            return self.reject(EditError::UnknownPolygon(id));
        };
        let len = self.polygons[pos].points.len();
        if index >= len {
            return self.reject(EditError::VertexOutOfRange {
                polygon: id,
                index,
                len,
            });
        }
        if len - 1 < MIN_VERTICES {
            return self.reject(EditError::TooFewVertices {
                min: MIN_VERTICES,
                remaining: len - 1,
            });
        }
        let mut points = self.polygons[pos].points.clone();
        points.remove(index);
        if polygon_area(&points) <= AREA_EPSILON {
            return self.reject(EditError::DegenerateResult);
        }
        self.polygons[pos].points = points;
        self.reset_gesture();
        log::debug!("deleted vertex {index} of {id}");
        Ok(self.commit())
    }

    /// Remove every vertex between two vertices along the shorter arc.
    pub fn remove_vertex_range(
        &mut self,
        id: PolygonId,
        start: usize,
        end: usize,
    ) -> Result<Response, EditError> {
        let Some(pos) = self.index_of(id) else {
            return self.reject(EditError::UnknownPolygon(id));
        };
        let len = self.polygons[pos].points.len();
        for index in [start, end] {
            if index >= len {
                return self.reject(EditError::VertexOutOfRange {
                    polygon: id,
                    index,
                    len,
                });
            }
        }
        let points = remove_vertices_between(&self.polygons[pos].points, start, end);
        if points == self.polygons[pos].points {
            return Ok(Response::NONE);
        }
        if points.len() < MIN_VERTICES {
            return self.reject(EditError::TooFewVertices {
                min: MIN_VERTICES,
                remaining: points.len(),
            });
        }
        if polygon_area(&points) <= AREA_EPSILON {
            return self.reject(EditError::DegenerateResult);
        }
        self.polygons[pos].points = points;
        self.reset_gesture();
        Ok(self.commit())
    }

    /// Insert a vertex on the edge that starts at `after`.
    pub fn insert_vertex(&mut self, id: PolygonId, after: usize, at: Point) -> Result<Response, EditError> {
        let Some(pos) = self.index_of(id) else {
            return self.reject(EditError::UnknownPolygon(id));
        };
        let len = self.polygons[pos].points.len();
        if after >= len {
            return self.reject(EditError::VertexOutOfRange {
                polygon: id,
                index: after,
                len,
            });
        }
        if !at.is_finite() {
            return Ok(Response::NONE);
        }
        self.polygons[pos].points.insert(after + 1, at);
        self.reset_gesture();
        log::debug!("inserted vertex after {after} of {id}");
        Ok(self.commit())
    }

    pub fn delete_polygon(&mut self, id: PolygonId) -> Result<Response, EditError> {
        let Some(pos) = self.index_of(id) else {
            return self.reject(EditError::UnknownPolygon(id));
        };
        self.polygons.remove(pos);
        if self.modes.selected() == Some(id) {
            let t = self.modes.deselect();
            self.apply_transition(t);
        }
        self.reset_gesture();
        log::debug!("deleted polygon {id}");
        Ok(self.commit())
    }

    pub fn set_polygon_kind(&mut self, id: PolygonId, kind: PolygonKind) -> Result<Response, EditError> {
        let Some(pos) = self.index_of(id) else {
            return self.reject(EditError::UnknownPolygon(id));
        };
        if self.polygons[pos].kind == kind {
            return Ok(Response::NONE);
        }
        self.polygons[pos].kind = kind;
        Ok(self.commit())
    }

    /// True when `p` is inside the selected polygon's body.
    pub(crate) fn inside_selected(&self, p: Point) -> bool {
        self.selected_polygon()
            .is_some_and(|poly| point_in_polygon(p, &poly.points))
    }
}
