//! Mode-specific pointer-down handlers.
//!
//! Each handler receives the image-space point already resolved by the
//! controller and returns a [`Response`]. Handlers that finish a gesture
//! commit to history and drive the mode machine to its follow-up mode.

use crate::controller::{Editor, Notice, Response};
use crate::input::Modifiers;
use polyseg_core::geometry::{AREA_EPSILON, polygon_area};
use polyseg_core::hit::{hit_test_edge, hit_test_polygon, hit_test_vertex};
use polyseg_core::model::{MIN_VERTICES, Point, Polygon, Vec2};
use polyseg_core::{
    PolygonId, SliceRejection, insert_vertices_between, slice_polygon, validate_slice_line,
};
use std::cell::Cell;
use std::rc::Rc;

// ─── Slice in-flight slot ────────────────────────────────────────────────

/// Single-slot guard against running the slice pipeline twice for the
/// same attempt.
#[derive(Debug, Default)]
pub struct SliceSlot {
    busy: Rc<Cell<bool>>,
}

impl SliceSlot {
    /// Take the slot, or `None` if a slice is already running.
    pub fn acquire(&self) -> Option<SliceToken> {
        if self.busy.replace(true) {
            return None;
        }
        Some(SliceToken {
            busy: Rc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

/// Releases the slot when dropped, including during unwinding.
#[derive(Debug)]
pub struct SliceToken {
    busy: Rc<Cell<bool>>,
}

impl Drop for SliceToken {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

// ─── Handlers ────────────────────────────────────────────────────────────

impl Editor {
    pub(crate) fn view_pointer_down(&mut self, canvas: Point, p: Point) -> Response {
        if let Some(id) = hit_test_polygon(&self.polygons, p) {
            let t = self.modes.select(id);
            self.apply_transition(t);
            return Response::REPAINT;
        }
        if self.modes.selected().is_some() {
            let t = self.modes.deselect();
            self.apply_transition(t);
            return Response::REPAINT;
        }
        self.start_pan(canvas)
    }

    pub(crate) fn create_pointer_down(&mut self, p: Point) -> Response {
        let close_radius = self.image_radius(self.config.close_radius);
        if let Some(&first) = self.temp_points.first()
            && self.temp_points.len() >= MIN_VERTICES
            && first.distance(p) <= close_radius
        {
            return self.close_new_polygon();
        }
        self.temp_points.push(p);
        Response::REPAINT
    }

    fn close_new_polygon(&mut self) -> Response {
        let points = std::mem::take(&mut self.temp_points);
        if polygon_area(&points) <= AREA_EPSILON {
            self.notices
                .push(Notice::warning("the new polygon has no area; keep adding points"));
            self.temp_points = points;
            return Response::NONE;
        }
        let polygon = Polygon::new(PolygonId::fresh(), points);
        log::debug!("created polygon {} ({} vertices)", polygon.id, polygon.points.len());
        self.polygons.push(polygon);
        let response = self.commit();
        let t = self.modes.complete_create();
        self.apply_transition(t);
        response
    }

    pub(crate) fn edit_vertices_pointer_down(
        &mut self,
        canvas: Point,
        p: Point,
        modifiers: Modifiers,
    ) -> Response {
        let radius = self.image_radius(self.config.vertex_hit_radius);
        let Some(polygon) = self.selected_polygon() else {
            return Response::NONE;
        };

        if let Some(vertex) = hit_test_vertex(polygon, p, radius) {
            let original = polygon.points[vertex.vertex_index];
            self.interaction.is_dragging_vertex = true;
            self.interaction.dragged_vertex = Some(vertex);
            self.interaction.original_vertex_position = Some(original);
            self.interaction.drag_offset = Vec2::ZERO;
            return Response::REPAINT;
        }

        if modifiers.command() {
            let id = polygon.id;
            if let Some((after, at)) = hit_test_edge(polygon, p, radius) {
                return self.insert_vertex(id, after, at).unwrap_or(Response::NONE);
            }
        }

        if self.inside_selected(p) {
            return self.start_pan(canvas);
        }
        Response::NONE
    }

    pub(crate) fn add_points_pointer_down(&mut self, p: Point) -> Response {
        let radius = self.image_radius(self.config.vertex_hit_radius);
        let Some(polygon) = self.selected_polygon() else {
            return Response::NONE;
        };
        let hit = hit_test_vertex(polygon, p, radius).map(|v| v.vertex_index);

        match (self.interaction.add_point_start_vertex, hit) {
            (None, Some(start)) => {
                self.interaction.add_point_start_vertex = Some(start);
                self.interaction.is_adding_points = true;
                self.temp_points.clear();
                Response::REPAINT
            }
            // The sequence must begin on a vertex.
            (None, None) => Response::NONE,
            (Some(start), Some(end)) if end != start => {
                self.interaction.add_point_end_vertex = Some(end);
                self.complete_add_points(start, end)
            }
            (Some(_), Some(_)) => Response::NONE,
            (Some(_), None) => {
                self.temp_points.push(p);
                Response::REPAINT
            }
        }
    }

    fn complete_add_points(&mut self, start: usize, end: usize) -> Response {
        let Some(id) = self.modes.selected() else {
            return Response::NONE;
        };
        let Some(pos) = self.index_of(id) else {
            return Response::NONE;
        };
        let new_points = std::mem::take(&mut self.temp_points);

        let mut response = Response::REPAINT;
        if !new_points.is_empty() {
            let points = insert_vertices_between(&self.polygons[pos].points, start, end, &new_points);
            if points.len() >= MIN_VERTICES && points != self.polygons[pos].points {
                log::debug!("added {} points to {id}", new_points.len());
                self.polygons[pos].points = points;
                response = self.commit();
            }
        }
        let t = self.modes.complete_add_points();
        self.apply_transition(t);
        response
    }

    pub(crate) fn slice_pointer_down(&mut self, p: Point) -> Response {
        if self.selected_polygon().is_none() {
            return Response::NONE;
        }
        match self.interaction.slice_start_point {
            None => {
                self.interaction.slice_start_point = Some(p);
                self.temp_points = vec![p];
                Response::REPAINT
            }
            Some(start) => {
                self.temp_points = vec![start, p];
                self.run_slice()
            }
        }
    }

    /// Validate, split, and replace the selected polygon in place.
    pub(crate) fn run_slice(&mut self) -> Response {
        let Some(_token) = self.slice_slot.acquire() else {
            log::debug!("slice already in flight; ignoring duplicate trigger");
            return Response::NONE;
        };
        let &[a, b] = self.temp_points.as_slice() else {
            return Response::NONE;
        };
        let Some(id) = self.modes.selected() else {
            return Response::NONE;
        };
        let Some(pos) = self.index_of(id) else {
            return Response::NONE;
        };

        let original = &self.polygons[pos];
        let result = validate_slice_line(original, a, b)
            .and_then(|()| slice_polygon(original, a, b).ok_or(SliceRejection::DegeneratePiece));

        match result {
            Err(reason) => {
                log::warn!("slice of {id} rejected: {reason}");
                self.notices.push(Notice::warning(format!("Cannot slice: {reason}")));
                self.temp_points.clear();
                self.interaction.slice_start_point = None;
                Response::REPAINT
            }
            Ok((left, right)) => {
                log::debug!("sliced {id} into {} and {}", left.id, right.id);
                self.polygons.splice(pos..=pos, [left, right]);
                let response = self.commit();
                let t = self.modes.complete_slice();
                self.apply_transition(t);
                self.reset_gesture();
                response
            }
        }
    }

    pub(crate) fn delete_pointer_down(&mut self, p: Point) -> Response {
        match hit_test_polygon(&self.polygons, p) {
            Some(id) => self.delete_polygon(id).unwrap_or(Response::NONE),
            None => Response::NONE,
        }
    }
}
