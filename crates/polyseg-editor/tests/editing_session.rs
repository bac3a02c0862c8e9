//! Integration tests: end-to-end editing sessions (polyseg-editor ↔
//! polyseg-core).
//!
//! Loads the fixture image, drives the editor through canvas-space input
//! the way a browser host would, and checks the state the renderer and the
//! save collaborator observe.

use polyseg_core::geometry::{point_in_polygon, polygon_area};
use polyseg_core::{EditorConfig, ImageData, Point, PolygonId, SaveError, Viewport};
use polyseg_editor::{
    EditMode, Editor, InputEvent, Modifiers, MoveCoalescer, NoticeLevel, PointerButton, SaveRequest,
    SaveSink,
};
use pretty_assertions::assert_eq;

fn id(name: &str) -> PolygonId {
    PolygonId::intern(name)
}

fn fixture() -> ImageData {
    serde_json::from_str(include_str!("fixtures/cells.json")).expect("fixture parses")
}

fn session() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut editor = Editor::new(EditorConfig::default(), Viewport::default());
    editor.load_image(fixture(), None);
    editor
}

fn canvas(editor: &Editor, x: f64, y: f64) -> Point {
    editor.transform().image_to_canvas(Point::new(x, y))
}

fn click(editor: &mut Editor, x: f64, y: f64) {
    let c = canvas(editor, x, y);
    editor.handle(&InputEvent::pointer_down(c.x, c.y));
    editor.handle(&InputEvent::pointer_up(c.x, c.y));
}

fn key(editor: &mut Editor, key: &str) {
    editor.handle(&InputEvent::key(key));
}

#[derive(Default)]
struct MemoryStore {
    saves: Vec<SaveRequest>,
    offline: bool,
}

impl SaveSink for MemoryStore {
    fn save(&mut self, request: &SaveRequest) -> Result<(), SaveError> {
        if self.offline {
            return Err(SaveError::Backend("network unreachable".to_string()));
        }
        self.saves.push(request.clone());
        Ok(())
    }
}

fn assert_rings_valid(editor: &Editor) {
    for polygon in editor.polygons() {
        assert!(
            polygon.points.len() >= 3,
            "{} has {} vertices",
            polygon.id,
            polygon.points.len()
        );
    }
}

// ─── Workflows ──────────────────────────────────────────────────────────

#[test]
fn draw_save_and_switch_image() {
    let mut editor = session();
    let mut store = MemoryStore::default();

    key(&mut editor, "n");
    assert_eq!(editor.mode(), EditMode::CreatePolygon);
    for (x, y) in [(820.0, 600.0), (950.0, 600.0), (950.0, 750.0), (820.0, 750.0)] {
        click(&mut editor, x, y);
    }
    assert_eq!(editor.temp_points().len(), 4);
    click(&mut editor, 822.0, 602.0);
    assert_eq!(editor.mode(), EditMode::View);
    assert_eq!(editor.polygons().len(), 6);
    let drawn = editor.polygons().last().expect("new polygon");
    assert!((polygon_area(&drawn.points) - 130.0 * 150.0).abs() < 1e-6);
    assert!(editor.has_unsaved_changes());

    let response = editor.handle(&InputEvent::Key {
        key: "s".to_string(),
        modifiers: Modifiers {
            meta: true,
            ..Modifiers::NONE
        },
    });
    assert!(response.save_requested);
    editor.save_with(&mut store).unwrap();
    assert!(!editor.has_unsaved_changes());
    assert_eq!(store.saves.len(), 1);
    assert_eq!(store.saves[0].image_id.as_deref(), Some("slide-017"));
    assert_eq!(store.saves[0].polygons.len(), 6);

    // Clean: switching does not autosave again.
    let next = ImageData {
        id: "slide-018".to_string(),
        width: 400.0,
        height: 300.0,
        polygons: vec![],
    };
    editor.load_image(next, Some(&mut store));
    assert_eq!(store.saves.len(), 1);
    assert!(editor.polygons().is_empty());
    assert_eq!(editor.transform().zoom, 1.0);
}

#[test]
fn offline_save_reports_and_keeps_dirty() {
    let mut editor = session();
    editor.delete_polygon(id("cell-u")).unwrap();
    let mut store = MemoryStore {
        offline: true,
        ..MemoryStore::default()
    };

    assert!(editor.save_with(&mut store).is_err());
    assert!(editor.has_unsaved_changes());
    let notices = editor.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);

    // Editing keeps working.
    editor.delete_polygon(id("cell-c")).unwrap();
    store.offline = false;
    editor.save_with(&mut store).unwrap();
    assert_eq!(store.saves[0].polygons.len(), 3);
    assert!(!editor.has_unsaved_changes());
}

#[test]
fn add_points_then_escape_and_right_click() {
    let mut editor = session();
    click(&mut editor, 120.0, 120.0);
    assert_eq!(editor.selected(), Some(id("cell-a")));

    key(&mut editor, "a");
    assert_eq!(editor.mode(), EditMode::AddPoints);
    click(&mut editor, 100.0, 100.0);
    click(&mut editor, 200.0, 60.0);
    assert_eq!(editor.temp_points().len(), 1);

    // Escape abandons the gesture but keeps the selection.
    key(&mut editor, "Escape");
    assert_eq!(editor.mode(), EditMode::EditVertices);
    assert!(editor.temp_points().is_empty());
    assert_eq!(editor.interaction().add_point_start_vertex, None);

    key(&mut editor, "a");
    click(&mut editor, 100.0, 100.0);
    click(&mut editor, 200.0, 60.0);
    click(&mut editor, 300.0, 100.0);
    assert_eq!(editor.mode(), EditMode::EditVertices);
    let cell = editor.polygon(id("cell-a")).expect("still there");
    assert_eq!(cell.points.len(), 5);
    assert!(polygon_area(&cell.points) > 200.0 * 200.0);

    let c = canvas(&editor, 0.0, 0.0);
    editor.handle(&InputEvent::PointerDown {
        x: c.x,
        y: c.y,
        button: PointerButton::Secondary,
        modifiers: Modifiers::NONE,
    });
    assert_eq!(editor.mode(), EditMode::View);
    assert_eq!(editor.selected(), Some(id("cell-a")));
}

#[test]
fn slice_then_select_a_piece() {
    let mut editor = session();
    click(&mut editor, 600.0, 400.0);
    key(&mut editor, "s");
    click(&mut editor, 450.0, 380.0);
    click(&mut editor, 750.0, 420.0);

    assert_eq!(editor.mode(), EditMode::View);
    assert_eq!(editor.selected(), None);
    assert_eq!(editor.polygons().len(), 6);
    assert!(editor.polygon(id("cell-b")).is_none());
    // Pieces take cell-b's place between hole-a and cell-c.
    assert_eq!(editor.polygons()[1].id, id("hole-a"));
    assert_eq!(editor.polygons()[4].id, id("cell-c"));
    for piece in &editor.polygons()[2..4] {
        assert_eq!(piece.color.as_deref(), Some("#33aa55"));
    }

    let probe = Point::new(600.0, 460.0);
    let lower = editor.polygons()[2..4]
        .iter()
        .find(|piece| point_in_polygon(probe, &piece.points))
        .map(|piece| piece.id);
    assert!(lower.is_some());
    click(&mut editor, probe.x, probe.y);
    assert_eq!(editor.selected(), lower);
    assert_eq!(editor.mode(), EditMode::EditVertices);
}

#[test]
fn slice_mode_without_selection_heals_to_view() {
    let mut editor = session();
    key(&mut editor, "s");
    assert_eq!(editor.mode(), EditMode::View);
    key(&mut editor, "e");
    assert_eq!(editor.mode(), EditMode::View);
    key(&mut editor, "d");
    assert_eq!(editor.mode(), EditMode::DeletePolygon);
}

#[test]
fn coalesced_pan_matches_direct_pan() {
    let mut direct = session();
    let mut coalesced = session();
    let mut coalescer = MoveCoalescer::new();

    let start = canvas(&direct, 950.0, 780.0);
    let path: Vec<InputEvent> = (1..=30)
        .map(|i| InputEvent::pointer_move(start.x - 2.0 * i as f64, start.y - 1.5 * i as f64))
        .collect();
    let end = (start.x - 60.0, start.y - 45.0);

    direct.handle(&InputEvent::pointer_down(start.x, start.y));
    for event in &path {
        direct.handle(event);
    }
    direct.handle(&InputEvent::pointer_up(end.0, end.1));

    for event in coalescer.push(InputEvent::pointer_down(start.x, start.y)) {
        coalesced.handle(&event);
    }
    for (frame, event) in path.into_iter().enumerate() {
        for ready in coalescer.push(event) {
            coalesced.handle(&ready);
        }
        if frame % 4 == 3 {
            for ready in coalescer.flush() {
                coalesced.handle(&ready);
            }
        }
    }
    for ready in coalescer.push(InputEvent::pointer_up(end.0, end.1)) {
        coalesced.handle(&ready);
    }

    let (a, b) = (direct.transform(), coalesced.transform());
    assert!((a.translate_x - b.translate_x).abs() < 1e-9);
    assert!((a.translate_y - b.translate_y).abs() < 1e-9);
    assert!(a.translate_x < 50.0, "pan should have moved the view");
    assert_eq!(direct.history().len(), 1);
}

#[test]
fn wheel_zoom_keeps_cursor_anchored() {
    let mut editor = session();
    let cursor = canvas(&editor, 600.0, 400.0);
    editor.handle(&InputEvent::Wheel {
        x: cursor.x,
        y: cursor.y,
        delta_y: -300.0,
    });
    assert!((editor.transform().zoom - 0.7 * 1.3).abs() < 1e-9);
    let under_cursor = editor.transform().canvas_to_image(cursor);
    assert!(under_cursor.distance(Point::new(600.0, 400.0)) < 1e-6);

    key(&mut editor, "0");
    assert!((editor.transform().zoom - 0.7).abs() < 1e-12);
}

#[test]
fn random_edit_sequence_keeps_rings_valid() {
    let mut editor = session();
    let targets = ["cell-a", "hole-a", "cell-b", "cell-c", "cell-u"];
    for (round, name) in targets.iter().cycle().take(40).enumerate() {
        let target = id(name);
        let Some(polygon) = editor.polygon(target) else {
            continue;
        };
        let n = polygon.points.len();
        match round % 3 {
            0 => {
                let _ = editor.delete_vertex(target, round % n);
            }
            1 => {
                let _ = editor.remove_vertex_range(target, 0, n / 2);
            }
            _ => {
                editor.undo();
            }
        }
        assert_rings_valid(&editor);
    }
}

#[test]
fn view_projection_for_renderer() {
    let mut editor = session();
    click(&mut editor, 175.0, 175.0);
    let json = serde_json::to_value(editor.view()).expect("serializes");
    assert_eq!(json["selected_polygon_id"], "hole-a");
    assert_eq!(json["mode"], "EditVertices");
    assert_eq!(json["polygons"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["polygons"][1]["type"], "internal");
    assert_eq!(json["interaction"]["is_panning"], false);
    assert_eq!(json["has_unsaved_changes"], false);
}
