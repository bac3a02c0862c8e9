//! Edit-mode state machine.
//!
//! Owns the active `EditMode` together with the selected polygon, because
//! the legal modes depend on whether something is selected. Every method
//! returns the `Transition` it performed so the caller can discard
//! transient state when the mode actually changed.
//!
//! | Event | From | To |
//! |-------|------|----|
//! | select | View | EditVertices |
//! | select | any other | unchanged |
//! | deselect | EditVertices | View |
//! | escape | any | EditVertices if selected, else View |
//! | invariant check | EditVertices / AddPoints / Slice without selection | View |

use polyseg_core::PolygonId;
use serde::Serialize;

/// The editing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EditMode {
    #[default]
    View,
    EditVertices,
    AddPoints,
    CreatePolygon,
    Slice,
    DeletePolygon,
}

impl EditMode {
    /// Modes that operate on the selected polygon.
    pub fn requires_selection(self) -> bool {
        matches!(self, Self::EditVertices | Self::AddPoints | Self::Slice)
    }

    /// Modes that show hovered-vertex feedback.
    pub fn is_vertex_sensitive(self) -> bool {
        matches!(self, Self::EditVertices | Self::AddPoints)
    }
}

/// A mode change (possibly to the same mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: EditMode,
    pub to: EditMode,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Mode + selection, kept consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeMachine {
    mode: EditMode,
    selected: Option<PolygonId>,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn selected(&self) -> Option<PolygonId> {
        self.selected
    }

    fn go(&mut self, to: EditMode) -> Transition {
        let t = Transition { from: self.mode, to };
        if t.changed() {
            log::debug!("mode {:?} → {:?}", t.from, t.to);
        }
        self.mode = to;
        t
    }

    /// Combine two steps into one transition from the original mode.
    fn chain(first: Transition, second: Transition) -> Transition {
        Transition {
            from: first.from,
            to: second.to,
        }
    }

    /// Select a polygon. Only View reacts, by moving to EditVertices.
    pub fn select(&mut self, id: PolygonId) -> Transition {
        self.selected = Some(id);
        match self.mode {
            EditMode::View => self.go(EditMode::EditVertices),
            mode => self.go(mode),
        }
    }

    /// Clear the selection. EditVertices falls back to View; other
    /// selection-dependent modes are caught by the invariant check.
    pub fn deselect(&mut self) -> Transition {
        self.selected = None;
        let first = match self.mode {
            EditMode::EditVertices => self.go(EditMode::View),
            mode => self.go(mode),
        };
        let second = self.enforce();
        Self::chain(first, second)
    }

    /// Request a mode. Selection-dependent modes without a selection are
    /// immediately healed back to View.
    pub fn set_mode(&mut self, mode: EditMode) -> Transition {
        let first = self.go(mode);
        let second = self.enforce();
        Self::chain(first, second)
    }

    /// Cancel: back to EditVertices when something is selected, else View.
    pub fn escape(&mut self) -> Transition {
        match self.selected {
            Some(_) => self.go(EditMode::EditVertices),
            None => self.go(EditMode::View),
        }
    }

    /// Self-healing invariant: a selection-dependent mode with nothing
    /// selected becomes View.
    pub fn enforce(&mut self) -> Transition {
        if self.mode.requires_selection() && self.selected.is_none() {
            self.go(EditMode::View)
        } else {
            self.go(self.mode)
        }
    }

    /// The add-points gesture reached its end vertex.
    pub fn complete_add_points(&mut self) -> Transition {
        let first = self.go(EditMode::EditVertices);
        let second = self.enforce();
        Self::chain(first, second)
    }

    /// A new polygon was closed and committed.
    pub fn complete_create(&mut self) -> Transition {
        self.go(EditMode::View)
    }

    /// A slice replaced the selected polygon, which no longer exists.
    pub fn complete_slice(&mut self) -> Transition {
        self.selected = None;
        self.go(EditMode::View)
    }

    /// Back to the initial state (new image loaded).
    pub fn reset(&mut self) -> Transition {
        self.selected = None;
        self.go(EditMode::View)
    }
}
