//! Input abstraction layer.
//!
//! Normalizes mouse, pen, and keyboard events into a unified `InputEvent`
//! enum consumed by the controller. Pointer positions are canvas
//! coordinates; the controller maps them into image space.

use polyseg_core::Point;

/// Which pointer button triggered a press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    /// Wheel / middle button.
    Middle,
    /// Right button (context step-back).
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// Space bar held (temporary hand tool).
    pub space: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
        space: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// Platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Scroll wheel / pinch over the canvas at `(x, y)`.
    Wheel { x: f64, y: f64, delta_y: f64 },
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract the canvas position if this is a pointer or wheel event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            Self::Key { .. } => None,
        }
    }
}

// ─── Frame coalescing ────────────────────────────────────────────────────

/// Collapses high-frequency input to at most one update per animation
/// frame.
///
/// Pointer moves replace each other; wheel deltas at the same frame are
/// summed. Any other event flushes pending work first so ordering is
/// preserved. This only changes how often the controller runs, not the
/// final committed state.
#[derive(Debug, Default)]
pub struct MoveCoalescer {
    pending_move: Option<InputEvent>,
    pending_wheel: Option<InputEvent>,
}

impl MoveCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event. Returns the events that must be dispatched now, in
    /// order.
    pub fn push(&mut self, event: InputEvent) -> Vec<InputEvent> {
        match event {
            InputEvent::PointerMove { .. } => {
                self.pending_move = Some(event);
                Vec::new()
            }
            InputEvent::Wheel { x, y, delta_y } => {
                let merged = match self.pending_wheel.take() {
                    Some(InputEvent::Wheel { delta_y: prev, .. }) => prev + delta_y,
                    _ => delta_y,
                };
                self.pending_wheel = Some(InputEvent::Wheel {
                    x,
                    y,
                    delta_y: merged,
                });
                Vec::new()
            }
            other => {
                let mut out = self.flush();
                out.push(other);
                out
            }
        }
    }

    /// Called once per animation frame.
    pub fn flush(&mut self) -> Vec<InputEvent> {
        self.pending_wheel
            .take()
            .into_iter()
            .chain(self.pending_move.take())
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_move.is_some() || self.pending_wheel.is_some()
    }
}
