//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. `key` is the
//! `KeyboardEvent.key` value, so letters may arrive in either case.

use crate::input::Modifiers;
use crate::mode::EditMode;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Mode switching ──
    SetMode(EditMode),
    /// Cancel the current gesture (Escape).
    Cancel,

    // ── Edit ──
    Undo,
    Redo,
    Save,
    /// Delete the hovered vertex of the selected polygon.
    DeleteVertex,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. Returns `None` if the combo has
    /// no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        // Escape cancels under any modifiers.
        if key == "Escape" {
            return Some(ShortcutAction::Cancel);
        }

        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "s" | "S" => Some(ShortcutAction::Save),
                _ => None,
            };
        }

        // `+` needs Shift on most layouts.
        match key {
            "+" | "=" => return Some(ShortcutAction::ZoomIn),
            "-" | "_" => return Some(ShortcutAction::ZoomOut),
            _ => {}
        }

        if modifiers.shift || modifiers.alt {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::SetMode(EditMode::View)),
            "e" | "E" => Some(ShortcutAction::SetMode(EditMode::EditVertices)),
            "a" | "A" => Some(ShortcutAction::SetMode(EditMode::AddPoints)),
            "n" | "N" => Some(ShortcutAction::SetMode(EditMode::CreatePolygon)),
            "s" | "S" => Some(ShortcutAction::SetMode(EditMode::Slice)),
            "d" | "D" => Some(ShortcutAction::SetMode(EditMode::DeletePolygon)),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteVertex),
            "0" => Some(ShortcutAction::ResetView),
            _ => None,
        }
    }
}
