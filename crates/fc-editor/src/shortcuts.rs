//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the wasm bridge and native hosts share one binding table.
//!
//! Arrow keys resolve to `Nudge`; whether that pans the view or steps the
//! focused slider is decided by the controller.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Delete,
    SelectAll,

    // ── View ──
    FrameSelection,
    FrameAll,
    ResetView,
    ZoomIn,
    ZoomOut,
    /// Arrow key; `large` when Shift is held.
    Nudge { direction: NudgeDirection, large: bool },
    /// Home/End: jump the focused slider to a bound.
    SliderBound { max: bool },

    // ── Modes ──
    ToggleGridSnap,
    ToggleHelp,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NudgeDirection {
    /// Screen-space unit vector.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
        }
    }

    /// Slider step sign: right/up increase.
    pub fn slider_sign(self) -> f64 {
        match self {
            Self::Right | Self::Up => 1.0,
            Self::Left | Self::Down => -1.0,
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"f"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if let Some(direction) = NudgeDirection::from_key(key) {
            return (!cmd).then_some(ShortcutAction::Nudge {
                direction,
                large: shift,
            });
        }

        // ── Modifier combos first (most specific) ──
        if cmd {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetView),
                _ => None,
            };
        }

        if shift {
            return match key {
                "f" | "F" => Some(ShortcutAction::FrameAll),
                // `?` arrives shifted on most layouts.
                "?" => Some(ShortcutAction::ToggleHelp),
                "+" => Some(ShortcutAction::ZoomIn),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "f" | "F" => Some(ShortcutAction::FrameSelection),
            "0" => Some(ShortcutAction::ResetView),
            "g" | "G" => Some(ShortcutAction::ToggleGridSnap),
            "?" => Some(ShortcutAction::ToggleHelp),
            "=" | "+" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "Home" => Some(ShortcutAction::SliderBound { max: false }),
            "End" => Some(ShortcutAction::SliderBound { max: true }),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }

    /// Rows for the shortcut overlay: `(keys, description)`.
    pub fn help_rows() -> Vec<(String, String)> {
        [
            ("Delete", "Remove selected nodes, else edges"),
            ("Ctrl/⌘ A", "Select all"),
            ("F", "Frame selection"),
            ("Shift F", "Frame all"),
            ("0", "Reset view"),
            ("+ / -", "Zoom in / out"),
            ("G", "Toggle grid snap"),
            ("Arrows", "Pan (Shift: faster) or step focused slider"),
            ("Home / End", "Focused slider to min / max"),
            ("Alt drag", "Move without snapping"),
            ("Shift drag", "Pan, or fine slider adjustment"),
            ("Double-click", "Edit node, or search to add one"),
            ("Right double-click", "Context menu"),
            ("?", "Toggle this help"),
        ]
        .into_iter()
        .map(|(k, d)| (k.to_string(), d.to_string()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_view_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("f", false, false, false, false),
            Some(ShortcutAction::FrameSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("F", false, true, false, false),
            Some(ShortcutAction::FrameAll)
        );
        assert_eq!(
            ShortcutMap::resolve("0", false, false, false, false),
            Some(ShortcutAction::ResetView)
        );
        assert_eq!(
            ShortcutMap::resolve("=", false, false, false, false),
            Some(ShortcutAction::ZoomIn)
        );
    }

    #[test]
    fn resolve_select_all() {
        // Cmd+A
        assert_eq!(
            ShortcutMap::resolve("a", false, false, false, true),
            Some(ShortcutAction::SelectAll)
        );
        // Ctrl+A
        assert_eq!(
            ShortcutMap::resolve("a", true, false, false, false),
            Some(ShortcutAction::SelectAll)
        );
        // Plain A is unbound
        assert_eq!(ShortcutMap::resolve("a", false, false, false, false), None);
    }

    #[test]
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
    }

    #[test]
    fn resolve_help_with_or_without_shift() {
        assert_eq!(
            ShortcutMap::resolve("?", false, true, false, false),
            Some(ShortcutAction::ToggleHelp)
        );
        assert_eq!(
            ShortcutMap::resolve("?", false, false, false, false),
            Some(ShortcutAction::ToggleHelp)
        );
    }

    #[test]
    fn resolve_arrows() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, false, false, false),
            Some(ShortcutAction::Nudge {
                direction: NudgeDirection::Left,
                large: false
            })
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowUp", false, true, false, false),
            Some(ShortcutAction::Nudge {
                direction: NudgeDirection::Up,
                large: true
            })
        );
        assert_eq!(ShortcutMap::resolve("ArrowUp", true, false, false, false), None);
    }

    #[test]
    fn resolve_grid_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("g", false, false, false, false),
            Some(ShortcutAction::ToggleGridSnap)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Cancel)
        );
        assert_eq!(
            ShortcutMap::resolve("End", false, false, false, false),
            Some(ShortcutAction::SliderBound { max: true })
        );
    }

    #[test]
    fn help_rows_cover_bindings() {
        let rows = ShortcutMap::help_rows();
        assert!(rows.iter().any(|(k, _)| k == "G"));
        assert!(rows.len() > 10);
    }
}
