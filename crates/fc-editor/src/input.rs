//! Input abstraction layer.
//!
//! Normalizes mouse, touch and pen events into a unified `InputEvent`
//! consumed by the canvas controller. Positions are screen-space pixels
//! relative to the canvas element; timestamps are milliseconds from any
//! monotonic origin (`event.timeStamp` in the browser).

use kurbo::Point;

/// Which button a press or release refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub fn new(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        Self {
            shift,
            ctrl,
            alt,
            meta,
        }
    }

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device or the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
        time_ms: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
        time_ms: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
        time_ms: f64,
    },
    /// Pointer capture lost, window blur, etc.
    PointerCancel,
    /// Wheel or trackpad scroll; deltas in pixels.
    Wheel {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    },
    KeyDown { key: String, modifiers: Modifiers },
    KeyUp { key: String, modifiers: Modifiers },
}

impl InputEvent {
    /// Screen position if this is a pointer or wheel event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            Self::PointerCancel | Self::KeyDown { .. } | Self::KeyUp { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Wheel { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. } => *modifiers,
            Self::PointerCancel => Modifiers::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_buttons() {
        assert_eq!(PointerButton::from_dom(0), Some(PointerButton::Left));
        assert_eq!(PointerButton::from_dom(2), Some(PointerButton::Right));
        assert_eq!(PointerButton::from_dom(4), None);
    }

    #[test]
    fn command_is_ctrl_or_meta() {
        assert!(Modifiers::CTRL.command());
        assert!(Modifiers::new(false, false, false, true).command());
        assert!(!Modifiers::SHIFT.command());
    }

    #[test]
    fn position_only_for_pointer_events() {
        let down = InputEvent::PointerDown {
            x: 3.0,
            y: 4.0,
            button: PointerButton::Left,
            modifiers: Modifiers::NONE,
            time_ms: 0.0,
        };
        assert_eq!(down.position(), Some(Point::new(3.0, 4.0)));
        assert_eq!(InputEvent::PointerCancel.position(), None);
    }
}
