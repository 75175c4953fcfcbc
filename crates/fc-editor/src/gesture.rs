//! Drag state machine.
//!
//! Exactly one `DragState` is active at a time. Variants change only on
//! pointer down, up or cancel; a pointer move updates the current
//! variant's payload and derives that frame's effect from it. An expired
//! right-button hold counts as a cancel.

use crate::selection::Selection;
use fc_core::numeric::snap_delta;
use fc_core::{NodeId, Position, Size, SliderLayout};
use fc_render::PortKey;
use kurbo::{Point, Vec2};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    None,
    /// Screen-space pan. A right-button press stays a click candidate until
    /// it travels past the drag threshold.
    Pan {
        origin: Point,
        last: Point,
        via_right: bool,
        moved: bool,
    },
    /// Co-moving nodes and their positions at press time.
    Node {
        origin: Point,
        starts: Vec<(NodeId, Position)>,
    },
    Resize {
        node: NodeId,
        origin: Point,
        start: Size,
    },
    ResizeText {
        node: NodeId,
        origin: Point,
        start: Size,
    },
    /// Wire from an output port; `anchor` and `cursor` are world space.
    Edge {
        from: PortKey,
        anchor: Point,
        cursor: Point,
    },
    Slider {
        node: NodeId,
        slider: SliderLayout,
        last_x: f64,
        value: f64,
    },
    /// Rubber band; `origin` and `current` are screen space. `snap` is the
    /// grid step in effect at the last pointer event, shared by the live
    /// preview and the commit.
    Box {
        origin: Point,
        current: Point,
        additive: bool,
        base: Selection,
        snap: Option<f64>,
    },
}

impl DragState {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short name for logs and the scheduler key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pan { .. } => "pan",
            Self::Node { .. } => "node",
            Self::Resize { .. } => "resize",
            Self::ResizeText { .. } => "resizeText",
            Self::Edge { .. } => "edge",
            Self::Slider { .. } => "slider",
            Self::Box { .. } => "box",
        }
    }
}

/// Quantize a drag delta per axis; `None` leaves it raw.
pub fn snapped(delta: Vec2, step: Option<f64>) -> Vec2 {
    match step {
        Some(step) => Vec2::new(snap_delta(delta.x, step), snap_delta(delta.y, step)),
        None => delta,
    }
}

/// New positions for every co-moving node, rigid relative to each other.
pub fn moved_positions(starts: &[(NodeId, Position)], delta: Vec2) -> Vec<(NodeId, Position)> {
    starts
        .iter()
        .map(|(id, p)| (*id, p.offset(delta.x, delta.y)))
        .collect()
}

/// Resized extent, never below `min`.
pub fn resized(start: Size, delta: Vec2, min: Size) -> Size {
    Size::new(
        (start.width + delta.x).max(min.width),
        (start.height + delta.y).max(min.height),
    )
}
