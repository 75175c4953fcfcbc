//! Drawing backends.
//!
//! [`Surface`] is the retained raster layer (bodies, text, edges, chrome).
//! [`PortOverlay`] is the optional immediate-mode layer that draws only
//! ports. [`DisplayList`] is a headless `Surface` that records operations.

use fc_core::{Bounds, Color};
use kurbo::{CubicBez, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text is anchored at its vertical middle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub align: TextAlign,
    pub bold: bool,
    pub monospace: bool,
}

impl TextStyle {
    pub fn new(size: f64, color: Color) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Left,
            bold: false,
            monospace: false,
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: Color,
    /// Dash and gap lengths.
    pub dash: Option<(f64, f64)>,
}

impl StrokeStyle {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dash: None,
        }
    }

    pub fn dashed(width: f64, color: Color, dash: f64, gap: f64) -> Self {
        Self {
            width,
            color,
            dash: Some((dash, gap)),
        }
    }
}

/// Retained 2D drawing target.
///
/// Coordinates are in whatever space the last `set_transform` selected;
/// `set_transform(1.0, 0.0, 0.0)` is screen space.
pub trait Surface {
    fn size(&self) -> (f64, f64);
    fn clear(&mut self, color: Color);
    fn set_transform(&mut self, scale: f64, tx: f64, ty: f64);
    fn fill_rect(&mut self, rect: Bounds, radius: f64, color: Color);
    fn stroke_rect(&mut self, rect: Bounds, radius: f64, stroke: &StrokeStyle);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);
    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle);
    fn stroke_line(&mut self, a: Point, b: Point, stroke: &StrokeStyle);
    fn stroke_curve(&mut self, curve: &CubicBez, stroke: &StrokeStyle);
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);
    fn push_clip(&mut self, rect: Bounds);
    fn pop_clip(&mut self);
}

// ─── Port overlay ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortState {
    #[default]
    Idle,
    Hover,
    /// Origin of the wire currently being dragged.
    Active,
}

/// One port for the overlay, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortSprite {
    pub center: Point,
    pub radius: f64,
    pub color: Color,
    pub state: PortState,
    /// A wire is plugged into this port.
    pub connected: bool,
}

/// Immediate-mode layer above the retained surface, redrawn every frame.
pub trait PortOverlay {
    fn begin_frame(&mut self, width: f64, height: f64);
    fn draw_ports(&mut self, sprites: &[PortSprite]);
    fn end_frame(&mut self);
}

// ─── Display list ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Transform { scale: f64, tx: f64, ty: f64 },
    FillRect { rect: Bounds, color: Color },
    StrokeRect { rect: Bounds, stroke: StrokeStyle },
    FillCircle { center: Point, radius: f64, color: Color },
    StrokeCircle { center: Point, radius: f64, stroke: StrokeStyle },
    Line { a: Point, b: Point, stroke: StrokeStyle },
    Curve { curve: CubicBez, stroke: StrokeStyle },
    Text { text: String, at: Point, style: TextStyle },
    PushClip(Bounds),
    PopClip,
}

/// Headless surface recording every call.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Index of the first text op equal to `needle`.
    pub fn position_of_text(&self, needle: &str) -> Option<usize> {
        self.ops
            .iter()
            .position(|op| matches!(op, DrawOp::Text { text, .. } if text == needle))
    }
}

impl Surface for DisplayList {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn set_transform(&mut self, scale: f64, tx: f64, ty: f64) {
        self.ops.push(DrawOp::Transform { scale, tx, ty });
    }

    fn fill_rect(&mut self, rect: Bounds, _radius: f64, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Bounds, _radius: f64, stroke: &StrokeStyle) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            stroke: *stroke,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        self.ops.push(DrawOp::StrokeCircle {
            center,
            radius,
            stroke: *stroke,
        });
    }

    fn stroke_line(&mut self, a: Point, b: Point, stroke: &StrokeStyle) {
        self.ops.push(DrawOp::Line {
            a,
            b,
            stroke: *stroke,
        });
    }

    fn stroke_curve(&mut self, curve: &CubicBez, stroke: &StrokeStyle) {
        self.ops.push(DrawOp::Curve {
            curve: *curve,
            stroke: *stroke,
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            style: *style,
        });
    }

    fn push_clip(&mut self, rect: Bounds) {
        self.ops.push(DrawOp::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.ops.push(DrawOp::PopClip);
    }
}
