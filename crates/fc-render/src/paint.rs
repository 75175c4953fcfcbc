//! Vello `Surface` backend.
//!
//! Emits Vello paint operations into a `Scene`; the caller presents the
//! scene via wgpu. Used by native hosts; the browser uses Canvas2D.
//!
//! The scene carries shapes only. Text is handed back as [`TextLabel`]s
//! for the host's text layer to draw over the presented scene.

use crate::surface::{StrokeStyle, Surface, TextStyle};
use fc_core::{Bounds, Color};
use kurbo::{Affine, BezPath, Circle, CubicBez, Line, Point, Rect, Stroke, Vec2};
use peniko::{Fill, Mix};
use vello::Scene;

/// A text run in screen space, left for the host to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub at: Point,
    /// `style.size` already multiplied by the zoom in effect.
    pub style: TextStyle,
}

pub struct VelloSurface {
    scene: Scene,
    labels: Vec<TextLabel>,
    width: f64,
    height: f64,
    transform: Affine,
    clip_depth: usize,
}

impl VelloSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scene: Scene::new(),
            labels: Vec::new(),
            width,
            height,
            transform: Affine::IDENTITY,
            clip_depth: 0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Close any clip layers left open and hand the scene over.
    pub fn finish(mut self) -> Scene {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        self.scene
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    /// Text emitted since the last `clear`.
    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn take_labels(&mut self) -> Vec<TextLabel> {
        std::mem::take(&mut self.labels)
    }
}

impl Surface for VelloSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.scene.reset();
        self.labels.clear();
        self.clip_depth = 0;
        let rect = Rect::new(0.0, 0.0, self.width, self.height);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_peniko(color), None, &rect);
    }

    fn set_transform(&mut self, scale: f64, tx: f64, ty: f64) {
        self.transform = Affine::scale(scale).then_translate(Vec2::new(tx, ty));
    }

    fn fill_rect(&mut self, rect: Bounds, radius: f64, color: Color) {
        let shape = to_rect(rect).to_rounded_rect(radius);
        self.scene
            .fill(Fill::NonZero, self.transform, to_peniko(color), None, &shape);
    }

    fn stroke_rect(&mut self, rect: Bounds, radius: f64, stroke: &StrokeStyle) {
        let shape = to_rect(rect).to_rounded_rect(radius);
        self.scene.stroke(
            &to_stroke(stroke),
            self.transform,
            to_peniko(stroke.color),
            None,
            &shape,
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let shape = Circle::new(center, radius);
        self.scene
            .fill(Fill::NonZero, self.transform, to_peniko(color), None, &shape);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        let shape = Circle::new(center, radius);
        self.scene.stroke(
            &to_stroke(stroke),
            self.transform,
            to_peniko(stroke.color),
            None,
            &shape,
        );
    }

    fn stroke_line(&mut self, a: Point, b: Point, stroke: &StrokeStyle) {
        self.scene.stroke(
            &to_stroke(stroke),
            self.transform,
            to_peniko(stroke.color),
            None,
            &Line::new(a, b),
        );
    }

    fn stroke_curve(&mut self, curve: &CubicBez, stroke: &StrokeStyle) {
        let mut path = BezPath::new();
        path.move_to(curve.p0);
        path.curve_to(curve.p1, curve.p2, curve.p3);
        self.scene.stroke(
            &to_stroke(stroke),
            self.transform,
            to_peniko(stroke.color),
            None,
            &path,
        );
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        // No glyph rendering here; the host's text layer draws labels.
        let scale = self.transform.as_coeffs()[0];
        let mut style = *style;
        style.size *= scale;
        self.labels.push(TextLabel {
            text: text.to_string(),
            at: self.transform * at,
            style,
        });
    }

    fn push_clip(&mut self, rect: Bounds) {
        self.scene
            .push_layer(Mix::Clip, 1.0, self.transform, &to_rect(rect));
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without matching push_clip");
            return;
        }
        self.scene.pop_layer();
        self.clip_depth -= 1;
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn to_rect(b: Bounds) -> Rect {
    Rect::new(b.x, b.y, b.right(), b.bottom())
}

fn to_stroke(style: &StrokeStyle) -> Stroke {
    let stroke = Stroke::new(style.width);
    match style.dash {
        Some((dash, gap)) => stroke.with_dashes(0.0, [dash, gap]),
        None => stroke,
    }
}

fn to_peniko(c: Color) -> peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_layers_balance() {
        let mut surface = VelloSurface::new(100.0, 100.0);
        surface.clear(Color::WHITE);
        surface.push_clip(Bounds::new(0.0, 0.0, 10.0, 10.0));
        surface.push_clip(Bounds::new(0.0, 0.0, 5.0, 5.0));
        surface.pop_clip();
        assert_eq!(surface.clip_depth(), 1);
        surface.pop_clip();
        surface.pop_clip();
        assert_eq!(surface.clip_depth(), 0);
    }

    #[test]
    fn clear_resets_clips() {
        let mut surface = VelloSurface::new(100.0, 100.0);
        surface.push_clip(Bounds::new(0.0, 0.0, 10.0, 10.0));
        surface.clear(Color::BLACK);
        assert_eq!(surface.clip_depth(), 0);
    }

    #[test]
    fn text_becomes_screen_space_labels() {
        let mut surface = VelloSurface::new(100.0, 100.0);
        surface.clear(Color::WHITE);
        surface.set_transform(2.0, 10.0, 20.0);
        surface.fill_text("sum", Point::new(5.0, 5.0), &TextStyle::new(12.0, Color::BLACK));
        let labels = surface.labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "sum");
        assert_eq!(labels[0].at, Point::new(20.0, 30.0));
        assert_eq!(labels[0].style.size, 24.0);

        surface.clear(Color::WHITE);
        assert!(surface.labels().is_empty());
    }

    #[test]
    fn dashed_strokes_carry_pattern() {
        let s = to_stroke(&StrokeStyle::dashed(2.0, Color::BLACK, 4.0, 3.0));
        assert_eq!(s.width, 2.0);
        assert_eq!(s.dash_pattern.as_slice(), &[4.0, 3.0]);
        assert!(to_stroke(&StrokeStyle::solid(1.0, Color::BLACK)).dash_pattern.is_empty());
    }
}
