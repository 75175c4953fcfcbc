//! Canvas2D backend.
//!
//! Implements the retained [`Surface`] on an HTML `<canvas>` through
//! `CanvasRenderingContext2d`, and text measurement through `measure_text`.

use fc_core::text::TextMeasure;
use fc_core::{Bounds, Color};
use fc_render::surface::{StrokeStyle, Surface, TextAlign, TextStyle};
use kurbo::{CubicBez, Point};
use web_sys::CanvasRenderingContext2d;

const SANS: &str = "Inter, system-ui, sans-serif";
const MONO: &str = "ui-monospace, Menlo, monospace";

/// CSS font shorthand for a text style.
pub fn font_spec(size: f64, bold: bool, monospace: bool) -> String {
    let weight = if bold { 600 } else { 400 };
    let family = if monospace { MONO } else { SANS };
    format!("{weight} {size}px {family}")
}

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
    transform: (f64, f64, f64),
    clip_depth: usize,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self {
            ctx,
            width,
            height,
            transform: (1.0, 0.0, 0.0),
            clip_depth: 0,
        }
    }

    /// Pop any clips left open so the context state is balanced for the host.
    pub fn finish(mut self) {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    fn apply_transform(&self) {
        let (s, tx, ty) = self.transform;
        let _ = self.ctx.set_transform(s, 0.0, 0.0, s, tx, ty);
    }

    fn apply_stroke(&self, stroke: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width);
        let dash = match stroke.dash {
            Some((dash, gap)) => js_sys::Array::of2(
                &wasm_bindgen::JsValue::from_f64(dash),
                &wasm_bindgen::JsValue::from_f64(gap),
            ),
            None => js_sys::Array::new(),
        };
        let _ = self.ctx.set_line_dash(&dash);
    }
}

impl Surface for CanvasSurface<'_> {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        self.apply_transform();
    }

    fn set_transform(&mut self, scale: f64, tx: f64, ty: f64) {
        self.transform = (scale, tx, ty);
        self.apply_transform();
    }

    fn fill_rect(&mut self, rect: Bounds, radius: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        if radius <= 0.0 {
            self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
            return;
        }
        rounded_rect_path(self.ctx, rect.x, rect.y, rect.width, rect.height, radius);
        self.ctx.fill();
    }

    fn stroke_rect(&mut self, rect: Bounds, radius: f64, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        rounded_rect_path(self.ctx, rect.x, rect.y, rect.width, rect.height, radius);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
        self.ctx.stroke();
    }

    fn stroke_line(&mut self, a: Point, b: Point, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(a.x, a.y);
        self.ctx.line_to(b.x, b.y);
        self.ctx.stroke();
    }

    fn stroke_curve(&mut self, curve: &CubicBez, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(curve.p0.x, curve.p0.y);
        self.ctx.bezier_curve_to(
            curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y, curve.p3.x, curve.p3.y,
        );
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.ctx
            .set_font(&font_spec(style.size, style.bold, style.monospace));
        self.ctx.set_fill_style_str(&style.color.to_css());
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline("middle");
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }

    fn push_clip(&mut self, rect: Bounds) {
        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.rect(rect.x, rect.y, rect.width, rect.height);
        self.ctx.clip();
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without matching push_clip");
            return;
        }
        // `restore` also rolls back the transform set inside the clip.
        self.ctx.restore();
        self.clip_depth -= 1;
        self.apply_transform();
    }
}

/// Measures text with the canvas font engine.
pub struct CanvasMeasure<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasMeasure<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasMeasure<'_> {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        self.ctx.set_font(&font_spec(font_size, false, false));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            // Same advance as the fixed approximation.
            Err(_) => text.chars().count() as f64 * font_size * 0.6,
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_spec_picks_weight_and_family() {
        assert_eq!(font_spec(13.0, false, false), "400 13px Inter, system-ui, sans-serif");
        assert_eq!(font_spec(11.0, true, true), "600 11px ui-monospace, Menlo, monospace");
    }
}
