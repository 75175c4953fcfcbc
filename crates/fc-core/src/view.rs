//! View transform between world and screen space.
//!
//! `screen = world * scale + offset`. Zoom is clamped to the configured
//! profile; `zoom_at` keeps the world point under the cursor fixed.

use crate::config::ZoomProfile;
use crate::model::Bounds;
use crate::numeric::finite_or;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Fraction of the smaller viewport side left as margin when framing.
const FRAME_PADDING_RATIO: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    /// Screen-space offset of the world origin.
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ZoomProfile::Standard)
    }
}

impl ViewTransform {
    pub fn new(profile: ZoomProfile) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            min_scale: profile.min_scale(),
            max_scale: profile.max_scale(),
        }
    }

    /// Switch zoom bounds, re-clamping the current scale.
    pub fn set_profile(&mut self, profile: ZoomProfile) {
        self.min_scale = profile.min_scale();
        self.max_scale = profile.max_scale();
        self.scale = self.clamp_scale(self.scale);
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        finite_or(scale, 1.0).clamp(self.min_scale, self.max_scale)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.scale, (p.y - self.y) / self.scale)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }

    /// Convert a screen-space distance into world units.
    pub fn screen_len(&self, len: f64) -> f64 {
        len / self.scale
    }

    pub fn screen_rect_to_world(&self, r: Bounds) -> Bounds {
        let a = self.screen_to_world(Point::new(r.x, r.y));
        let b = self.screen_to_world(Point::new(r.right(), r.bottom()));
        Bounds::from_corners(a.x, a.y, b.x, b.y)
    }

    pub fn world_rect_to_screen(&self, r: Bounds) -> Bounds {
        let a = self.world_to_screen(Point::new(r.x, r.y));
        Bounds::new(a.x, a.y, r.width * self.scale, r.height * self.scale)
    }

    /// World rectangle currently visible in a viewport of the given size.
    pub fn visible_world(&self, width: f64, height: f64) -> Bounds {
        self.screen_rect_to_world(Bounds::new(0.0, 0.0, width, height))
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.x += delta.x;
            self.y += delta.y;
        }
    }

    /// Multiply the scale by `factor`, keeping `anchor` (screen) fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let next = self.clamp_scale(self.scale * factor);
        // Pinned at a limit: re-deriving the offsets would only add rounding.
        if next == self.scale {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.scale = next;
        self.x = anchor.x - world.x * self.scale;
        self.y = anchor.y - world.y * self.scale;
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.scale = self.clamp_scale(1.0);
    }

    /// Fit `bounds` into the viewport with proportional padding.
    ///
    /// Degenerate bounds keep the current scale and only center.
    pub fn frame_bounds(&mut self, bounds: Bounds, viewport_w: f64, viewport_h: f64) {
        if viewport_w <= 0.0 || viewport_h <= 0.0 {
            return;
        }
        let pad = viewport_w.min(viewport_h) * FRAME_PADDING_RATIO;
        let avail_w = (viewport_w - pad * 2.0).max(1.0);
        let avail_h = (viewport_h - pad * 2.0).max(1.0);

        if !bounds.is_degenerate() {
            let fit = (avail_w / bounds.width).min(avail_h / bounds.height);
            self.scale = self.clamp_scale(fit);
        }
        let (cx, cy) = bounds.center();
        self.x = viewport_w / 2.0 - cx * self.scale;
        self.y = viewport_h / 2.0 - cy * self.scale;
    }

    /// Frame the union of several rectangles; no-op when empty.
    pub fn frame_all<'a>(
        &mut self,
        rects: impl IntoIterator<Item = &'a Bounds>,
        viewport_w: f64,
        viewport_h: f64,
    ) -> bool {
        let union = rects.into_iter().fold(None::<Bounds>, |acc, r| {
            Some(match acc {
                Some(u) => u.union(r),
                None => *r,
            })
        });
        match union {
            Some(u) => {
                self.frame_bounds(u, viewport_w, viewport_h);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn zoom_past_the_limit_keeps_offsets() {
        let mut view = ViewTransform::default();
        view.pan_by(Vec2::new(37.3, -12.9));
        view.zoom_at(Point::new(400.0, 300.0), 1e6);
        assert_eq!(view.scale, view.max_scale);
        let (x, y) = (view.x, view.y);
        for i in 0..200 {
            let anchor = Point::new(i as f64 * 7.3 - 300.0, i as f64 * -3.1 + 250.0);
            view.zoom_at(anchor, 2.0);
            assert_eq!((view.x, view.y), (x, y));
        }
        view.zoom_at(Point::new(5.0, 5.0), 1e-9);
        assert_eq!(view.scale, view.min_scale);
        let (x, y) = (view.x, view.y);
        view.zoom_at(Point::new(-80.0, 640.0), 0.5);
        assert_eq!((view.x, view.y), (x, y));
    }

    #[test]
    fn round_trip_under_random_ops() {
        let mut view = ViewTransform::default();
        let ops: [(f64, f64, f64); 5] = [
            (1.3, 10.0, -4.0),
            (0.7, -250.0, 33.0),
            (2.2, 0.5, 0.5),
            (0.1, 900.0, 12.0),
            (4.0, -3.0, -3.0),
        ];
        let sample = Point::new(123.4, -56.7);
        for (factor, px, py) in ops {
            view.zoom_at(Point::new(px, py), factor);
            view.pan_by(Vec2::new(px / 3.0, py / 7.0));
            assert!(close(view.screen_to_world(view.world_to_screen(sample)), sample));
            assert!(view.scale >= view.min_scale && view.scale <= view.max_scale);
        }
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = ViewTransform {
            x: 40.0,
            y: -20.0,
            ..ViewTransform::default()
        };
        let anchor = Point::new(300.0, 200.0);
        let before = view.screen_to_world(anchor);
        view.zoom_at(anchor, 1.5);
        assert!(close(view.screen_to_world(anchor), before));
        assert_eq!(view.scale, 1.5);
    }

    #[test]
    fn zoom_is_clamped_to_profile() {
        let mut view = ViewTransform::default();
        view.zoom_at(Point::ZERO, 100.0);
        assert_eq!(view.scale, 3.0);
        view.set_profile(ZoomProfile::Extended);
        view.zoom_at(Point::ZERO, 100.0);
        assert_eq!(view.scale, 6.0);
        view.set_profile(ZoomProfile::Standard);
        assert_eq!(view.scale, 3.0);
        view.zoom_at(Point::ZERO, f64::NAN);
        assert_eq!(view.scale, 3.0);
    }

    #[test]
    fn frame_centers_and_fits() {
        let mut view = ViewTransform::default();
        let bounds = Bounds::new(1000.0, 1000.0, 400.0, 200.0);
        view.frame_bounds(bounds, 800.0, 600.0);
        let center = view.world_to_screen(Point::new(1200.0, 1100.0));
        assert!(close(center, Point::new(400.0, 300.0)));
        let screen = view.world_rect_to_screen(bounds);
        assert!(screen.x >= 0.0 && screen.right() <= 800.0);
        assert!(screen.y >= 0.0 && screen.bottom() <= 600.0);
    }

    #[test]
    fn frame_all_empty_is_noop() {
        let mut view = ViewTransform::default();
        assert!(!view.frame_all(std::iter::empty(), 800.0, 600.0));
        assert_eq!(view, ViewTransform::default());
    }
}
