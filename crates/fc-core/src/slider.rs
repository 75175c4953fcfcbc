//! Slider value law.
//!
//! A slider's effective value is always
//! `clamp(round(snap(raw, step), precision), min, max)`. Pointer drags,
//! wheel nudges and keyboard steps all funnel through
//! [`resolve_slider_value`] so rounding is identical everywhere.

use crate::numeric::{MAX_PRECISION, decimal_places, finite_or, format_fixed, param_f64, param_str, round_to_precision};
use serde_json::{Map, Value};

pub const DEFAULT_MIN: f64 = 0.0;
pub const DEFAULT_MAX: f64 = 1.0;
pub const DEFAULT_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapMode {
    /// Continuous values; only precision rounding applies.
    Free,
    /// Values land on `min + k * step`.
    Step,
}

/// Numeric bounds of a slider, sanitized at construction.
///
/// Invariants: all fields finite, `min <= max`, `step > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub snap: SnapMode,
    pub precision_override: Option<u32>,
}

impl Default for SliderBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            step: DEFAULT_STEP,
            snap: SnapMode::Free,
            precision_override: None,
        }
    }
}

impl SliderBounds {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let min = finite_or(min, DEFAULT_MIN);
        let max = finite_or(max, DEFAULT_MAX);
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let step = finite_or(step, DEFAULT_STEP);
        let step = if step > 0.0 { step } else { DEFAULT_STEP };
        Self {
            min,
            max,
            step,
            snap: SnapMode::Free,
            precision_override: None,
        }
    }

    pub fn with_snap(mut self, snap: SnapMode) -> Self {
        self.snap = snap;
        self
    }

    pub fn with_precision(mut self, digits: Option<u32>) -> Self {
        self.precision_override = digits.map(|d| d.min(MAX_PRECISION));
        self
    }

    /// Read `min`, `max`, `step`, `snapMode` and `precision` parameters.
    pub fn from_parameters(params: &Map<String, Value>) -> Self {
        let snap = match param_str(params, "snapMode") {
            Some("step") => SnapMode::Step,
            _ => SnapMode::Free,
        };
        let precision = params
            .get("precision")
            .and_then(Value::as_f64)
            .filter(|p| p.is_finite() && *p >= 0.0)
            .map(|p| p.round() as u32);
        Self::new(
            param_f64(params, "min", DEFAULT_MIN),
            param_f64(params, "max", DEFAULT_MAX),
            param_f64(params, "step", DEFAULT_STEP),
        )
        .with_snap(snap)
        .with_precision(precision)
    }

    /// Display/rounding digits: the override, else the digits in `step`.
    pub fn precision(&self) -> u32 {
        self.precision_override
            .unwrap_or_else(|| decimal_places(self.step))
            .min(MAX_PRECISION)
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Same bounds with a tenth of the step, for Shift fine adjustment.
    pub fn fine(&self) -> Self {
        let mut fine = *self;
        fine.step = self.step / 10.0;
        fine
    }

    /// Position of `value` along the track, 0..=1.
    pub fn fraction(&self, value: f64) -> f64 {
        if self.range() <= 0.0 {
            return 0.0;
        }
        ((finite_or(value, self.min) - self.min) / self.range()).clamp(0.0, 1.0)
    }

    pub fn value_at_fraction(&self, t: f64) -> f64 {
        self.min + finite_or(t, 0.0).clamp(0.0, 1.0) * self.range()
    }

    pub fn format(&self, value: f64) -> String {
        format_fixed(value, self.precision())
    }

    /// Snap to the nearest grid point that lies inside `[min, max]`.
    fn snap(&self, raw: f64) -> f64 {
        match self.snap {
            SnapMode::Free => raw,
            SnapMode::Step => {
                let last = (self.range() / self.step + 1e-9).floor();
                let k = ((raw - self.min) / self.step).round().clamp(0.0, last);
                self.min + k * self.step
            }
        }
    }
}

/// The slider value law.
pub fn resolve_slider_value(raw: f64, bounds: &SliderBounds) -> f64 {
    let raw = finite_or(raw, bounds.min);
    let snapped = bounds.snap(raw);
    round_to_precision(snapped, bounds.precision()).clamp(bounds.min, bounds.max)
}

/// Current value of a slider node's `value` parameter, resolved.
pub fn current_value(params: &Map<String, Value>, bounds: &SliderBounds) -> f64 {
    resolve_slider_value(param_f64(params, "value", bounds.min), bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitizes_bounds() {
        let b = SliderBounds::new(10.0, 0.0, -1.0);
        assert_eq!((b.min, b.max, b.step), (0.0, 10.0, DEFAULT_STEP));
        let b = SliderBounds::new(f64::NAN, f64::INFINITY, f64::NAN);
        assert_eq!((b.min, b.max, b.step), (DEFAULT_MIN, DEFAULT_MAX, DEFAULT_STEP));
    }

    #[test]
    fn free_mode_rounds_and_clamps() {
        let b = SliderBounds::new(0.0, 10.0, 0.5);
        assert_eq!(resolve_slider_value(3.14159, &b), 3.1);
        assert_eq!(resolve_slider_value(42.0, &b), 10.0);
        assert_eq!(resolve_slider_value(-3.0, &b), 0.0);
        assert_eq!(resolve_slider_value(f64::NAN, &b), 0.0);
    }

    #[test]
    fn step_mode_snaps_from_min() {
        let b = SliderBounds::new(1.0, 10.0, 2.0).with_snap(SnapMode::Step);
        assert_eq!(resolve_slider_value(4.2, &b), 5.0);
        assert_eq!(resolve_slider_value(3.9, &b), 3.0);
        // 10 is off-grid; the nearest in-range grid point is 9.
        assert_eq!(resolve_slider_value(100.0, &b), 9.0);
    }

    #[test]
    fn precision_override_wins() {
        let b = SliderBounds::new(0.0, 1.0, 0.001).with_precision(Some(1));
        assert_eq!(b.precision(), 1);
        assert_eq!(resolve_slider_value(0.4567, &b), 0.5);
        assert_eq!(b.format(0.5), "0.5");
    }

    #[test]
    fn value_law_is_idempotent_and_bounded() {
        let cases = [
            SliderBounds::new(0.0, 1.0, 0.01),
            SliderBounds::new(-5.0, 5.0, 0.3).with_snap(SnapMode::Step),
            SliderBounds::new(0.0, 100.0, 7.0).with_snap(SnapMode::Step),
            SliderBounds::new(0.0, 1.0, 0.25).with_precision(Some(1)),
            SliderBounds::new(2.0, 2.0, 1.0),
        ];
        for bounds in &cases {
            let mut raw = -150.0;
            while raw <= 150.0 {
                let once = resolve_slider_value(raw, bounds);
                let twice = resolve_slider_value(once, bounds);
                assert_eq!(once, twice, "raw={raw} bounds={bounds:?}");
                assert!(once >= bounds.min && once <= bounds.max);
                raw += 0.37;
            }
        }
    }

    #[test]
    fn reads_parameters() {
        let params = json!({ "min": 0, "max": 20, "step": 0.5, "snapMode": "step", "value": 7.3 })
            .as_object()
            .cloned()
            .unwrap();
        let b = SliderBounds::from_parameters(&params);
        assert_eq!(b.snap, SnapMode::Step);
        assert_eq!(b.precision(), 1);
        assert_eq!(current_value(&params, &b), 7.5);
    }
}
