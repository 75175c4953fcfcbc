//! Canvas configuration.
//!
//! Every geometric constant and interaction threshold lives here so the host
//! can override them with a JSON document. Missing fields take defaults.

use serde::{Deserialize, Serialize};

// ─── Layout metrics ──────────────────────────────────────────────────────

/// World-space sizes used by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutMetrics {
    pub node_width: f64,
    pub min_node_height: f64,
    pub header_height: f64,
    pub port_row_height: f64,
    pub port_radius: f64,
    pub bottom_padding: f64,
    pub label_font_size: f64,
    pub port_font_size: f64,
    /// Height of the evaluation-error banner under the port rows.
    pub error_banner_height: f64,

    pub group_header_height: f64,
    pub default_group_width: f64,
    pub default_group_height: f64,

    pub text_padding: f64,
    pub text_font_size: f64,
    pub text_line_height: f64,
    pub text_max_auto_width: f64,
    /// Extra slack around text nodes for hit testing; glyphs overhang.
    pub text_hit_padding: f64,

    pub panel_width: f64,
    pub panel_line_height: f64,
    pub panel_font_size: f64,
    pub panel_max_visible_lines: usize,
    pub panel_max_lines: usize,

    pub slider_height: f64,
    pub slider_value_column: f64,
    pub slider_track_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            min_node_height: 64.0,
            header_height: 32.0,
            port_row_height: 24.0,
            port_radius: 6.0,
            bottom_padding: 10.0,
            label_font_size: 13.0,
            port_font_size: 11.0,
            error_banner_height: 20.0,

            group_header_height: 28.0,
            default_group_width: 360.0,
            default_group_height: 240.0,

            text_padding: 8.0,
            text_font_size: 16.0,
            text_line_height: 20.0,
            text_max_auto_width: 320.0,
            text_hit_padding: 6.0,

            panel_width: 240.0,
            panel_line_height: 16.0,
            panel_font_size: 11.0,
            panel_max_visible_lines: 12,
            panel_max_lines: 200,

            slider_height: 56.0,
            slider_value_column: 56.0,
            slider_track_height: 6.0,
        }
    }
}

// ─── Interaction ─────────────────────────────────────────────────────────

/// Screen-space thresholds and timings for gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    /// Max world distance from a wire that still counts as a hit.
    pub edge_hit_radius: f64,
    /// Parametric samples per wire for hit testing.
    pub edge_sample_count: usize,
    /// Box drags shorter than this (screen px) are plain clicks.
    pub box_click_threshold: f64,
    /// Right-drags beyond this (screen px) become pans.
    pub right_drag_threshold: f64,
    pub right_click_hold_ms: f64,
    pub double_click_ms: f64,
    /// Side of the bottom-right resize handle, in screen px.
    pub resize_handle_size: f64,
    pub arrow_pan_step: f64,
    pub arrow_pan_step_large: f64,
    pub wheel_zoom_sensitivity: f64,
    pub key_zoom_factor: f64,
    /// Grid step in world units at scale 1.
    pub grid_step: f64,
    /// Slider nudge multiplier with Shift held on the keyboard.
    pub slider_large_step: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            edge_hit_radius: 8.0,
            edge_sample_count: 24,
            box_click_threshold: 4.0,
            right_drag_threshold: 5.0,
            right_click_hold_ms: 550.0,
            double_click_ms: 300.0,
            resize_handle_size: 12.0,
            arrow_pan_step: 40.0,
            arrow_pan_step_large: 160.0,
            wheel_zoom_sensitivity: 0.0015,
            key_zoom_factor: 1.2,
            grid_step: 24.0,
            slider_large_step: 10.0,
        }
    }
}

// ─── Zoom ────────────────────────────────────────────────────────────────

/// Mode-dependent scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomProfile {
    #[default]
    Standard,
    /// Wider range for large graphs and presentation.
    Extended,
}

impl ZoomProfile {
    pub fn min_scale(self) -> f64 {
        match self {
            Self::Standard => 0.2,
            Self::Extended => 0.05,
        }
    }

    pub fn max_scale(self) -> f64 {
        match self {
            Self::Standard => 3.0,
            Self::Extended => 6.0,
        }
    }
}

// ─── Top level ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub layout: LayoutMetrics,
    pub interaction: InteractionConfig,
    pub zoom: ZoomProfile,
}

impl CanvasConfig {
    /// Parse a partial JSON config; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid canvas config: {e}"))
    }

    /// Grid step for the current zoom.
    ///
    /// The step doubles when zoomed far out and halves when zoomed far in so
    /// snapping stays usable at every scale.
    pub fn grid_step(&self, scale: f64) -> f64 {
        let base = self.interaction.grid_step;
        if scale < 0.5 {
            base * 2.0
        } else if scale > 2.0 {
            base / 2.0
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CanvasConfig::from_json(
            r#"{ "layout": { "nodeWidth": 180 }, "zoom": "extended" }"#,
        )
        .unwrap();
        assert_eq!(cfg.layout.node_width, 180.0);
        assert_eq!(cfg.layout.port_radius, LayoutMetrics::default().port_radius);
        assert_eq!(cfg.interaction, InteractionConfig::default());
        assert_eq!(cfg.zoom, ZoomProfile::Extended);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(CanvasConfig::from_json("{ nope").is_err());
    }

    #[test]
    fn grid_step_tracks_zoom() {
        let cfg = CanvasConfig::default();
        assert_eq!(cfg.grid_step(1.0), 24.0);
        assert_eq!(cfg.grid_step(0.3), 48.0);
        assert_eq!(cfg.grid_step(2.5), 12.0);
    }
}
