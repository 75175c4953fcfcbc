//! Canvas color themes.

use fc_core::Color;

/// Theme-dependent colors for the render pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub grid: Color,
    pub node_fill: Color,
    pub node_stroke: Color,
    pub header_fill: Color,
    pub text: Color,
    pub muted_text: Color,
    pub selection: Color,
    pub error: Color,
    pub edge: Color,
    pub edge_halo: Color,
    pub group_fill: Color,
    pub group_stroke: Color,
    pub slider_track: Color,
    pub slider_fill: Color,
    pub box_fill: Color,
    pub tooltip_fill: Color,
    pub tooltip_text: Color,
    pub port_default: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: rgb(0xF5, 0xF5, 0xF7),
            grid: Color::rgba(0.0, 0.0, 0.0, 0.06),
            node_fill: Color::WHITE,
            node_stroke: rgb(0xD1, 0xD1, 0xD6),
            header_fill: rgb(0xEE, 0xEE, 0xF2),
            text: rgb(0x1D, 0x1D, 0x1F),
            muted_text: rgb(0x86, 0x86, 0x8B),
            selection: rgb(0x4F, 0xC3, 0xF7),
            error: rgb(0xE5, 0x48, 0x4D),
            edge: rgb(0x8E, 0x8E, 0x93),
            edge_halo: Color::rgba(0.31, 0.76, 0.97, 0.18),
            group_fill: Color::rgba(0.56, 0.56, 0.58, 0.08),
            group_stroke: rgb(0xC7, 0xC7, 0xCC),
            slider_track: rgb(0xE5, 0xE5, 0xEA),
            slider_fill: rgb(0x4F, 0x8C, 0xFF),
            box_fill: Color::rgba(0.31, 0.76, 0.97, 0.12),
            tooltip_fill: rgb(0x1D, 0x1D, 0x1F),
            tooltip_text: Color::WHITE,
            port_default: rgb(0x86, 0x86, 0x8B),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: rgb(0x1C, 0x1C, 0x1E),
            grid: Color::rgba(1.0, 1.0, 1.0, 0.05),
            node_fill: rgb(0x2C, 0x2C, 0x2E),
            node_stroke: rgb(0x3A, 0x3A, 0x3C),
            header_fill: rgb(0x36, 0x36, 0x38),
            text: rgb(0xF5, 0xF5, 0xF7),
            muted_text: rgb(0x98, 0x98, 0x9D),
            selection: rgb(0x64, 0xD2, 0xFF),
            error: rgb(0xFF, 0x6B, 0x6B),
            edge: rgb(0x63, 0x63, 0x66),
            edge_halo: Color::rgba(0.39, 0.82, 1.0, 0.2),
            group_fill: Color::rgba(0.39, 0.39, 0.4, 0.12),
            group_stroke: rgb(0x48, 0x48, 0x4A),
            slider_track: rgb(0x3A, 0x3A, 0x3C),
            slider_fill: rgb(0x0A, 0x84, 0xFF),
            box_fill: Color::rgba(0.39, 0.82, 1.0, 0.12),
            tooltip_fill: rgb(0xF5, 0xF5, 0xF7),
            tooltip_text: rgb(0x1C, 0x1C, 0x1E),
            port_default: rgb(0x98, 0x98, 0x9D),
        }
    }

    /// Socket and wire color for a port value type.
    pub fn port_color(&self, port_type: &str) -> Color {
        match port_type {
            "number" | "integer" => rgb(0x4F, 0x8C, 0xFF),
            "boolean" => rgb(0xFF, 0x9F, 0x0A),
            "string" | "text" => rgb(0x30, 0xD1, 0x58),
            "vector" | "point" => rgb(0xBF, 0x5A, 0xF2),
            "geometry" | "mesh" => rgb(0xFF, 0x37, 0x5F),
            "color" => rgb(0xFF, 0xD6, 0x0A),
            _ => self.port_default,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}
