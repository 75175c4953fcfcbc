//! Color parsing and mixing.
//!
//! Accepts the CSS subset the host catalog uses for port and category
//! colors: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb()/rgba()` and a
//! handful of named colors.

use serde::{Deserialize, Serialize};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse any supported color notation.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        if let Some(body) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            return Self::from_rgb_fn(body.strip_suffix(')')?);
        }
        Self::named(value).or_else(|| Self::from_hex(value))
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let nibbles: Option<Vec<u8>> = bytes.iter().map(|&c| hex_val(c)).collect();
        let n = nibbles?;

        match n.len() {
            3 => Some(Self::from_rgba8(n[0] * 17, n[1] * 17, n[2] * 17, 255)),
            4 => Some(Self::from_rgba8(n[0] * 17, n[1] * 17, n[2] * 17, n[3] * 17)),
            6 => Some(Self::from_rgba8(
                n[0] << 4 | n[1],
                n[2] << 4 | n[3],
                n[4] << 4 | n[5],
                255,
            )),
            8 => Some(Self::from_rgba8(
                n[0] << 4 | n[1],
                n[2] << 4 | n[3],
                n[4] << 4 | n[5],
                n[6] << 4 | n[7],
            )),
            _ => None,
        }
    }

    fn from_rgb_fn(body: &str) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| -> Option<f32> {
            let v: f32 = s.parse().ok()?;
            v.is_finite().then(|| (v / 255.0).clamp(0.0, 1.0))
        };
        let alpha = match parts.get(3) {
            Some(s) => {
                let v: f32 = s.parse().ok()?;
                if !v.is_finite() {
                    return None;
                }
                v.clamp(0.0, 1.0)
            }
            None => 1.0,
        };
        Some(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }

    fn named(name: &str) -> Option<Self> {
        let hex = match name.to_ascii_lowercase().as_str() {
            "white" => "#FFFFFF",
            "black" => "#000000",
            "red" => "#FF0000",
            "green" => "#008000",
            "blue" => "#0000FF",
            "yellow" => "#FFFF00",
            "orange" => "#FFA500",
            "purple" => "#800080",
            "gray" | "grey" => "#808080",
            "transparent" => return Some(Self::TRANSPARENT),
            _ => return None,
        };
        Self::from_hex(hex)
    }

    /// Linear interpolation toward `other`; `t` is clamped to [0, 1].
    pub fn mix(&self, other: &Color, t: f32) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Color::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    pub fn with_alpha(&self, a: f32) -> Color {
        Color::rgba(self.r, self.g, self.b, a.clamp(0.0, 1.0))
    }

    /// Perceived luminance (sRGB weights).
    pub fn luminance(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS `rgba()` string for Canvas2D style setters.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {:.3})", self.a.clamp(0.0, 1.0))
    }
}
