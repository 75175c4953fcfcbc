//! Paint cache: memoized color resolution keyed by `(value, tint)`.
//!
//! Catalog and port colors arrive as CSS strings and are parsed every frame
//! otherwise. The cache is owned by the pipeline, not a global, so tests and
//! multiple canvases never share state.

use fc_core::Color;
use std::collections::HashMap;

/// How far a tint pulls the parsed color toward the tint color.
pub const TINT_STRENGTH: f32 = 0.35;

type Key = (String, Option<[u8; 4]>);

#[derive(Debug, Default)]
pub struct PaintCache {
    entries: HashMap<Key, Option<Color>>,
    misses: usize,
}

impl PaintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `value`, optionally tinted; unparseable values yield `fallback`.
    pub fn resolve(&mut self, value: &str, tint: Option<Color>, fallback: Color) -> Color {
        let key = (value.to_string(), tint.map(|t| t.to_rgba8()));
        if let Some(cached) = self.entries.get(&key) {
            return cached.unwrap_or(fallback);
        }

        self.misses += 1;
        let parsed = Color::parse(value);
        if parsed.is_none() {
            log::debug!("unparseable color {value:?}");
        }
        let resolved = parsed.map(|c| match tint {
            Some(t) => c.mix(&t, TINT_STRENGTH),
            None => c,
        });
        self.entries.insert(key, resolved);
        resolved.unwrap_or(fallback)
    }

    /// Distinct `(value, tint)` pairs resolved so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memoizes_per_value_and_tint() {
        let mut cache = PaintCache::new();
        let red = cache.resolve("#ff0000", None, Color::BLACK);
        assert_eq!(red, Color::from_rgba8(255, 0, 0, 255));
        cache.resolve("#ff0000", None, Color::BLACK);
        assert_eq!(cache.len(), 1);

        let tinted = cache.resolve("#ff0000", Some(Color::WHITE), Color::BLACK);
        assert_eq!(cache.len(), 2);
        assert!(tinted.g > 0.3 && tinted.r == 1.0);
    }

    #[test]
    fn bad_values_fall_back() {
        let mut cache = PaintCache::new();
        assert_eq!(cache.resolve("not-a-color", None, Color::WHITE), Color::WHITE);
        assert_eq!(cache.resolve("not-a-color", None, Color::BLACK), Color::BLACK);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.misses(), 1);
    }
}
