//! Text measurement and word wrapping.
//!
//! Layout measures glyph runs through `TextMeasure` so the browser bridge can
//! plug in `CanvasRenderingContext2d::measure_text` while native code and
//! tests use the fixed-advance approximation.

/// Measures the advance width of a single-line string.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed per-character advance: `font_size * ratio` per char.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMeasure {
    pub ratio: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { ratio: 0.6 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.ratio
    }
}

/// Word-wrap `text` to `max_width`.
///
/// Hard line breaks are kept. A word wider than the line is split at
/// character boundaries. Empty input yields a single empty line so callers
/// always have something to size against.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    font_size: f64,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let max_width = if max_width.is_finite() { max_width.max(1.0) } else { f64::MAX };

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure.measure(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure.measure(word, font_size) <= max_width {
                current = word.to_string();
            } else {
                for piece in break_word(word, max_width, font_size, measure) {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current = piece;
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn break_word(word: &str, max_width: f64, font_size: f64, measure: &dyn TextMeasure) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if measure.measure(&current, font_size) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Widest line under `measure`.
pub fn max_line_width(lines: &[String], font_size: f64, measure: &dyn TextMeasure) -> f64 {
    lines
        .iter()
        .map(|l| measure.measure(l, font_size))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 px per char at size 10.
    const M: ApproxMeasure = ApproxMeasure { ratio: 1.0 };

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("aaa bbb ccc", 70.0, 10.0, &M);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn keeps_hard_breaks_and_empty_lines() {
        let lines = wrap_text("one\n\ntwo", 1000.0, 10.0, &M);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn splits_overlong_words() {
        let lines = wrap_text("abcdefgh", 30.0, 10.0, &M);
        assert_eq!(lines, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(wrap_text("", 100.0, 10.0, &M), vec![String::new()]);
    }

    #[test]
    fn measures_widest_line() {
        let lines = vec!["ab".to_string(), "abcd".to_string()];
        assert_eq!(max_line_width(&lines, 10.0, &M), 40.0);
    }
}
