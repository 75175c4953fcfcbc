//! Value inspection for panel and note nodes.
//!
//! The canvas does not interpret computed outputs. It asks an inspector for
//! a bounded list of display lines and lays those out.

use crate::numeric::{MAX_PRECISION, round_to_precision};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InspectOptions {
    /// Hard cap on returned lines, including the overflow marker.
    pub max_lines: usize,
    /// Decimal digits for floating point numbers.
    pub precision: u32,
    /// Longest line before truncation with an ellipsis.
    pub max_line_chars: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            max_lines: 200,
            precision: 4,
            max_line_chars: 80,
        }
    }
}

/// Turns an arbitrary output value into display lines.
pub trait ValueInspector {
    fn inspect(&self, value: &Value, opts: &InspectOptions) -> Vec<String>;
}

/// Default inspector: scalars on one line, containers one entry per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonInspector;

impl ValueInspector for JsonInspector {
    fn inspect(&self, value: &Value, opts: &InspectOptions) -> Vec<String> {
        let mut lines = Vec::new();
        push_value(&mut lines, None, value, 0, opts);

        let max = opts.max_lines.max(1);
        if lines.len() > max {
            let hidden = count_lines(value) - (max - 1);
            lines.truncate(max - 1);
            lines.push(format!("… ({hidden} more)"));
        }
        for line in &mut lines {
            truncate_chars(line, opts.max_line_chars);
        }
        lines
    }
}

fn push_value(
    out: &mut Vec<String>,
    key: Option<&str>,
    value: &Value,
    depth: usize,
    opts: &InspectOptions,
) {
    let indent = "  ".repeat(depth);
    let prefix = key.map(|k| format!("{k}: ")).unwrap_or_default();

    match value {
        Value::Array(items) if !items.is_empty() => {
            out.push(format!("{indent}{prefix}[{}]", items.len()));
            for (i, item) in items.iter().enumerate() {
                push_value(out, Some(&i.to_string()), item, depth + 1, opts);
                // Stop expanding once the caller's budget is clearly exceeded.
                if out.len() > opts.max_lines {
                    return;
                }
            }
        }
        Value::Object(map) if !map.is_empty() => {
            out.push(format!("{indent}{prefix}{{{}}}", map.len()));
            for (k, v) in map {
                push_value(out, Some(k), v, depth + 1, opts);
                if out.len() > opts.max_lines {
                    return;
                }
            }
        }
        scalar => out.push(format!("{indent}{prefix}{}", format_scalar(scalar, opts))),
    }
}

fn count_lines(value: &Value) -> usize {
    match value {
        Value::Array(items) if !items.is_empty() => 1 + items.iter().map(count_lines).sum::<usize>(),
        Value::Object(map) if !map.is_empty() => 1 + map.values().map(count_lines).sum::<usize>(),
        _ => 1,
    }
}

fn format_scalar(value: &Value, opts: &InspectOptions) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => round_to_precision(f, opts.precision.min(MAX_PRECISION)).to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(_) => "[]".to_string(),
        Value::Object(_) => "{}".to_string(),
    }
}

fn truncate_chars(line: &mut String, max_chars: usize) {
    if max_chars == 0 || line.chars().count() <= max_chars {
        return;
    }
    let cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    *line = format!("{cut}…");
}
