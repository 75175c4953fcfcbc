//! Per-node layout engine.
//!
//! Turns a node (type, parameters, position, parent) plus ambient geometry
//! into its world-space rectangle, port anchors, and type-specific content.
//! Layout is a pure function of its inputs: the hit-test and render passes
//! each read the same per-frame result, and recomputing with identical
//! inputs gives bit-identical rectangles.
//!
//! ## Node families
//!
//! | Kind | Width | Height | Ports |
//! |------|-------|--------|-------|
//! | Standard | fixed | header + port rows, min height | centered row band |
//! | Group | explicit `size` | explicit `size` | none |
//! | Text | explicit or measured | wrapped lines | none |
//! | TextNote / Panel | fixed | port rows + visible lines | centered row band |
//! | Slider | fixed | fixed compact | centered on body |

use crate::catalog::NodeCatalog;
use crate::config::LayoutMetrics;
use crate::id::NodeId;
use crate::inspect::{InspectOptions, ValueInspector};
use crate::model::{Bounds, Node, NodeKind, PortDirection, PortSpec, Position};
use crate::numeric::{finite_or, param_f64, param_str};
use crate::slider::{SliderBounds, current_value};
use crate::text::{TextMeasure, max_line_width, wrap_text};
use kurbo::Point;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Panel/note scroll positions (first visible line), owned by the UI.
pub type ScrollOffsets = HashMap<NodeId, usize>;

/// Everything layout needs besides the node itself.
pub struct LayoutContext<'a> {
    pub catalog: &'a dyn NodeCatalog,
    pub measure: &'a dyn TextMeasure,
    pub inspector: &'a dyn ValueInspector,
    pub metrics: &'a LayoutMetrics,
    pub scroll: Option<&'a ScrollOffsets>,
}

// ─── Layout output ───────────────────────────────────────────────────────

/// A port anchor in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct PortLayout {
    pub port: PortSpec,
    pub x: f64,
    pub y: f64,
    pub is_output: bool,
}

impl PortLayout {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn direction(&self) -> PortDirection {
        if self.is_output {
            PortDirection::Output
        } else {
            PortDirection::Input
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderLayout {
    pub track: Bounds,
    pub bounds: SliderBounds,
    pub value: f64,
    pub value_text: String,
}

impl SliderLayout {
    /// Pointer zone for grabbing the track; taller than the drawn track.
    pub fn hit_zone(&self, min_height: f64) -> Bounds {
        let pad = ((min_height - self.track.height) / 2.0).max(0.0);
        Bounds::new(
            self.track.x,
            self.track.y - pad,
            self.track.width,
            self.track.height + pad * 2.0,
        )
    }

    /// Thumb center for the current value.
    pub fn thumb(&self) -> Point {
        let (_, cy) = self.track.center();
        Point::new(
            self.track.x + self.bounds.fraction(self.value) * self.track.width,
            cy,
        )
    }

    /// Raw (unresolved) value under a world x coordinate.
    pub fn raw_value_at(&self, x: f64) -> f64 {
        if self.track.width <= 0.0 {
            return self.bounds.min;
        }
        self.bounds
            .value_at_fraction((x - self.track.x) / self.track.width)
    }
}

/// Type-specific derived content.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutContent {
    None,
    Text {
        lines: Vec<String>,
        font_size: f64,
        line_height: f64,
    },
    Lines {
        lines: Vec<String>,
        area: Bounds,
        first_visible: usize,
        visible: usize,
        scrollable: bool,
    },
    Slider(SliderLayout),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: NodeId,
    pub kind: NodeKind,
    pub rect: Bounds,
    /// Title strip; zero height for kinds without a header.
    pub header: Bounds,
    pub inputs: SmallVec<[PortLayout; 4]>,
    pub outputs: SmallVec<[PortLayout; 4]>,
    input_index: HashMap<String, usize>,
    output_index: HashMap<String, usize>,
    pub default_input_key: Option<String>,
    pub default_output_key: Option<String>,
    pub content: LayoutContent,
}

impl NodeLayout {
    pub fn input(&self, key: &str) -> Option<&PortLayout> {
        self.input_index.get(key).map(|&i| &self.inputs[i])
    }

    pub fn output(&self, key: &str) -> Option<&PortLayout> {
        self.output_index.get(key).map(|&i| &self.outputs[i])
    }

    pub fn port(&self, key: &str, direction: PortDirection) -> Option<&PortLayout> {
        match direction {
            PortDirection::Input => self.input(key),
            PortDirection::Output => self.output(key),
        }
    }

    /// Explicit handle, or the default input when the edge omits one.
    pub fn resolve_input(&self, handle: Option<&str>) -> Option<&PortLayout> {
        self.input(handle.or(self.default_input_key.as_deref())?)
    }

    pub fn resolve_output(&self, handle: Option<&str>) -> Option<&PortLayout> {
        self.output(handle.or(self.default_output_key.as_deref())?)
    }

    pub fn ports(&self) -> impl Iterator<Item = &PortLayout> {
        self.outputs.iter().chain(self.inputs.iter())
    }

    /// Bounding box used by hit testing; text glyphs may overhang.
    pub fn hit_rect(&self, text_padding: f64) -> Bounds {
        match self.kind {
            NodeKind::Text => self.rect.inflate(text_padding),
            _ => self.rect,
        }
    }

    /// Bottom-right resize handle, `world_size` on a side.
    pub fn resize_handle(&self, world_size: f64) -> Option<Bounds> {
        self.kind.is_resizable().then(|| {
            Bounds::new(
                self.rect.right() - world_size,
                self.rect.bottom() - world_size,
                world_size,
                world_size,
            )
        })
    }

    pub fn slider(&self) -> Option<&SliderLayout> {
        match &self.content {
            LayoutContent::Slider(s) => Some(s),
            _ => None,
        }
    }

    /// Shift the whole layout (rect, ports, content) by a world offset.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.rect = self.rect.translate(dx, dy);
        self.header = self.header.translate(dx, dy);
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.x += dx;
            port.y += dy;
        }
        match &mut self.content {
            LayoutContent::Lines { area, .. } => *area = area.translate(dx, dy),
            LayoutContent::Slider(s) => s.track = s.track.translate(dx, dy),
            LayoutContent::None | LayoutContent::Text { .. } => {}
        }
    }
}

// ─── Entry points ────────────────────────────────────────────────────────

/// Lay out a single node at its own position (no parent translation).
pub fn compute_layout(node: &Node, ctx: &LayoutContext) -> NodeLayout {
    let m = ctx.metrics;
    let origin = Position::new(finite_or(node.position.x, 0.0), finite_or(node.position.y, 0.0));

    match node.kind() {
        NodeKind::Group => layout_group(node, origin, m),
        NodeKind::Text => layout_text(node, origin, ctx),
        NodeKind::TextNote | NodeKind::Panel => layout_lines(node, origin, ctx),
        NodeKind::Slider => layout_slider(node, origin, ctx),
        NodeKind::Standard => layout_standard(node, origin, ctx),
    }
}

/// Lay out every visible node, then translate group members by their
/// parent's position.
pub fn compute_layouts(nodes: &[Node], ctx: &LayoutContext) -> HashMap<NodeId, NodeLayout> {
    let mut layouts: HashMap<NodeId, NodeLayout> = nodes
        .iter()
        .filter(|n| !n.hidden)
        .map(|n| (n.id, compute_layout(n, ctx)))
        .collect();

    let positions: HashMap<NodeId, Position> = nodes.iter().map(|n| (n.id, n.position)).collect();
    for node in nodes.iter().filter(|n| !n.hidden) {
        let Some(parent) = node.parent_node else {
            continue;
        };
        let Some(offset) = positions.get(&parent) else {
            log::trace!("node {} has unknown parent {}", node.id, parent);
            continue;
        };
        if let Some(layout) = layouts.get_mut(&node.id) {
            layout.translate(finite_or(offset.x, 0.0), finite_or(offset.y, 0.0));
        }
    }
    layouts
}

// ─── Shared port placement ───────────────────────────────────────────────

/// Rows in the port band: `max(#inputs, #outputs, 1)`.
pub fn row_count(inputs: usize, outputs: usize) -> usize {
    inputs.max(outputs).max(1)
}

/// Row offset of port `i` of `n` in a `rows`-row band; each direction is
/// centered as a group.
pub fn row_offset(i: usize, n: usize, rows: usize) -> f64 {
    (rows as f64 - n as f64) / 2.0 + i as f64
}

struct PortBand {
    inputs: SmallVec<[PortLayout; 4]>,
    outputs: SmallVec<[PortLayout; 4]>,
}

fn place_ports(
    inputs: Vec<PortSpec>,
    outputs: Vec<PortSpec>,
    rect: Bounds,
    band_top: f64,
    row_height: f64,
) -> PortBand {
    let rows = row_count(inputs.len(), outputs.len());
    let place = |ports: Vec<PortSpec>, x: f64, is_output: bool| -> SmallVec<[PortLayout; 4]> {
        let n = ports.len();
        ports
            .into_iter()
            .enumerate()
            .map(|(i, port)| PortLayout {
                port,
                x,
                y: band_top + (row_offset(i, n, rows) + 0.5) * row_height,
                is_output,
            })
            .collect()
    };
    PortBand {
        inputs: place(inputs, rect.x, false),
        outputs: place(outputs, rect.right(), true),
    }
}

fn index_of(ports: &[PortLayout]) -> HashMap<String, usize> {
    ports
        .iter()
        .enumerate()
        .map(|(i, p)| (p.port.key.clone(), i))
        .collect()
}

fn finish(
    node: &Node,
    kind: NodeKind,
    rect: Bounds,
    header: Bounds,
    band: PortBand,
    content: LayoutContent,
    ctx: Option<&LayoutContext>,
) -> NodeLayout {
    let default_input_key = band.inputs.first().map(|p| p.port.key.clone());
    let catalog_default = ctx.and_then(|c| c.catalog.default_output_key(&node.node_type));
    let default_output_key = catalog_default
        .filter(|k| band.outputs.iter().any(|p| &p.port.key == k))
        .or_else(|| band.outputs.first().map(|p| p.port.key.clone()));

    NodeLayout {
        id: node.id,
        kind,
        rect,
        header,
        input_index: index_of(&band.inputs),
        output_index: index_of(&band.outputs),
        inputs: band.inputs,
        outputs: band.outputs,
        default_input_key,
        default_output_key,
        content,
    }
}

// ─── Node families ───────────────────────────────────────────────────────

fn layout_standard(node: &Node, origin: Position, ctx: &LayoutContext) -> NodeLayout {
    let m = ctx.metrics;
    let ports = ctx.catalog.ports(node);
    let rows = row_count(ports.inputs.len(), ports.outputs.len());
    let ports_height = m.header_height + rows as f64 * m.port_row_height + m.bottom_padding;
    let content_height = if node.data.evaluation_error.is_some() {
        ports_height + m.error_banner_height
    } else {
        0.0
    };
    let height = m.min_node_height.max(ports_height).max(content_height);

    let rect = Bounds::new(origin.x, origin.y, m.node_width, height);
    let header = Bounds::new(origin.x, origin.y, m.node_width, m.header_height);
    let band = place_ports(
        ports.inputs,
        ports.outputs,
        rect,
        origin.y + m.header_height,
        m.port_row_height,
    );
    finish(node, NodeKind::Standard, rect, header, band, LayoutContent::None, Some(ctx))
}

fn layout_group(node: &Node, origin: Position, m: &LayoutMetrics) -> NodeLayout {
    let size = node.data.size.unwrap_or_default();
    let width = positive_or(size.width, m.default_group_width).max(m.group_header_height * 2.0);
    let height = positive_or(size.height, m.default_group_height).max(m.group_header_height * 2.0);

    let rect = Bounds::new(origin.x, origin.y, width, height);
    let header = Bounds::new(origin.x, origin.y, width, m.group_header_height);
    let band = PortBand {
        inputs: SmallVec::new(),
        outputs: SmallVec::new(),
    };
    finish(node, NodeKind::Group, rect, header, band, LayoutContent::None, None)
}

fn layout_text(node: &Node, origin: Position, ctx: &LayoutContext) -> NodeLayout {
    let m = ctx.metrics;
    let text = param_str(&node.data.parameters, "text")
        .or(node.data.label.as_deref())
        .unwrap_or("");
    let font_size = positive_or(
        param_f64(&node.data.parameters, "fontSize", m.text_font_size),
        m.text_font_size,
    );
    let line_height = m.text_line_height * font_size / m.text_font_size;
    let pad = m.text_padding;

    let explicit = node
        .data
        .size
        .filter(|s| s.width.is_finite() && s.width > pad * 2.0);

    let (lines, width, min_height) = match explicit {
        Some(size) => {
            let lines = wrap_text(text, size.width - pad * 2.0, font_size, ctx.measure);
            (lines, size.width, finite_or(size.height, 0.0))
        }
        None => {
            let lines = wrap_text(text, m.text_max_auto_width - pad * 2.0, font_size, ctx.measure);
            let measured = max_line_width(&lines, font_size, ctx.measure);
            (lines, (measured + pad * 2.0).max(line_height * 2.0), 0.0)
        }
    };
    let height = (lines.len() as f64 * line_height + pad * 2.0).max(min_height);

    let rect = Bounds::new(origin.x, origin.y, width, height);
    let band = PortBand {
        inputs: SmallVec::new(),
        outputs: SmallVec::new(),
    };
    let content = LayoutContent::Text {
        lines,
        font_size,
        line_height,
    };
    finish(
        node,
        NodeKind::Text,
        rect,
        Bounds::new(origin.x, origin.y, width, 0.0),
        band,
        content,
        None,
    )
}

fn layout_lines(node: &Node, origin: Position, ctx: &LayoutContext) -> NodeLayout {
    let m = ctx.metrics;
    let kind = node.kind();
    let ports = ctx.catalog.ports(node);
    let rows = if ports.inputs.is_empty() && ports.outputs.is_empty() {
        0
    } else {
        row_count(ports.inputs.len(), ports.outputs.len())
    };

    let value = displayed_value(node, ctx);
    let opts = InspectOptions {
        max_lines: m.panel_max_lines,
        ..InspectOptions::default()
    };
    let lines = match value {
        Some(v) => ctx.inspector.inspect(&v, &opts),
        None => Vec::new(),
    };

    let max_visible = m.panel_max_visible_lines.max(1);
    let visible = lines.len().min(max_visible);
    let scrollable = lines.len() > max_visible;
    let max_first = lines.len() - visible;
    let first_visible = ctx
        .scroll
        .and_then(|s| s.get(&node.id).copied())
        .unwrap_or(0)
        .min(max_first);

    let band_top = origin.y + m.header_height;
    let area_top = band_top + rows as f64 * m.port_row_height;
    let area_height = visible.max(1) as f64 * m.panel_line_height;
    let height = m
        .min_node_height
        .max(area_top - origin.y + area_height + m.bottom_padding);

    let rect = Bounds::new(origin.x, origin.y, m.panel_width, height);
    let header = Bounds::new(origin.x, origin.y, m.panel_width, m.header_height);
    let area = Bounds::new(
        origin.x + m.text_padding,
        area_top,
        m.panel_width - m.text_padding * 2.0,
        area_height,
    );
    let band = place_ports(ports.inputs, ports.outputs, rect, band_top, m.port_row_height);
    let content = LayoutContent::Lines {
        lines,
        area,
        first_visible,
        visible,
        scrollable,
    };
    finish(node, kind, rect, header, band, content, Some(ctx))
}

/// Value shown by a panel or note: the default output's computed value,
/// else any output, else (notes only) the `text` parameter.
fn displayed_value(node: &Node, ctx: &LayoutContext) -> Option<Value> {
    let outputs = &node.data.outputs;
    let by_default = ctx
        .catalog
        .default_output_key(&node.node_type)
        .and_then(|k| outputs.get(&k).cloned());
    by_default
        .or_else(|| outputs.values().next().cloned())
        .or_else(|| match node.kind() {
            NodeKind::TextNote => node.parameter("text").cloned(),
            _ => None,
        })
}

fn layout_slider(node: &Node, origin: Position, ctx: &LayoutContext) -> NodeLayout {
    let m = ctx.metrics;
    let ports = ctx.catalog.ports(node);
    let rows = row_count(ports.inputs.len(), ports.outputs.len());

    let rect = Bounds::new(origin.x, origin.y, m.node_width, m.slider_height);
    let inset = m.port_radius * 2.0;
    let track_width = (m.node_width - inset * 2.0 - m.slider_value_column).max(1.0);
    let track_cy = origin.y + m.slider_height * 0.62;
    let track = Bounds::new(
        origin.x + inset,
        track_cy - m.slider_track_height / 2.0,
        track_width,
        m.slider_track_height,
    );

    let bounds = SliderBounds::from_parameters(&node.data.parameters);
    let value = current_value(&node.data.parameters, &bounds);
    let content = LayoutContent::Slider(SliderLayout {
        track,
        bounds,
        value,
        value_text: bounds.format(value),
    });

    let band_top = origin.y + (m.slider_height - rows as f64 * m.port_row_height) / 2.0;
    let band = place_ports(ports.inputs, ports.outputs, rect, band_top, m.port_row_height);
    finish(
        node,
        NodeKind::Slider,
        rect,
        Bounds::new(origin.x, origin.y, m.node_width, 0.0),
        band,
        content,
        Some(ctx),
    )
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NodeTypeDef, StaticCatalog};
    use crate::inspect::JsonInspector;
    use crate::model::Size;
    use crate::text::ApproxMeasure;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn catalog() -> StaticCatalog {
        let def = |inputs: &[&str], outputs: &[&str]| NodeTypeDef {
            inputs: inputs.iter().map(|k| PortSpec::new(k, "number")).collect(),
            outputs: outputs.iter().map(|k| PortSpec::new(k, "number")).collect(),
            ..NodeTypeDef::default()
        };
        StaticCatalog::new()
            .with_type("split3", def(&["in"], &["x", "y", "z"]))
            .with_type("add", def(&["a", "b"], &["sum"]))
            .with_type("panel", def(&["data"], &["value"]))
            .with_type("slider", def(&[], &["value"]))
    }

    fn with_ctx<R>(scroll: Option<&ScrollOffsets>, f: impl FnOnce(&LayoutContext) -> R) -> R {
        let catalog = catalog();
        let metrics = LayoutMetrics::default();
        let ctx = LayoutContext {
            catalog: &catalog,
            measure: &ApproxMeasure::default(),
            inspector: &JsonInspector,
            metrics: &metrics,
            scroll,
        };
        f(&ctx)
    }

    #[test]
    fn standard_height_and_port_sides() {
        with_ctx(None, |ctx| {
            let node = Node::new("a", "add", 100.0, 50.0);
            let l = compute_layout(&node, ctx);
            let m = ctx.metrics;
            let expected_h = (m.header_height + 2.0 * m.port_row_height + m.bottom_padding)
                .max(m.min_node_height);
            assert_eq!(l.rect, Bounds::new(100.0, 50.0, m.node_width, expected_h));
            assert!(l.inputs.iter().all(|p| p.x == 100.0 && !p.is_output));
            assert!(l.outputs.iter().all(|p| p.x == 100.0 + m.node_width && p.is_output));
            assert_eq!(l.default_input_key.as_deref(), Some("a"));
            assert_eq!(l.default_output_key.as_deref(), Some("sum"));
        });
    }

    #[test]
    fn single_input_centered_on_three_outputs() {
        with_ctx(None, |ctx| {
            let l = compute_layout(&Node::new("s", "split3", 0.0, 0.0), ctx);
            let mid = l.outputs.iter().map(|p| p.y).sum::<f64>() / 3.0;
            assert_eq!(l.inputs.len(), 1);
            assert!((l.inputs[0].y - mid).abs() < 1e-9);
            assert_eq!(l.outputs[1].y, l.inputs[0].y);
        });
    }

    #[test]
    fn layout_is_deterministic() {
        with_ctx(None, |ctx| {
            let mut node = Node::new("s", "split3", 13.25, -7.5);
            node.data.evaluation_error = Some("boom".into());
            assert_eq!(compute_layout(&node, ctx), compute_layout(&node, ctx));
        });
    }

    #[test]
    fn error_banner_grows_node() {
        with_ctx(None, |ctx| {
            let plain = compute_layout(&Node::new("a", "add", 0.0, 0.0), ctx);
            let mut failing = Node::new("a", "add", 0.0, 0.0);
            failing.data.evaluation_error = Some("division by zero".into());
            let failed = compute_layout(&failing, ctx);
            assert!(failed.rect.height > plain.rect.height);
        });
    }

    #[test]
    fn group_uses_explicit_size_and_has_no_ports() {
        with_ctx(None, |ctx| {
            let mut g = Node::new("g", "group", 0.0, 0.0);
            g.data.size = Some(Size::new(500.0, 300.0));
            let l = compute_layout(&g, ctx);
            assert_eq!(l.rect, Bounds::new(0.0, 0.0, 500.0, 300.0));
            assert!(l.inputs.is_empty() && l.outputs.is_empty());
            assert_eq!(l.header.height, ctx.metrics.group_header_height);

            g.data.size = Some(Size::new(f64::NAN, -3.0));
            let l = compute_layout(&g, ctx);
            assert_eq!(l.rect.width, ctx.metrics.default_group_width);
            assert_eq!(l.rect.height, ctx.metrics.default_group_height);
        });
    }

    #[test]
    fn text_wraps_to_explicit_width() {
        with_ctx(None, |ctx| {
            let mut t = Node::new("t", "text", 0.0, 0.0);
            t.data.parameters.insert("text".into(), json!("one two three four five six"));
            let auto = compute_layout(&t, ctx);
            t.data.size = Some(Size::new(100.0, 0.0));
            let narrow = compute_layout(&t, ctx);
            let lines = |l: &NodeLayout| match &l.content {
                LayoutContent::Text { lines, .. } => lines.len(),
                _ => 0,
            };
            assert_eq!(narrow.rect.width, 100.0);
            assert!(lines(&narrow) > lines(&auto));
            assert!(narrow.rect.height > auto.rect.height);
        });
    }

    #[test]
    fn panel_lines_cap_and_scroll() {
        let mut scroll = ScrollOffsets::new();
        scroll.insert(NodeId::intern("p"), 1000);
        with_ctx(Some(&scroll), |ctx| {
            let mut p = Node::new("p", "panel", 0.0, 0.0);
            let values: Vec<i32> = (0..40).collect();
            p.data.outputs.insert("value".into(), json!(values));
            let l = compute_layout(&p, ctx);
            match &l.content {
                LayoutContent::Lines {
                    lines,
                    first_visible,
                    visible,
                    scrollable,
                    ..
                } => {
                    assert_eq!(lines.len(), 41);
                    assert_eq!(*visible, ctx.metrics.panel_max_visible_lines);
                    assert!(*scrollable);
                    assert_eq!(*first_visible, 41 - visible);
                }
                other => panic!("expected lines, got {other:?}"),
            }
        });
    }

    #[test]
    fn panel_grows_with_lines_until_cap() {
        with_ctx(None, |ctx| {
            let mut small = Node::new("p", "panel", 0.0, 0.0);
            small.data.outputs.insert("value".into(), json!([1, 2]));
            let mut big = small.clone();
            big.data.outputs.insert("value".into(), json!((0..8).collect::<Vec<_>>()));
            let mut huge = small.clone();
            huge.data.outputs.insert("value".into(), json!((0..80).collect::<Vec<_>>()));
            let mut huger = small.clone();
            huger.data.outputs.insert("value".into(), json!((0..90).collect::<Vec<_>>()));
            let h = |n: &Node| compute_layout(n, ctx).rect.height;
            assert!(h(&big) > h(&small));
            assert_eq!(h(&huge), h(&huger));
        });
    }

    #[test]
    fn slider_track_leaves_value_column() {
        with_ctx(None, |ctx| {
            let mut s = Node::new("s", "slider", 10.0, 10.0);
            s.data.parameters.insert("min".into(), json!(0));
            s.data.parameters.insert("max".into(), json!(10));
            s.data.parameters.insert("step".into(), json!(0.5));
            s.data.parameters.insert("value".into(), json!(2.5));
            let l = compute_layout(&s, ctx);
            let m = ctx.metrics;
            let slider = l.slider().expect("slider content");
            assert_eq!(l.rect.height, m.slider_height);
            assert!(slider.track.right() <= l.rect.right() - m.slider_value_column);
            assert_eq!(slider.value_text, "2.5");
            assert!((slider.thumb().x - (slider.track.x + slider.track.width * 0.25)).abs() < 1e-9);
            assert_eq!(slider.raw_value_at(slider.track.right()), 10.0);
            assert_eq!(l.outputs[0].y, l.rect.y + l.rect.height / 2.0);
        });
    }

    #[test]
    fn children_translate_by_parent_position() {
        with_ctx(None, |ctx| {
            let g = Node::new("g", "group", 100.0, 200.0);
            let mut child = Node::new("c", "add", 10.0, 20.0);
            child.parent_node = Some(g.id);
            let alone = compute_layout(&child, ctx);
            let all = compute_layouts(&[g, child], ctx);
            let c = &all[&NodeId::intern("c")];
            assert_eq!(c.rect, alone.rect.translate(100.0, 200.0));
            assert_eq!(c.rect.width, alone.rect.width);
            assert_eq!(c.inputs[0].x, alone.inputs[0].x + 100.0);
        });
    }

    #[test]
    fn hidden_nodes_have_no_layout() {
        with_ctx(None, |ctx| {
            let mut n = Node::new("h", "add", 0.0, 0.0);
            n.hidden = true;
            assert!(compute_layouts(&[n], ctx).is_empty());
        });
    }

    #[test]
    fn handles_resolve_against_defaults() {
        with_ctx(None, |ctx| {
            let l = compute_layout(&Node::new("a", "add", 0.0, 0.0), ctx);
            assert_eq!(l.resolve_input(None).map(|p| p.port.key.as_str()), Some("a"));
            assert_eq!(l.resolve_input(Some("b")).map(|p| p.port.key.as_str()), Some("b"));
            assert!(l.resolve_input(Some("zzz")).is_none());
            assert_eq!(l.resolve_output(None).map(|p| p.port.key.as_str()), Some("sum"));
        });
    }
}
