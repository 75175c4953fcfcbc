//! Render pipeline: one frame, two layers.
//!
//! Paint order per frame:
//!
//! 1. background and grid (screen space)
//! 2. group chrome
//! 3. edges, halo pass then solid pass
//! 4. node bodies, labels, content; fallback ports when there is no overlay
//! 5. port overlay (optional immediate-mode layer)
//! 6. drag previews: ghost node, in-flight wire
//! 7. selection box (screen space)
//! 8. tooltip and shortcut help (screen space)

use crate::cache::PaintCache;
use crate::edges::PortKey;
use crate::frame::FrameCache;
use crate::hit::HitTarget;
use crate::surface::{PortOverlay, PortSprite, PortState, StrokeStyle, Surface, TextAlign, TextStyle};
use crate::theme::Theme;
use fc_core::geometry::edge_curve;
use fc_core::layout::LayoutContent;
use fc_core::text::TextMeasure;
use fc_core::{
    Bounds, CanvasConfig, Color, EdgeId, GraphSnapshot, Node, NodeCatalog, NodeId, NodeKind,
    NodeLayout, ViewTransform,
};
use kurbo::{ParamCurveExtrema, Point};
use std::collections::{HashMap, HashSet};

const CORNER_RADIUS: f64 = 6.0;
/// Grid lines closer than this (screen px) are not drawn.
const MIN_GRID_SPACING: f64 = 6.0;

/// Screen-space tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub at: Point,
}

/// Local UI state the pipeline draws on top of the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiSnapshot {
    pub hover: HitTarget,
    /// Port a wire is being dragged from.
    pub active_port: Option<PortKey>,
    /// Selection not yet reflected in the store (e.g. live box select).
    pub selected_nodes: HashSet<NodeId>,
    pub selected_edges: HashSet<EdgeId>,
    pub focused_slider: Option<NodeId>,
    /// In-flight wire, world space.
    pub preview_edge: Option<(Point, Point)>,
    /// Ghost rectangle for a pending node drop, world space.
    pub ghost: Option<Bounds>,
    /// Rubber band, screen space.
    pub selection_box: Option<Bounds>,
    pub tooltip: Option<Tooltip>,
    /// `(keys, description)` rows of the shortcut overlay when shown.
    pub shortcut_help: Option<Vec<(String, String)>>,
}

/// Everything one frame reads.
pub struct FrameScene<'a> {
    pub graph: &'a GraphSnapshot,
    pub frame: &'a FrameCache,
    pub view: &'a ViewTransform,
    pub ui: &'a UiSnapshot,
    pub catalog: &'a dyn NodeCatalog,
    pub measure: &'a dyn TextMeasure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub nodes: usize,
    pub culled: usize,
    pub edges: usize,
    pub ports: usize,
    pub overlay: bool,
}

pub struct RenderPipeline {
    pub theme: Theme,
    pub config: CanvasConfig,
    cache: PaintCache,
}

impl RenderPipeline {
    pub fn new(theme: Theme, config: CanvasConfig) -> Self {
        Self {
            theme,
            config,
            cache: PaintCache::new(),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.cache.clear();
    }

    pub fn cache(&self) -> &PaintCache {
        &self.cache
    }

    /// Draw one frame. Without an overlay, ports are drawn on `surface`.
    pub fn render(
        &mut self,
        scene: &FrameScene,
        surface: &mut dyn Surface,
        overlay: Option<&mut dyn PortOverlay>,
    ) -> RenderStats {
        let mut stats = RenderStats {
            overlay: overlay.is_some(),
            ..RenderStats::default()
        };
        let view = scene.view;
        let (width, height) = surface.size();
        let nodes: HashMap<NodeId, &Node> = scene.graph.nodes.iter().map(|n| (n.id, n)).collect();
        let edge_selected: HashMap<EdgeId, bool> =
            scene.graph.edges.iter().map(|e| (e.id, e.selected)).collect();
        let visible = view
            .visible_world(width, height)
            .inflate(self.config.layout.port_radius * 2.0);

        // 1. Background
        surface.set_transform(1.0, 0.0, 0.0);
        surface.clear(self.theme.background);
        self.draw_grid(surface, view, width, height);

        surface.set_transform(view.scale, view.x, view.y);

        // 2. Groups
        let mut on_screen: Vec<&NodeLayout> = Vec::new();
        for layout in scene.frame.ordered() {
            if !layout.rect.intersects(&visible) {
                stats.culled += 1;
                continue;
            }
            on_screen.push(layout);
        }
        for layout in on_screen.iter().filter(|l| l.kind == NodeKind::Group) {
            let Some(node) = nodes.get(&layout.id) else {
                continue;
            };
            self.draw_group(surface, scene, node, layout);
            stats.nodes += 1;
        }

        // 3. Edges
        let routes: Vec<_> = scene
            .frame
            .routes
            .iter()
            .filter(|r| {
                let bb = r.curve.bounding_box();
                visible.intersects(&Bounds::new(bb.x0, bb.y0, bb.width(), bb.height()))
            })
            .collect();
        let is_selected = |id: EdgeId| {
            edge_selected.get(&id).copied().unwrap_or(false)
                || scene.ui.selected_edges.contains(&id)
                || scene.ui.hover == HitTarget::Edge(id)
        };
        for route in &routes {
            let halo = if is_selected(route.edge) {
                StrokeStyle::solid(8.0, self.theme.selection.with_alpha(0.35))
            } else {
                StrokeStyle::solid(6.0, self.theme.port_color(&route.port_type).with_alpha(0.15))
            };
            surface.stroke_curve(&route.curve, &halo);
        }
        for route in &routes {
            let solid = if is_selected(route.edge) {
                StrokeStyle::solid(2.5, self.theme.selection)
            } else {
                StrokeStyle::solid(2.0, self.theme.port_color(&route.port_type))
            };
            surface.stroke_curve(&route.curve, &solid);
            stats.edges += 1;
        }

        // 4. Nodes
        for layout in on_screen.iter().filter(|l| l.kind != NodeKind::Group) {
            let Some(node) = nodes.get(&layout.id) else {
                continue;
            };
            match layout.kind {
                NodeKind::Text => self.draw_text_node(surface, scene, node, layout),
                NodeKind::Slider => self.draw_slider(surface, scene, node, layout),
                NodeKind::TextNote | NodeKind::Panel => self.draw_lines_node(surface, scene, node, layout),
                NodeKind::Standard | NodeKind::Group => self.draw_standard(surface, scene, node, layout),
            }
            stats.nodes += 1;
        }

        // 5. Ports
        let sprites = self.port_sprites(scene, &on_screen);
        stats.ports = sprites.len();
        match overlay {
            Some(overlay) => {
                overlay.begin_frame(width, height);
                overlay.draw_ports(&sprites);
                overlay.end_frame();
            }
            None => self.draw_fallback_ports(surface, view, &sprites),
        }

        // 6. Previews
        self.draw_previews(surface, scene.ui, view);

        // 7-8. Screen-space chrome
        surface.set_transform(1.0, 0.0, 0.0);
        if let Some(rect) = scene.ui.selection_box {
            surface.fill_rect(rect, 0.0, self.theme.box_fill);
            surface.stroke_rect(rect, 0.0, &StrokeStyle::solid(1.0, self.theme.selection));
        }
        if let Some(tip) = &scene.ui.tooltip {
            self.draw_tooltip(surface, scene.measure, tip);
        }
        if let Some(rows) = &scene.ui.shortcut_help {
            self.draw_shortcut_help(surface, scene.measure, rows, width, height);
        }

        log::trace!(
            "rendered {} nodes ({} culled), {} edges, {} ports",
            stats.nodes,
            stats.culled,
            stats.edges,
            stats.ports
        );
        stats
    }

    // ─── Background ──────────────────────────────────────────────────────

    fn draw_grid(&self, surface: &mut dyn Surface, view: &ViewTransform, width: f64, height: f64) {
        let spacing = self.config.grid_step(view.scale) * view.scale;
        if !spacing.is_finite() || spacing < MIN_GRID_SPACING {
            return;
        }
        let stroke = StrokeStyle::solid(1.0, self.theme.grid);
        let mut x = view.x.rem_euclid(spacing);
        while x <= width {
            surface.stroke_line(Point::new(x, 0.0), Point::new(x, height), &stroke);
            x += spacing;
        }
        let mut y = view.y.rem_euclid(spacing);
        while y <= height {
            surface.stroke_line(Point::new(0.0, y), Point::new(width, y), &stroke);
            y += spacing;
        }
    }

    // ─── Node families ───────────────────────────────────────────────────

    fn is_selected(&self, scene: &FrameScene, node: &Node) -> bool {
        node.selected || scene.ui.selected_nodes.contains(&node.id)
    }

    fn accent(&mut self, scene: &FrameScene, node: &Node, fallback: Color) -> Color {
        match scene.catalog.display(&node.node_type).color {
            Some(value) => self.cache.resolve(&value, Some(fallback), fallback),
            None => fallback,
        }
    }

    fn outline(&self, surface: &mut dyn Surface, rect: Bounds, selected: bool, view: &ViewTransform) {
        let stroke = if selected {
            StrokeStyle::solid(2.0 / view.scale, self.theme.selection)
        } else {
            StrokeStyle::solid(1.0 / view.scale, self.theme.node_stroke)
        };
        surface.stroke_rect(rect, CORNER_RADIUS, &stroke);
    }

    fn draw_resize_handle(&self, surface: &mut dyn Surface, layout: &NodeLayout, view: &ViewTransform) {
        let size = view.screen_len(self.config.interaction.resize_handle_size);
        let Some(handle) = layout.resize_handle(size) else {
            return;
        };
        let stroke = StrokeStyle::solid(1.5 / view.scale, self.theme.selection);
        for t in [0.3, 0.65] {
            surface.stroke_line(
                Point::new(handle.x + handle.width * t, handle.bottom()),
                Point::new(handle.right(), handle.y + handle.height * t),
                &stroke,
            );
        }
    }

    fn draw_header_label(
        &self,
        surface: &mut dyn Surface,
        scene: &FrameScene,
        node: &Node,
        layout: &NodeLayout,
    ) {
        let m = &self.config.layout;
        let pad = m.text_padding;
        let label = ellipsize(
            node.display_label(),
            layout.header.width - pad * 2.0,
            m.label_font_size,
            scene.measure,
        );
        let (_, cy) = layout.header.center();
        let style = TextStyle::new(m.label_font_size, self.theme.text).bold();
        surface.fill_text(&label, Point::new(layout.header.x + pad, cy), &style);
    }

    fn draw_group(&mut self, surface: &mut dyn Surface, scene: &FrameScene, node: &Node, layout: &NodeLayout) {
        let fill = self.accent(scene, node, self.theme.group_fill);
        let fill = if fill == self.theme.group_fill {
            fill
        } else {
            fill.with_alpha(self.theme.group_fill.a)
        };
        surface.fill_rect(layout.rect, CORNER_RADIUS, fill);
        surface.fill_rect(layout.header, CORNER_RADIUS, fill.with_alpha((fill.a * 2.0).min(1.0)));
        self.draw_header_label(surface, scene, node, layout);

        let selected = self.is_selected(scene, node);
        let stroke = if selected {
            StrokeStyle::solid(2.0 / scene.view.scale, self.theme.selection)
        } else {
            StrokeStyle::dashed(1.0 / scene.view.scale, self.theme.group_stroke, 6.0, 4.0)
        };
        surface.stroke_rect(layout.rect, CORNER_RADIUS, &stroke);
        if selected {
            self.draw_resize_handle(surface, layout, scene.view);
        }
    }

    fn draw_standard(&mut self, surface: &mut dyn Surface, scene: &FrameScene, node: &Node, layout: &NodeLayout) {
        let m = self.config.layout.clone();
        let header = self.accent(scene, node, self.theme.header_fill);
        surface.fill_rect(layout.rect, CORNER_RADIUS, self.theme.node_fill);
        surface.fill_rect(layout.header, CORNER_RADIUS, header);
        self.draw_header_label(surface, scene, node, layout);

        let port_style = TextStyle::new(m.port_font_size, self.theme.muted_text);
        let inset = m.port_radius * 2.0;
        let half = layout.rect.width / 2.0 - inset * 1.5;
        for port in &layout.inputs {
            let text = ellipsize(port.port.display_label(), half, m.port_font_size, scene.measure);
            surface.fill_text(&text, Point::new(port.x + inset, port.y), &port_style);
        }
        let right = port_style.align(TextAlign::Right);
        for port in &layout.outputs {
            let text = ellipsize(port.port.display_label(), half, m.port_font_size, scene.measure);
            surface.fill_text(&text, Point::new(port.x - inset, port.y), &right);
        }

        if let Some(err) = &node.data.evaluation_error {
            let banner = Bounds::new(
                layout.rect.x,
                layout.rect.bottom() - m.bottom_padding - m.error_banner_height,
                layout.rect.width,
                m.error_banner_height,
            );
            surface.fill_rect(banner, 0.0, self.theme.error.with_alpha(0.15));
            let text = ellipsize(err, banner.width - m.text_padding * 2.0, m.port_font_size, scene.measure);
            let (_, cy) = banner.center();
            surface.fill_text(
                &text,
                Point::new(banner.x + m.text_padding, cy),
                &TextStyle::new(m.port_font_size, self.theme.error),
            );
        }

        let selected = self.is_selected(scene, node);
        if node.data.evaluation_error.is_some() && !selected {
            let stroke = StrokeStyle::solid(1.5 / scene.view.scale, self.theme.error);
            surface.stroke_rect(layout.rect, CORNER_RADIUS, &stroke);
        } else {
            self.outline(surface, layout.rect, selected, scene.view);
        }
    }

    fn draw_text_node(&mut self, surface: &mut dyn Surface, scene: &FrameScene, node: &Node, layout: &NodeLayout) {
        let LayoutContent::Text {
            lines,
            font_size,
            line_height,
        } = &layout.content
        else {
            return;
        };
        let pad = self.config.layout.text_padding;
        let color = self.accent(scene, node, self.theme.text);
        let style = TextStyle::new(*font_size, color);
        for (i, line) in lines.iter().enumerate() {
            let y = layout.rect.y + pad + (i as f64 + 0.5) * line_height;
            surface.fill_text(line, Point::new(layout.rect.x + pad, y), &style);
        }
        if self.is_selected(scene, node) {
            let stroke = StrokeStyle::dashed(1.0 / scene.view.scale, self.theme.selection, 4.0, 3.0);
            surface.stroke_rect(layout.rect, 2.0, &stroke);
            self.draw_resize_handle(surface, layout, scene.view);
        }
    }

    fn draw_lines_node(&mut self, surface: &mut dyn Surface, scene: &FrameScene, node: &Node, layout: &NodeLayout) {
        let m = self.config.layout.clone();
        let header = self.accent(scene, node, self.theme.header_fill);
        surface.fill_rect(layout.rect, CORNER_RADIUS, self.theme.node_fill);
        surface.fill_rect(layout.header, CORNER_RADIUS, header);
        self.draw_header_label(surface, scene, node, layout);

        if let LayoutContent::Lines {
            lines,
            area,
            first_visible,
            visible,
            scrollable,
        } = &layout.content
        {
            let style = TextStyle::new(m.panel_font_size, self.theme.text).monospace();
            surface.push_clip(*area);
            for (row, line) in lines.iter().skip(*first_visible).take(*visible).enumerate() {
                let y = area.y + (row as f64 + 0.5) * m.panel_line_height;
                surface.fill_text(line, Point::new(area.x, y), &style);
            }
            surface.pop_clip();

            if *scrollable && !lines.is_empty() {
                let total = lines.len() as f64;
                let bar = Bounds::new(area.right() - 3.0, area.y, 3.0, area.height);
                let thumb = Bounds::new(
                    bar.x,
                    area.y + area.height * (*first_visible as f64 / total),
                    bar.width,
                    (area.height * (*visible as f64 / total)).max(4.0),
                );
                surface.fill_rect(bar, 1.5, self.theme.slider_track);
                surface.fill_rect(thumb, 1.5, self.theme.muted_text);
            }
        }

        self.outline(surface, layout.rect, self.is_selected(scene, node), scene.view);
    }

    fn draw_slider(&mut self, surface: &mut dyn Surface, scene: &FrameScene, node: &Node, layout: &NodeLayout) {
        let Some(slider) = layout.slider() else {
            return;
        };
        let m = self.config.layout.clone();
        surface.fill_rect(layout.rect, CORNER_RADIUS, self.theme.node_fill);

        let inset = m.port_radius * 2.0;
        let label = ellipsize(
            node.display_label(),
            slider.track.width,
            m.port_font_size,
            scene.measure,
        );
        surface.fill_text(
            &label,
            Point::new(layout.rect.x + inset, layout.rect.y + m.port_font_size),
            &TextStyle::new(m.port_font_size, self.theme.muted_text),
        );

        let radius = slider.track.height / 2.0;
        surface.fill_rect(slider.track, radius, self.theme.slider_track);
        let thumb = slider.thumb();
        let filled = Bounds::new(
            slider.track.x,
            slider.track.y,
            thumb.x - slider.track.x,
            slider.track.height,
        );
        let accent = self.accent(scene, node, self.theme.slider_fill);
        surface.fill_rect(filled, radius, accent);
        surface.fill_circle(thumb, slider.track.height * 1.2, accent);

        surface.fill_text(
            &slider.value_text,
            Point::new(layout.rect.right() - inset, thumb.y),
            &TextStyle::new(m.label_font_size, self.theme.text)
                .align(TextAlign::Right)
                .monospace(),
        );

        let selected = self.is_selected(scene, node);
        self.outline(surface, layout.rect, selected, scene.view);
        if scene.ui.focused_slider == Some(node.id) && !selected {
            let ring = StrokeStyle::dashed(1.0 / scene.view.scale, self.theme.selection, 3.0, 3.0);
            surface.stroke_rect(layout.rect.inflate(3.0 / scene.view.scale), CORNER_RADIUS, &ring);
        }
    }

    // ─── Ports ───────────────────────────────────────────────────────────

    fn port_sprites(&self, scene: &FrameScene, layouts: &[&NodeLayout]) -> Vec<PortSprite> {
        let view = scene.view;
        let radius = self.config.layout.port_radius * view.scale;
        layouts
            .iter()
            .flat_map(|l| l.ports().map(move |p| (l, p)))
            .map(|(layout, port)| {
                let key = PortKey::new(layout.id, port.port.key.as_str(), port.direction());
                let state = if scene.ui.active_port.as_ref() == Some(&key) {
                    PortState::Active
                } else if scene.ui.hover == HitTarget::Port(key.clone()) {
                    PortState::Hover
                } else {
                    PortState::Idle
                };
                PortSprite {
                    center: view.world_to_screen(port.point()),
                    radius,
                    color: self.theme.port_color(&port.port.port_type),
                    state,
                    connected: scene.frame.is_connected(&key),
                }
            })
            .collect()
    }

    /// Plain circles on the retained layer, drawn in world space.
    fn draw_fallback_ports(&self, surface: &mut dyn Surface, view: &ViewTransform, sprites: &[PortSprite]) {
        for sprite in sprites {
            let center = view.screen_to_world(sprite.center);
            let mut radius = view.screen_len(sprite.radius);
            if sprite.state != PortState::Idle {
                radius *= 1.3;
            }
            if sprite.connected || sprite.state == PortState::Active {
                surface.fill_circle(center, radius, sprite.color);
            } else {
                surface.fill_circle(center, radius, self.theme.node_fill);
                surface.stroke_circle(center, radius, &StrokeStyle::solid(radius * 0.3, sprite.color));
            }
        }
    }

    // ─── Previews and chrome ─────────────────────────────────────────────

    fn draw_previews(&self, surface: &mut dyn Surface, ui: &UiSnapshot, view: &ViewTransform) {
        if let Some(ghost) = ui.ghost {
            surface.fill_rect(ghost, CORNER_RADIUS, self.theme.box_fill);
            let stroke = StrokeStyle::dashed(1.0 / view.scale, self.theme.selection, 5.0, 4.0);
            surface.stroke_rect(ghost, CORNER_RADIUS, &stroke);
        }
        if let Some((from, to)) = ui.preview_edge {
            let stroke = StrokeStyle::dashed(2.0 / view.scale, self.theme.selection, 6.0, 4.0);
            surface.stroke_curve(&edge_curve(from, to), &stroke);
        }
    }

    fn draw_tooltip(&self, surface: &mut dyn Surface, measure: &dyn TextMeasure, tip: &Tooltip) {
        let size = self.config.layout.port_font_size;
        let width = measure.measure(&tip.text, size) + 12.0;
        let rect = Bounds::new(tip.at.x + 12.0, tip.at.y + 12.0, width, size * 2.0);
        surface.fill_rect(rect, 4.0, self.theme.tooltip_fill);
        let (_, cy) = rect.center();
        surface.fill_text(
            &tip.text,
            Point::new(rect.x + 6.0, cy),
            &TextStyle::new(size, self.theme.tooltip_text),
        );
    }

    fn draw_shortcut_help(
        &self,
        surface: &mut dyn Surface,
        measure: &dyn TextMeasure,
        rows: &[(String, String)],
        width: f64,
        height: f64,
    ) {
        let size = self.config.layout.label_font_size;
        let row_h = size * 1.8;
        let keys_w = rows
            .iter()
            .map(|(k, _)| measure.measure(k, size))
            .fold(0.0, f64::max);
        let desc_w = rows
            .iter()
            .map(|(_, d)| measure.measure(d, size))
            .fold(0.0, f64::max);
        let panel_w = keys_w + desc_w + 48.0;
        let panel_h = rows.len() as f64 * row_h + 24.0;
        let panel = Bounds::new(
            (width - panel_w) / 2.0,
            (height - panel_h) / 2.0,
            panel_w,
            panel_h,
        );
        surface.fill_rect(panel, 10.0, self.theme.tooltip_fill.with_alpha(0.92));
        let keys = TextStyle::new(size, self.theme.tooltip_text).bold().monospace();
        let desc = TextStyle::new(size, self.theme.tooltip_text);
        for (i, (k, d)) in rows.iter().enumerate() {
            let y = panel.y + 12.0 + (i as f64 + 0.5) * row_h;
            surface.fill_text(k, Point::new(panel.x + 16.0, y), &keys);
            surface.fill_text(d, Point::new(panel.x + 32.0 + keys_w, y), &desc);
        }
    }
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
pub fn ellipsize(text: &str, max_width: f64, font_size: f64, measure: &dyn TextMeasure) -> String {
    if measure.measure(text, font_size) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for end in (0..chars.len()).rev() {
        let candidate: String = chars[..end].iter().chain(['…'].iter()).collect();
        if measure.measure(&candidate, font_size) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayList, DrawOp};
    use fc_core::layout::LayoutContext;
    use fc_core::{
        ApproxMeasure, Edge, JsonInspector, NodeTypeDef, PortDirection, PortSpec, StaticCatalog,
    };

    #[derive(Default)]
    struct RecordingOverlay {
        frames: usize,
        sprites: Vec<PortSprite>,
    }

    impl PortOverlay for RecordingOverlay {
        fn begin_frame(&mut self, _width: f64, _height: f64) {
            self.frames += 1;
            self.sprites.clear();
        }

        fn draw_ports(&mut self, sprites: &[PortSprite]) {
            self.sprites.extend_from_slice(sprites);
        }

        fn end_frame(&mut self) {}
    }

    fn catalog() -> StaticCatalog {
        let def = NodeTypeDef {
            inputs: vec![PortSpec::new("in", "number")],
            outputs: vec![PortSpec::new("out", "number")],
            ..NodeTypeDef::default()
        };
        StaticCatalog::new().with_type("op", def)
    }

    fn graph() -> GraphSnapshot {
        let mut a = Node::new("a", "op", 0.0, 0.0);
        a.data.label = Some("Alpha".into());
        let mut b = Node::new("b", "op", 300.0, 0.0);
        b.data.label = Some("Beta".into());
        let mut g = Node::new("g", "group", -20.0, -40.0);
        g.data.label = Some("Frame".into());
        GraphSnapshot {
            nodes: vec![a, b, g],
            edges: vec![
                Edge::new("e", "a", "out", "b", "in"),
                Edge::new("dangling", "a", "out", "nobody", "in"),
            ],
        }
    }

    fn frame(graph: &GraphSnapshot, catalog: &StaticCatalog, config: &CanvasConfig) -> FrameCache {
        let ctx = LayoutContext {
            catalog,
            measure: &ApproxMeasure::default(),
            inspector: &JsonInspector,
            metrics: &config.layout,
            scroll: None,
        };
        FrameCache::build(graph, &ctx)
    }

    fn render(ui: &UiSnapshot, overlay: Option<&mut dyn PortOverlay>) -> (DisplayList, RenderStats) {
        let config = CanvasConfig::default();
        let catalog = catalog();
        let graph = graph();
        let frame = frame(&graph, &catalog, &config);
        let view = ViewTransform::default();
        let scene = FrameScene {
            graph: &graph,
            frame: &frame,
            view: &view,
            ui,
            catalog: &catalog,
            measure: &ApproxMeasure::default(),
        };
        let mut pipeline = RenderPipeline::new(Theme::light(), config);
        let mut list = DisplayList::new(800.0, 600.0);
        let stats = pipeline.render(&scene, &mut list, overlay);
        (list, stats)
    }

    fn first(list: &DisplayList, pred: impl Fn(&DrawOp) -> bool) -> usize {
        list.ops.iter().position(pred).expect("op not found")
    }

    #[test]
    fn layers_paint_in_order() {
        let ui = UiSnapshot {
            preview_edge: Some((Point::new(0.0, 0.0), Point::new(50.0, 50.0))),
            selection_box: Some(Bounds::new(5.0, 5.0, 40.0, 40.0)),
            tooltip: Some(Tooltip {
                text: "hint".into(),
                at: Point::new(10.0, 10.0),
            }),
            ..UiSnapshot::default()
        };
        let (list, stats) = render(&ui, None);

        let grid = first(&list, |op| matches!(op, DrawOp::Line { .. }));
        let group = list.position_of_text("Frame").unwrap();
        let halo = first(&list, |op| matches!(op, DrawOp::Curve { stroke, .. } if stroke.width == 6.0));
        let solid = first(&list, |op| matches!(op, DrawOp::Curve { stroke, .. } if stroke.width == 2.0));
        let node = list.position_of_text("Alpha").unwrap();
        let port = first(&list, |op| matches!(op, DrawOp::StrokeCircle { .. }));
        let preview = first(&list, |op| matches!(op, DrawOp::Curve { stroke, .. } if stroke.dash.is_some()));
        let boxed = first(&list, |op| matches!(op, DrawOp::FillRect { rect, .. } if *rect == Bounds::new(5.0, 5.0, 40.0, 40.0)));
        let tip = list.position_of_text("hint").unwrap();

        assert!(grid < group);
        assert!(group < halo && halo < solid);
        assert!(solid < node && node < port);
        assert!(port < preview && preview < boxed && boxed < tip);
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.nodes, 3);
        assert!(!stats.overlay);
    }

    #[test]
    fn overlay_takes_over_ports() {
        let mut overlay = RecordingOverlay::default();
        let ui = UiSnapshot {
            active_port: Some(PortKey::new(NodeId::intern("a"), "out", PortDirection::Output)),
            ..UiSnapshot::default()
        };
        let (list, stats) = render(&ui, Some(&mut overlay));
        assert!(stats.overlay);
        assert_eq!(overlay.frames, 1);
        assert_eq!(overlay.sprites.len(), 4);
        assert_eq!(stats.ports, 4);
        assert!(!list.ops.iter().any(|op| matches!(op, DrawOp::StrokeCircle { .. })));

        let active: Vec<_> = overlay.sprites.iter().filter(|s| s.state == PortState::Active).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].connected);
        let plugged = overlay.sprites.iter().filter(|s| s.connected).count();
        assert_eq!(plugged, 2);
    }

    #[test]
    fn offscreen_nodes_are_culled() {
        let config = CanvasConfig::default();
        let catalog = catalog();
        let graph = graph();
        let frame = frame(&graph, &catalog, &config);
        let view = ViewTransform {
            x: -5000.0,
            ..ViewTransform::default()
        };
        let ui = UiSnapshot::default();
        let scene = FrameScene {
            graph: &graph,
            frame: &frame,
            view: &view,
            ui: &ui,
            catalog: &catalog,
            measure: &ApproxMeasure::default(),
        };
        let mut list = DisplayList::new(800.0, 600.0);
        let stats = RenderPipeline::new(Theme::dark(), config).render(&scene, &mut list, None);
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.culled, 3);
        assert_eq!(stats.edges, 0);
    }

    #[test]
    fn ellipsize_fits_width() {
        let m = ApproxMeasure::default();
        assert_eq!(ellipsize("short", 100.0, 10.0, &m), "short");
        let cut = ellipsize("a very long label indeed", 60.0, 10.0, &m);
        assert!(cut.ends_with('…'));
        assert!(m.measure(&cut, 10.0) <= 60.0);
        assert_eq!(ellipsize("abc", 0.0, 10.0, &m), "");
    }
}
