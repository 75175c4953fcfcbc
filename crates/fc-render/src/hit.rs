//! Hit testing: world point → node, port, or edge.
//!
//! Reverse-walks the paint order (front-to-back) so the topmost node wins.
//! Groups paint first, so every other node is tested before any group.
//! Within a node, outputs beat inputs beat the body. Edges are only
//! considered when no node or port claims the point.

use crate::edges::PortKey;
use crate::frame::FrameCache;
use fc_core::geometry::distance_to_curve;
use fc_core::{Bounds, CanvasConfig, EdgeId, NodeId, NodeKind, NodeLayout, PortDirection, PortLayout};
use kurbo::Point;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum HitTarget {
    #[default]
    None,
    Node(NodeId),
    Port(PortKey),
    Edge(EdgeId),
}

impl HitTarget {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Node owning the target, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Port(key) => Some(key.node),
            Self::None | Self::Edge(_) => None,
        }
    }
}

/// Radii and sampling used by the hit tester, all in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOptions {
    pub port_radius: f64,
    pub text_padding: f64,
    pub edge_radius: f64,
    pub edge_samples: usize,
}

impl HitOptions {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            port_radius: config.layout.port_radius * 2.0,
            text_padding: config.layout.text_hit_padding,
            edge_radius: config.interaction.edge_hit_radius,
            edge_samples: config.interaction.edge_sample_count,
        }
    }
}

impl Default for HitOptions {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

/// Find the topmost element at world point `p`.
pub fn hit_test(frame: &FrameCache, p: Point, opts: &HitOptions) -> HitTarget {
    for layout in frame.ordered().rev() {
        if let Some(port) = port_in(layout, p, opts, None) {
            return HitTarget::Port(port_key(layout, port));
        }
        if layout.hit_rect(opts.text_padding).contains(p.x, p.y) {
            return HitTarget::Node(layout.id);
        }
    }

    match edge_at(frame, p, opts) {
        Some(edge) => HitTarget::Edge(edge),
        None => HitTarget::None,
    }
}

/// Topmost port of the given direction at `p`, ignoring node bodies.
///
/// Used when dropping a wire: the body of the hovered node must not hide
/// the input port under the cursor.
pub fn port_at(
    frame: &FrameCache,
    p: Point,
    opts: &HitOptions,
    direction: PortDirection,
) -> Option<PortKey> {
    frame.ordered().rev().find_map(|layout| {
        port_in(layout, p, opts, Some(direction)).map(|port| port_key(layout, port))
    })
}

/// Topmost node whose body contains `p`, ignoring ports.
pub fn node_at(frame: &FrameCache, p: Point, opts: &HitOptions) -> Option<NodeId> {
    frame
        .ordered()
        .rev()
        .find(|l| l.hit_rect(opts.text_padding).contains(p.x, p.y))
        .map(|l| l.id)
}

/// Closest edge within the hit radius; the first of equally close edges wins.
pub fn edge_at(frame: &FrameCache, p: Point, opts: &HitOptions) -> Option<EdgeId> {
    let mut best: Option<(EdgeId, f64)> = None;
    for route in &frame.routes {
        let d = distance_to_curve(p, &route.curve, opts.edge_samples);
        if d > opts.edge_radius {
            continue;
        }
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((route.edge, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Nodes whose rectangle intersects `rect` (world), in paint order.
pub fn hit_test_rect(frame: &FrameCache, rect: Bounds) -> Vec<NodeId> {
    frame
        .ordered()
        .filter(|l| l.rect.intersects(&rect))
        .map(|l| l.id)
        .collect()
}

/// Group or text node whose resize handle contains `p`.
///
/// `handle_world` is the handle side in world units, i.e. the configured
/// screen size divided by the current scale.
pub fn resize_handle_at(frame: &FrameCache, p: Point, handle_world: f64) -> Option<NodeId> {
    frame
        .ordered()
        .rev()
        .find(|l| {
            l.resize_handle(handle_world)
                .is_some_and(|h| h.contains(p.x, p.y))
        })
        .map(|l| l.id)
}

/// Slider node whose track zone contains `p`.
/// Topmost node taking wheel input at `p`. A slider's grab zone counts as
/// part of the slider where it overhangs the body.
pub fn wheel_target<'a>(
    frame: &'a FrameCache,
    p: Point,
    opts: &HitOptions,
    min_zone: f64,
) -> Option<&'a NodeLayout> {
    frame.ordered().rev().find(|l| {
        l.hit_rect(opts.text_padding).contains(p.x, p.y)
            || l.slider().is_some_and(|s| s.hit_zone(min_zone).contains(p.x, p.y))
    })
}

/// Topmost slider whose grab zone contains `p`.
pub fn slider_track_at(frame: &FrameCache, p: Point, min_zone: f64) -> Option<NodeId> {
    frame
        .ordered()
        .rev()
        .filter(|l| l.kind == NodeKind::Slider)
        .find(|l| l.slider().is_some_and(|s| s.hit_zone(min_zone).contains(p.x, p.y)))
        .map(|l| l.id)
}

fn port_in<'a>(
    layout: &'a NodeLayout,
    p: Point,
    opts: &HitOptions,
    direction: Option<PortDirection>,
) -> Option<&'a PortLayout> {
    let r2 = opts.port_radius * opts.port_radius;
    let hit = |port: &&PortLayout| {
        let dx = port.x - p.x;
        let dy = port.y - p.y;
        dx * dx + dy * dy <= r2
    };
    let outputs = layout.outputs.iter().filter(|_| direction != Some(PortDirection::Input));
    let inputs = layout.inputs.iter().filter(|_| direction != Some(PortDirection::Output));
    outputs.chain(inputs).find(hit)
}

fn port_key(layout: &NodeLayout, port: &PortLayout) -> PortKey {
    PortKey::new(layout.id, port.port.key.as_str(), port.direction())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::layout::LayoutContext;
    use fc_core::{
        ApproxMeasure, Edge, GraphSnapshot, JsonInspector, LayoutMetrics, Node, NodeTypeDef,
        PortSpec, Size, StaticCatalog,
    };
    use pretty_assertions::assert_eq;

    fn frame(graph: &GraphSnapshot) -> FrameCache {
        let def = NodeTypeDef {
            inputs: vec![PortSpec::new("in", "number")],
            outputs: vec![PortSpec::new("out", "number")],
            ..NodeTypeDef::default()
        };
        let catalog = StaticCatalog::new().with_type("op", def);
        let metrics = LayoutMetrics::default();
        let ctx = LayoutContext {
            catalog: &catalog,
            measure: &ApproxMeasure::default(),
            inspector: &JsonInspector,
            metrics: &metrics,
            scroll: None,
        };
        FrameCache::build(graph, &ctx)
    }

    fn two_nodes() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![Node::new("a", "op", 0.0, 0.0), Node::new("b", "op", 400.0, 0.0)],
            edges: vec![Edge::new("e", "a", "out", "b", "in")],
        }
    }

    #[test]
    fn body_and_background() {
        let f = frame(&two_nodes());
        let opts = HitOptions::default();
        assert_eq!(
            hit_test(&f, Point::new(100.0, 10.0), &opts),
            HitTarget::Node(NodeId::intern("a"))
        );
        assert_eq!(hit_test(&f, Point::new(300.0, 500.0), &opts), HitTarget::None);
    }

    #[test]
    fn port_anchor_beats_body_and_edge() {
        let f = frame(&two_nodes());
        let anchor = f.layout(NodeId::intern("a")).unwrap().outputs[0].point();
        let hit = hit_test(&f, anchor, &HitOptions::default());
        assert_eq!(
            hit,
            HitTarget::Port(PortKey::new(NodeId::intern("a"), "out", PortDirection::Output))
        );
    }

    #[test]
    fn edge_between_nodes() {
        let f = frame(&two_nodes());
        let mid = f.routes[0].curve.p0.midpoint(f.routes[0].curve.p3);
        assert_eq!(
            hit_test(&f, mid, &HitOptions::default()),
            HitTarget::Edge(EdgeId::intern("e"))
        );
        let far = Point::new(mid.x, mid.y + 50.0);
        assert_eq!(hit_test(&f, far, &HitOptions::default()), HitTarget::None);
    }

    #[test]
    fn first_of_equal_edges_wins() {
        let mut graph = two_nodes();
        graph.edges.push(Edge::new("dup", "a", "out", "b", "in"));
        let mut f = frame(&graph);
        // Collapse fan-out so both wires coincide.
        let curve = f.routes[0].curve;
        f.routes[1].curve = curve;
        let mid = curve.p0.midpoint(curve.p3);
        assert_eq!(edge_at(&f, mid, &HitOptions::default()), Some(EdgeId::intern("e")));
    }

    #[test]
    fn nodes_above_groups() {
        let mut group = Node::new("g", "group", -50.0, -50.0);
        group.data.size = Some(Size::new(600.0, 400.0));
        // Group listed last still sits underneath.
        let graph = GraphSnapshot {
            nodes: vec![Node::new("a", "op", 0.0, 0.0), group],
            edges: vec![],
        };
        let f = frame(&graph);
        let opts = HitOptions::default();
        assert_eq!(
            hit_test(&f, Point::new(50.0, 20.0), &opts),
            HitTarget::Node(NodeId::intern("a"))
        );
        assert_eq!(
            hit_test(&f, Point::new(500.0, 300.0), &opts),
            HitTarget::Node(NodeId::intern("g"))
        );
        assert_eq!(
            resize_handle_at(&f, Point::new(545.0, 345.0), 12.0),
            Some(NodeId::intern("g"))
        );
    }

    #[test]
    fn missing_target_edge_is_not_hit() {
        let mut graph = two_nodes();
        graph.edges = vec![Edge::new("orphan", "a", "out", "ghost", "in")];
        let f = frame(&graph);
        assert!(f.routes.is_empty());
        let p = Point::new(300.0, 44.0);
        assert_eq!(hit_test(&f, p, &HitOptions::default()), HitTarget::None);
    }

    #[test]
    fn rect_select_intersects() {
        let f = frame(&two_nodes());
        let hits = hit_test_rect(&f, Bounds::new(150.0, 10.0, 300.0, 10.0));
        assert_eq!(hits, vec![NodeId::intern("a"), NodeId::intern("b")]);
        assert!(hit_test_rect(&f, Bounds::new(210.0, 10.0, 50.0, 10.0)).is_empty());
    }

    #[test]
    fn drop_target_ignores_bodies() {
        let f = frame(&two_nodes());
        let input = f.layout(NodeId::intern("b")).unwrap().inputs[0].point();
        let near = Point::new(input.x + 3.0, input.y);
        assert_eq!(
            port_at(&f, near, &HitOptions::default(), PortDirection::Input),
            Some(PortKey::new(NodeId::intern("b"), "in", PortDirection::Input))
        );
        assert_eq!(port_at(&f, near, &HitOptions::default(), PortDirection::Output), None);
    }
}
