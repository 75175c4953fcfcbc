//! Edge routing: resolve edges against layouts and fan out shared ports.
//!
//! An edge resolves only when both endpoint nodes have a layout and both
//! handles (explicit or default) name a port on them. Anything else is
//! skipped for the frame; nodes and ports come and go mid-edit.

use fc_core::geometry::edge_curve;
use fc_core::{Edge, EdgeId, NodeId, NodeLayout, PortDirection};
use kurbo::{CubicBez, Point};
use std::collections::HashMap;

/// Fan-out spacing as a fraction of the port radius.
pub const FAN_SPREAD: f64 = 0.9;

/// Identifies one port end: node, port key, direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortKey {
    pub node: NodeId,
    pub port: String,
    pub direction: PortDirection,
}

impl PortKey {
    pub fn new(node: NodeId, port: impl Into<String>, direction: PortDirection) -> Self {
        Self {
            node,
            port: port.into(),
            direction,
        }
    }
}

/// A drawable edge for this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub edge: EdgeId,
    pub source: PortKey,
    pub target: PortKey,
    /// Port anchors before fan-out.
    pub source_anchor: Point,
    pub target_anchor: Point,
    pub curve: CubicBez,
    /// Value type of the source port; drives wire color.
    pub port_type: String,
    pub selected: bool,
}

impl EdgeRoute {
    pub fn start(&self) -> Point {
        self.curve.p0
    }

    pub fn end(&self) -> Point {
        self.curve.p3
    }
}

/// Offset of the `k`-th of `n` wires on one port.
///
/// Offsets are symmetric about zero: `(k - (n-1)/2) * radius * FAN_SPREAD`.
pub fn fan_offset(k: usize, n: usize, port_radius: f64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    (k as f64 - (n as f64 - 1.0) / 2.0) * port_radius * FAN_SPREAD
}

struct Resolved<'a> {
    edge: &'a Edge,
    source: PortKey,
    target: PortKey,
    start: Point,
    end: Point,
    port_type: String,
}

fn resolve<'a>(edge: &'a Edge, layouts: &HashMap<NodeId, NodeLayout>) -> Option<Resolved<'a>> {
    let src = layouts.get(&edge.source)?;
    let tgt = layouts.get(&edge.target)?;
    let out = src.resolve_output(edge.source_handle.as_deref())?;
    let inp = tgt.resolve_input(edge.target_handle.as_deref())?;
    Some(Resolved {
        edge,
        source: PortKey::new(edge.source, out.port.key.as_str(), PortDirection::Output),
        target: PortKey::new(edge.target, inp.port.key.as_str(), PortDirection::Input),
        start: out.point(),
        end: inp.point(),
        port_type: out.port.port_type.clone(),
    })
}

/// Resolve every edge in array order and apply fan-out at both ends.
pub fn route_edges(
    edges: &[Edge],
    layouts: &HashMap<NodeId, NodeLayout>,
    port_radius: f64,
) -> Vec<EdgeRoute> {
    let resolved: Vec<Resolved> = edges
        .iter()
        .filter_map(|e| {
            let r = resolve(e, layouts);
            if r.is_none() {
                log::trace!("skipping unresolved edge {}", e.id);
            }
            r
        })
        .collect();

    let mut totals: HashMap<PortKey, usize> = HashMap::new();
    for r in &resolved {
        *totals.entry(r.source.clone()).or_default() += 1;
        *totals.entry(r.target.clone()).or_default() += 1;
    }

    // k counts wires already placed on a port, in edge array order.
    let mut seen: HashMap<PortKey, usize> = HashMap::new();
    let mut offset = |key: &PortKey| -> f64 {
        let n = totals.get(key).copied().unwrap_or(1);
        let k = seen.entry(key.clone()).or_default();
        let off = fan_offset(*k, n, port_radius);
        *k += 1;
        off
    };

    resolved
        .into_iter()
        .map(|r| {
            let start = Point::new(r.start.x, r.start.y + offset(&r.source));
            let end = Point::new(r.end.x, r.end.y + offset(&r.target));
            EdgeRoute {
                edge: r.edge.id,
                source: r.source,
                target: r.target,
                source_anchor: r.start,
                target_anchor: r.end,
                curve: edge_curve(start, end),
                port_type: r.port_type,
                selected: r.edge.selected,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::layout::{LayoutContext, compute_layouts};
    use fc_core::{
        ApproxMeasure, JsonInspector, LayoutMetrics, Node, NodeTypeDef, PortSpec, StaticCatalog,
    };

    fn layouts(nodes: &[Node]) -> HashMap<NodeId, NodeLayout> {
        let def = NodeTypeDef {
            inputs: vec![PortSpec::new("a", "number"), PortSpec::new("b", "number")],
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
        compute_layouts(nodes, &ctx)
    }

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("src", "op", 0.0, 0.0),
            Node::new("t1", "op", 400.0, -100.0),
            Node::new("t2", "op", 400.0, 0.0),
            Node::new("t3", "op", 400.0, 100.0),
        ]
    }

    #[test]
    fn fan_offsets_are_symmetric() {
        for n in 1..8 {
            let offsets: Vec<f64> = (0..n).map(|k| fan_offset(k, n, 6.0)).collect();
            let sum: f64 = offsets.iter().sum();
            assert!(sum.abs() < 1e-9, "n={n} sum={sum}");
            for k in 0..n {
                assert!((offsets[k] + offsets[n - 1 - k]).abs() < 1e-9);
            }
        }
        assert_eq!(fan_offset(0, 1, 6.0), 0.0);
        assert!((fan_offset(0, 2, 6.0) + 2.7).abs() < 1e-9);
    }

    #[test]
    fn shared_source_port_fans_out() {
        let layouts = layouts(&nodes());
        let edges = vec![
            Edge::new("e1", "src", "out", "t1", "a"),
            Edge::new("e2", "src", "out", "t2", "a"),
            Edge::new("e3", "src", "out", "t3", "a"),
        ];
        let routes = route_edges(&edges, &layouts, 6.0);
        assert_eq!(routes.len(), 3);
        let anchor = routes[0].source_anchor.y;
        let starts: Vec<f64> = routes.iter().map(|r| r.start().y - anchor).collect();
        assert!((starts[0] + 5.4).abs() < 1e-9);
        assert!(starts[1].abs() < 1e-9);
        assert!((starts[2] - 5.4).abs() < 1e-9);
        // Each target port has a single wire, so no offset there.
        for r in &routes {
            assert_eq!(r.end(), r.target_anchor);
        }
    }

    #[test]
    fn missing_handles_use_defaults() {
        let layouts = layouts(&nodes());
        let mut edge = Edge::new("e", "src", "out", "t1", "a");
        edge.source_handle = None;
        edge.target_handle = None;
        let routes = route_edges(&[edge], &layouts, 6.0);
        assert_eq!(routes[0].source.port, "out");
        assert_eq!(routes[0].target.port, "a");
        assert_eq!(routes[0].port_type, "number");
    }

    #[test]
    fn unresolved_edges_are_skipped() {
        let layouts = layouts(&nodes());
        let edges = vec![
            Edge::new("gone", "src", "out", "missing", "a"),
            Edge::new("badport", "src", "nope", "t1", "a"),
            Edge::new("ok", "src", "out", "t1", "b"),
        ];
        let routes = route_edges(&edges, &layouts, 6.0);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].edge, EdgeId::intern("ok"));
        // The skipped edges do not count toward fan-out.
        assert_eq!(routes[0].start(), routes[0].source_anchor);
    }
}
