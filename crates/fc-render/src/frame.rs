//! Per-frame cache shared by hit testing and painting.
//!
//! Rebuilt from scratch every frame from the store snapshot; nothing here
//! outlives the frame, so a node that changed between frames can never
//! leave a stale rectangle behind.

use crate::edges::{EdgeRoute, PortKey, route_edges};
use fc_core::layout::{LayoutContext, compute_layouts};
use fc_core::{Bounds, EdgeId, GraphSnapshot, NodeId, NodeKind, NodeLayout};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct FrameCache {
    pub layouts: HashMap<NodeId, NodeLayout>,
    /// Paint order: groups in array order, then every other node.
    pub draw_order: Vec<NodeId>,
    /// Resolved edges in edge array order.
    pub routes: Vec<EdgeRoute>,
    connected: HashSet<PortKey>,
}

impl FrameCache {
    pub fn build(graph: &GraphSnapshot, ctx: &LayoutContext) -> Self {
        let layouts = compute_layouts(&graph.nodes, ctx);

        let visible = graph.nodes.iter().filter(|n| layouts.contains_key(&n.id));
        let (groups, others): (Vec<_>, Vec<_>) =
            visible.partition(|n| n.kind() == NodeKind::Group);
        let draw_order = groups.iter().chain(others.iter()).map(|n| n.id).collect();

        let routes = route_edges(&graph.edges, &layouts, ctx.metrics.port_radius);
        let connected = routes
            .iter()
            .flat_map(|r| [r.source.clone(), r.target.clone()])
            .collect();

        log::trace!(
            "frame: {} layouts, {} routes ({} edges)",
            layouts.len(),
            routes.len(),
            graph.edges.len()
        );

        Self {
            layouts,
            draw_order,
            routes,
            connected,
        }
    }

    pub fn layout(&self, id: NodeId) -> Option<&NodeLayout> {
        self.layouts.get(&id)
    }

    pub fn route(&self, id: EdgeId) -> Option<&EdgeRoute> {
        self.routes.iter().find(|r| r.edge == id)
    }

    /// Layouts in paint order.
    pub fn ordered(&self) -> impl DoubleEndedIterator<Item = &NodeLayout> {
        self.draw_order.iter().filter_map(|id| self.layouts.get(id))
    }

    pub fn is_connected(&self, key: &PortKey) -> bool {
        self.connected.contains(key)
    }

    /// Union of the given nodes' rectangles (all nodes when `ids` is None).
    pub fn world_bounds(&self, ids: Option<&[NodeId]>) -> Option<Bounds> {
        let rects: Vec<Bounds> = match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.layouts.get(id))
                .map(|l| l.rect)
                .collect(),
            None => self.ordered().map(|l| l.rect).collect(),
        };
        rects.into_iter().reduce(|a, b| a.union(&b))
    }
}
