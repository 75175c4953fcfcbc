//! Selection model.
//!
//! Selection lives in the host store as `selected` flags. These helpers
//! derive the next selection from the current one plus a gesture, and the
//! controller sends it back as a single `SetSelection` intent.

use crate::intents::GraphIntent;
use fc_core::{Bounds, EdgeId, GraphSnapshot, NodeId, NodeKind};
use fc_render::{FrameCache, hit_test_rect};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Selection {
    /// Current selection as recorded in the store.
    pub fn from_graph(graph: &GraphSnapshot) -> Self {
        Self {
            nodes: graph
                .nodes
                .iter()
                .filter(|n| n.selected && !n.hidden)
                .map(|n| n.id)
                .collect(),
            edges: graph
                .edges
                .iter()
                .filter(|e| e.selected)
                .map(|e| e.id)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn into_intent(self) -> GraphIntent {
        GraphIntent::SetSelection {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

/// Every visible node, no edges.
pub fn select_all(graph: &GraphSnapshot) -> Selection {
    Selection {
        nodes: graph.nodes.iter().filter(|n| !n.hidden).map(|n| n.id).collect(),
        edges: Vec::new(),
    }
}

/// Press on a node body.
///
/// Additive toggles the node. A plain press on an already selected node
/// keeps the selection so the whole set can be dragged.
pub fn click_node(current: &Selection, id: NodeId, additive: bool) -> Selection {
    if additive {
        let mut next = current.clone();
        match next.nodes.iter().position(|n| *n == id) {
            Some(i) => {
                next.nodes.remove(i);
            }
            None => next.nodes.push(id),
        }
        return next;
    }
    if current.contains_node(id) {
        return current.clone();
    }
    Selection {
        nodes: vec![id],
        edges: Vec::new(),
    }
}

pub fn click_edge(current: &Selection, id: EdgeId, additive: bool) -> Selection {
    if additive {
        let mut next = current.clone();
        match next.edges.iter().position(|e| *e == id) {
            Some(i) => {
                next.edges.remove(i);
            }
            None => next.edges.push(id),
        }
        return next;
    }
    Selection {
        nodes: Vec::new(),
        edges: vec![id],
    }
}

/// Nodes whose rectangle intersects `world_rect`, replacing or extending
/// `base`.
pub fn box_select(
    frame: &FrameCache,
    world_rect: Bounds,
    base: &Selection,
    additive: bool,
) -> Selection {
    let hits = hit_test_rect(frame, world_rect);
    if !additive {
        return Selection {
            nodes: hits,
            edges: Vec::new(),
        };
    }
    let mut next = base.clone();
    for id in hits {
        if !next.nodes.contains(&id) {
            next.nodes.push(id);
        }
    }
    next
}

/// Nodes that move when `pressed` is dragged.
///
/// A pressed node inside the selection drags the whole selection; a group
/// drags its recorded members. Nodes whose `parentNode` is already moving
/// are left out because their layout follows the parent.
pub fn co_moving(graph: &GraphSnapshot, pressed: NodeId, selection: &Selection) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = if selection.contains_node(pressed) {
        selection.nodes.clone()
    } else {
        vec![pressed]
    };

    let groups: Vec<NodeId> = ids
        .iter()
        .filter_map(|id| graph.node(*id))
        .filter(|n| n.kind() == NodeKind::Group)
        .map(|n| n.id)
        .collect();
    for group in groups {
        if let Some(node) = graph.node(group) {
            for member in &node.data.members {
                if !ids.contains(member) {
                    ids.push(*member);
                }
            }
        }
    }

    let moving = ids.clone();
    ids.retain(|id| {
        graph
            .node(*id)
            .is_some_and(|n| n.parent_node.is_none_or(|p| !moving.contains(&p)))
    });
    ids
}
