//! Graph store seam.
//!
//! The host owns the graph; [`GraphStore`] is what the canvas needs from
//! it. [`GraphDocument`] is an in-memory reference store used by tests,
//! native hosts and the wasm bridge when JavaScript does not bring its own.

use crate::intents::GraphIntent;
use fc_core::{Edge, EdgeId, GraphSnapshot, Node, NodeCatalog, NodeId, StaticCatalog};
use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),
    #[error("unknown edge `{0}`")]
    UnknownEdge(EdgeId),
    #[error("node `{node}` has no {direction} port `{port}`")]
    UnknownPort {
        node: NodeId,
        port: String,
        direction: &'static str,
    },
    #[error("cannot connect `{0}` to itself")]
    SelfLoop(NodeId),
    #[error("connecting `{from}` to `{to}` would create a cycle")]
    WouldCycle { from: NodeId, to: NodeId },
    #[error("{0}")]
    Rejected(String),
}

pub trait GraphStore {
    fn snapshot(&self) -> &GraphSnapshot;
    fn apply(&mut self, intent: &GraphIntent) -> Result<(), StoreError>;
}

/// Outcome of a batch commit.
#[derive(Debug, Default)]
pub struct CommitReport {
    pub applied: usize,
    /// Index into the batch and the error it produced.
    pub failures: Vec<(usize, StoreError)>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply intents in order. A failing intent is logged and skipped; the
/// rest of the batch still applies.
pub fn commit_intents(store: &mut dyn GraphStore, intents: &[GraphIntent]) -> CommitReport {
    let mut report = CommitReport::default();
    for (i, intent) in intents.iter().enumerate() {
        match store.apply(intent) {
            Ok(()) => report.applied += 1,
            Err(err) => {
                log::warn!("intent {i} rejected: {err}");
                report.failures.push((i, err));
            }
        }
    }
    report
}

// ─── Reference store ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct GraphDocument {
    graph: GraphSnapshot,
    catalog: Option<StaticCatalog>,
}

impl GraphDocument {
    pub fn new(graph: GraphSnapshot) -> Self {
        Self {
            graph,
            catalog: None,
        }
    }

    /// Validate port keys on connect against `catalog`.
    pub fn with_catalog(mut self, catalog: StaticCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn replace(&mut self, graph: GraphSnapshot) {
        self.graph = graph;
    }

    pub fn set_catalog(&mut self, catalog: Option<StaticCatalog>) {
        self.catalog = catalog;
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, StoreError> {
        self.graph
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::UnknownNode(id))
    }

    fn require_node(&self, id: NodeId) -> Result<&Node, StoreError> {
        self.graph.node(id).ok_or(StoreError::UnknownNode(id))
    }

    fn check_port(&self, node: &Node, port: &str, output: bool) -> Result<(), StoreError> {
        let Some(catalog) = &self.catalog else {
            return Ok(());
        };
        let ports = catalog.ports(node);
        let list = if output { &ports.outputs } else { &ports.inputs };
        if list.iter().any(|p| p.key == port) {
            Ok(())
        } else {
            Err(StoreError::UnknownPort {
                node: node.id,
                port: port.to_string(),
                direction: if output { "output" } else { "input" },
            })
        }
    }

    fn would_cycle(&self, source: NodeId, target: NodeId) -> bool {
        let mut g = DiGraphMap::<NodeId, ()>::new();
        for edge in &self.graph.edges {
            g.add_edge(edge.source, edge.target, ());
        }
        g.contains_node(target)
            && g.contains_node(source)
            && has_path_connecting(&g, target, source, None)
    }

    fn connect(
        &mut self,
        source: NodeId,
        source_handle: &str,
        target: NodeId,
        target_handle: &str,
    ) -> Result<(), StoreError> {
        if source == target {
            return Err(StoreError::SelfLoop(source));
        }
        let src = self.require_node(source)?;
        let tgt = self.require_node(target)?;
        self.check_port(src, source_handle, true)?;
        self.check_port(tgt, target_handle, false)?;
        // Edges without a handle land on the target's first input.
        let default_input = self
            .catalog
            .as_ref()
            .and_then(|c| c.ports(tgt).inputs.first().map(|p| p.key.clone()));

        // An input takes one wire; the new one replaces the old before the
        // cycle check so rewiring an input never reports a stale cycle.
        let (replaced, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.graph.edges)
                .into_iter()
                .partition(|e| {
                    e.target == target
                        && e.target_handle.as_deref().or(default_input.as_deref()) == Some(target_handle)
                });
        self.graph.edges = kept;

        if self.would_cycle(source, target) {
            self.graph.edges.extend(replaced);
            return Err(StoreError::WouldCycle {
                from: source,
                to: target,
            });
        }

        let id = EdgeId::with_prefix("e");
        log::debug!("connect {source}.{source_handle} -> {target}.{target_handle} as {id}");
        self.graph.edges.push(Edge {
            id,
            source,
            target,
            source_handle: Some(source_handle.to_string()),
            target_handle: Some(target_handle.to_string()),
            selected: false,
        });
        Ok(())
    }

    fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<(), StoreError> {
        for id in ids {
            self.require_node(*id)?;
        }
        let removed: Vec<Node> = self
            .graph
            .nodes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .cloned()
            .collect();
        self.graph.nodes.retain(|n| !ids.contains(&n.id));
        self.graph
            .edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));

        // Orphaned children keep their on-screen place.
        for parent in &removed {
            for node in self.graph.nodes.iter_mut() {
                if node.parent_node == Some(parent.id) {
                    node.parent_node = None;
                    node.position = node.position.offset(parent.position.x, parent.position.y);
                }
                node.data.members.retain(|m| *m != parent.id);
            }
        }
        Ok(())
    }
}

impl GraphStore for GraphDocument {
    fn snapshot(&self) -> &GraphSnapshot {
        &self.graph
    }

    fn apply(&mut self, intent: &GraphIntent) -> Result<(), StoreError> {
        match intent {
            GraphIntent::MoveNode { id, position } => {
                self.node_mut(*id)?.position = *position;
            }
            GraphIntent::ResizeNode { id, size } => {
                let node = self.node_mut(*id)?;
                if !node.kind().is_resizable() {
                    return Err(StoreError::Rejected(format!(
                        "`{id}` ({}) is not resizable",
                        node.node_type
                    )));
                }
                node.data.size = Some(*size);
            }
            GraphIntent::SetSelection { nodes, edges } => {
                for id in nodes {
                    self.require_node(*id)?;
                }
                for id in edges {
                    if self.graph.edge(*id).is_none() {
                        return Err(StoreError::UnknownEdge(*id));
                    }
                }
                for node in self.graph.nodes.iter_mut() {
                    node.selected = nodes.contains(&node.id);
                }
                for edge in self.graph.edges.iter_mut() {
                    edge.selected = edges.contains(&edge.id);
                }
            }
            GraphIntent::SetHidden { id, hidden } => {
                self.node_mut(*id)?.hidden = *hidden;
            }
            GraphIntent::PatchParameters { id, patch } => {
                let params = &mut self.node_mut(*id)?.data.parameters;
                for (k, v) in patch {
                    params.insert(k.clone(), v.clone());
                }
            }
            GraphIntent::SetLabel { id, label } => {
                let label = label.trim();
                self.node_mut(*id)?.data.label = (!label.is_empty()).then(|| label.to_string());
            }
            GraphIntent::Connect {
                source,
                source_handle,
                target,
                target_handle,
            } => self.connect(*source, source_handle, *target, target_handle)?,
            GraphIntent::RemoveEdges { ids } => {
                if let Some(missing) = ids.iter().find(|id| self.graph.edge(**id).is_none()) {
                    return Err(StoreError::UnknownEdge(*missing));
                }
                self.graph.edges.retain(|e| !ids.contains(&e.id));
            }
            GraphIntent::RemoveNodes { ids } => self.remove_nodes(ids)?,
            GraphIntent::AddNode {
                id,
                node_type,
                position,
            } => {
                if self.graph.node(*id).is_some() {
                    return Err(StoreError::Rejected(format!("node `{id}` already exists")));
                }
                let mut node = Node::new(id.as_str(), node_type, position.x, position.y);
                node.selected = true;
                for other in self.graph.nodes.iter_mut() {
                    other.selected = false;
                }
                self.graph.nodes.push(node);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{NodeTypeDef, PortSpec, Position};
    use pretty_assertions::assert_eq;

    fn doc() -> GraphDocument {
        GraphDocument::new(GraphSnapshot {
            nodes: vec![
                Node::new("a", "add", 0.0, 0.0),
                Node::new("b", "add", 300.0, 0.0),
                Node::new("c", "add", 600.0, 0.0),
            ],
            edges: vec![
                Edge::new("ab", "a", "out", "b", "x"),
                Edge::new("bc", "b", "out", "c", "x"),
            ],
        })
    }

    fn connect(s: &str, t: &str, th: &str) -> GraphIntent {
        GraphIntent::Connect {
            source: NodeId::intern(s),
            source_handle: "out".into(),
            target: NodeId::intern(t),
            target_handle: th.into(),
        }
    }

    #[test]
    fn rejects_cycles_and_self_loops() {
        let mut d = doc();
        assert_eq!(
            d.apply(&connect("c", "a", "y")),
            Err(StoreError::WouldCycle {
                from: NodeId::intern("c"),
                to: NodeId::intern("a"),
            })
        );
        assert_eq!(
            d.apply(&connect("a", "a", "y")),
            Err(StoreError::SelfLoop(NodeId::intern("a")))
        );
        assert_eq!(d.snapshot().edges.len(), 2);
    }

    #[test]
    fn connect_replaces_wire_into_same_input() {
        let mut d = doc();
        d.apply(&connect("a", "c", "x")).unwrap();
        let into_cx: Vec<_> = d
            .snapshot()
            .edges
            .iter()
            .filter(|e| e.target == NodeId::intern("c") && e.target_handle.as_deref() == Some("x"))
            .collect();
        assert_eq!(into_cx.len(), 1);
        assert_eq!(into_cx[0].source, NodeId::intern("a"));
    }

    #[test]
    fn connect_replaces_wire_on_default_input() {
        let def = NodeTypeDef {
            inputs: vec![PortSpec::new("x", "number"), PortSpec::new("y", "number")],
            outputs: vec![PortSpec::new("out", "number")],
            ..NodeTypeDef::default()
        };
        let mut d = doc().with_catalog(StaticCatalog::new().with_type("add", def));
        // `bc` has no target handle, so it occupies c's first input.
        d.graph.edges[1].target_handle = None;

        d.apply(&connect("a", "c", "y")).unwrap();
        assert_eq!(d.snapshot().edges.len(), 3);

        d.apply(&connect("a", "c", "x")).unwrap();
        let into_c: Vec<_> = d
            .snapshot()
            .edges
            .iter()
            .filter(|e| e.target == NodeId::intern("c"))
            .map(|e| (e.source.as_str(), e.target_handle.as_deref()))
            .collect();
        assert_eq!(into_c, vec![("a", Some("y")), ("a", Some("x"))]);
        assert!(d.snapshot().edge(EdgeId::intern("bc")).is_none());
    }

    #[test]
    fn failed_rewire_restores_old_edge() {
        let mut d = doc();
        // b.x currently comes from a; c -> b would cycle through b -> c.
        assert!(d.apply(&connect("c", "b", "x")).is_err());
        assert!(d.snapshot().edge(EdgeId::intern("ab")).is_some());
    }

    #[test]
    fn validates_ports_against_catalog() {
        let def = NodeTypeDef {
            inputs: vec![PortSpec::new("x", "number")],
            outputs: vec![PortSpec::new("out", "number")],
            ..NodeTypeDef::default()
        };
        let mut d = doc().with_catalog(StaticCatalog::new().with_type("add", def));
        assert!(matches!(
            d.apply(&connect("a", "c", "nope")),
            Err(StoreError::UnknownPort { direction: "input", .. })
        ));
    }

    #[test]
    fn removing_nodes_drops_incident_edges() {
        let mut d = doc();
        d.apply(&GraphIntent::RemoveNodes {
            ids: vec![NodeId::intern("b")],
        })
        .unwrap();
        assert_eq!(d.snapshot().nodes.len(), 2);
        assert!(d.snapshot().edges.is_empty());
    }

    #[test]
    fn removing_parent_keeps_child_in_place() {
        let mut frame = Node::new("frame", "group", 100.0, 50.0);
        frame.data.members = vec![NodeId::intern("kid")];
        let mut kid = Node::new("kid", "add", 10.0, 10.0);
        kid.parent_node = Some(frame.id);
        let mut d = GraphDocument::new(GraphSnapshot {
            nodes: vec![frame, kid],
            edges: vec![],
        });
        d.apply(&GraphIntent::RemoveNodes {
            ids: vec![NodeId::intern("frame")],
        })
        .unwrap();
        let kid = d.snapshot().node(NodeId::intern("kid")).unwrap();
        assert_eq!(kid.parent_node, None);
        assert_eq!(kid.position, Position::new(110.0, 60.0));
    }

    #[test]
    fn commit_continues_past_failures() {
        let mut d = doc();
        let report = commit_intents(
            &mut d,
            &[
                GraphIntent::MoveNode {
                    id: NodeId::intern("ghost"),
                    position: Position::new(1.0, 1.0),
                },
                GraphIntent::MoveNode {
                    id: NodeId::intern("a"),
                    position: Position::new(5.0, 6.0),
                },
            ],
        );
        assert_eq!(report.applied, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 0);
        assert_eq!(
            d.snapshot().node(NodeId::intern("a")).unwrap().position,
            Position::new(5.0, 6.0)
        );
    }

    #[test]
    fn only_groups_and_text_resize() {
        let mut d = doc();
        let err = d.apply(&GraphIntent::ResizeNode {
            id: NodeId::intern("a"),
            size: fc_core::Size::new(10.0, 10.0),
        });
        assert!(matches!(err, Err(StoreError::Rejected(_))));
    }
}
