//! Graph data model as the canvas sees it.
//!
//! Nodes and edges are owned by the host store. The canvas reads them every
//! frame and never mutates them directly; changes travel back to the store
//! as intents (see `fc-editor`). Positions are world-space and `f64` so they
//! round-trip JavaScript numbers losslessly.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Geometry primitives ─────────────────────────────────────────────────

/// A world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, world space unless noted otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// AABB overlap test (touching edges count as overlap).
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow on every side by `pad` (negative shrinks).
    pub fn inflate(&self, pad: f64) -> Self {
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    pub fn union(&self, other: &Bounds) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Zero-area or non-finite rectangles cannot be framed or hit.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// Layout family of a node, derived from its type string.
///
/// Every type the catalog knows that is not one of the special kinds lays
/// out as `Standard`: fixed width, header, port rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Standard,
    Group,
    Text,
    TextNote,
    Panel,
    Slider,
}

impl NodeKind {
    pub fn from_type(node_type: &str) -> Self {
        match node_type {
            "group" => Self::Group,
            "text" => Self::Text,
            "textNote" => Self::TextNote,
            "panel" => Self::Panel,
            "slider" => Self::Slider,
            _ => Self::Standard,
        }
    }

    /// Kinds whose body is a bounded list of inspected lines.
    pub fn shows_lines(self) -> bool {
        matches!(self, Self::TextNote | Self::Panel)
    }

    /// Kinds with a bottom-right resize handle.
    pub fn is_resizable(self) -> bool {
        matches!(self, Self::Group | Self::Text)
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Host-owned payload of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeData {
    pub label: Option<String>,
    pub parameters: Map<String, Value>,
    pub outputs: Map<String, Value>,
    pub evaluation_error: Option<String>,
    /// Explicit size for groups (`groupSize`) and manually sized text nodes.
    #[serde(alias = "groupSize")]
    pub size: Option<Size>,
    /// Member ids recorded on a group; they move with it.
    pub members: Vec<NodeId>,
}

/// A node as read from the host store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub parent_node: Option<NodeId>,
}

impl Node {
    pub fn new(id: &str, node_type: &str, x: f64, y: f64) -> Self {
        Self {
            id: NodeId::intern(id),
            node_type: node_type.to_string(),
            position: Position::new(x, y),
            data: NodeData::default(),
            selected: false,
            hidden: false,
            parent_node: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_type(&self.node_type)
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.data.parameters.get(key)
    }

    /// Display label: explicit label, falling back to the type name.
    pub fn display_label(&self) -> &str {
        self.data.label.as_deref().unwrap_or(&self.node_type)
    }
}

// ─── Ports ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A port declared by a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    pub key: String,
    #[serde(default)]
    pub label: String,
    /// Value type; drives the socket color.
    #[serde(rename = "type", default = "any_type")]
    pub port_type: String,
    #[serde(default)]
    pub required: bool,
    /// A required input may be satisfied by this parameter instead of a wire.
    #[serde(default)]
    pub parameter_key: Option<String>,
}

fn any_type() -> String {
    "any".to_string()
}

impl PortSpec {
    pub fn new(key: &str, port_type: &str) -> Self {
        Self {
            key: key.to_string(),
            label: key.to_string(),
            port_type: port_type.to_string(),
            required: false,
            parameter_key: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A wire from an output port to an input port.
///
/// Missing handles resolve to the endpoint layout's default port key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    pub fn new(id: &str, source: &str, source_handle: &str, target: &str, target_handle: &str) -> Self {
        Self {
            id: EdgeId::intern(id),
            source: NodeId::intern(source),
            target: NodeId::intern(target),
            source_handle: Some(source_handle.to_string()),
            target_handle: Some(target_handle.to_string()),
            selected: false,
        }
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// One read of the host store: everything a frame needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid graph: {e}"))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_deserializes_from_host_shape() {
        let json = r#"{
            "id": "n1",
            "type": "group",
            "position": { "x": 10, "y": 20 },
            "data": { "label": "Box", "groupSize": { "width": 300, "height": 200 }, "members": ["n2"] },
            "selected": true
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind(), NodeKind::Group);
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(node.data.size, Some(Size::new(300.0, 200.0)));
        assert_eq!(node.data.members, vec![NodeId::intern("n2")]);
        assert!(node.selected);
        assert!(!node.hidden);
    }

    #[test]
    fn bounds_from_corners_normalizes() {
        let b = Bounds::from_corners(50.0, 40.0, 10.0, 0.0);
        assert_eq!(b, Bounds::new(10.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn bounds_intersection_and_union() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 10.0, 10.0);
        let c = Bounds::new(20.0, 20.0, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c), Bounds::new(0.0, 0.0, 21.0, 21.0));
    }

    #[test]
    fn degenerate_bounds() {
        assert!(Bounds::new(0.0, 0.0, 0.0, 5.0).is_degenerate());
        assert!(Bounds::new(0.0, 0.0, f64::NAN, 5.0).is_degenerate());
        assert!(!Bounds::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }
}
