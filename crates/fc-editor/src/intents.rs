//! Graph intents: the only way the canvas changes the host graph.
//!
//! The controller never mutates nodes or edges. Every gesture that would
//! change the graph produces `GraphIntent`s which the host store applies
//! (see [`crate::store`]). Intents serialize to tagged JSON so the wasm
//! bridge can hand them to JavaScript unchanged.

use fc_core::{EdgeId, NodeId, Position, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GraphIntent {
    /// Absolute world position for one node.
    #[serde(rename_all = "camelCase")]
    MoveNode { id: NodeId, position: Position },
    /// Explicit size for a group or text node.
    #[serde(rename_all = "camelCase")]
    ResizeNode { id: NodeId, size: Size },
    /// Replace the whole selection.
    #[serde(rename_all = "camelCase")]
    SetSelection {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
    #[serde(rename_all = "camelCase")]
    SetHidden { id: NodeId, hidden: bool },
    /// Shallow merge into `data.parameters`.
    #[serde(rename_all = "camelCase")]
    PatchParameters {
        id: NodeId,
        patch: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    SetLabel { id: NodeId, label: String },
    #[serde(rename_all = "camelCase")]
    Connect {
        source: NodeId,
        source_handle: String,
        target: NodeId,
        target_handle: String,
    },
    #[serde(rename_all = "camelCase")]
    RemoveEdges { ids: Vec<EdgeId> },
    /// Removing a node also removes every edge touching it.
    #[serde(rename_all = "camelCase")]
    RemoveNodes { ids: Vec<NodeId> },
    #[serde(rename_all = "camelCase")]
    AddNode {
        id: NodeId,
        node_type: String,
        position: Position,
    },
}

impl GraphIntent {
    /// Single-key parameter patch.
    pub fn set_parameter(id: NodeId, key: &str, value: impl Into<Value>) -> Self {
        let mut patch = Map::new();
        patch.insert(key.to_string(), value.into());
        Self::PatchParameters { id, patch }
    }

    pub fn clear_selection() -> Self {
        Self::SetSelection {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Whether applying this intent can change what the canvas draws
    /// without changing the graph's structure.
    pub fn is_selection(&self) -> bool {
        matches!(self, Self::SetSelection { .. })
    }
}

/// Serialize a batch for the JavaScript host.
pub fn intents_to_json(intents: &[GraphIntent]) -> String {
    serde_json::to_string(intents).unwrap_or_else(|e| {
        log::error!("failed to serialize intents: {e}");
        "[]".to_string()
    })
}
