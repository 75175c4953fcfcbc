//! Node type catalog.
//!
//! Resolves a node's type into its declared ports and display metadata. The
//! host owns the real catalog; `StaticCatalog` is the serde-loadable version
//! the bridge and tests use.

use crate::model::{Node, PortSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ports of one node, resolved against its current data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePorts {
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayMeta {
    pub label: String,
    pub category: String,
    /// Accent color for the header strip, any `Color::parse` notation.
    pub color: Option<String>,
    pub icon: Option<String>,
}

pub trait NodeCatalog {
    fn ports(&self, node: &Node) -> NodePorts;
    /// Output used when an edge omits `sourceHandle`.
    fn default_output_key(&self, node_type: &str) -> Option<String>;
    fn display(&self, node_type: &str) -> DisplayMeta;
    /// All addable types, for the node search popover.
    fn entries(&self) -> Vec<(String, DisplayMeta)>;
}

/// One catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeTypeDef {
    #[serde(flatten)]
    pub display: DisplayMeta,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
    pub default_output_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    pub types: HashMap<String, NodeTypeDef>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, node_type: &str, def: NodeTypeDef) -> Self {
        self.types.insert(node_type.to_string(), def);
        self
    }

    /// Parse a `{ "types": { ... } }` document.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid catalog: {e}"))
    }
}

impl NodeCatalog for StaticCatalog {
    fn ports(&self, node: &Node) -> NodePorts {
        match self.types.get(&node.node_type) {
            Some(def) => NodePorts {
                inputs: dedup_keys(&def.inputs, &node.node_type),
                outputs: dedup_keys(&def.outputs, &node.node_type),
            },
            None => NodePorts::default(),
        }
    }

    fn default_output_key(&self, node_type: &str) -> Option<String> {
        let def = self.types.get(node_type)?;
        def.default_output_key
            .clone()
            .or_else(|| def.outputs.first().map(|p| p.key.clone()))
    }

    fn display(&self, node_type: &str) -> DisplayMeta {
        match self.types.get(node_type) {
            Some(def) => {
                let mut meta = def.display.clone();
                if meta.label.is_empty() {
                    meta.label = node_type.to_string();
                }
                meta
            }
            None => DisplayMeta {
                label: node_type.to_string(),
                ..DisplayMeta::default()
            },
        }
    }

    fn entries(&self) -> Vec<(String, DisplayMeta)> {
        let mut out: Vec<_> = self
            .types
            .keys()
            .map(|t| (t.clone(), self.display(t)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// Keep the first port for each key; a duplicate would make edge
/// resolution ambiguous.
fn dedup_keys(ports: &[PortSpec], node_type: &str) -> Vec<PortSpec> {
    let mut out: Vec<PortSpec> = Vec::with_capacity(ports.len());
    for port in ports {
        if out.iter().any(|p| p.key == port.key) {
            log::warn!("duplicate port key {:?} on type {node_type}", port.key);
            continue;
        }
        out.push(port.clone());
    }
    out
}
