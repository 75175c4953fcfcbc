//! Overlay controllers: inline editors, slider settings, node search and
//! the context menu.
//!
//! The host draws these as DOM popovers. The controller only tracks which
//! one is open and turns a commit into intents.

use crate::intents::GraphIntent;
use fc_core::numeric::param_str;
use fc_core::slider::current_value;
use fc_core::{DisplayMeta, EdgeId, Node, NodeCatalog, NodeId, Position, SliderBounds, SnapMode};
use fc_render::HitTarget;
use kurbo::Point;
use serde::Serialize;
use serde_json::{Map, Value};

// ─── Context menu ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "item", content = "id", rename_all = "camelCase")]
pub enum MenuItem {
    AddNode,
    FrameAll,
    ToggleGridSnap,
    DeleteNode(NodeId),
    HideNode(NodeId),
    FrameNode(NodeId),
    DeleteEdge(EdgeId),
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddNode => "Add node…",
            Self::FrameAll => "Frame all",
            Self::ToggleGridSnap => "Toggle grid snap",
            Self::DeleteNode(_) | Self::DeleteEdge(_) => "Delete",
            Self::HideNode(_) => "Hide",
            Self::FrameNode(_) => "Frame",
        }
    }
}

/// Items offered for whatever was under the pointer.
pub fn menu_items(target: &HitTarget) -> Vec<MenuItem> {
    match target {
        HitTarget::None => vec![MenuItem::AddNode, MenuItem::FrameAll, MenuItem::ToggleGridSnap],
        HitTarget::Node(id) => node_items(*id),
        HitTarget::Port(key) => node_items(key.node),
        HitTarget::Edge(id) => vec![MenuItem::DeleteEdge(*id)],
    }
}

fn node_items(id: NodeId) -> Vec<MenuItem> {
    vec![
        MenuItem::DeleteNode(id),
        MenuItem::HideNode(id),
        MenuItem::FrameNode(id),
    ]
}

// ─── Slider settings ─────────────────────────────────────────────────────

/// Editable copy of a slider's bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderDraft {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub snap: SnapMode,
    pub precision: Option<u32>,
}

impl SliderDraft {
    pub fn from_node(node: &Node) -> Self {
        let b = SliderBounds::from_parameters(&node.data.parameters);
        Self {
            min: b.min,
            max: b.max,
            step: b.step,
            snap: b.snap,
            precision: b.precision_override,
        }
    }

    pub fn bounds(&self) -> SliderBounds {
        SliderBounds::new(self.min, self.max, self.step)
            .with_snap(self.snap)
            .with_precision(self.precision)
    }

    /// Parameter patch: sanitized bounds plus the current value re-resolved
    /// under them.
    pub fn patch(&self, node: &Node) -> Map<String, Value> {
        let b = self.bounds();
        let value = current_value(&node.data.parameters, &b);
        let mut patch = Map::new();
        patch.insert("min".into(), b.min.into());
        patch.insert("max".into(), b.max.into());
        patch.insert("step".into(), b.step.into());
        patch.insert(
            "snapMode".into(),
            match b.snap {
                SnapMode::Step => "step",
                SnapMode::Free => "free",
            }
            .into(),
        );
        patch.insert(
            "precision".into(),
            b.precision_override.map_or(Value::Null, Value::from),
        );
        patch.insert("value".into(), value.into());
        patch
    }
}

// ─── Node search ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub node_type: String,
    pub label: String,
    pub category: String,
}

/// Catalog entries matching `query` (case-insensitive, label, type or
/// category), label-sorted.
pub fn search_catalog(catalog: &dyn NodeCatalog, query: &str) -> Vec<SearchHit> {
    let q = query.trim().to_lowercase();
    let mut hits: Vec<SearchHit> = catalog
        .entries()
        .into_iter()
        .filter(|(ty, meta)| q.is_empty() || matches(ty, meta, &q))
        .map(|(node_type, meta)| SearchHit {
            label: if meta.label.is_empty() {
                node_type.clone()
            } else {
                meta.label
            },
            node_type,
            category: meta.category,
        })
        .collect();
    hits.sort_by(|a, b| a.label.cmp(&b.label).then(a.node_type.cmp(&b.node_type)));
    hits
}

fn matches(node_type: &str, meta: &DisplayMeta, q: &str) -> bool {
    node_type.to_lowercase().contains(q)
        || meta.label.to_lowercase().contains(q)
        || meta.category.to_lowercase().contains(q)
}

// ─── Overlay state ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Overlay {
    #[default]
    None,
    TextEditor {
        node: NodeId,
        text: String,
    },
    LabelEditor {
        node: NodeId,
        text: String,
    },
    SliderSettings {
        node: NodeId,
        draft: SliderDraft,
    },
    /// `at` is the world position the new node will be placed at.
    NodeSearch {
        at: Point,
        query: String,
    },
    /// `at` is screen space; `world` is where "Add node…" would place.
    ContextMenu {
        at: Point,
        world: Point,
        items: Vec<MenuItem>,
    },
}

impl Overlay {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn text_editor(node: &Node) -> Self {
        let text = param_str(&node.data.parameters, "text")
            .map(str::to_string)
            .or_else(|| node.data.label.clone())
            .unwrap_or_default();
        Self::TextEditor {
            node: node.id,
            text,
        }
    }

    pub fn label_editor(node: &Node) -> Self {
        Self::LabelEditor {
            node: node.id,
            text: node.display_label().to_string(),
        }
    }

    /// Replace the draft text of an open editor or the search query.
    pub fn set_text(&mut self, value: &str) -> bool {
        match self {
            Self::TextEditor { text, .. }
            | Self::LabelEditor { text, .. }
            | Self::NodeSearch { query: text, .. } => {
                *text = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Replace the slider settings draft; other overlays ignore it.
    pub fn set_draft(&mut self, value: SliderDraft) -> bool {
        match self {
            Self::SliderSettings { draft, .. } => {
                *draft = value;
                true
            }
            _ => false,
        }
    }

    /// Intents for committing an editor; popovers with their own choose
    /// step (search, menu) commit nothing here.
    pub fn commit_intents(&self, node: Option<&Node>) -> Vec<GraphIntent> {
        match self {
            Self::TextEditor { node: id, text } => {
                vec![GraphIntent::set_parameter(*id, "text", text.as_str())]
            }
            Self::LabelEditor { node: id, text } => vec![GraphIntent::SetLabel {
                id: *id,
                label: text.clone(),
            }],
            Self::SliderSettings { node: id, draft } => match node {
                Some(n) if n.id == *id => vec![GraphIntent::PatchParameters {
                    id: *id,
                    patch: draft.patch(n),
                }],
                _ => {
                    log::warn!("slider settings for missing node {id}");
                    Vec::new()
                }
            },
            Self::None | Self::NodeSearch { .. } | Self::ContextMenu { .. } => Vec::new(),
        }
    }

    /// Node an editor is bound to.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::TextEditor { node, .. }
            | Self::LabelEditor { node, .. }
            | Self::SliderSettings { node, .. } => Some(*node),
            _ => None,
        }
    }
}

/// `AddNode` intent for a search pick, centered under the cursor when the
/// node's width is known.
pub fn add_node_intent(node_type: &str, at: Point, width: f64) -> GraphIntent {
    GraphIntent::AddNode {
        id: NodeId::with_prefix(node_type),
        node_type: node_type.to_string(),
        position: Position::new(at.x - width / 2.0, at.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{NodeTypeDef, StaticCatalog};
    use serde_json::json;

    fn catalog() -> StaticCatalog {
        let def = |label: &str, category: &str| NodeTypeDef {
            display: DisplayMeta {
                label: label.into(),
                category: category.into(),
                ..DisplayMeta::default()
            },
            ..NodeTypeDef::default()
        };
        StaticCatalog::new()
            .with_type("add", def("Add", "Math"))
            .with_type("multiply", def("Multiply", "Math"))
            .with_type("panel", def("Panel", "Display"))
    }

    #[test]
    fn search_matches_label_type_and_category() {
        let c = catalog();
        let math: Vec<_> = search_catalog(&c, "math")
            .into_iter()
            .map(|h| h.node_type)
            .collect();
        assert_eq!(math, vec!["add", "multiply"]);
        assert_eq!(search_catalog(&c, "PAN")[0].label, "Panel");
        assert_eq!(search_catalog(&c, "").len(), 3);
        assert!(search_catalog(&c, "zzz").is_empty());
    }

    #[test]
    fn menu_depends_on_target() {
        assert_eq!(menu_items(&HitTarget::None).len(), 3);
        let edge = EdgeId::intern("e1");
        assert_eq!(menu_items(&HitTarget::Edge(edge)), vec![MenuItem::DeleteEdge(edge)]);
        let node = NodeId::intern("n1");
        assert_eq!(menu_items(&HitTarget::Node(node))[0], MenuItem::DeleteNode(node));
    }

    #[test]
    fn text_editor_commits_parameter_patch() {
        let mut node = Node::new("t", "text", 0.0, 0.0);
        node.data.parameters.insert("text".into(), json!("hello"));
        let mut overlay = Overlay::text_editor(&node);
        assert!(overlay.set_text("bye"));
        assert_eq!(
            overlay.commit_intents(Some(&node)),
            vec![GraphIntent::set_parameter(node.id, "text", "bye")]
        );
    }

    #[test]
    fn slider_settings_reresolve_value() {
        let mut node = Node::new("s", "slider", 0.0, 0.0);
        node.data.parameters.insert("value".into(), json!(7.3));
        node.data.parameters.insert("max".into(), json!(10.0));
        let draft = SliderDraft {
            min: 0.0,
            max: 5.0,
            step: 1.0,
            snap: SnapMode::Step,
            precision: None,
        };
        let patch = draft.patch(&node);
        assert_eq!(patch["value"], json!(5.0));
        assert_eq!(patch["snapMode"], json!("step"));
        assert_eq!(patch["precision"], Value::Null);
    }

    #[test]
    fn set_text_ignores_menus() {
        let mut overlay = Overlay::ContextMenu {
            at: Point::ZERO,
            world: Point::ZERO,
            items: vec![],
        };
        assert!(!overlay.set_text("x"));
    }

    #[test]
    fn draft_edits_only_reach_slider_settings() {
        let node = Node::new("s", "slider", 0.0, 0.0);
        let mut draft = SliderDraft::from_node(&node);
        draft.max = 42.0;
        let mut overlay = Overlay::SliderSettings {
            node: node.id,
            draft: SliderDraft::from_node(&node),
        };
        assert!(overlay.set_draft(draft));
        assert!(matches!(overlay, Overlay::SliderSettings { draft: d, .. } if d.max == 42.0));
        assert!(!Overlay::None.set_draft(draft));
    }
}
