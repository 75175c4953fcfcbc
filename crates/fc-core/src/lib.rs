pub mod catalog;
pub mod color;
pub mod config;
pub mod geometry;
pub mod id;
pub mod inspect;
pub mod layout;
pub mod model;
pub mod numeric;
pub mod slider;
pub mod text;
pub mod view;

pub use catalog::{DisplayMeta, NodeCatalog, NodePorts, NodeTypeDef, StaticCatalog};
pub use color::Color;
pub use config::{CanvasConfig, InteractionConfig, LayoutMetrics, ZoomProfile};
pub use id::{EdgeId, NodeId};
pub use inspect::{InspectOptions, JsonInspector, ValueInspector};
pub use layout::{
    LayoutContent, LayoutContext, NodeLayout, PortLayout, ScrollOffsets, SliderLayout,
    compute_layout, compute_layouts,
};
pub use model::*;
pub use slider::{SliderBounds, SnapMode, resolve_slider_value};
pub use text::{ApproxMeasure, TextMeasure};
pub use view::ViewTransform;

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Point, Vec2};
