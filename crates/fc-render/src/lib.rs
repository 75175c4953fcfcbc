pub mod cache;
pub mod edges;
pub mod frame;
pub mod hit;
pub mod paint;
pub mod pipeline;
pub mod surface;
pub mod theme;

pub use edges::{EdgeRoute, PortKey};
pub use frame::FrameCache;
pub use hit::{HitOptions, HitTarget, hit_test, hit_test_rect};
pub use pipeline::{FrameScene, RenderPipeline, RenderStats, Tooltip, UiSnapshot};
pub use surface::{DisplayList, PortOverlay, PortSprite, PortState, Surface};
pub use theme::Theme;
