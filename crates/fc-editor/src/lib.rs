pub mod controller;
pub mod gesture;
pub mod input;
pub mod intents;
pub mod overlays;
pub mod scheduler;
pub mod selection;
pub mod shortcuts;
pub mod store;

pub use controller::{CanvasController, FrameContext};
pub use gesture::DragState;
pub use input::{InputEvent, Modifiers, PointerButton};
pub use intents::{GraphIntent, intents_to_json};
pub use overlays::{MenuItem, Overlay, SearchHit, SliderDraft};
pub use scheduler::{FrameRequester, RenderLoop};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{CommitReport, GraphDocument, GraphStore, StoreError, commit_intents};
