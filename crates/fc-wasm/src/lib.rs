//! WASM bridge for FC: exposes the canvas engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host owns two stacked
//! `<canvas>` elements: a 2D one for the retained layer and an optional
//! WebGL one for the port overlay. Input handlers return the emitted graph
//! intents as JSON so the host can forward them to its own store.

mod render2d;
mod webgl;

use fc_core::text::TextMeasure;
use fc_core::{
    ApproxMeasure, CanvasConfig, GraphSnapshot, JsonInspector, LayoutContext, NodeId,
    PortDirection, SnapMode, StaticCatalog,
};
use fc_editor::scheduler::FrameRequester;
use fc_editor::{
    CanvasController, DragState, FrameContext, GraphDocument, GraphIntent, GraphStore,
    InputEvent, Modifiers, Overlay, PointerButton, RenderLoop, SliderDraft, intents_to_json,
};
use fc_render::surface::PortOverlay;
use fc_render::{FrameCache, FrameScene, HitTarget, RenderPipeline, RenderStats, Theme};
use render2d::{CanvasMeasure, CanvasSurface};
use serde::Deserialize;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, WebGlRenderingContext};
use webgl::WebGlPortOverlay;

/// The WASM-facing canvas.
///
/// Keeps a mirror of the host graph in a [`GraphDocument`]. With
/// auto-commit on (the default) every emitted intent is applied to the
/// mirror before it is returned; hosts with their own store turn it off
/// and push fresh snapshots through `set_graph_json`.
#[wasm_bindgen]
pub struct NodeCanvas {
    doc: GraphDocument,
    catalog: StaticCatalog,
    controller: CanvasController,
    pipeline: RenderPipeline,
    frame: FrameCache,
    ctx: Option<CanvasRenderingContext2d>,
    overlay: Option<WebGlPortOverlay>,
    render_loop: Option<RenderLoop<AnimationFrames>>,
    /// Bumped on every graph change; part of the render-loop key.
    revision: u64,
    frame_dirty: bool,
    /// Frame-cache rebuilds so far.
    frames_built: u64,
    auto_commit: bool,
    dark_mode: bool,
    stats: RenderStats,
}

#[wasm_bindgen]
impl NodeCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();

        let config = CanvasConfig::default();
        let mut controller = CanvasController::new(config.clone());
        controller.set_viewport(width, height);
        Self {
            doc: GraphDocument::default(),
            catalog: StaticCatalog::new(),
            controller,
            pipeline: RenderPipeline::new(Theme::light(), config),
            frame: FrameCache::default(),
            ctx: None,
            overlay: None,
            render_loop: None,
            revision: 0,
            frame_dirty: true,
            frames_built: 0,
            auto_commit: true,
            dark_mode: false,
            stats: RenderStats::default(),
        }
    }

    // ─── Contexts ────────────────────────────────────────────────────────

    /// Attach the 2D context used for drawing and text measurement.
    pub fn attach_canvas(&mut self, ctx: CanvasRenderingContext2d) {
        self.ctx = Some(ctx);
        self.frame_dirty = true;
    }

    /// Attach the overlay context. Returns `false` (and keeps Canvas2D
    /// ports) when shaders fail to build.
    pub fn attach_webgl(&mut self, gl: WebGlRenderingContext) -> bool {
        self.overlay = WebGlPortOverlay::new(gl);
        self.overlay.is_some()
    }

    pub fn detach_webgl(&mut self) {
        self.overlay = None;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.controller.set_viewport(width, height);
        self.sync_loop();
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
        let theme = if is_dark { Theme::dark() } else { Theme::light() };
        self.pipeline.set_theme(theme);
        self.revision = self.revision.wrapping_add(1);
        self.sync_loop();
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Replace the graph. Returns `false` on invalid JSON.
    pub fn set_graph_json(&mut self, json: &str) -> bool {
        match GraphSnapshot::from_json(json) {
            Ok(graph) => {
                self.doc.replace(graph);
                self.graph_changed();
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn get_graph_json(&self) -> String {
        serde_json::to_string(self.doc.snapshot()).unwrap_or_else(|e| {
            log::error!("graph serialization failed: {e}");
            "{}".to_string()
        })
    }

    pub fn set_catalog_json(&mut self, json: &str) -> bool {
        match StaticCatalog::from_json(json) {
            Ok(catalog) => {
                self.doc.set_catalog(Some(catalog.clone()));
                self.catalog = catalog;
                self.graph_changed();
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Partial config; absent fields keep their defaults.
    pub fn set_config_json(&mut self, json: &str) -> bool {
        match CanvasConfig::from_json(json) {
            Ok(config) => {
                self.pipeline.config = config.clone();
                self.controller.set_config(config);
                self.graph_changed();
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn set_auto_commit(&mut self, enabled: bool) {
        self.auto_commit = enabled;
    }

    /// Apply a JSON array of intents to the mirror. Returns how many
    /// applied, or -1 on invalid JSON.
    pub fn apply_intents_json(&mut self, json: &str) -> i32 {
        let intents: Vec<GraphIntent> = match serde_json::from_str(json) {
            Ok(intents) => intents,
            Err(e) => {
                log::warn!("invalid intents: {e}");
                return -1;
            }
        };
        let applied = self.controller.commit(&mut self.doc, &intents);
        if applied > 0 {
            self.graph_changed();
        }
        applied as i32
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// `button` is `PointerEvent.button`. Returns the intents as JSON.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        time_ms: f64,
    ) -> String {
        let Some(button) = PointerButton::from_dom(button) else {
            return "[]".to_string();
        };
        self.dispatch(InputEvent::PointerDown {
            x,
            y,
            button,
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
            time_ms,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        time_ms: f64,
    ) -> String {
        self.dispatch(InputEvent::PointerMove {
            x,
            y,
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
            time_ms,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        time_ms: f64,
    ) -> String {
        let Some(button) = PointerButton::from_dom(button) else {
            return "[]".to_string();
        };
        self.dispatch(InputEvent::PointerUp {
            x,
            y,
            button,
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
            time_ms,
        })
    }

    pub fn handle_pointer_cancel(&mut self) -> String {
        self.dispatch(InputEvent::PointerCancel)
    }

    /// `dx`/`dy` are `WheelEvent` deltas in pixels.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_wheel(
        &mut self,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.dispatch(InputEvent::Wheel {
            x,
            y,
            dx,
            dy,
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
        })
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        self.dispatch(InputEvent::KeyDown {
            key: key.to_string(),
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
        })
    }

    pub fn handle_key_up(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        self.dispatch(InputEvent::KeyUp {
            key: key.to_string(),
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
        })
    }

    /// Advance the right-button hold timer. Returns whether the context
    /// menu opened.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let opened = self.controller.tick(now_ms);
        if opened {
            self.sync_loop();
        }
        opened
    }

    /// Fit every node, or the current selection when `selection` is set.
    pub fn frame_all(&mut self, selection: bool) -> bool {
        self.refresh_frame();
        let selected: Vec<NodeId> = self
            .doc
            .snapshot()
            .nodes
            .iter()
            .filter(|n| n.selected && !n.hidden)
            .map(|n| n.id)
            .collect();
        let ids = selection.then_some(selected.as_slice());
        let changed = self.controller.frame_nodes(&self.frame, ids);
        self.sync_loop();
        changed
    }

    /// `{"x":..,"y":..,"scale":..}`
    pub fn get_view_json(&self) -> String {
        let view = &self.controller.view;
        json!({ "x": view.x, "y": view.y, "scale": view.scale }).to_string()
    }

    /// CSS cursor for the current hover and drag.
    pub fn get_cursor(&self) -> String {
        cursor_for(self.controller.drag(), self.controller.hover()).to_string()
    }

    pub fn is_grid_snap(&self) -> bool {
        self.controller.grid_snap
    }

    // ─── Overlays ────────────────────────────────────────────────────────

    /// Open popover state as JSON, `{"kind":"none"}` when closed.
    pub fn get_overlay_json(&self) -> String {
        overlay_json(self.controller.overlay()).to_string()
    }

    pub fn set_overlay_text(&mut self, text: &str) -> bool {
        let changed = self.controller.set_overlay_text(text);
        self.sync_loop();
        changed
    }

    /// Update the slider settings draft from
    /// `{"min":..,"max":..,"step":..,"snap":"step"|"free","precision":..}`.
    pub fn set_slider_draft_json(&mut self, json: &str) -> bool {
        let input: DraftInput = match serde_json::from_str(json) {
            Ok(input) => input,
            Err(e) => {
                log::warn!("invalid slider draft: {e}");
                return false;
            }
        };
        self.controller.set_slider_draft(input.into_draft())
    }

    pub fn commit_overlay(&mut self) -> String {
        self.refresh_frame();
        let ctx = FrameContext {
            graph: self.doc.snapshot(),
            frame: &self.frame,
            catalog: &self.catalog,
        };
        let intents = self.controller.commit_overlay(&ctx);
        self.finish(intents)
    }

    pub fn close_overlay(&mut self) {
        self.controller.close_overlay();
        self.sync_loop();
    }

    pub fn choose_menu_item(&mut self, index: usize) -> String {
        self.refresh_frame();
        let ctx = FrameContext {
            graph: self.doc.snapshot(),
            frame: &self.frame,
            catalog: &self.catalog,
        };
        let intents = self.controller.choose_menu_item(index, &ctx);
        self.finish(intents)
    }

    /// Catalog matches for the node search query.
    pub fn get_search_results_json(&self) -> String {
        let ctx = FrameContext {
            graph: self.doc.snapshot(),
            frame: &self.frame,
            catalog: &self.catalog,
        };
        let hits = self.controller.search_results(&ctx);
        serde_json::to_string(&hits).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn choose_search_result(&mut self, node_type: &str) -> String {
        let intents = self.controller.choose_search_result(node_type);
        self.finish(intents)
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Draw one frame. Returns `false` when no 2D context is attached.
    ///
    /// The frame cache is rebuilt on every call, so host-side changes that
    /// never passed through an intent still show up.
    pub fn render(&mut self) -> bool {
        self.rebuild_frame();
        let Some(ctx2d) = self.ctx.as_ref() else {
            log::warn!("render without a 2D context");
            return false;
        };
        let (width, height) = self.controller.viewport();
        let measure = CanvasMeasure::new(ctx2d);
        let fctx = FrameContext {
            graph: self.doc.snapshot(),
            frame: &self.frame,
            catalog: &self.catalog,
        };
        let ui = self.controller.ui_snapshot(&fctx);
        let scene = FrameScene {
            graph: self.doc.snapshot(),
            frame: &self.frame,
            view: &self.controller.view,
            ui: &ui,
            catalog: &self.catalog,
            measure: &measure,
        };
        let mut surface = CanvasSurface::new(ctx2d, width, height);
        let overlay = self.overlay.as_mut().map(|o| o as &mut dyn PortOverlay);
        self.stats = self.pipeline.render(&scene, &mut surface, overlay);
        surface.finish();
        true
    }

    /// Counts from the last frame.
    pub fn get_stats_json(&self) -> String {
        let s = self.stats;
        json!({
            "nodes": s.nodes,
            "culled": s.culled,
            "edges": s.edges,
            "ports": s.ports,
            "overlay": s.overlay,
        })
        .to_string()
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    /// Drive redraws through `requestAnimationFrame(callback)`. The
    /// callback should call `on_animation_frame` and `render` when it
    /// returns `true`.
    pub fn start_loop(&mut self, callback: js_sys::Function) {
        if let Some(running) = self.render_loop.as_mut() {
            running.stop();
        }
        self.render_loop = Some(RenderLoop::new(AnimationFrames { callback }));
        self.sync_loop();
    }

    pub fn on_animation_frame(&mut self) -> bool {
        self.render_loop
            .as_mut()
            .is_some_and(|running| running.on_frame())
    }

    pub fn stop_loop(&mut self) {
        if let Some(mut running) = self.render_loop.take() {
            running.stop();
        }
    }
}

// ─── Internals ───────────────────────────────────────────────────────────

impl NodeCanvas {
    fn dispatch(&mut self, event: InputEvent) -> String {
        self.refresh_frame();
        let ctx = FrameContext {
            graph: self.doc.snapshot(),
            frame: &self.frame,
            catalog: &self.catalog,
        };
        let intents = self.controller.handle(&event, &ctx);
        // Wheel and keys may scroll panels, which changes layout.
        if matches!(event, InputEvent::Wheel { .. } | InputEvent::KeyDown { .. }) {
            self.frame_dirty = true;
        }
        self.finish(intents)
    }

    fn finish(&mut self, intents: Vec<GraphIntent>) -> String {
        if self.auto_commit && !intents.is_empty() {
            let applied = self.controller.commit(&mut self.doc, &intents);
            if applied > 0 {
                self.graph_changed();
            }
        }
        self.sync_loop();
        intents_to_json(&intents)
    }

    fn graph_changed(&mut self) {
        self.controller.sync_graph(self.doc.snapshot());
        self.revision = self.revision.wrapping_add(1);
        self.frame_dirty = true;
        self.sync_loop();
    }

    /// Rebuild only when something known to affect layout changed.
    fn refresh_frame(&mut self) {
        if self.frame_dirty {
            self.rebuild_frame();
        }
    }

    fn rebuild_frame(&mut self) {
        let metrics = self.controller.config.layout.clone();
        let approx = ApproxMeasure::default();
        let canvas = self.ctx.as_ref().map(CanvasMeasure::new);
        let measure: &dyn TextMeasure = match &canvas {
            Some(m) => m,
            None => &approx,
        };
        let ctx = LayoutContext {
            catalog: &self.catalog,
            measure,
            inspector: &JsonInspector,
            metrics: &metrics,
            scroll: Some(&self.controller.scroll),
        };
        self.frame = FrameCache::build(self.doc.snapshot(), &ctx);
        self.frame_dirty = false;
        self.frames_built += 1;
        log::trace!("frame cache rebuilt (revision {})", self.revision);
    }

    fn sync_loop(&mut self) {
        let key = self.controller.loop_key(self.revision);
        if let Some(running) = self.render_loop.as_mut() {
            running.sync(key);
        }
    }
}

// ─── Animation frames ────────────────────────────────────────────────────

/// `requestAnimationFrame` requester bound to a host callback.
struct AnimationFrames {
    callback: js_sys::Function,
}

impl FrameRequester for AnimationFrames {
    fn request(&mut self) -> i32 {
        let handle = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|w| w.request_animation_frame(&self.callback));
        match handle {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {e:?}");
                -1
            }
        }
    }

    fn cancel(&mut self, handle: i32) {
        if handle < 0 {
            return;
        }
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftInput {
    min: f64,
    max: f64,
    step: f64,
    #[serde(default)]
    snap: Option<String>,
    #[serde(default)]
    precision: Option<u32>,
}

impl DraftInput {
    fn into_draft(self) -> SliderDraft {
        let snap = match self.snap.as_deref() {
            Some("free") => SnapMode::Free,
            _ => SnapMode::Step,
        };
        SliderDraft {
            min: self.min,
            max: self.max,
            step: self.step,
            snap,
            precision: self.precision,
        }
    }
}

fn overlay_json(overlay: &Overlay) -> Value {
    match overlay {
        Overlay::None => json!({ "kind": "none" }),
        Overlay::TextEditor { node, text } => {
            json!({ "kind": "textEditor", "node": node.as_str(), "text": text })
        }
        Overlay::LabelEditor { node, text } => {
            json!({ "kind": "labelEditor", "node": node.as_str(), "text": text })
        }
        Overlay::SliderSettings { node, draft } => json!({
            "kind": "sliderSettings",
            "node": node.as_str(),
            "min": draft.min,
            "max": draft.max,
            "step": draft.step,
            "snap": match draft.snap {
                SnapMode::Step => "step",
                SnapMode::Free => "free",
            },
            "precision": draft.precision,
        }),
        Overlay::NodeSearch { at, query } => json!({
            "kind": "nodeSearch",
            "x": at.x,
            "y": at.y,
            "query": query,
        }),
        Overlay::ContextMenu { at, items, .. } => {
            let items: Vec<Value> = items
                .iter()
                .map(|item| {
                    let mut entry = serde_json::to_value(item).unwrap_or(Value::Null);
                    if let Value::Object(map) = &mut entry {
                        map.insert("label".into(), item.label().into());
                    }
                    entry
                })
                .collect();
            json!({ "kind": "contextMenu", "x": at.x, "y": at.y, "items": items })
        }
    }
}

fn cursor_for(drag: &DragState, hover: &HitTarget) -> &'static str {
    match drag {
        DragState::Pan { .. } | DragState::Node { .. } => "grabbing",
        DragState::Resize { .. } | DragState::ResizeText { .. } => "nwse-resize",
        DragState::Edge { .. } => "crosshair",
        DragState::Slider { .. } => "ew-resize",
        DragState::Box { .. } => "default",
        DragState::None => match hover {
            HitTarget::Port(key) if key.direction == PortDirection::Output => "crosshair",
            HitTarget::Port(_) | HitTarget::Node(_) | HitTarget::Edge(_) => "pointer",
            HitTarget::None => "default",
        },
    }
}

fn error_json(message: &str) -> String {
    let escaped = message.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{{"ok":false,"error":"{escaped}"}}"#)
}

// ─── Logging ─────────────────────────────────────────────────────────────

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        #[cfg(target_arch = "wasm32")]
        {
            let msg = JsValue::from_str(&msg);
            match record.level() {
                log::Level::Error => web_sys::console::error_1(&msg),
                log::Level::Warn => web_sys::console::warn_1(&msg),
                log::Level::Info => web_sys::console::info_1(&msg),
                log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = msg;
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn console_logger_setup() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Change the console log level: `error`, `warn`, `info`, `debug`, `trace`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => {
            log::set_max_level(filter);
            true
        }
        Err(_) => false,
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FC WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation functions (no canvas needed) ──────────────────

/// Validate a graph document. Returns JSON `{"ok":true,"nodes":N,"edges":M}`
/// or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_graph(json: &str) -> String {
    match GraphSnapshot::from_json(json) {
        Ok(graph) => format!(
            r#"{{"ok":true,"nodes":{},"edges":{}}}"#,
            graph.nodes.len(),
            graph.edges.len()
        ),
        Err(e) => error_json(&e),
    }
}

/// Validate a node type catalog. Returns `{"ok":true,"types":N}` or an error.
#[wasm_bindgen]
pub fn validate_catalog(json: &str) -> String {
    match StaticCatalog::from_json(json) {
        Ok(catalog) => format!(r#"{{"ok":true,"types":{}}}"#, catalog.types.len()),
        Err(e) => error_json(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_editor::MenuItem;
    use kurbo::Point;
    use pretty_assertions::assert_eq;

    const GRAPH: &str = r#"{
        "nodes": [
            { "id": "n1", "type": "number", "position": { "x": 0, "y": 0 }, "data": {} },
            { "id": "n2", "type": "number", "position": { "x": 400, "y": 0 }, "data": {} }
        ],
        "edges": []
    }"#;

    fn canvas() -> NodeCanvas {
        let mut c = NodeCanvas::new(800.0, 600.0);
        assert!(c.set_graph_json(GRAPH));
        c
    }

    #[test]
    fn validate_reports_counts_and_errors() {
        assert_eq!(validate_graph(GRAPH), r#"{"ok":true,"nodes":2,"edges":0}"#);
        let bad: Value = serde_json::from_str(&validate_graph("{\"nodes\": 3}")).unwrap();
        assert_eq!(bad["ok"], json!(false));
        assert!(bad["error"].as_str().unwrap().starts_with("invalid graph"));
        assert_eq!(validate_catalog(r#"{"types":{}}"#), r#"{"ok":true,"types":0}"#);
    }

    #[test]
    fn error_json_escapes_quotes() {
        let v: Value = serde_json::from_str(&error_json(r#"bad "x" \ y"#)).unwrap();
        assert_eq!(v["error"], json!(r#"bad "x" \ y"#));
    }

    #[test]
    fn rejects_invalid_documents() {
        let mut c = canvas();
        assert!(!c.set_graph_json("not json"));
        assert!(!c.set_catalog_json("42"));
        assert!(c.set_config_json(r#"{"interaction":{"gridStep":10}}"#));
        assert_eq!(c.apply_intents_json("{"), -1);
        // The previous graph survives a failed load.
        assert!(c.get_graph_json().contains("n2"));
    }

    #[test]
    fn click_selects_and_commits_to_mirror() {
        let mut c = canvas();
        let out = c.handle_pointer_down(20.0, 10.0, 0, false, false, false, false, 0.0);
        let intents: Vec<GraphIntent> = serde_json::from_str(&out).unwrap();
        assert!(intents.iter().any(GraphIntent::is_selection));
        c.handle_pointer_up(20.0, 10.0, 0, false, false, false, false, 10.0);
        let graph: Value = serde_json::from_str(&c.get_graph_json()).unwrap();
        assert_eq!(graph["nodes"][0]["selected"], json!(true));
        assert_eq!(graph["nodes"][1]["selected"], json!(false));
    }

    #[test]
    fn manual_commit_leaves_mirror_untouched() {
        let mut c = canvas();
        c.set_auto_commit(false);
        let out = c.handle_pointer_down(20.0, 10.0, 0, false, false, false, false, 0.0);
        assert_ne!(out, "[]");
        let graph: Value = serde_json::from_str(&c.get_graph_json()).unwrap();
        assert_eq!(graph["nodes"][0]["selected"], json!(false));
        assert!(c.apply_intents_json(&out) > 0);
        let graph: Value = serde_json::from_str(&c.get_graph_json()).unwrap();
        assert_eq!(graph["nodes"][0]["selected"], json!(true));
    }

    #[test]
    fn unknown_buttons_are_ignored() {
        let mut c = canvas();
        assert_eq!(c.handle_pointer_down(5.0, 5.0, 4, false, false, false, false, 0.0), "[]");
    }

    #[test]
    fn render_needs_a_context() {
        let mut c = canvas();
        assert!(!c.render());
    }

    #[test]
    fn every_render_rebuilds_the_frame() {
        let mut c = canvas();
        c.render();
        let built = c.frames_built;
        assert!(!c.frame_dirty);
        c.render();
        c.render();
        assert_eq!(c.frames_built, built + 2);

        // Input between frames reuses a clean cache.
        c.handle_pointer_move(700.0, 500.0, false, false, false, false, 0.0);
        assert_eq!(c.frames_built, built + 2);
    }

    #[test]
    fn overlay_json_shapes() {
        assert_eq!(overlay_json(&Overlay::None), json!({ "kind": "none" }));
        let menu = Overlay::ContextMenu {
            at: Point::new(5.0, 6.0),
            world: Point::ZERO,
            items: vec![MenuItem::FrameAll],
        };
        assert_eq!(
            overlay_json(&menu),
            json!({
                "kind": "contextMenu",
                "x": 5.0,
                "y": 6.0,
                "items": [{ "item": "frameAll", "label": "Frame all" }],
            })
        );
    }

    #[test]
    fn slider_draft_input_defaults_to_step_snap() {
        let input: DraftInput = serde_json::from_str(r#"{"min":0,"max":2,"step":0.5}"#).unwrap();
        let draft = input.into_draft();
        assert_eq!(draft.snap, SnapMode::Step);
        assert_eq!(draft.precision, None);
        let input: DraftInput =
            serde_json::from_str(r#"{"min":0,"max":2,"step":0.5,"snap":"free","precision":3}"#).unwrap();
        assert_eq!(input.into_draft().snap, SnapMode::Free);
    }

    #[test]
    fn cursor_follows_drag_then_hover() {
        assert_eq!(cursor_for(&DragState::None, &HitTarget::None), "default");
        assert_eq!(cursor_for(&DragState::None, &HitTarget::Node(NodeId::intern("n1"))), "pointer");
        let mut c = canvas();
        c.handle_pointer_down(700.0, 500.0, 1, false, false, false, false, 0.0);
        assert_eq!(c.get_cursor(), "grabbing");
    }

    #[test]
    fn keyboard_zoom_changes_view() {
        let mut c = canvas();
        let before: Value = serde_json::from_str(&c.get_view_json()).unwrap();
        c.handle_key("=", false, false, false, false);
        let after: Value = serde_json::from_str(&c.get_view_json()).unwrap();
        assert!(after["scale"].as_f64().unwrap() > before["scale"].as_f64().unwrap());
    }
}
