//! Canvas controller: pointer, wheel and keyboard handling.
//!
//! Owns the view transform and all local UI state (drag, hover, focused
//! slider, panel scroll, overlays). Reads the graph through a
//! [`FrameContext`] built for the current frame and answers every event
//! with zero or more [`GraphIntent`]s for the host store.
//!
//! ## Pointer bindings
//!
//! | Press | Target | Gesture |
//! |-------|--------|---------|
//! | Middle | anywhere | pan |
//! | Left + Shift/Space | anywhere | pan |
//! | Right | anywhere | pan; hold or double-click opens the context menu |
//! | Left | output port | wire |
//! | Left | group/text resize handle | resize |
//! | Left | slider track | scrub (Shift: fine) |
//! | Left | node body | move (Alt: no grid snap) |
//! | Left | empty canvas | box select (Ctrl/⌘: additive) |

use crate::gesture::{DragState, moved_positions, resized, snapped};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::intents::GraphIntent;
use crate::overlays::{
    MenuItem, Overlay, SearchHit, SliderDraft, add_node_intent, menu_items, search_catalog,
};
use crate::scheduler::dependency_key;
use crate::selection::{self, Selection};
use crate::shortcuts::{NudgeDirection, ShortcutAction, ShortcutMap};
use crate::store::{GraphStore, commit_intents};
use fc_core::{
    Bounds, CanvasConfig, GraphSnapshot, LayoutContent, NodeCatalog, NodeId, NodeKind,
    PortDirection, ScrollOffsets, Size, SliderBounds, ViewTransform, resolve_slider_value,
};
use fc_render::hit::{port_at, resize_handle_at, slider_track_at, wheel_target};
use fc_render::{FrameCache, HitOptions, HitTarget, PortKey, Tooltip, UiSnapshot, hit_test};
use kurbo::{Point, Vec2};

/// Minimum grab height of a slider track, world units.
const SLIDER_GRAB_HEIGHT: f64 = 18.0;

/// Everything the controller reads for one frame.
pub struct FrameContext<'a> {
    pub graph: &'a GraphSnapshot,
    pub frame: &'a FrameCache,
    pub catalog: &'a dyn NodeCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    at: Point,
    time_ms: f64,
}

/// Right-button press awaiting hold-timer expiry.
#[derive(Debug, Clone, PartialEq)]
struct RightPress {
    at: Point,
    time_ms: f64,
    target: HitTarget,
}

pub struct CanvasController {
    pub config: CanvasConfig,
    pub view: ViewTransform,
    pub grid_snap: bool,
    /// Panel/note scroll offsets fed back into layout.
    pub scroll: ScrollOffsets,
    viewport: (f64, f64),
    drag: DragState,
    hover: HitTarget,
    cursor: Point,
    focused_slider: Option<NodeId>,
    overlay: Overlay,
    show_help: bool,
    space_held: bool,
    last_left: Option<Press>,
    last_right_click: Option<f64>,
    right_press: Option<RightPress>,
    generation: u64,
}

impl CanvasController {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            view: ViewTransform::new(config.zoom),
            config,
            grid_snap: true,
            scroll: ScrollOffsets::new(),
            viewport: (0.0, 0.0),
            drag: DragState::None,
            hover: HitTarget::None,
            cursor: Point::ZERO,
            focused_slider: None,
            overlay: Overlay::None,
            show_help: false,
            space_held: false,
            last_left: None,
            last_right_click: None,
            right_press: None,
            generation: 0,
        }
    }

    pub fn set_config(&mut self, config: CanvasConfig) {
        self.view.set_profile(config.zoom);
        self.config = config;
        self.touch();
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width.max(0.0), height.max(0.0));
        self.touch();
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn hover(&self) -> &HitTarget {
        &self.hover
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn focused_slider(&self) -> Option<NodeId> {
        self.focused_slider
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn hit_options(&self) -> HitOptions {
        HitOptions::from_config(&self.config)
    }

    /// Render-loop key: changes whenever anything this controller draws
    /// may have changed. `graph_revision` comes from the host store.
    pub fn loop_key(&self, graph_revision: u64) -> u64 {
        dependency_key((
            graph_revision,
            self.view.x.to_bits(),
            self.view.y.to_bits(),
            self.view.scale.to_bits(),
            self.drag.name(),
            self.generation,
        ))
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn snap_step(&self, modifiers: Modifiers) -> Option<f64> {
        (self.grid_snap && !modifiers.alt).then(|| self.config.grid_step(self.view.scale))
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent, ctx: &FrameContext) -> Vec<GraphIntent> {
        self.touch();
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
                time_ms,
            } => self.pointer_down(Point::new(*x, *y), *button, *modifiers, *time_ms, ctx),
            InputEvent::PointerMove {
                x, y, modifiers, ..
            } => self.pointer_move(Point::new(*x, *y), *modifiers, ctx),
            InputEvent::PointerUp {
                x,
                y,
                button,
                modifiers,
                time_ms,
            } => self.pointer_up(Point::new(*x, *y), *button, *modifiers, *time_ms, ctx),
            InputEvent::PointerCancel => {
                self.pointer_cancel();
                Vec::new()
            }
            InputEvent::Wheel {
                x,
                y,
                dy,
                modifiers,
                ..
            } => self.wheel(Point::new(*x, *y), *dy, *modifiers, ctx),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, *modifiers, ctx),
            InputEvent::KeyUp { key, .. } => {
                if key == " " {
                    self.space_held = false;
                }
                Vec::new()
            }
        }
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    fn pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
        time_ms: f64,
        ctx: &FrameContext,
    ) -> Vec<GraphIntent> {
        self.cursor = screen;
        if self.overlay.is_open() {
            // Editors commit through `commit_overlay`; a canvas press only
            // dismisses and starts nothing.
            self.overlay = Overlay::None;
            self.drag = DragState::None;
            self.right_press = None;
            self.touch();
            return Vec::new();
        }
        // A press while a gesture is live (second button) ends it first.
        self.drag = DragState::None;

        let world = self.view.screen_to_world(screen);
        match button {
            PointerButton::Middle => {
                self.start_pan(screen, false);
                Vec::new()
            }
            PointerButton::Right => {
                let target = hit_test(ctx.frame, world, &self.hit_options());
                self.right_press = Some(RightPress {
                    at: screen,
                    time_ms,
                    target,
                });
                self.start_pan(screen, true);
                Vec::new()
            }
            PointerButton::Left => {
                if modifiers.shift || self.space_held {
                    self.start_pan(screen, false);
                    return Vec::new();
                }
                if self.is_double_click(screen, time_ms) {
                    self.last_left = None;
                    self.double_click(world, ctx);
                    return Vec::new();
                }
                self.last_left = Some(Press {
                    at: screen,
                    time_ms,
                });
                self.left_down(screen, world, modifiers, ctx)
            }
        }
    }

    fn start_pan(&mut self, screen: Point, via_right: bool) {
        log::debug!("drag: pan (right={via_right})");
        self.drag = DragState::Pan {
            origin: screen,
            last: screen,
            via_right,
            moved: false,
        };
    }

    fn is_double_click(&self, screen: Point, time_ms: f64) -> bool {
        let i = &self.config.interaction;
        self.last_left.is_some_and(|p| {
            time_ms - p.time_ms <= i.double_click_ms && p.at.distance(screen) <= i.box_click_threshold
        })
    }

    fn left_down(
        &mut self,
        screen: Point,
        world: Point,
        modifiers: Modifiers,
        ctx: &FrameContext,
    ) -> Vec<GraphIntent> {
        let opts = self.hit_options();
        let hit = hit_test(ctx.frame, world, &opts);
        let additive = modifiers.command();
        let current = Selection::from_graph(ctx.graph);

        // Wire from an output port.
        if let HitTarget::Port(key) = &hit
            && key.direction == PortDirection::Output
            && let Some(port) = ctx
                .frame
                .layout(key.node)
                .and_then(|l| l.output(&key.port))
        {
            log::debug!("drag: edge from {}.{}", key.node, key.port);
            self.drag = DragState::Edge {
                from: key.clone(),
                anchor: port.point(),
                cursor: world,
            };
            return Vec::new();
        }

        let Some(node_id) = hit.node() else {
            if let HitTarget::Edge(edge) = hit {
                let next = selection::click_edge(&current, edge, additive);
                return vec![next.into_intent()];
            }
            log::debug!("drag: box (additive={additive})");
            self.drag = DragState::Box {
                origin: screen,
                current: screen,
                additive,
                base: current,
                snap: self.snap_step(modifiers),
            };
            return Vec::new();
        };
        let Some(layout) = ctx.frame.layout(node_id) else {
            return Vec::new();
        };

        // Resize handle, kept a constant screen size.
        let handle = self.config.interaction.resize_handle_size / self.view.scale;
        if resize_handle_at(ctx.frame, world, handle) == Some(node_id) {
            let start = Size::new(layout.rect.width, layout.rect.height);
            log::debug!("drag: resize {node_id}");
            self.drag = match layout.kind {
                NodeKind::Text => DragState::ResizeText {
                    node: node_id,
                    origin: world,
                    start,
                },
                _ => DragState::Resize {
                    node: node_id,
                    origin: world,
                    start,
                },
            };
            return Vec::new();
        }

        // Slider scrub.
        if !additive
            && slider_track_at(ctx.frame, world, SLIDER_GRAB_HEIGHT) == Some(node_id)
            && let Some(slider) = layout.slider()
        {
            log::debug!("drag: slider {node_id}");
            self.focused_slider = Some(node_id);
            let value = resolve_slider_value(slider.raw_value_at(world.x), &slider.bounds);
            self.drag = DragState::Slider {
                node: node_id,
                slider: slider.clone(),
                last_x: world.x,
                value,
            };
            return value_intent(node_id, slider.value, value);
        }

        // Node body (or an input port, which carries no drag of its own).
        let mut intents = Vec::new();
        let next = selection::click_node(&current, node_id, additive);
        if next != current {
            intents.push(next.clone().into_intent());
        }
        if layout.kind == NodeKind::Slider {
            self.focused_slider = Some(node_id);
        }
        if additive && !next.contains_node(node_id) {
            // Toggled off: nothing to drag.
            return intents;
        }
        let starts = selection::co_moving(ctx.graph, node_id, &next)
            .into_iter()
            .filter_map(|id| ctx.graph.node(id).map(|n| (id, n.position)))
            .collect::<Vec<_>>();
        log::debug!("drag: node {node_id} (+{} co-moving)", starts.len().saturating_sub(1));
        self.drag = DragState::Node {
            origin: world,
            starts,
        };
        intents
    }

    fn pointer_move(&mut self, screen: Point, modifiers: Modifiers, ctx: &FrameContext) -> Vec<GraphIntent> {
        self.cursor = screen;
        let world = self.view.screen_to_world(screen);
        let snap = self.snap_step(modifiers);
        let threshold = self.config.interaction.right_drag_threshold;
        let opts = self.hit_options();

        let mut pan = None;
        let intents = match &mut self.drag {
            DragState::None => {
                self.hover = hit_test(ctx.frame, world, &opts);
                Vec::new()
            }
            DragState::Pan {
                origin,
                last,
                via_right,
                moved,
            } => {
                pan = Some(screen - *last);
                *last = screen;
                if *via_right && !*moved && origin.distance(screen) > threshold {
                    *moved = true;
                    self.right_press = None;
                }
                Vec::new()
            }
            DragState::Node { origin, starts } => {
                let delta = snapped(world - *origin, snap);
                moved_positions(starts, delta)
                    .into_iter()
                    .map(|(id, position)| GraphIntent::MoveNode { id, position })
                    .collect()
            }
            DragState::Resize {
                node,
                origin,
                start,
            } => {
                let m = &self.config.layout;
                let min = Size::new(m.node_width * 0.5, m.group_header_height * 2.0);
                vec![GraphIntent::ResizeNode {
                    id: *node,
                    size: resized(*start, snapped(world - *origin, snap), min),
                }]
            }
            DragState::ResizeText {
                node,
                origin,
                start,
            } => {
                let m = &self.config.layout;
                let min = Size::new(
                    m.text_font_size * 2.0 + m.text_padding * 2.0,
                    m.text_line_height + m.text_padding * 2.0,
                );
                vec![GraphIntent::ResizeNode {
                    id: *node,
                    size: resized(*start, snapped(world - *origin, snap), min),
                }]
            }
            DragState::Edge { cursor, .. } => {
                *cursor = world;
                self.hover = port_at(ctx.frame, world, &opts, PortDirection::Input)
                    .map(HitTarget::Port)
                    .unwrap_or_default();
                Vec::new()
            }
            DragState::Slider {
                node,
                slider,
                last_x,
                value,
            } => {
                let next = if modifiers.shift {
                    let fine = slider.bounds.fine();
                    let raw_delta = slider.raw_value_at(world.x) - slider.raw_value_at(*last_x);
                    resolve_slider_value(*value + raw_delta / 10.0, &fine)
                } else {
                    resolve_slider_value(slider.raw_value_at(world.x), &slider.bounds)
                };
                *last_x = world.x;
                let out = value_intent(*node, *value, next);
                *value = next;
                out
            }
            DragState::Box {
                current,
                snap: box_snap,
                ..
            } => {
                *current = screen;
                *box_snap = snap;
                Vec::new()
            }
        };
        if let Some(delta) = pan {
            self.view.pan_by(delta);
        }
        intents
    }

    fn pointer_up(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
        time_ms: f64,
        ctx: &FrameContext,
    ) -> Vec<GraphIntent> {
        self.cursor = screen;
        let world = self.view.screen_to_world(screen);
        let drag = std::mem::take(&mut self.drag);
        // Always-run cleanup: the hold timer never outlives the press.
        let right_press = self.right_press.take();

        let intents = match drag {
            DragState::Edge { from, .. } => self.finish_wire(from, world, ctx),
            DragState::Box {
                origin,
                additive,
                base,
                snap,
                ..
            } => self.finish_box(origin, screen, additive, &base, snap, ctx),
            DragState::Pan {
                via_right: true,
                moved: false,
                ..
            } if button == PointerButton::Right => {
                self.right_click(time_ms, right_press);
                Vec::new()
            }
            _ => Vec::new(),
        };
        intents
    }

    fn finish_wire(&mut self, from: PortKey, world: Point, ctx: &FrameContext) -> Vec<GraphIntent> {
        self.hover = HitTarget::None;
        match port_at(ctx.frame, world, &self.hit_options(), PortDirection::Input) {
            Some(target) if target.node != from.node => {
                log::debug!(
                    "connect {}.{} -> {}.{}",
                    from.node,
                    from.port,
                    target.node,
                    target.port
                );
                vec![GraphIntent::Connect {
                    source: from.node,
                    source_handle: from.port,
                    target: target.node,
                    target_handle: target.port,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn finish_box(
        &self,
        origin: Point,
        end: Point,
        additive: bool,
        base: &Selection,
        snap: Option<f64>,
        ctx: &FrameContext,
    ) -> Vec<GraphIntent> {
        if origin.distance(end) < self.config.interaction.box_click_threshold {
            if additive || base.is_empty() {
                return Vec::new();
            }
            return vec![GraphIntent::clear_selection()];
        }
        let rect = self.box_world_rect(origin, end, snap);
        let next = selection::box_select(ctx.frame, rect, base, additive);
        if next == *base {
            Vec::new()
        } else {
            vec![next.into_intent()]
        }
    }

    /// World rectangle of a rubber band; its extent snaps like any drag.
    fn box_world_rect(&self, origin: Point, end: Point, snap: Option<f64>) -> Bounds {
        let a = self.view.screen_to_world(origin);
        let b = self.view.screen_to_world(end);
        let delta = snapped(b - a, snap);
        let b = a + delta;
        Bounds::from_corners(a.x, a.y, b.x, b.y)
    }

    fn right_click(&mut self, time_ms: f64, press: Option<RightPress>) {
        let window = self.config.interaction.double_click_ms;
        if self.last_right_click.is_some_and(|t| time_ms - t <= window) {
            self.last_right_click = None;
            if let Some(press) = press {
                self.open_context_menu(press.at, &press.target);
            }
        } else {
            self.last_right_click = Some(time_ms);
        }
    }

    fn pointer_cancel(&mut self) {
        if !self.drag.is_none() {
            log::debug!("drag cancelled: {}", self.drag.name());
        }
        self.drag = DragState::None;
        self.right_press = None;
        self.hover = HitTarget::None;
    }

    /// Advance timers. Returns whether the context menu opened.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(press) = &self.right_press else {
            return false;
        };
        let still = matches!(
            self.drag,
            DragState::Pan {
                via_right: true,
                moved: false,
                ..
            }
        );
        if !still || now_ms - press.time_ms < self.config.interaction.right_click_hold_ms {
            return false;
        }
        let press = press.clone();
        // An expired hold cancels the pending right-button pan.
        self.pointer_cancel();
        self.open_context_menu(press.at, &press.target);
        true
    }

    fn open_context_menu(&mut self, at: Point, target: &HitTarget) {
        log::debug!("context menu at ({}, {})", at.x, at.y);
        self.overlay = Overlay::ContextMenu {
            at,
            world: self.view.screen_to_world(at),
            items: menu_items(target),
        };
        self.touch();
    }

    fn double_click(&mut self, world: Point, ctx: &FrameContext) {
        let hit = hit_test(ctx.frame, world, &self.hit_options());
        let Some(id) = hit.node() else {
            if hit.is_none() {
                self.overlay = Overlay::NodeSearch {
                    at: world,
                    query: String::new(),
                };
            }
            return;
        };
        let (Some(node), Some(layout)) = (ctx.graph.node(id), ctx.frame.layout(id)) else {
            return;
        };
        self.overlay = match layout.kind {
            NodeKind::Text => Overlay::text_editor(node),
            NodeKind::Slider => Overlay::SliderSettings {
                node: id,
                draft: SliderDraft::from_node(node),
            },
            _ if layout.header.contains(world.x, world.y) => Overlay::label_editor(node),
            _ => return,
        };
        log::debug!("overlay opened for {id}");
    }

    // ─── Wheel ───────────────────────────────────────────────────────────

    fn wheel(&mut self, screen: Point, dy: f64, modifiers: Modifiers, ctx: &FrameContext) -> Vec<GraphIntent> {
        if !dy.is_finite() || dy == 0.0 {
            return Vec::new();
        }
        let world = self.view.screen_to_world(screen);
        let sign = if dy < 0.0 { 1.0 } else { -1.0 };
        // Only the topmost node under the cursor reacts; anything it covers
        // stays put.
        let target = wheel_target(ctx.frame, world, &self.hit_options(), SLIDER_GRAB_HEIGHT);

        if let Some(layout) = target
            && let Some(slider) = layout.slider()
            && slider.hit_zone(SLIDER_GRAB_HEIGHT).contains(world.x, world.y)
        {
            let id = layout.id;
            self.focused_slider = Some(id);
            let bounds = if modifiers.shift {
                slider.bounds.fine()
            } else {
                slider.bounds
            };
            let next = resolve_slider_value(slider.value + sign * bounds.step, &bounds);
            return value_intent(id, slider.value, next);
        }

        if let Some(layout) = target
            && let LayoutContent::Lines {
                lines,
                first_visible,
                visible,
                scrollable: true,
                ..
            } = &layout.content
        {
            let id = layout.id;
            let max_first = lines.len().saturating_sub(*visible);
            let next = if dy > 0.0 {
                (first_visible + 1).min(max_first)
            } else {
                first_visible.saturating_sub(1)
            };
            self.scroll.insert(id, next);
            return Vec::new();
        }

        let factor = (-dy * self.config.interaction.wheel_zoom_sensitivity).exp();
        self.view.zoom_at(screen, factor);
        Vec::new()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers, ctx: &FrameContext) -> Vec<GraphIntent> {
        if key == " " {
            self.space_held = true;
            return Vec::new();
        }
        if self.overlay.is_open() {
            return self.overlay_key(key, modifiers, ctx);
        }
        let Some(action) =
            ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta)
        else {
            return Vec::new();
        };
        log::debug!("shortcut {key:?} -> {action:?}");
        self.touch();

        match action {
            ShortcutAction::Delete => {
                let sel = Selection::from_graph(ctx.graph);
                if !sel.nodes.is_empty() {
                    if self.focused_slider.is_some_and(|f| sel.contains_node(f)) {
                        self.focused_slider = None;
                    }
                    vec![GraphIntent::RemoveNodes { ids: sel.nodes }]
                } else if !sel.edges.is_empty() {
                    vec![GraphIntent::RemoveEdges { ids: sel.edges }]
                } else {
                    Vec::new()
                }
            }
            ShortcutAction::SelectAll => vec![selection::select_all(ctx.graph).into_intent()],
            ShortcutAction::FrameSelection => {
                let sel = Selection::from_graph(ctx.graph);
                self.frame_nodes(ctx.frame, Some(&sel.nodes));
                Vec::new()
            }
            ShortcutAction::FrameAll => {
                self.frame_nodes(ctx.frame, None);
                Vec::new()
            }
            ShortcutAction::ResetView => {
                self.view.reset();
                Vec::new()
            }
            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut => {
                let f = self.config.interaction.key_zoom_factor;
                let factor = if action == ShortcutAction::ZoomIn { f } else { 1.0 / f };
                let center = Point::new(self.viewport.0 / 2.0, self.viewport.1 / 2.0);
                self.view.zoom_at(center, factor);
                Vec::new()
            }
            ShortcutAction::Nudge { direction, large } => self.nudge(direction, large, ctx),
            ShortcutAction::SliderBound { max } => match self.focused_slider_layout(ctx) {
                Some((id, current, bounds)) => {
                    let target = if max { bounds.max } else { bounds.min };
                    value_intent(id, current, resolve_slider_value(target, &bounds))
                }
                None => Vec::new(),
            },
            ShortcutAction::ToggleGridSnap => {
                self.grid_snap = !self.grid_snap;
                log::debug!("grid snap {}", if self.grid_snap { "on" } else { "off" });
                Vec::new()
            }
            ShortcutAction::ToggleHelp => {
                self.show_help = !self.show_help;
                Vec::new()
            }
            ShortcutAction::Cancel => {
                self.cancel();
                Vec::new()
            }
        }
    }

    fn overlay_key(&mut self, key: &str, modifiers: Modifiers, ctx: &FrameContext) -> Vec<GraphIntent> {
        match key {
            "Escape" => {
                self.overlay = Overlay::None;
                Vec::new()
            }
            "Enter" => {
                let commits = match self.overlay {
                    Overlay::TextEditor { .. } => modifiers.command(),
                    Overlay::LabelEditor { .. } | Overlay::SliderSettings { .. } => true,
                    _ => false,
                };
                if commits {
                    self.commit_overlay(ctx)
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn nudge(&mut self, direction: NudgeDirection, large: bool, ctx: &FrameContext) -> Vec<GraphIntent> {
        if let Some((id, current, bounds)) = self.focused_slider_layout(ctx) {
            let steps = if large {
                self.config.interaction.slider_large_step
            } else {
                1.0
            };
            let next = resolve_slider_value(current + direction.slider_sign() * bounds.step * steps, &bounds);
            return value_intent(id, current, next);
        }
        let i = &self.config.interaction;
        let step = if large { i.arrow_pan_step_large } else { i.arrow_pan_step };
        let (ux, uy) = direction.unit();
        // Content moves opposite to the direction looked in.
        self.view.pan_by(Vec2::new(-ux * step, -uy * step));
        Vec::new()
    }

    fn focused_slider_layout(&self, ctx: &FrameContext) -> Option<(NodeId, f64, SliderBounds)> {
        let id = self.focused_slider?;
        let slider = ctx.frame.layout(id)?.slider()?;
        Some((id, slider.value, slider.bounds))
    }

    /// Abort the drag, close popovers and release the focused slider.
    pub fn cancel(&mut self) {
        self.drag = DragState::None;
        self.right_press = None;
        self.overlay = Overlay::None;
        self.focused_slider = None;
        self.show_help = false;
        self.touch();
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Fit the given nodes (all when `None`). No-op for an empty target set
    /// or a degenerate box.
    pub fn frame_nodes(&mut self, frame: &FrameCache, ids: Option<&[NodeId]>) -> bool {
        if ids.is_some_and(|ids| ids.is_empty()) {
            return false;
        }
        match frame.world_bounds(ids) {
            Some(bounds) if !bounds.is_degenerate() => {
                self.view.frame_bounds(bounds, self.viewport.0, self.viewport.1);
                self.touch();
                true
            }
            _ => false,
        }
    }

    // ─── Overlays ────────────────────────────────────────────────────────

    /// Update an open editor's text or the search query.
    pub fn set_overlay_text(&mut self, text: &str) -> bool {
        self.overlay.set_text(text)
    }

    pub fn set_slider_draft(&mut self, draft: SliderDraft) -> bool {
        self.touch();
        self.overlay.set_draft(draft)
    }

    pub fn commit_overlay(&mut self, ctx: &FrameContext) -> Vec<GraphIntent> {
        let node = self.overlay.node().and_then(|id| ctx.graph.node(id));
        let intents = self.overlay.commit_intents(node);
        self.overlay = Overlay::None;
        self.touch();
        intents
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
        self.touch();
    }

    /// Pick a context menu entry by index.
    pub fn choose_menu_item(&mut self, index: usize, ctx: &FrameContext) -> Vec<GraphIntent> {
        let Overlay::ContextMenu { world, items, .. } = &self.overlay else {
            return Vec::new();
        };
        let Some(item) = items.get(index).copied() else {
            return Vec::new();
        };
        let world = *world;
        self.overlay = Overlay::None;
        self.touch();

        match item {
            MenuItem::AddNode => {
                self.overlay = Overlay::NodeSearch {
                    at: world,
                    query: String::new(),
                };
                Vec::new()
            }
            MenuItem::FrameAll => {
                self.frame_nodes(ctx.frame, None);
                Vec::new()
            }
            MenuItem::ToggleGridSnap => {
                self.grid_snap = !self.grid_snap;
                Vec::new()
            }
            MenuItem::DeleteNode(id) => vec![GraphIntent::RemoveNodes { ids: vec![id] }],
            MenuItem::HideNode(id) => vec![GraphIntent::SetHidden { id, hidden: true }],
            MenuItem::FrameNode(id) => {
                self.frame_nodes(ctx.frame, Some(&[id]));
                Vec::new()
            }
            MenuItem::DeleteEdge(id) => vec![GraphIntent::RemoveEdges { ids: vec![id] }],
        }
    }

    /// Catalog matches for the open node search's query.
    pub fn search_results(&self, ctx: &FrameContext) -> Vec<SearchHit> {
        match &self.overlay {
            Overlay::NodeSearch { query, .. } => search_catalog(ctx.catalog, query),
            _ => Vec::new(),
        }
    }

    /// Add the chosen type at the search popover's position.
    pub fn choose_search_result(&mut self, node_type: &str) -> Vec<GraphIntent> {
        let Overlay::NodeSearch { at, .. } = &self.overlay else {
            return Vec::new();
        };
        let intent = add_node_intent(node_type, *at, self.config.layout.node_width);
        self.overlay = Overlay::None;
        self.touch();
        vec![intent]
    }

    // ─── Store ───────────────────────────────────────────────────────────

    /// Apply intents to `store`. Any failure clears transient UI state so
    /// nothing stays stuck on a rejected action. Returns the applied count.
    pub fn commit(&mut self, store: &mut dyn GraphStore, intents: &[GraphIntent]) -> usize {
        if intents.is_empty() {
            return 0;
        }
        let report = commit_intents(store, intents);
        self.sync_graph(store.snapshot());
        if !report.is_clean() {
            self.drag = DragState::None;
            self.right_press = None;
            self.overlay = Overlay::None;
            self.touch();
        }
        report.applied
    }

    /// Forget per-node UI state for nodes the graph no longer has. Hosts
    /// that replace the graph directly call this after each replacement.
    pub fn sync_graph(&mut self, graph: &GraphSnapshot) {
        let before = self.scroll.len();
        self.scroll.retain(|id, _| graph.node(*id).is_some());
        if self.focused_slider.is_some_and(|id| graph.node(id).is_none()) {
            self.focused_slider = None;
        }
        if self.hover.node().is_some_and(|id| graph.node(id).is_none()) {
            self.hover = HitTarget::None;
        }
        if self.scroll.len() != before {
            log::trace!("dropped {} stale scroll offsets", before - self.scroll.len());
        }
    }

    // ─── Render snapshot ─────────────────────────────────────────────────

    pub fn ui_snapshot(&self, ctx: &FrameContext) -> UiSnapshot {
        let mut ui = UiSnapshot {
            hover: self.hover.clone(),
            focused_slider: self.focused_slider,
            tooltip: self.tooltip(ctx),
            shortcut_help: self.show_help.then(ShortcutMap::help_rows),
            ..UiSnapshot::default()
        };

        match &self.drag {
            DragState::Edge {
                from,
                anchor,
                cursor,
            } => {
                ui.active_port = Some(from.clone());
                ui.preview_edge = Some((*anchor, *cursor));
            }
            DragState::Box {
                origin,
                current,
                additive,
                base,
                snap,
            } => {
                ui.selection_box = Some(Bounds::from_corners(origin.x, origin.y, current.x, current.y));
                if origin.distance(*current) >= self.config.interaction.box_click_threshold {
                    let rect = self.box_world_rect(*origin, *current, *snap);
                    let live = selection::box_select(ctx.frame, rect, base, *additive);
                    ui.selected_nodes = live.nodes.into_iter().collect();
                }
            }
            _ => {}
        }

        if let Overlay::NodeSearch { at, .. } = &self.overlay {
            let m = &self.config.layout;
            ui.ghost = Some(Bounds::new(
                at.x - m.node_width / 2.0,
                at.y,
                m.node_width,
                m.min_node_height,
            ));
        }
        ui
    }

    fn tooltip(&self, ctx: &FrameContext) -> Option<Tooltip> {
        if !self.drag.is_none() {
            return None;
        }
        let text = match &self.hover {
            HitTarget::Port(key) => {
                let port = ctx.frame.layout(key.node)?.port(&key.port, key.direction)?;
                format!("{}: {}", port.port.display_label(), port.port.port_type)
            }
            HitTarget::Node(id) => ctx.graph.node(*id)?.data.evaluation_error.clone()?,
            HitTarget::None | HitTarget::Edge(_) => return None,
        };
        Some(Tooltip {
            text,
            at: self.cursor,
        })
    }
}

/// Value patch for a slider, only when the value actually changed.
fn value_intent(id: NodeId, previous: f64, next: f64) -> Vec<GraphIntent> {
    if previous == next {
        Vec::new()
    } else {
        vec![GraphIntent::set_parameter(id, "value", next)]
    }
}
