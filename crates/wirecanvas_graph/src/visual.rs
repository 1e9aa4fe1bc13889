// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node visual: the scene object drawing one node on the canvas.
//!
//! Construction happens in two phases. `start` creates the texts and the
//! hidden connector line and asks for every text to be measured. Once all
//! texts reported their size, the backdrops and pins are built around them.

use crate::layout::{NodeLayout, NodeLayoutConfig};
use crate::node_data::{NodeData, PinData};
use egui::{Color32, Stroke, Vec2};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wirecanvas_runtime::{
    AnchorX, AnchorY, PointerContext, PointerListener, Scene, SceneNodeId, SceneObject, Shape,
    StartContext, TextJoin, TextShape,
};

const TITLE_FILL: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);
const IO_FILL: Color32 = Color32::from_rgb(0x23, 0x23, 0x23);
const PIN_Z: f32 = 5.0;
const LINE_Z: f32 = 10.0;

#[derive(Debug, Default)]
struct VisualState {
    root: Option<SceneNodeId>,
    line: Option<SceneNodeId>,
    title_text: Option<SceneNodeId>,
    input_labels: Vec<SceneNodeId>,
    output_labels: Vec<SceneNodeId>,
    title_backdrop: Option<SceneNodeId>,
    io_backdrop: Option<SceneNodeId>,
    input_pins: Vec<SceneNodeId>,
    output_pins: Vec<SceneNodeId>,
    active_pin: Option<SceneNodeId>,
    layout: Option<NodeLayout>,
}

/// Shared view on a node visual's scene nodes
#[derive(Debug, Clone)]
pub struct NodeVisualState(Rc<RefCell<VisualState>>);

impl NodeVisualState {
    /// Whether the layout phase ran
    pub fn is_laid_out(&self) -> bool {
        self.0.borrow().layout.is_some()
    }

    /// Computed layout
    pub fn layout(&self) -> Option<NodeLayout> {
        self.0.borrow().layout.clone()
    }

    /// Root of the node subtree
    pub fn root(&self) -> Option<SceneNodeId> {
        self.0.borrow().root
    }

    /// Connector line
    pub fn line(&self) -> Option<SceneNodeId> {
        self.0.borrow().line
    }

    /// Title bar backdrop
    pub fn title_backdrop(&self) -> Option<SceneNodeId> {
        self.0.borrow().title_backdrop
    }

    /// IO backdrop
    pub fn io_backdrop(&self) -> Option<SceneNodeId> {
        self.0.borrow().io_backdrop
    }

    /// Input pin nodes, top to bottom
    pub fn input_pins(&self) -> Vec<SceneNodeId> {
        self.0.borrow().input_pins.clone()
    }

    /// Output pin nodes, top to bottom
    pub fn output_pins(&self) -> Vec<SceneNodeId> {
        self.0.borrow().output_pins.clone()
    }

    /// Pin under the pointer
    pub fn active_pin(&self) -> Option<SceneNodeId> {
        self.0.borrow().active_pin
    }
}

/// Scene object showing a [`NodeData`] as a draggable box with pins
#[derive(Debug)]
pub struct NodeVisual {
    data: NodeData,
    config: NodeLayoutConfig,
    position: Vec2,
    state: Rc<RefCell<VisualState>>,
}

impl NodeVisual {
    /// Create a visual at the world origin with the default layout
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            config: NodeLayoutConfig::default(),
            position: Vec2::ZERO,
            state: Rc::new(RefCell::new(VisualState::default())),
        }
    }

    /// Set the layout configuration
    pub fn with_config(mut self, config: NodeLayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the world position of the title bar center
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Displayed node data
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Handle on the visual's scene nodes
    pub fn state(&self) -> NodeVisualState {
        NodeVisualState(Rc::clone(&self.state))
    }
}

impl SceneObject for NodeVisual {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) {
        let scene = &mut *ctx.scene;
        let root = ctx.handle.root();
        scene.set_position(root, self.position);

        let line = scene.spawn(
            Some(root),
            "connector",
            Shape::Line {
                from: Vec2::ZERO,
                to: Vec2::ZERO,
                stroke: Stroke::new(self.config.line_width, Color32::WHITE),
            },
        );
        scene.set_z(line, LINE_Z);
        scene.set_visible(line, false);

        let title = spawn_text(scene, root, &self.data.name, self.config.title_font_size);
        let font_size = self.config.pin_font_size;
        let input_labels: Vec<SceneNodeId> = self
            .data
            .inputs
            .iter()
            .map(|pin| spawn_text(scene, root, pin.name(), font_size))
            .collect();
        let output_labels: Vec<SceneNodeId> = self
            .data
            .outputs
            .iter()
            .map(|pin| spawn_text(scene, root, pin.name(), font_size))
            .collect();

        let texts: Vec<SceneNodeId> = std::iter::once(title)
            .chain(input_labels.iter().copied())
            .chain(output_labels.iter().copied())
            .collect();

        {
            let mut state = self.state.borrow_mut();
            state.root = Some(root);
            state.line = Some(line);
            state.title_text = Some(title);
            state.input_labels = input_labels;
            state.output_labels = output_labels;
        }

        let weak = Rc::downgrade(&self.state);
        let data = self.data.clone();
        let config = self.config.clone();
        TextJoin::sync_all(scene, &texts, move |scene| {
            let Some(state) = weak.upgrade() else {
                tracing::trace!("Node visual dropped before its texts were measured");
                return;
            };
            if !scene.contains(root) {
                tracing::trace!("Node visual removed before its texts were measured");
                return;
            }
            build_layout(scene, &state, &data, &config);
        });

        tracing::debug!("Node '{}' waiting for {} texts", self.data.name, texts.len());
    }

    fn end(&mut self, _scene: &mut Scene) {
        self.state.borrow_mut().active_pin = None;
        tracing::debug!("Node '{}' removed", self.data.name);
    }
}

fn spawn_text(scene: &mut Scene, parent: SceneNodeId, text: &str, font_size: f32) -> SceneNodeId {
    let id = scene.spawn(
        Some(parent),
        text,
        Shape::Text(
            TextShape::new(text, font_size, Color32::WHITE).with_anchor(AnchorX::Center, AnchorY::Middle),
        ),
    );
    // Shown once the layout placed it
    scene.set_visible(id, false);
    id
}

fn build_layout(
    scene: &mut Scene,
    shared: &Rc<RefCell<VisualState>>,
    data: &NodeData,
    config: &NodeLayoutConfig,
) {
    let weak = Rc::downgrade(shared);
    let mut state = shared.borrow_mut();
    let (Some(root), Some(title)) = (state.root, state.title_text) else {
        return;
    };

    let measured = |id: &SceneNodeId| scene.text(*id).map_or(Vec2::ZERO, TextShape::measured_size);
    let title_size = measured(&title);
    let input_sizes: Vec<Vec2> = state.input_labels.iter().map(measured).collect();
    let output_sizes: Vec<Vec2> = state.output_labels.iter().map(measured).collect();
    let layout = NodeLayout::compute(config, title_size, &input_sizes, &output_sizes);

    let title_backdrop = scene.spawn(
        Some(root),
        "title backdrop",
        Shape::Rect {
            size: layout.title_size,
            fill: TITLE_FILL,
            rounding: 0.0,
        },
    );
    scene.set_listener(title_backdrop, drag_root(root));
    place(scene, title, title_backdrop, layout.title_text);

    let io_backdrop = scene.spawn(
        Some(root),
        "io backdrop",
        Shape::Rect {
            size: layout.io_size,
            fill: IO_FILL,
            rounding: 0.0,
        },
    );
    scene.set_position(io_backdrop, layout.io_position);
    scene.set_listener(io_backdrop, drag_root(root));

    for (label, slot) in state.input_labels.iter().zip(&layout.inputs) {
        place(scene, *label, io_backdrop, slot.label);
    }
    for (label, slot) in state.output_labels.iter().zip(&layout.outputs) {
        place(scene, *label, io_backdrop, slot.label);
    }

    state.input_pins = data
        .inputs
        .iter()
        .zip(&layout.inputs)
        .map(|(pin, slot)| spawn_pin(scene, io_backdrop, pin, slot.pin, config, &weak))
        .collect();
    state.output_pins = data
        .outputs
        .iter()
        .zip(&layout.outputs)
        .map(|(pin, slot)| spawn_pin(scene, io_backdrop, pin, slot.pin, config, &weak))
        .collect();

    state.title_backdrop = Some(title_backdrop);
    state.io_backdrop = Some(io_backdrop);
    state.layout = Some(layout);
    tracing::debug!("Node '{}' laid out", data.name);
}

fn place(scene: &mut Scene, id: SceneNodeId, parent: SceneNodeId, position: Vec2) {
    scene.attach(id, parent);
    scene.set_position(id, position);
    scene.set_visible(id, true);
}

fn drag_root(root: SceneNodeId) -> PointerListener {
    PointerListener::new().with_drag(move |ctx, delta| ctx.scene.translate(root, delta.world))
}

fn spawn_pin(
    scene: &mut Scene,
    parent: SceneNodeId,
    pin: &PinData,
    position: Vec2,
    config: &NodeLayoutConfig,
    state: &Weak<RefCell<VisualState>>,
) -> SceneNodeId {
    let [r, g, b] = pin.color();
    let fill = Color32::from_rgb(r, g, b);
    let shape = if pin.is_flow() {
        Shape::Rect {
            size: Vec2::splat(config.pin_radius * 2.0),
            fill,
            rounding: 0.0,
        }
    } else {
        Shape::Circle {
            radius: config.pin_radius,
            fill,
        }
    };

    let id = scene.spawn(Some(parent), pin.name(), shape);
    scene.set_position(id, position);
    scene.set_z(id, PIN_Z);

    let scale = config.active_pin_scale;
    let (begin, end, drag, release) = (state.clone(), state.clone(), state.clone(), state.clone());
    scene.set_listener(
        id,
        PointerListener::new()
            .with_hover_begin(move |ctx| {
                if let Some(state) = begin.upgrade() {
                    set_active_pin(&mut state.borrow_mut(), ctx.scene, Some(ctx.target), scale);
                }
            })
            .with_hover_end(move |ctx| {
                if let Some(state) = end.upgrade() {
                    set_active_pin(&mut state.borrow_mut(), ctx.scene, None, scale);
                }
            })
            .with_drag(move |ctx, _| {
                if let Some(state) = drag.upgrade() {
                    draw_connector(&state.borrow(), ctx);
                }
            })
            .with_press_up(move |ctx, _| {
                if let Some(line) = release.upgrade().and_then(|state| state.borrow().line) {
                    ctx.scene.set_visible(line, false);
                }
            }),
    );
    id
}

fn set_active_pin(state: &mut VisualState, scene: &mut Scene, pin: Option<SceneNodeId>, scale: f32) {
    if let Some(previous) = state.active_pin.take() {
        scene.set_scale(previous, 1.0);
        if let Some(line) = state.line {
            reset_connector(scene, line);
        }
    }
    if let Some(pin) = pin {
        scene.set_scale(pin, scale);
        state.active_pin = Some(pin);
    }
}

/// Collapse and hide the connector
fn reset_connector(scene: &mut Scene, line: SceneNodeId) {
    if let Some(node) = scene.node_mut(line) {
        if let Shape::Line { from, to, .. } = &mut node.shape {
            *from = Vec2::ZERO;
            *to = Vec2::ZERO;
        }
        node.visible = false;
    }
}

/// Stretch the connector from the active pin to the pointer
fn draw_connector(state: &VisualState, ctx: &mut PointerContext<'_>) {
    let (Some(pin), Some(line)) = (state.active_pin, state.line) else {
        return;
    };
    let (Some(pin_world), Some(line_transform)) =
        (ctx.scene.world_position(pin), ctx.scene.world_transform(line))
    else {
        return;
    };
    let start = line_transform.inverse(pin_world);
    let end = line_transform.inverse(ctx.pointer.world);

    if let Some(node) = ctx.scene.node_mut(line) {
        if let Shape::Line { from, to, .. } = &mut node.shape {
            *from = start;
            *to = end;
        }
        node.visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;
    use std::time::{Duration, Instant};
    use wirecanvas_runtime::{
        InputEvent, InputQueue, MonospaceMeasurer, OrthographicView, PointerButton, Runtime,
        RuntimeConfig, SceneRenderer, TextMeasurer,
    };

    struct NullRenderer;

    impl SceneRenderer for NullRenderer {
        fn render(&mut self, _scene: &Scene, _view: &OrthographicView) {}
    }

    /// Records whether the layout already ran each time a text is measured
    struct WatchingMeasurer {
        inner: MonospaceMeasurer,
        state: NodeVisualState,
        seen: Vec<bool>,
    }

    impl TextMeasurer for WatchingMeasurer {
        fn measure(&mut self, text: &TextShape) -> Vec2 {
            self.seen.push(self.state.is_laid_out());
            self.inner.measure(text)
        }
    }

    struct Rig {
        runtime: Runtime,
        input: InputQueue,
        now: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let input = InputQueue::new();
            let runtime = Runtime::new(
                RuntimeConfig::default(),
                Vec2::new(200.0, 100.0),
                Box::new(input.clone()),
            )
            .unwrap();
            Self {
                runtime,
                input,
                now: Instant::now(),
            }
        }

        fn frame(&mut self) {
            self.now += Duration::from_millis(20);
            self.runtime
                .frame(self.now, &mut MonospaceMeasurer::default(), &mut NullRenderer);
        }

        fn screen_of(&self, id: SceneNodeId) -> Pos2 {
            let world = self.runtime.scene().world_position(id).unwrap();
            self.runtime.camera().view().world_to_screen(world)
        }
    }

    fn clamp_node() -> NodeData {
        NodeData::new("Clamp")
            .with_input(PinData::data("Value", "float"))
            .with_input(PinData::data("Min", "float"))
            .with_input(PinData::data("Max", "float"))
            .with_output(PinData::data("Result", "float"))
    }

    #[test]
    fn test_layout_waits_for_all_texts() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(clamp_node());
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));

        assert!(!state.is_laid_out());
        assert_eq!(rig.runtime.scene().pending_text_requests(), 5);

        let mut measurer = WatchingMeasurer {
            inner: MonospaceMeasurer::default(),
            state: state.clone(),
            seen: Vec::new(),
        };
        rig.runtime.frame(Instant::now(), &mut measurer, &mut NullRenderer);

        assert_eq!(measurer.seen, vec![false; 5]);
        assert!(state.is_laid_out());
        assert_eq!(state.input_pins().len(), 3);
        assert_eq!(state.output_pins().len(), 1);
    }

    #[test]
    fn test_io_backdrop_fits_all_rows() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(clamp_node());
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));
        rig.frame();

        let layout = state.layout().unwrap();
        assert!(layout.row_height > 0.0);
        assert!(layout.io_size.y >= 3.0 * layout.row_height);

        let io = state.io_backdrop().unwrap();
        match &rig.runtime.scene().node(io).unwrap().shape {
            Shape::Rect { size, .. } => assert_eq!(*size, layout.io_size),
            other => panic!("unexpected io backdrop shape {other:?}"),
        }
        for label in rig.runtime.scene().children(io) {
            assert!(rig.runtime.scene().node(*label).unwrap().visible);
        }
    }

    #[test]
    fn test_node_without_pins() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(NodeData::new("Solo"));
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));
        rig.frame();

        let layout = state.layout().unwrap();
        assert!(state.input_pins().is_empty());
        assert_eq!(layout.io_size.y, 10.0);
    }

    #[test]
    fn test_removed_before_measure_never_lays_out() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(clamp_node());
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));

        let root = state.root().unwrap();
        rig.runtime.scene_mut().remove_subtree(root);
        rig.frame();
        rig.frame();

        assert!(!state.is_laid_out());
        assert_eq!(rig.runtime.scene().pending_text_requests(), 0);
    }

    #[test]
    fn test_title_drag_moves_node() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(clamp_node());
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));

        rig.input.push(InputEvent::PointerMove { x: 100.0, y: 50.0 });
        rig.frame();
        assert_eq!(rig.runtime.pointer().hovered(), state.title_backdrop());

        rig.input.push(InputEvent::PointerDown { button: PointerButton::Primary });
        rig.input.push(InputEvent::PointerMove { x: 150.0, y: 50.0 });
        rig.input.push(InputEvent::PointerUp { button: PointerButton::Primary });
        rig.frame();

        let root = state.root().unwrap();
        assert_eq!(rig.runtime.scene().node(root).unwrap().position, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_pin_drag_draws_connector() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(clamp_node());
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));
        rig.frame();

        let pin = state.input_pins()[0];
        let screen = rig.screen_of(pin);
        rig.input.push(InputEvent::PointerMove { x: screen.x, y: screen.y });
        rig.frame();
        assert_eq!(state.active_pin(), Some(pin));
        assert_eq!(rig.runtime.scene().node(pin).unwrap().scale, 1.2);

        let pin_world = rig.runtime.scene().world_position(pin).unwrap();
        rig.input.push(InputEvent::PointerDown { button: PointerButton::Primary });
        rig.input.push(InputEvent::PointerMove {
            x: screen.x - 20.0,
            y: screen.y,
        });
        rig.frame();

        let line = state.line().unwrap();
        let node = rig.runtime.scene().node(line).unwrap();
        assert!(node.visible);
        let Shape::Line { from, to, .. } = &node.shape else {
            panic!("connector is not a line");
        };
        assert!((*from - pin_world.to_vec2()).length() < 1e-3);
        assert!((*to - (pin_world.to_vec2() - Vec2::new(20.0, 0.0))).length() < 1e-3);

        rig.input.push(InputEvent::PointerUp { button: PointerButton::Primary });
        rig.input.push(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        rig.frame();

        assert!(!rig.runtime.scene().node(line).unwrap().visible);
        assert_eq!(state.active_pin(), None);
        assert_eq!(rig.runtime.scene().node(pin).unwrap().scale, 1.0);
    }

    #[test]
    fn test_switching_pins_resets_connector() {
        let mut rig = Rig::new();
        let visual = NodeVisual::new(clamp_node());
        let state = visual.state();
        rig.runtime.add_object(Box::new(visual));
        rig.frame();

        let first = state.input_pins()[0];
        let second = state.input_pins()[1];
        let screen = rig.screen_of(first);
        rig.input.push(InputEvent::PointerMove { x: screen.x, y: screen.y });
        rig.frame();
        assert_eq!(state.active_pin(), Some(first));

        let line = state.line().unwrap();
        if let Some(node) = rig.runtime.scene_mut().node_mut(line) {
            if let Shape::Line { from, to, .. } = &mut node.shape {
                *from = Vec2::new(-70.0, 0.0);
                *to = Vec2::new(-120.0, 30.0);
            }
            node.visible = true;
        }

        let screen = rig.screen_of(second);
        rig.input.push(InputEvent::PointerMove { x: screen.x, y: screen.y });
        rig.frame();

        assert_eq!(state.active_pin(), Some(second));
        assert_eq!(rig.runtime.scene().node(first).unwrap().scale, 1.0);
        assert_eq!(rig.runtime.scene().node(second).unwrap().scale, 1.2);
        let node = rig.runtime.scene().node(line).unwrap();
        assert!(!node.visible);
        let Shape::Line { from, to, .. } = &node.shape else {
            panic!("connector is not a line");
        };
        assert_eq!(*from, Vec2::ZERO);
        assert_eq!(*to, Vec2::ZERO);
    }
}
