// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer dispatch: turns raw pointer input into hover, press, drag and zoom
//! callbacks on whichever interactive node is under the pointer.
//!
//! The world position is the camera center plus the normalized pointer
//! position times the frustum half-extents. This assumes the camera never
//! rotates and the viewport has no offset.

use crate::camera::CameraController;
use crate::capability::{is_pointer_event_listener, DragDelta, PointerContext, PointerListener};
use crate::debug::DebugOverlay;
use crate::input::PointerButton;
use crate::scene::{Scene, SceneNodeId};
use egui::{Pos2, Vec2};

/// Pointer state shared with callbacks and ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSnapshot {
    /// Normalized position in [-1, 1], Y up
    pub ndc: Vec2,
    /// Normalized position before the last move
    pub previous_ndc: Vec2,
    /// Position in world space
    pub world: Pos2,
    /// Whether a button is held
    pub dragging: bool,
}

impl Default for PointerSnapshot {
    fn default() -> Self {
        Self {
            ndc: Vec2::ZERO,
            previous_ndc: Vec2::ZERO,
            world: Pos2::ZERO,
            dragging: false,
        }
    }
}

/// Borrowed runtime parts pointer callbacks may touch
pub struct PointerTargets<'a> {
    /// Scene graph
    pub scene: &'a mut Scene,
    /// Camera controller
    pub camera: &'a mut CameraController,
    /// Debug overlay
    pub debug: &'a mut DebugOverlay,
}

/// Routes pointer input to the hovered node's [`PointerListener`]
#[derive(Debug, Default)]
pub struct PointerDispatch {
    state: PointerSnapshot,
    hovered: Option<SceneNodeId>,
    debug_pointer: bool,
}

impl PointerDispatch {
    /// Create a dispatcher with the pointer at the canvas center
    pub fn new(debug_pointer: bool) -> Self {
        Self {
            debug_pointer,
            ..Self::default()
        }
    }

    /// Current pointer state
    pub fn snapshot(&self) -> PointerSnapshot {
        self.state
    }

    /// Node that currently receives pointer callbacks
    pub fn hovered(&self) -> Option<SceneNodeId> {
        self.hovered
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Pointer moved to canvas pixel `(x, y)`
    pub fn pointer_move(&mut self, targets: PointerTargets<'_>, x: f32, y: f32) {
        let canvas = targets.camera.canvas();
        if canvas.x <= 0.0 || canvas.y <= 0.0 {
            return;
        }

        self.state.previous_ndc = self.state.ndc;
        self.state.ndc = Vec2::new(x / canvas.x * 2.0 - 1.0, -(y / canvas.y * 2.0 - 1.0));
        self.update_world(targets.camera);

        if !self.state.dragging {
            return;
        }
        let pixels = (self.state.ndc - self.state.previous_ndc) * (canvas / 2.0);
        let delta = DragDelta {
            pixels,
            world: pixels / targets.camera.zoom_scale(),
        };
        self.dispatch(targets, |listener, ctx| {
            if let Some(on_drag) = listener.on_drag.as_mut() {
                on_drag(ctx, delta);
            }
        });
    }

    /// Button pressed: start dragging and notify the hovered node
    pub fn pointer_down(&mut self, targets: PointerTargets<'_>, button: PointerButton) {
        self.state.dragging = true;
        self.dispatch(targets, |listener, ctx| {
            if let Some(on_press_down) = listener.on_press_down.as_mut() {
                on_press_down(ctx, button);
            }
        });
    }

    /// Button released: stop dragging and notify the hovered node
    pub fn pointer_up(&mut self, targets: PointerTargets<'_>, button: PointerButton) {
        self.state.dragging = false;
        self.dispatch(targets, |listener, ctx| {
            if let Some(on_press_up) = listener.on_press_up.as_mut() {
                on_press_up(ctx, button);
            }
        });
    }

    /// Wheel scrolled; the raw delta goes to the hovered node's zoom callback
    pub fn wheel(&mut self, targets: PointerTargets<'_>, delta_y: f32) {
        self.dispatch(targets, |listener, ctx| {
            if let Some(on_zoom) = listener.on_zoom.as_mut() {
                on_zoom(ctx, delta_y);
            }
        });
    }

    /// Re-pick the node under the pointer and fire hover transitions.
    ///
    /// Does nothing while dragging, so the drag source keeps receiving events.
    pub fn tick(&mut self, targets: PointerTargets<'_>) {
        // The camera may have moved since the last pointer event
        self.update_world(targets.camera);

        if self.debug_pointer {
            targets.debug.add_message(format!(
                "pointer {:.1}, {:.1}",
                self.state.world.x, self.state.world.y
            ));
        }

        if self.state.dragging {
            return;
        }

        let hit = targets
            .scene
            .hit_test(self.state.world)
            .filter(|id| is_pointer_event_listener(targets.scene.listener(*id)));
        if hit == self.hovered {
            return;
        }

        let PointerTargets { scene, camera, debug } = targets;
        if let Some(previous) = self.hovered {
            self.invoke(scene, camera, debug, previous, |listener, ctx| {
                if let Some(on_hover_end) = listener.on_hover_end.as_mut() {
                    on_hover_end(ctx);
                }
            });
        }
        if let Some(next) = hit {
            self.invoke(scene, camera, debug, next, |listener, ctx| {
                if let Some(on_hover_begin) = listener.on_hover_begin.as_mut() {
                    on_hover_begin(ctx);
                }
            });
        }
        tracing::trace!("Hover {:?} -> {:?}", self.hovered, hit);
        self.hovered = hit;
    }

    fn update_world(&mut self, camera: &CameraController) {
        let view = camera.view();
        self.state.world = Pos2::new(
            view.position.x + self.state.ndc.x * view.right,
            view.position.y + self.state.ndc.y * view.top,
        );
    }

    fn dispatch(
        &self,
        targets: PointerTargets<'_>,
        f: impl FnOnce(&mut PointerListener, &mut PointerContext<'_>),
    ) {
        let Some(target) = self.hovered else {
            return;
        };
        let PointerTargets { scene, camera, debug } = targets;
        self.invoke(scene, camera, debug, target, f);
    }

    fn invoke(
        &self,
        scene: &mut Scene,
        camera: &mut CameraController,
        debug: &mut DebugOverlay,
        target: SceneNodeId,
        f: impl FnOnce(&mut PointerListener, &mut PointerContext<'_>),
    ) {
        let Some(mut listener) = scene.take_listener(target) else {
            return;
        };
        let mut ctx = PointerContext {
            scene: &mut *scene,
            camera,
            debug,
            pointer: self.state,
            target,
        };
        f(&mut listener, &mut ctx);
        scene.restore_listener(target, listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::scene::Shape;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Rig {
        scene: Scene,
        camera: CameraController,
        debug: DebugOverlay,
        pointer: PointerDispatch,
        log: Log,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                camera: CameraController::new(&RuntimeConfig::default(), Vec2::new(200.0, 100.0)),
                debug: DebugOverlay::new(),
                pointer: PointerDispatch::new(false),
                log: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn targets(&mut self) -> PointerTargets<'_> {
            PointerTargets {
                scene: &mut self.scene,
                camera: &mut self.camera,
                debug: &mut self.debug,
            }
        }

        /// Box of 20x20 world units centered on `center` that logs every callback
        fn boxed(&mut self, name: &'static str, center: Vec2) -> SceneNodeId {
            let root = self.scene.root();
            let id = self.scene.spawn(
                Some(root),
                name,
                Shape::Rect {
                    size: Vec2::splat(20.0),
                    fill: egui::Color32::RED,
                    rounding: 0.0,
                },
            );
            self.scene.set_position(id, center);
            let (a, b, c, d) = (self.log.clone(), self.log.clone(), self.log.clone(), self.log.clone());
            self.scene.set_listener(
                id,
                PointerListener::new()
                    .with_hover_begin(move |_| a.borrow_mut().push(format!("{name}:begin")))
                    .with_hover_end(move |_| b.borrow_mut().push(format!("{name}:end")))
                    .with_drag(move |_, delta| {
                        c.borrow_mut().push(format!("{name}:drag {} {}", delta.pixels.x, delta.pixels.y))
                    })
                    .with_zoom(move |_, delta| d.borrow_mut().push(format!("{name}:zoom {delta}"))),
            );
            id
        }

        fn move_to(&mut self, x: f32, y: f32) {
            let mut pointer = std::mem::take(&mut self.pointer);
            pointer.pointer_move(self.targets(), x, y);
            self.pointer = pointer;
        }

        fn tick(&mut self) {
            let mut pointer = std::mem::take(&mut self.pointer);
            pointer.tick(self.targets());
            self.pointer = pointer;
        }

        fn down(&mut self) {
            let mut pointer = std::mem::take(&mut self.pointer);
            pointer.pointer_down(self.targets(), PointerButton::Primary);
            self.pointer = pointer;
        }

        fn up(&mut self) {
            let mut pointer = std::mem::take(&mut self.pointer);
            pointer.pointer_up(self.targets(), PointerButton::Primary);
            self.pointer = pointer;
        }

        fn entries(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    #[test]
    fn test_normalized_and_world_position() {
        let mut rig = Rig::new();
        rig.move_to(150.0, 25.0);
        let snapshot = rig.pointer.snapshot();
        assert_eq!(snapshot.ndc, Vec2::new(0.5, 0.5));
        assert_eq!(snapshot.world, Pos2::new(50.0, 25.0));
    }

    #[test]
    fn test_hover_begin_fires_once() {
        let mut rig = Rig::new();
        let a = rig.boxed("a", Vec2::ZERO);

        rig.move_to(100.0, 50.0);
        rig.tick();
        rig.move_to(102.0, 51.0);
        rig.tick();
        rig.tick();

        assert_eq!(rig.entries(), vec!["a:begin"]);
        assert_eq!(rig.pointer.hovered(), Some(a));
    }

    #[test]
    fn test_hover_end_precedes_next_begin() {
        let mut rig = Rig::new();
        rig.boxed("a", Vec2::ZERO);
        rig.boxed("b", Vec2::new(50.0, 0.0));

        rig.move_to(100.0, 50.0);
        rig.tick();
        rig.move_to(150.0, 50.0);
        rig.tick();

        assert_eq!(rig.entries(), vec!["a:begin", "a:end", "b:begin"]);
    }

    #[test]
    fn test_hover_suppressed_while_dragging() {
        let mut rig = Rig::new();
        let a = rig.boxed("a", Vec2::ZERO);
        rig.boxed("b", Vec2::new(50.0, 0.0));

        rig.move_to(100.0, 50.0);
        rig.tick();
        rig.down();
        rig.move_to(150.0, 50.0);
        rig.tick();

        assert_eq!(rig.entries(), vec!["a:begin", "a:drag 50 0"]);
        assert_eq!(rig.pointer.hovered(), Some(a));

        rig.up();
        rig.tick();
        assert_eq!(rig.entries()[2..], ["a:end".to_string(), "b:begin".to_string()]);
    }

    #[test]
    fn test_drag_delta_is_in_pixels_with_y_up() {
        let mut rig = Rig::new();
        rig.boxed("a", Vec2::ZERO);
        rig.camera.zoom(&mut rig.scene, 1.0);

        rig.move_to(100.0, 50.0);
        rig.tick();
        rig.down();
        rig.move_to(125.0, 25.0);

        assert_eq!(rig.entries().last().unwrap(), "a:drag 25 25");
    }

    #[test]
    fn test_non_interactive_hit_clears_hover() {
        let mut rig = Rig::new();
        rig.boxed("a", Vec2::ZERO);
        let root = rig.scene.root();
        let plain = rig.scene.spawn(
            Some(root),
            "plain",
            Shape::Rect {
                size: Vec2::splat(20.0),
                fill: egui::Color32::BLUE,
                rounding: 0.0,
            },
        );
        rig.scene.set_z(plain, 1.0);

        rig.move_to(100.0, 50.0);
        rig.tick();
        assert!(rig.entries().is_empty());
        assert_eq!(rig.pointer.hovered(), None);
    }

    #[test]
    fn test_wheel_forwards_raw_delta() {
        let mut rig = Rig::new();
        rig.boxed("a", Vec2::ZERO);
        rig.move_to(100.0, 50.0);
        rig.tick();

        let mut pointer = std::mem::take(&mut rig.pointer);
        pointer.wheel(rig.targets(), 120.0);
        rig.pointer = pointer;

        assert_eq!(rig.entries().last().unwrap(), "a:zoom 120");
    }

    #[test]
    fn test_listener_replaced_during_callback_is_kept() {
        let mut rig = Rig::new();
        let root = rig.scene.root();
        let node = rig.scene.spawn(
            Some(root),
            "swap",
            Shape::Circle {
                radius: 5.0,
                fill: egui::Color32::GREEN,
            },
        );
        rig.scene.set_listener(
            node,
            PointerListener::new().with_hover_begin(|ctx| {
                let target = ctx.target;
                ctx.scene
                    .set_listener(target, PointerListener::new().with_hover_end(|_| {}));
            }),
        );

        rig.move_to(100.0, 50.0);
        rig.tick();
        let listener = rig.scene.listener(node).unwrap();
        assert!(listener.on_hover_begin.is_none());
        assert!(listener.on_hover_end.is_some());
    }
}
