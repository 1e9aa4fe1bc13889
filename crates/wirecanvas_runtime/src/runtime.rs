// SPDX-License-Identifier: MIT OR Apache-2.0
//! The frame loop: object registry, frame throttling, input routing,
//! rendering and deferred object removal.

use crate::camera::{CameraController, OrthographicView};
use crate::config::{ConfigError, RuntimeConfig};
use crate::debug::DebugOverlay;
use crate::input::{InputEvent, InputSource, PointerButton};
use crate::object::{FrameContext, FrameTime, ObjectHandle, ObjectId, SceneObject, StartContext};
use crate::pointer::{PointerDispatch, PointerTargets};
use crate::scene::{Scene, Shape};
use crate::text::TextMeasurer;
use egui::Vec2;
use indexmap::{IndexMap, IndexSet};
use std::time::{Duration, Instant};

/// Draws the scene through the host's graphics API
pub trait SceneRenderer {
    /// Draw every visible node as seen through `view`
    fn render(&mut self, scene: &Scene, view: &OrthographicView);
}

/// What a call to [`Runtime::frame`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Too early for the frame-rate cap; nothing ran
    Skipped,
    /// The frame ran and the scene was rendered
    Rendered,
}

struct ObjectEntry {
    object: Box<dyn SceneObject>,
    handle: ObjectHandle,
}

/// Owns the scene, its objects and the services driving them
pub struct Runtime {
    config: RuntimeConfig,
    scene: Scene,
    camera: CameraController,
    pointer: PointerDispatch,
    debug: DebugOverlay,
    input: Box<dyn InputSource>,
    objects: IndexMap<ObjectId, ObjectEntry>,
    tickables: IndexSet<ObjectId>,
    started_at: Option<Instant>,
    last_frame: Option<Instant>,
    time: FrameTime,
}

impl Runtime {
    /// Build the scene, camera, debug overlay and pointer dispatch
    pub fn new(
        config: RuntimeConfig,
        canvas: Vec2,
        input: Box<dyn InputSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut scene = Scene::new();
        let mut camera = CameraController::new(&config, canvas);
        camera.attach_background(&mut scene);
        let pointer = PointerDispatch::new(config.debug_pointer);

        tracing::debug!("Runtime created for a {}x{} canvas", canvas.x, canvas.y);

        Ok(Self {
            config,
            scene,
            camera,
            pointer,
            debug: DebugOverlay::new(),
            input,
            objects: IndexMap::new(),
            tickables: IndexSet::new(),
            started_at: None,
            last_frame: None,
            time: FrameTime::default(),
        })
    }

    /// Start the clock; called by the first [`Runtime::frame`] if not done before
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            tracing::info!(
                "Runtime started, frame cap {} fps",
                self.config.frame_rate_cap
            );
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Scene graph
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene graph
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Camera controller
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Pointer dispatch state
    pub fn pointer(&self) -> &PointerDispatch {
        &self.pointer
    }

    /// Debug overlay
    pub fn debug(&self) -> &DebugOverlay {
        &self.debug
    }

    /// Mutable debug overlay
    pub fn debug_mut(&mut self) -> &mut DebugOverlay {
        &mut self.debug
    }

    /// Timing of the last accepted frame
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Number of registered objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of registered objects that tick
    pub fn tickable_count(&self) -> usize {
        self.tickables.len()
    }

    /// Whether an object is still registered
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Handle of a registered object
    pub fn handle(&self, id: ObjectId) -> Option<&ObjectHandle> {
        self.objects.get(&id).map(|entry| &entry.handle)
    }

    /// Register an object, attach its root under the scene and start it
    pub fn add_object(&mut self, mut object: Box<dyn SceneObject>) -> ObjectId {
        let id = ObjectId::new();
        let root = self.scene.root();
        let object_root = self.scene.spawn(Some(root), object.name(), Shape::Group);
        let handle = ObjectHandle::new(id, object_root);

        if object.as_tickable().is_some() {
            self.tickables.insert(id);
        }

        let mut ctx = StartContext {
            handle: handle.clone(),
            scene: &mut self.scene,
            debug: &mut self.debug,
        };
        object.start(&mut ctx);
        tracing::debug!("Started object '{}' ({:?})", object.name(), id);

        self.objects.insert(id, ObjectEntry { object, handle });
        id
    }

    /// Mark an object for removal at the end of the next frame
    pub fn destroy(&mut self, id: ObjectId) -> bool {
        match self.objects.get(&id) {
            Some(entry) => {
                entry.handle.destroy();
                true
            }
            None => false,
        }
    }

    /// Whether enough time passed since the last accepted frame
    pub fn frame_due(&self, now: Instant) -> bool {
        match self.last_frame {
            Some(last) => {
                now.saturating_duration_since(last)
                    >= Duration::from_secs_f64(self.config.frame_interval())
            }
            None => true,
        }
    }

    /// Run one frame if the frame-rate cap allows it
    pub fn frame(
        &mut self,
        now: Instant,
        measurer: &mut dyn TextMeasurer,
        renderer: &mut dyn SceneRenderer,
    ) -> FrameOutcome {
        self.start(now);
        if !self.frame_due(now) {
            return FrameOutcome::Skipped;
        }

        let delta = self
            .last_frame
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f64());
        let elapsed = self
            .started_at
            .map_or(0.0, |start| now.saturating_duration_since(start).as_secs_f64());
        self.last_frame = Some(now);
        self.time = FrameTime {
            delta,
            elapsed,
            frame: self.time.frame + 1,
        };

        self.process_input();
        self.scene.resolve_text(measurer);

        // Expire first so messages posted this frame stay visible until the next one
        self.debug.tick(elapsed);
        if self.config.debug_camera {
            self.camera.post_debug(&mut self.debug);
        }
        self.pointer.tick(PointerTargets {
            scene: &mut self.scene,
            camera: &mut self.camera,
            debug: &mut self.debug,
        });

        self.tick_objects();

        renderer.render(&self.scene, &self.camera.view());

        self.sweep();
        FrameOutcome::Rendered
    }

    /// Route one input event immediately
    pub fn dispatch_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::AuxClick { button: PointerButton::Middle } => {
                self.camera.reset_zoom(&mut self.scene);
                return;
            }
            InputEvent::AuxClick { .. } => return,
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                return;
            }
            _ => {}
        }

        let targets = PointerTargets {
            scene: &mut self.scene,
            camera: &mut self.camera,
            debug: &mut self.debug,
        };
        match event {
            InputEvent::PointerMove { x, y } => self.pointer.pointer_move(targets, x, y),
            InputEvent::PointerDown { button } => self.pointer.pointer_down(targets, button),
            InputEvent::PointerUp { button } => self.pointer.pointer_up(targets, button),
            InputEvent::Wheel { delta_y } => self.pointer.wheel(targets, delta_y),
            InputEvent::AuxClick { .. } | InputEvent::Resize { .. } => {}
        }
    }

    /// Resize the canvas and recompute the camera frustum
    pub fn resize(&mut self, width: f32, height: f32) {
        tracing::debug!("Canvas resized to {}x{}", width, height);
        self.camera.resize(&mut self.scene, width, height);
    }

    fn process_input(&mut self) {
        while let Some(event) = self.input.poll() {
            self.dispatch_input(event);
        }
    }

    fn tick_objects(&mut self) {
        let pointer = self.pointer.snapshot();
        let ids: Vec<ObjectId> = self.tickables.iter().copied().collect();
        for id in ids {
            let Some(entry) = self.objects.get_mut(&id) else {
                continue;
            };
            let Some(tickable) = entry.object.as_tickable() else {
                continue;
            };
            let mut ctx = FrameContext {
                scene: &mut self.scene,
                camera: &self.camera,
                pointer,
                debug: &mut self.debug,
                time: self.time,
            };
            tickable.tick(&mut ctx);
        }
    }

    /// Remove every object marked for destruction
    fn sweep(&mut self) {
        let doomed: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, entry)| entry.handle.is_pending_destroy())
            .map(|(id, _)| *id)
            .collect();

        for id in doomed {
            let Some(mut entry) = self.objects.shift_remove(&id) else {
                continue;
            };
            self.scene.remove_subtree(entry.handle.root());
            self.tickables.shift_remove(&id);
            entry.object.end(&mut self.scene);
            tracing::debug!("Removed object '{}' ({:?})", entry.object.name(), id);
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("objects", &self.objects.len())
            .field("tickables", &self.tickables.len())
            .field("time", &self.time)
            .finish()
    }
}
