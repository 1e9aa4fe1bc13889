// SPDX-License-Identifier: MIT OR Apache-2.0
//! Orthographic camera with a background pan/zoom plane.

use crate::capability::PointerListener;
use crate::config::RuntimeConfig;
use crate::debug::DebugOverlay;
use crate::scene::{Scene, SceneNodeId, Shape};
use egui::{Color32, Pos2, Vec2};

/// Depth of the background plane, behind everything else
pub const BACKGROUND_Z: f32 = -100.0;

const BACKGROUND_FILL: Color32 = Color32::from_rgb(30, 30, 34);
const GRID_LINE_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 60, 100);

/// Visible world rectangle of the camera, used for rendering and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicView {
    /// Camera center in world space
    pub position: Pos2,
    /// Left frustum edge relative to the center
    pub left: f32,
    /// Right frustum edge relative to the center
    pub right: f32,
    /// Top frustum edge relative to the center
    pub top: f32,
    /// Bottom frustum edge relative to the center
    pub bottom: f32,
    /// Zoom scale (canvas pixels per world unit)
    pub zoom: f32,
    /// Canvas size in pixels
    pub canvas: Vec2,
}

impl OrthographicView {
    /// Map a world point to canvas pixels (origin top-left, Y down)
    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        if width == 0.0 || height == 0.0 {
            return Pos2::ZERO;
        }
        Pos2::new(
            (world.x - self.position.x - self.left) / width * self.canvas.x,
            (self.top - (world.y - self.position.y)) / height * self.canvas.y,
        )
    }

    /// Map canvas pixels to a world point
    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        if self.canvas.x == 0.0 || self.canvas.y == 0.0 {
            return self.position;
        }
        Pos2::new(
            self.position.x + self.left + screen.x / self.canvas.x * (self.right - self.left),
            self.position.y + self.top - screen.y / self.canvas.y * (self.top - self.bottom),
        )
    }
}

/// Pans and zooms an orthographic camera within clamped bounds
#[derive(Debug, Clone)]
pub struct CameraController {
    position: Pos2,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    wheel_sensitivity: f32,
    grid_spacing: f32,
    canvas: Vec2,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    background: Option<SceneNodeId>,
}

impl CameraController {
    /// Create a camera centered on the world origin at zoom 1
    pub fn new(config: &RuntimeConfig, canvas: Vec2) -> Self {
        let mut camera = Self {
            position: Pos2::ZERO,
            zoom: 1.0,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            wheel_sensitivity: config.wheel_sensitivity,
            grid_spacing: config.grid_spacing,
            canvas,
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            background: None,
        };
        camera.update_frustum();
        camera
    }

    /// Create the background plane under the scene root.
    ///
    /// Dragging the plane pans the camera, the wheel zooms it.
    pub fn attach_background(&mut self, scene: &mut Scene) -> SceneNodeId {
        if let Some(existing) = self.background.filter(|id| scene.contains(*id)) {
            return existing;
        }

        let root = scene.root();
        let plane = scene.spawn(
            Some(root),
            "camera background",
            Shape::Grid {
                size: self.frustum_size(),
                spacing: self.grid_spacing,
                background: BACKGROUND_FILL,
                line_color: GRID_LINE_COLOR,
            },
        );
        scene.set_z(plane, BACKGROUND_Z);

        let sensitivity = self.wheel_sensitivity;
        scene.set_listener(
            plane,
            PointerListener::new()
                .with_drag(|ctx, delta| {
                    ctx.camera.move_by(ctx.scene, -delta.pixels.x, -delta.pixels.y);
                })
                .with_zoom(move |ctx, delta| {
                    ctx.camera.zoom(ctx.scene, -delta * sensitivity);
                }),
        );

        self.background = Some(plane);
        self.sync_background(scene);
        plane
    }

    /// Background plane node, once attached
    pub fn background(&self) -> Option<SceneNodeId> {
        self.background
    }

    /// Camera center in world space
    pub fn position(&self) -> Pos2 {
        self.position
    }

    /// Current zoom scale
    pub fn zoom_scale(&self) -> f32 {
        self.zoom
    }

    /// Canvas size in pixels
    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    /// Current frustum and transform
    pub fn view(&self) -> OrthographicView {
        OrthographicView {
            position: self.position,
            left: self.left,
            right: self.right,
            top: self.top,
            bottom: self.bottom,
            zoom: self.zoom,
            canvas: self.canvas,
        }
    }

    /// Shift the camera by a pixel delta; the world moves 1:1 with the pointer at any zoom
    pub fn move_by(&mut self, scene: &mut Scene, x_pixels: f32, y_pixels: f32) {
        self.position += Vec2::new(x_pixels, y_pixels) / self.zoom;
        self.sync_background(scene);
    }

    /// Multiply the zoom scale by `1 + delta`, clamped to the configured bounds
    pub fn zoom(&mut self, scene: &mut Scene, delta: f32) {
        self.zoom = (self.zoom * (1.0 + delta)).clamp(self.min_zoom, self.max_zoom);
        self.update_frustum();
        self.sync_background(scene);
        tracing::trace!("Camera zoom {:.3}", self.zoom);
    }

    /// Return to zoom 1
    pub fn reset_zoom(&mut self, scene: &mut Scene) {
        self.zoom = 1.0;
        self.update_frustum();
        self.sync_background(scene);
        tracing::debug!("Camera zoom reset");
    }

    /// Adopt a new canvas size, keeping position and zoom
    pub fn resize(&mut self, scene: &mut Scene, width: f32, height: f32) {
        self.canvas = Vec2::new(width, height);
        self.update_frustum();
        self.sync_background(scene);
    }

    /// Post the frustum edges to the debug overlay
    pub fn post_debug(&self, debug: &mut DebugOverlay) {
        debug.add_message(format!(
            "camera left {:.1} right {:.1} top {:.1} bottom {:.1}",
            self.left, self.right, self.top, self.bottom
        ));
    }

    fn update_frustum(&mut self) {
        let half = self.canvas / (2.0 * self.zoom);
        self.left = -half.x;
        self.right = half.x;
        self.top = half.y;
        self.bottom = -half.y;
    }

    fn frustum_size(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.top - self.bottom)
    }

    /// Keep the background plane centered on the camera and covering the frustum
    fn sync_background(&self, scene: &mut Scene) {
        let Some(plane) = self.background else {
            return;
        };
        let size = self.frustum_size();
        if let Some(node) = scene.node_mut(plane) {
            node.position = self.position.to_vec2();
            if let Shape::Grid { size: plane_size, .. } = &mut node.shape {
                *plane_size = size;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> (CameraController, Scene) {
        let mut scene = Scene::new();
        let mut camera = CameraController::new(&RuntimeConfig::default(), Vec2::new(800.0, 600.0));
        camera.attach_background(&mut scene);
        (camera, scene)
    }

    fn plane_size(camera: &CameraController, scene: &Scene) -> Vec2 {
        match scene.node(camera.background().unwrap()).map(|n| &n.shape) {
            Some(Shape::Grid { size, .. }) => *size,
            other => panic!("unexpected background shape {other:?}"),
        }
    }

    #[test]
    fn test_zero_zoom_keeps_frustum() {
        let (mut camera, mut scene) = camera();
        camera.zoom(&mut scene, 0.0);
        let view = camera.view();
        assert_eq!(view.left, -400.0);
        assert_eq!(view.right, 400.0);
        assert_eq!(view.top, 300.0);
        assert_eq!(view.bottom, -300.0);
        assert_eq!(plane_size(&camera, &scene), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (mut camera, mut scene) = camera();
        for _ in 0..100 {
            camera.zoom(&mut scene, 0.5);
            assert!(camera.zoom_scale() <= 2.0);
        }
        assert_eq!(camera.zoom_scale(), 2.0);

        for _ in 0..100 {
            camera.zoom(&mut scene, -0.5);
            assert!(camera.zoom_scale() >= 0.1);
        }
        assert_eq!(camera.zoom_scale(), 0.1);
    }

    #[test]
    fn test_reset_zoom_is_exact() {
        let (mut camera, mut scene) = camera();
        camera.zoom(&mut scene, 0.37);
        camera.zoom(&mut scene, -0.12);
        camera.reset_zoom(&mut scene);
        assert_eq!(camera.zoom_scale(), 1.0);
        assert_eq!(camera.view().right, 400.0);
    }

    #[test]
    fn test_zoom_shrinks_frustum_and_plane() {
        let (mut camera, mut scene) = camera();
        camera.zoom(&mut scene, 1.0);
        assert_eq!(camera.zoom_scale(), 2.0);
        assert_eq!(camera.view().right, 200.0);
        assert_eq!(plane_size(&camera, &scene), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_move_scales_with_zoom() {
        let (mut camera, mut scene) = camera();
        camera.zoom(&mut scene, 1.0);
        camera.move_by(&mut scene, 10.0, -20.0);
        assert_eq!(camera.position(), Pos2::new(5.0, -10.0));

        let plane = scene.node(camera.background().unwrap()).unwrap();
        assert_eq!(plane.position, Vec2::new(5.0, -10.0));
    }

    #[test]
    fn test_resize_keeps_position() {
        let (mut camera, mut scene) = camera();
        camera.move_by(&mut scene, 30.0, 40.0);
        camera.resize(&mut scene, 1000.0, 500.0);
        assert_eq!(camera.position(), Pos2::new(30.0, 40.0));
        assert_eq!(camera.view().left, -500.0);
        assert_eq!(camera.view().bottom, -250.0);
        assert_eq!(plane_size(&camera, &scene), Vec2::new(1000.0, 500.0));
    }

    #[test]
    fn test_view_round_trip_corners() {
        let (camera, _) = camera();
        let view = camera.view();
        assert_eq!(view.screen_to_world(Pos2::ZERO), Pos2::new(-400.0, 300.0));
        assert_eq!(view.world_to_screen(Pos2::new(400.0, -300.0)), Pos2::new(800.0, 600.0));
    }
}
