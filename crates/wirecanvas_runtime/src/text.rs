// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text elements and asynchronous text sizing.
//!
//! Text is measured by the host's font system. A scene node asks for its size
//! with [`Scene::sync_text`]; the request is answered during the next frame,
//! never synchronously. [`TextJoin`] waits for a whole group of requests.

use crate::scene::{Scene, SceneNodeId};
use egui::{Color32, Rect, Vec2};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Horizontal anchor of a text element relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorX {
    /// Position is the left edge
    #[default]
    Left,
    /// Position is the horizontal center
    Center,
    /// Position is the right edge
    Right,
}

/// Vertical anchor of a text element relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorY {
    /// Position is the top edge
    Top,
    /// Position is the vertical middle
    #[default]
    Middle,
    /// Position is the bottom edge
    Bottom,
}

/// A single-line text element
#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    /// Displayed text
    pub text: String,
    /// Font size in world units
    pub font_size: f32,
    /// Text color
    pub color: Color32,
    /// Horizontal anchor
    pub anchor_x: AnchorX,
    /// Vertical anchor
    pub anchor_y: AnchorY,
    /// Measured size, `None` until the first sync completed
    pub size: Option<Vec2>,
}

impl TextShape {
    /// Create an unmeasured text element
    pub fn new(text: impl Into<String>, font_size: f32, color: Color32) -> Self {
        Self {
            text: text.into(),
            font_size,
            color,
            anchor_x: AnchorX::default(),
            anchor_y: AnchorY::default(),
            size: None,
        }
    }

    /// Set the anchors
    pub fn with_anchor(mut self, anchor_x: AnchorX, anchor_y: AnchorY) -> Self {
        self.anchor_x = anchor_x;
        self.anchor_y = anchor_y;
        self
    }

    /// Measured size, or zero if not synced yet
    pub fn measured_size(&self) -> Vec2 {
        self.size.unwrap_or(Vec2::ZERO)
    }

    /// Bounds in local space with Y pointing up
    pub fn local_bounds(&self) -> Rect {
        let size = self.measured_size();
        let min_x = match self.anchor_x {
            AnchorX::Left => 0.0,
            AnchorX::Center => -size.x / 2.0,
            AnchorX::Right => -size.x,
        };
        let min_y = match self.anchor_y {
            AnchorY::Top => -size.y,
            AnchorY::Middle => -size.y / 2.0,
            AnchorY::Bottom => 0.0,
        };
        Rect::from_min_size(egui::pos2(min_x, min_y), size)
    }
}

/// Font system that can lay out a text element
pub trait TextMeasurer {
    /// Size of `text` in world units at zoom 1
    fn measure(&mut self, text: &TextShape) -> Vec2;
}

/// Measurer with a fixed advance per character, for tests and headless use
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    /// Advance per character as a fraction of the font size
    pub advance: f32,
    /// Line height as a fraction of the font size
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance: 0.5,
            line_height: 1.25,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&mut self, text: &TextShape) -> Vec2 {
        let chars = text.text.chars().count() as f32;
        Vec2::new(
            chars * text.font_size * self.advance,
            text.font_size * self.line_height,
        )
    }
}

/// Callback run once a text sync request completes
pub type TextSyncCallback = Box<dyn FnOnce(&mut Scene, SceneNodeId)>;

/// A queued text sync request
pub(crate) struct TextRequest {
    pub(crate) node: SceneNodeId,
    pub(crate) on_synced: TextSyncCallback,
}

/// Counting join over several text sync requests.
///
/// `on_complete` runs exactly once, after every joined request reported.
pub struct TextJoin {
    pending: Cell<usize>,
    on_complete: RefCell<Option<Box<dyn FnOnce(&mut Scene)>>>,
}

impl TextJoin {
    /// Request a sync for every node in `nodes` and run `on_complete` once all finished.
    ///
    /// With an empty `nodes` slice the callback runs immediately.
    pub fn sync_all(
        scene: &mut Scene,
        nodes: &[SceneNodeId],
        on_complete: impl FnOnce(&mut Scene) + 'static,
    ) -> Rc<TextJoin> {
        let join = Rc::new(TextJoin {
            pending: Cell::new(nodes.len()),
            on_complete: RefCell::new(Some(Box::new(on_complete))),
        });

        if nodes.is_empty() {
            join.fire(scene);
            return join;
        }

        for &node in nodes {
            let join = Rc::clone(&join);
            scene.sync_text(node, move |scene, _| join.complete_one(scene));
        }
        join
    }

    /// Number of requests still outstanding
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Whether the completion callback already ran
    pub fn is_complete(&self) -> bool {
        self.on_complete.borrow().is_none()
    }

    fn complete_one(&self, scene: &mut Scene) {
        let remaining = self.pending.get().saturating_sub(1);
        self.pending.set(remaining);
        if remaining == 0 {
            self.fire(scene);
        }
    }

    fn fire(&self, scene: &mut Scene) {
        let callback = self.on_complete.borrow_mut().take();
        if let Some(callback) = callback {
            callback(scene);
        }
    }
}

impl std::fmt::Debug for TextJoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextJoin")
            .field("pending", &self.pending.get())
            .field("complete", &self.is_complete())
            .finish()
    }
}
