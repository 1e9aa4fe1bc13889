// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene objects and their lifecycle.
//!
//! created → started (root attached, [`SceneObject::start`] run) →
//! pending destroy ([`ObjectHandle::destroy`]) → removed at the end of the
//! frame (subtree dropped, [`SceneObject::end`] run).

use crate::camera::CameraController;
use crate::capability::Tickable;
use crate::debug::DebugOverlay;
use crate::pointer::PointerSnapshot;
use crate::scene::{Scene, SceneNodeId};
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a registered object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle bound to an object when it starts.
///
/// Cheap to clone; pointer callbacks capture it to destroy their owner.
#[derive(Debug, Clone)]
pub struct ObjectHandle {
    id: ObjectId,
    root: SceneNodeId,
    pending_destroy: Rc<Cell<bool>>,
}

impl ObjectHandle {
    pub(crate) fn new(id: ObjectId, root: SceneNodeId) -> Self {
        Self {
            id,
            root,
            pending_destroy: Rc::new(Cell::new(false)),
        }
    }

    /// Object id
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Root of the object's subtree
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Mark the object for removal at the next frame boundary
    pub fn destroy(&self) {
        self.pending_destroy.set(true);
    }

    /// Whether removal is pending
    pub fn is_pending_destroy(&self) -> bool {
        self.pending_destroy.get()
    }
}

/// Elapsed time of the frame loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous accepted frame
    pub delta: f64,
    /// Seconds since the runtime started
    pub elapsed: f64,
    /// Number of accepted frames
    pub frame: u64,
}

/// State handed to an object when it starts
pub struct StartContext<'a> {
    /// The object's handle
    pub handle: ObjectHandle,
    /// Scene graph; the handle's root is already attached
    pub scene: &'a mut Scene,
    /// Debug overlay
    pub debug: &'a mut DebugOverlay,
}

/// State handed to tickable objects every frame
pub struct FrameContext<'a> {
    /// Scene graph
    pub scene: &'a mut Scene,
    /// Camera controller
    pub camera: &'a CameraController,
    /// Pointer state
    pub pointer: PointerSnapshot,
    /// Debug overlay
    pub debug: &'a mut DebugOverlay,
    /// Frame timing
    pub time: FrameTime,
}

/// Something the runtime can own, attach and remove
pub trait SceneObject {
    /// Display name used in logs
    fn name(&self) -> &str {
        "object"
    }

    /// Build the subtree under `ctx.handle.root()`
    fn start(&mut self, ctx: &mut StartContext<'_>);

    /// Cleanup after the subtree was removed
    fn end(&mut self, _scene: &mut Scene) {}

    /// Expose per-frame updates
    fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_clones_share_destroy_flag() {
        let handle = ObjectHandle::new(ObjectId::new(), SceneNodeId::new());
        let captured = handle.clone();
        assert!(!handle.is_pending_destroy());

        captured.destroy();
        assert!(handle.is_pending_destroy());
        assert_eq!(handle.id(), captured.id());
        assert_eq!(handle.root(), captured.root());
    }
}
