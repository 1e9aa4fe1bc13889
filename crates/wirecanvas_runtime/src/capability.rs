// SPDX-License-Identifier: MIT OR Apache-2.0
//! Opt-in capabilities: per-frame ticking and pointer interaction.
//!
//! Objects do not inherit from a common interactive base. A scene object
//! exposes [`Tickable`] through [`SceneObject::as_tickable`], and any scene
//! node becomes interactive by carrying a [`PointerListener`] with at least
//! one callback.

use crate::camera::CameraController;
use crate::debug::DebugOverlay;
use crate::input::PointerButton;
use crate::object::{FrameContext, SceneObject};
use crate::pointer::PointerSnapshot;
use crate::scene::{Scene, SceneNodeId};
use egui::Vec2;

/// Per-frame update capability
pub trait Tickable {
    /// Advance one frame
    fn tick(&mut self, ctx: &mut FrameContext<'_>);
}

/// Whether `object` exists and exposes a tick
pub fn is_tickable_object(object: Option<&mut dyn SceneObject>) -> bool {
    object.is_some_and(|o| o.as_tickable().is_some())
}

/// Pointer movement while a drag is active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDelta {
    /// Movement in canvas pixels, Y up
    pub pixels: Vec2,
    /// Movement in world units (pixels divided by zoom)
    pub world: Vec2,
}

/// State handed to pointer callbacks
pub struct PointerContext<'a> {
    /// Scene graph
    pub scene: &'a mut Scene,
    /// Camera controller
    pub camera: &'a mut CameraController,
    /// Debug overlay
    pub debug: &'a mut DebugOverlay,
    /// Pointer state at the time of the event
    pub pointer: PointerSnapshot,
    /// Node whose listener is running
    pub target: SceneNodeId,
}

/// Callback for hover transitions
pub type HoverCallback = Box<dyn FnMut(&mut PointerContext<'_>)>;
/// Callback for button presses and releases
pub type PressCallback = Box<dyn FnMut(&mut PointerContext<'_>, PointerButton)>;
/// Callback for drag movement
pub type DragCallback = Box<dyn FnMut(&mut PointerContext<'_>, DragDelta)>;
/// Callback for wheel input, receives the raw vertical delta
pub type ZoomCallback = Box<dyn FnMut(&mut PointerContext<'_>, f32)>;

/// Optional pointer callbacks attached to a scene node
#[derive(Default)]
pub struct PointerListener {
    /// Pointer entered the node
    pub on_hover_begin: Option<HoverCallback>,
    /// Pointer left the node
    pub on_hover_end: Option<HoverCallback>,
    /// Button pressed while hovering
    pub on_press_down: Option<PressCallback>,
    /// Button released; goes to the node the press started on
    pub on_press_up: Option<PressCallback>,
    /// Pointer moved while a button is held
    pub on_drag: Option<DragCallback>,
    /// Wheel scrolled while hovering
    pub on_zoom: Option<ZoomCallback>,
}

impl PointerListener {
    /// Create a listener without callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hover-begin callback
    pub fn with_hover_begin(mut self, f: impl FnMut(&mut PointerContext<'_>) + 'static) -> Self {
        self.on_hover_begin = Some(Box::new(f));
        self
    }

    /// Set the hover-end callback
    pub fn with_hover_end(mut self, f: impl FnMut(&mut PointerContext<'_>) + 'static) -> Self {
        self.on_hover_end = Some(Box::new(f));
        self
    }

    /// Set the press-down callback
    pub fn with_press_down(
        mut self,
        f: impl FnMut(&mut PointerContext<'_>, PointerButton) + 'static,
    ) -> Self {
        self.on_press_down = Some(Box::new(f));
        self
    }

    /// Set the press-up callback
    pub fn with_press_up(
        mut self,
        f: impl FnMut(&mut PointerContext<'_>, PointerButton) + 'static,
    ) -> Self {
        self.on_press_up = Some(Box::new(f));
        self
    }

    /// Set the drag callback
    pub fn with_drag(mut self, f: impl FnMut(&mut PointerContext<'_>, DragDelta) + 'static) -> Self {
        self.on_drag = Some(Box::new(f));
        self
    }

    /// Set the zoom callback
    pub fn with_zoom(mut self, f: impl FnMut(&mut PointerContext<'_>, f32) + 'static) -> Self {
        self.on_zoom = Some(Box::new(f));
        self
    }

    /// Whether at least one callback is present
    pub fn has_any(&self) -> bool {
        self.on_hover_begin.is_some()
            || self.on_hover_end.is_some()
            || self.on_press_down.is_some()
            || self.on_press_up.is_some()
            || self.on_drag.is_some()
            || self.on_zoom.is_some()
    }
}

impl std::fmt::Debug for PointerListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerListener")
            .field("on_hover_begin", &self.on_hover_begin.is_some())
            .field("on_hover_end", &self.on_hover_end.is_some())
            .field("on_press_down", &self.on_press_down.is_some())
            .field("on_press_up", &self.on_press_up.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_zoom", &self.on_zoom.is_some())
            .finish()
    }
}

/// Whether `listener` exists and carries at least one callback
pub fn is_pointer_event_listener(listener: Option<&PointerListener>) -> bool {
    listener.is_some_and(PointerListener::has_any)
}

/// Copy the callbacks present in `capabilities` onto `target`.
///
/// Callbacks absent from `capabilities` are left as they are on `target`.
pub fn as_pointer_event_listener(
    target: &mut PointerListener,
    capabilities: PointerListener,
) -> &mut PointerListener {
    let PointerListener {
        on_hover_begin,
        on_hover_end,
        on_press_down,
        on_press_up,
        on_drag,
        on_zoom,
    } = capabilities;

    if on_hover_begin.is_some() {
        target.on_hover_begin = on_hover_begin;
    }
    if on_hover_end.is_some() {
        target.on_hover_end = on_hover_end;
    }
    if on_press_down.is_some() {
        target.on_press_down = on_press_down;
    }
    if on_press_up.is_some() {
        target.on_press_up = on_press_up;
    }
    if on_drag.is_some() {
        target.on_drag = on_drag;
    }
    if on_zoom.is_some() {
        target.on_zoom = on_zoom;
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::StartContext;

    struct Inert;

    impl SceneObject for Inert {
        fn start(&mut self, _ctx: &mut StartContext<'_>) {}
    }

    struct Spinner {
        ticks: u32,
    }

    impl SceneObject for Spinner {
        fn start(&mut self, _ctx: &mut StartContext<'_>) {}

        fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
            Some(self)
        }
    }

    impl Tickable for Spinner {
        fn tick(&mut self, _ctx: &mut FrameContext<'_>) {
            self.ticks += 1;
        }
    }

    #[test]
    fn test_tickable_check() {
        assert!(!is_tickable_object(None));
        assert!(!is_tickable_object(Some(&mut Inert)));
        assert!(is_tickable_object(Some(&mut Spinner { ticks: 0 })));
    }

    #[test]
    fn test_listener_check() {
        assert!(!is_pointer_event_listener(None));
        assert!(!is_pointer_event_listener(Some(&PointerListener::new())));

        let mut target = PointerListener::new();
        as_pointer_event_listener(&mut target, PointerListener::new());
        assert!(!is_pointer_event_listener(Some(&target)));

        as_pointer_event_listener(&mut target, PointerListener::new().with_drag(|_, _| {}));
        assert!(is_pointer_event_listener(Some(&target)));
    }

    #[test]
    fn test_merge_keeps_unspecified_callbacks() {
        let mut target = PointerListener::new().with_hover_begin(|_| {});
        as_pointer_event_listener(&mut target, PointerListener::new().with_zoom(|_, _| {}));

        assert!(target.on_hover_begin.is_some());
        assert!(target.on_zoom.is_some());
        assert!(target.on_drag.is_none());
        assert!(target.on_hover_end.is_none());
    }
}
