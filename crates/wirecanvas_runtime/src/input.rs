// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input source abstraction.
//!
//! The runtime never subscribes to window events itself. The host pushes
//! [`InputEvent`]s into an [`InputSource`] handed to the runtime at
//! construction, which lets tests drive the canvas deterministically.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Pointer button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button or primary touch
    Primary,
    /// Right mouse button
    Secondary,
    /// Middle mouse button / wheel click
    Middle,
    /// Any other button
    Other(u16),
}

/// Raw input delivered by the host, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to canvas pixel coordinates (origin top-left)
    PointerMove {
        /// Horizontal position in pixels
        x: f32,
        /// Vertical position in pixels
        y: f32,
    },
    /// A pointer button was pressed
    PointerDown {
        /// Pressed button
        button: PointerButton,
    },
    /// A pointer button was released
    PointerUp {
        /// Released button
        button: PointerButton,
    },
    /// Wheel scrolled; positive values scroll down (away from the content)
    Wheel {
        /// Vertical scroll amount in pixels
        delta_y: f32,
    },
    /// A non-primary button was clicked
    AuxClick {
        /// Clicked button
        button: PointerButton,
    },
    /// Canvas backbuffer changed size
    Resize {
        /// New width in pixels
        width: f32,
        /// New height in pixels
        height: f32,
    },
}

/// Source of input events polled once per accepted frame
pub trait InputSource {
    /// Take the oldest pending event
    fn poll(&mut self) -> Option<InputEvent>;
}

/// Shared FIFO of input events.
///
/// Clones share the same queue, so the host keeps one clone for pushing and
/// hands another to the runtime.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl InputQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&self, event: InputEvent) {
        self.events.borrow_mut().push_back(event);
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl InputSource for InputQueue {
    fn poll(&mut self) -> Option<InputEvent> {
        self.events.borrow_mut().pop_front()
    }
}
