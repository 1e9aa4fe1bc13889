// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas runtime for the Wirecanvas node editor.
//!
//! This crate owns everything between raw input and a rendered frame:
//! - A scene graph of 2D shapes with z-ordered picking
//! - Scene objects with a start/tick/end lifecycle
//! - Pointer dispatch (hover, press, drag, zoom) to interactive nodes
//! - An orthographic camera with a pan/zoom background plane
//! - A debug overlay of short-lived messages
//!
//! ## Architecture
//!
//! The [`Runtime`] is single-threaded. Input arrives through an
//! [`InputSource`], text is measured through a [`TextMeasurer`] and the scene
//! is drawn through a [`SceneRenderer`]; the host supplies all three.
//! World space is Y-up, canvas pixels are Y-down with the origin top-left.

pub mod broadcast;
pub mod camera;
pub mod capability;
pub mod config;
pub mod debug;
pub mod input;
pub mod object;
pub mod pointer;
pub mod runtime;
pub mod scene;
pub mod text;

pub use broadcast::{Broadcast, ListenerError, ListenerId, ListenerResult};
pub use camera::{CameraController, OrthographicView, BACKGROUND_Z};
pub use capability::{
    as_pointer_event_listener, is_pointer_event_listener, is_tickable_object, DragDelta,
    PointerContext, PointerListener, Tickable,
};
pub use config::{ConfigError, RuntimeConfig};
pub use debug::{DebugMessage, DebugOverlay};
pub use input::{InputEvent, InputQueue, InputSource, PointerButton};
pub use object::{FrameContext, FrameTime, ObjectHandle, ObjectId, SceneObject, StartContext};
pub use pointer::{PointerDispatch, PointerSnapshot, PointerTargets};
pub use runtime::{FrameOutcome, Runtime, SceneRenderer};
pub use scene::{DrawItem, Scene, SceneNode, SceneNodeId, Shape, WorldTransform};
pub use text::{AnchorX, AnchorY, MonospaceMeasurer, TextJoin, TextMeasurer, TextShape};
