// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph visuals for the Wirecanvas node editor.
//!
//! This crate provides:
//! - Node descriptions (title, flow and data pins)
//! - A registry of node types and a demo graph
//! - Layout of a node box from measured text sizes
//! - [`NodeVisual`], the scene object that draws and drags a node
//!
//! Nodes are not evaluated; the canvas only shows and moves them.

pub mod layout;
pub mod node_data;
pub mod registry;
pub mod visual;

pub use layout::{NodeLayout, NodeLayoutConfig, PinSlot};
pub use node_data::{NodeData, PinData};
pub use registry::{demo_graph, demo_registry, DemoPlacement, NodeCategory, NodeRegistry, NodeType};
pub use visual::{NodeVisual, NodeVisualState};
