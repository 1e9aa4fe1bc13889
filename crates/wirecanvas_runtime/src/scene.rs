// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retained 2D scene graph.
//!
//! World space has Y pointing up. Every node has a local position, a depth
//! (`z`, larger is closer to the viewer) and a uniform scale relative to its
//! parent. Nodes only render and hit-test while attached under [`Scene::root`].

use crate::capability::PointerListener;
use crate::text::{TextMeasurer, TextRequest, TextShape};
use egui::{Color32, Pos2, Stroke, Vec2};
use indexmap::IndexMap;
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneNodeId(pub Uuid);

impl SceneNodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneNodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry carried by a scene node, in local space
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Pure transform node
    Group,
    /// Rectangle centered on the node position
    Rect {
        /// Width and height
        size: Vec2,
        /// Fill color
        fill: Color32,
        /// Corner radius
        rounding: f32,
    },
    /// Circle centered on the node position
    Circle {
        /// Radius
        radius: f32,
        /// Fill color
        fill: Color32,
    },
    /// Line segment
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Stroke
        stroke: Stroke,
    },
    /// Single-line text
    Text(TextShape),
    /// Procedural grid filling a rectangle centered on the node position.
    /// Grid lines are anchored to world multiples of `spacing`.
    Grid {
        /// Width and height of the covered area
        size: Vec2,
        /// Distance between grid lines in world units
        spacing: f32,
        /// Fill behind the lines
        background: Color32,
        /// Line color
        line_color: Color32,
    },
}

impl Shape {
    /// Whether nodes with this shape take part in hit testing by default
    pub fn default_pickable(&self) -> bool {
        matches!(self, Self::Rect { .. } | Self::Circle { .. } | Self::Grid { .. })
    }

    /// Whether a local-space point lies inside the shape
    pub fn contains(&self, local: Vec2) -> bool {
        match self {
            Self::Rect { size, .. } | Self::Grid { size, .. } => {
                local.x.abs() <= size.x / 2.0 && local.y.abs() <= size.y / 2.0
            }
            Self::Circle { radius, .. } => local.length() <= *radius,
            Self::Text(text) => text.size.is_some() && text.local_bounds().contains(local.to_pos2()),
            Self::Group | Self::Line { .. } => false,
        }
    }
}

/// A node of the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name
    pub name: String,
    /// Geometry
    pub shape: Shape,
    /// Position relative to the parent
    pub position: Vec2,
    /// Depth relative to the parent
    pub z: f32,
    /// Uniform scale relative to the parent
    pub scale: f32,
    /// Hidden nodes hide their whole subtree
    pub visible: bool,
    /// Whether hit testing considers this node
    pub pickable: bool,
    parent: Option<SceneNodeId>,
    children: Vec<SceneNodeId>,
}

impl SceneNode {
    fn new(name: String, shape: Shape) -> Self {
        let pickable = shape.default_pickable();
        Self {
            name,
            shape,
            position: Vec2::ZERO,
            z: 0.0,
            scale: 1.0,
            visible: true,
            pickable,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent node, if attached to one
    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }
}

/// Accumulated transform of a node in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    /// World position of the node origin
    pub position: Pos2,
    /// World depth
    pub z: f32,
    /// World scale
    pub scale: f32,
}

impl WorldTransform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: Pos2::ZERO,
        z: 0.0,
        scale: 1.0,
    };

    /// Map a local point into world space
    pub fn apply(&self, local: Vec2) -> Pos2 {
        self.position + local * self.scale
    }

    /// Map a world point into local space
    pub fn inverse(&self, world: Pos2) -> Vec2 {
        if self.scale == 0.0 {
            return Vec2::ZERO;
        }
        (world - self.position) / self.scale
    }

    fn child(&self, node: &SceneNode) -> Self {
        Self {
            position: self.apply(node.position),
            z: self.z + node.z,
            scale: self.scale * node.scale,
        }
    }
}

/// A node ready to be drawn
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    /// Node id
    pub id: SceneNodeId,
    /// Geometry to draw
    pub shape: &'a Shape,
    /// World transform
    pub transform: WorldTransform,
}

/// The scene graph: an arena of nodes plus pointer listeners and pending text syncs
pub struct Scene {
    root: SceneNodeId,
    nodes: IndexMap<SceneNodeId, SceneNode>,
    listeners: HashMap<SceneNodeId, PointerListener>,
    text_requests: Vec<TextRequest>,
}

impl Scene {
    /// Create a scene containing only the root group
    pub fn new() -> Self {
        let root = SceneNodeId::new();
        let mut nodes = IndexMap::new();
        nodes.insert(root, SceneNode::new("root".to_string(), Shape::Group));
        Self {
            root,
            nodes,
            listeners: HashMap::new(),
            text_requests: Vec::new(),
        }
    }

    /// The root group everything visible hangs under
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Create a node, attached to `parent` or detached when `None`
    pub fn spawn(
        &mut self,
        parent: Option<SceneNodeId>,
        name: impl Into<String>,
        shape: Shape,
    ) -> SceneNodeId {
        let id = SceneNodeId::new();
        self.nodes.insert(id, SceneNode::new(name.into(), shape));
        if let Some(parent) = parent {
            if !self.attach(id, parent) {
                tracing::warn!("Spawned node {:?} left detached, parent {:?} missing", id, parent);
            }
        }
        id
    }

    /// Number of nodes, including the root and detached nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene holds only its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether a node exists
    pub fn contains(&self, id: SceneNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a node
    pub fn node(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable node
    pub fn node_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Children of a node, empty if the node does not exist
    pub fn children(&self, id: SceneNodeId) -> &[SceneNodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Attach `child` under `parent`, detaching it from its previous parent.
    ///
    /// Fails if either node is missing or the move would create a cycle.
    pub fn attach(&mut self, child: SceneNodeId, parent: SceneNodeId) -> bool {
        if !self.contains(child) || !self.contains(parent) || child == self.root {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        true
    }

    /// Detach a node from its parent, keeping its subtree intact
    pub fn detach(&mut self, id: SceneNodeId) {
        let Some(parent) = self.nodes.get_mut(&id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|c| *c != id);
        }
    }

    /// Remove a node and all its descendants, returning how many nodes were dropped.
    ///
    /// Pointer listeners on removed nodes are dropped too. The root cannot be removed.
    pub fn remove_subtree(&mut self, id: SceneNodeId) -> usize {
        if id == self.root || !self.contains(id) {
            return 0;
        }
        self.detach(id);

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.swap_remove(&current) {
                stack.extend(node.children);
                self.listeners.remove(&current);
                removed += 1;
            }
        }
        removed
    }

    /// Whether the node hangs under the root
    pub fn is_attached(&self, id: SceneNodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent);
        }
        false
    }

    fn is_ancestor_or_self(&self, ancestor: SceneNodeId, node: SceneNodeId) -> bool {
        let mut current = Some(node);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent);
        }
        false
    }

    /// Set the local position
    pub fn set_position(&mut self, id: SceneNodeId, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    /// Offset the local position
    pub fn translate(&mut self, id: SceneNodeId, delta: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position += delta;
        }
    }

    /// Set the local depth
    pub fn set_z(&mut self, id: SceneNodeId, z: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.z = z;
        }
    }

    /// Set the local scale
    pub fn set_scale(&mut self, id: SceneNodeId, scale: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scale = scale;
        }
    }

    /// Show or hide a subtree
    pub fn set_visible(&mut self, id: SceneNodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    /// Text element of a node, if it is a text node
    pub fn text(&self, id: SceneNodeId) -> Option<&TextShape> {
        match self.nodes.get(&id).map(|n| &n.shape) {
            Some(Shape::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// World transform of a node, accumulated through its parents
    pub fn world_transform(&self, id: SceneNodeId) -> Option<WorldTransform> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(&node_id)?;
            chain.push(node);
            current = node.parent;
        }

        Some(
            chain
                .iter()
                .rev()
                .fold(WorldTransform::IDENTITY, |parent, node| parent.child(node)),
        )
    }

    /// World position of a node origin
    pub fn world_position(&self, id: SceneNodeId) -> Option<Pos2> {
        self.world_transform(id).map(|t| t.position)
    }

    /// Visible attached nodes in depth-first order with their world transforms
    fn visible_nodes(&self) -> Vec<(SceneNodeId, WorldTransform)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_visible(self.root, WorldTransform::IDENTITY, &mut out);
        out
    }

    fn collect_visible(
        &self,
        id: SceneNodeId,
        parent: WorldTransform,
        out: &mut Vec<(SceneNodeId, WorldTransform)>,
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let transform = parent.child(node);
        out.push((id, transform));
        for &child in &node.children {
            self.collect_visible(child, transform, out);
        }
    }

    /// Topmost pickable node under a world-space point.
    ///
    /// Depth decides first; among equal depths the node drawn last wins.
    pub fn hit_test(&self, point: Pos2) -> Option<SceneNodeId> {
        let mut best: Option<(SceneNodeId, f32)> = None;
        for (id, transform) in self.visible_nodes() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.pickable || !node.shape.contains(transform.inverse(point)) {
                continue;
            }
            match best {
                Some((_, z)) if transform.z < z => {}
                _ => best = Some((id, transform.z)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Visible nodes sorted back to front
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        let mut items: Vec<DrawItem<'_>> = self
            .visible_nodes()
            .into_iter()
            .filter_map(|(id, transform)| {
                self.nodes.get(&id).map(|node| DrawItem {
                    id,
                    shape: &node.shape,
                    transform,
                })
            })
            .collect();
        // Stable sort keeps traversal order for equal depths
        items.sort_by(|a, b| a.transform.z.total_cmp(&b.transform.z));
        items
    }

    /// Attach a pointer listener to a node, replacing any previous one
    pub fn set_listener(&mut self, id: SceneNodeId, listener: PointerListener) {
        if self.contains(id) {
            self.listeners.insert(id, listener);
        } else {
            tracing::warn!("Ignoring pointer listener for missing node {:?}", id);
        }
    }

    /// Pointer listener of a node
    pub fn listener(&self, id: SceneNodeId) -> Option<&PointerListener> {
        self.listeners.get(&id)
    }

    /// Mutable pointer listener of a node
    pub fn listener_mut(&mut self, id: SceneNodeId) -> Option<&mut PointerListener> {
        self.listeners.get_mut(&id)
    }

    /// Remove a node's pointer listener
    pub fn remove_listener(&mut self, id: SceneNodeId) -> Option<PointerListener> {
        self.listeners.remove(&id)
    }

    /// Take a listener out while one of its callbacks runs against the scene
    pub(crate) fn take_listener(&mut self, id: SceneNodeId) -> Option<PointerListener> {
        self.listeners.remove(&id)
    }

    /// Put a taken listener back, unless the node vanished or got a new listener meanwhile
    pub(crate) fn restore_listener(&mut self, id: SceneNodeId, listener: PointerListener) {
        if self.contains(id) && !self.listeners.contains_key(&id) {
            self.listeners.insert(id, listener);
        }
    }

    /// Ask for a text node to be measured.
    ///
    /// `on_synced` runs during a later [`Scene::resolve_text`], never from this call.
    pub fn sync_text(
        &mut self,
        id: SceneNodeId,
        on_synced: impl FnOnce(&mut Scene, SceneNodeId) + 'static,
    ) {
        self.text_requests.push(TextRequest {
            node: id,
            on_synced: Box::new(on_synced),
        });
    }

    /// Number of text sync requests waiting for the next resolve
    pub fn pending_text_requests(&self) -> usize {
        self.text_requests.len()
    }

    /// Measure all queued text nodes and run their callbacks.
    ///
    /// Requests for nodes that were removed, or are not text, are dropped without
    /// running their callback. Requests queued by callbacks wait for the next call.
    pub fn resolve_text(&mut self, measurer: &mut dyn TextMeasurer) -> usize {
        let requests = std::mem::take(&mut self.text_requests);
        let mut resolved = 0;
        for request in requests {
            let Some(Shape::Text(text)) = self.nodes.get_mut(&request.node).map(|n| &mut n.shape)
            else {
                tracing::trace!("Dropping text sync for missing node {:?}", request.node);
                continue;
            };
            text.size = Some(measurer.measure(text));
            (request.on_synced)(self, request.node);
            resolved += 1;
        }
        resolved
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("text_requests", &self.text_requests.len())
            .finish()
    }
}
