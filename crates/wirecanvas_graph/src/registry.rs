// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node types and the demo graph shown at startup.

use crate::node_data::{NodeData, PinData};
use egui::Vec2;
use serde::{Deserialize, Serialize};

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Entry points triggered by the host
    Event,
    /// Flow control
    Flow,
    /// Math operations
    Math,
    /// Utility nodes
    Utility,
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Title and pins
    pub data: NodeData,
}

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type, replacing any type with the same ID
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// All registered types, in registration order
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Types of one category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Node data for a type ID
    pub fn create(&self, type_id: &str) -> Option<NodeData> {
        self.get(type_id).map(|t| t.data.clone())
    }
}

/// Create the registry of demo node types
pub fn demo_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Events
    registry.register(NodeType {
        id: "event_begin".to_string(),
        category: NodeCategory::Event,
        description: "Triggered once when the graph starts".to_string(),
        data: NodeData::new("Event Begin").with_output(PinData::flow("Exec")),
    });

    registry.register(NodeType {
        id: "event_tick".to_string(),
        category: NodeCategory::Event,
        description: "Triggered every frame".to_string(),
        data: NodeData::new("Event Tick")
            .with_output(PinData::flow("Exec"))
            .with_output(PinData::data("Delta Time", "float")),
    });

    // Flow control
    registry.register(NodeType {
        id: "branch".to_string(),
        category: NodeCategory::Flow,
        description: "If/else branching".to_string(),
        data: NodeData::new("Branch")
            .with_input(PinData::flow("Exec"))
            .with_input(PinData::data("Condition", "bool"))
            .with_output(PinData::flow("True"))
            .with_output(PinData::flow("False")),
    });

    // Math
    registry.register(NodeType {
        id: "add".to_string(),
        category: NodeCategory::Math,
        description: "Sum of two numbers".to_string(),
        data: NodeData::new("Add")
            .with_input(PinData::data("A", "float"))
            .with_input(PinData::data("B", "float"))
            .with_output(PinData::data("Result", "float")),
    });

    registry.register(NodeType {
        id: "clamp".to_string(),
        category: NodeCategory::Math,
        description: "Limit a number to a range".to_string(),
        data: NodeData::new("Clamp")
            .with_input(PinData::data("Value", "float"))
            .with_input(PinData::data("Min", "float"))
            .with_input(PinData::data("Max", "float"))
            .with_output(PinData::data("Result", "float")),
    });

    // Print string (for debugging)
    registry.register(NodeType {
        id: "print_string".to_string(),
        category: NodeCategory::Utility,
        description: "Print a string to the console".to_string(),
        data: NodeData::new("Print String")
            .with_input(PinData::flow("Exec"))
            .with_input(PinData::data("String", "string"))
            .with_output(PinData::flow("Exec")),
    });

    registry
}

/// A node of the demo graph: a registered type placed at a world position
#[derive(Debug, Clone, PartialEq)]
pub struct DemoPlacement {
    /// Registered type ID
    pub type_id: &'static str,
    /// World position of the node's title bar
    pub position: Vec2,
}

/// Placements seeded onto the canvas at startup
pub fn demo_graph() -> Vec<DemoPlacement> {
    [
        ("event_begin", Vec2::new(-320.0, 160.0)),
        ("branch", Vec2::new(-80.0, 160.0)),
        ("print_string", Vec2::new(180.0, 220.0)),
        ("event_tick", Vec2::new(-320.0, -60.0)),
        ("clamp", Vec2::new(-60.0, -60.0)),
        ("add", Vec2::new(200.0, -40.0)),
    ]
    .into_iter()
    .map(|(type_id, position)| DemoPlacement { type_id, position })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_registry_contents() {
        let registry = demo_registry();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.types_in_category(NodeCategory::Math).count(), 2);

        let clamp = registry.create("clamp").unwrap();
        assert_eq!(clamp.inputs.len(), 3);
        assert_eq!(clamp.outputs.len(), 1);
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = NodeRegistry::new();
        for name in ["First", "Second"] {
            registry.register(NodeType {
                id: "node".to_string(),
                category: NodeCategory::Utility,
                description: String::new(),
                data: NodeData::new(name),
            });
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("node").unwrap().data.name, "Second");
    }

    #[test]
    fn test_demo_graph_uses_registered_types() {
        let registry = demo_registry();
        let placements = demo_graph();
        assert!(!placements.is_empty());
        assert!(placements.iter().all(|p| registry.get(p.type_id).is_some()));
    }
}
