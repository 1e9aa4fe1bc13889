// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node descriptions: a name and ordered input/output pins.
//!
//! The canvas only reads node data; it never changes it.

use serde::{Deserialize, Serialize};

/// A single pin of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinData {
    /// Execution flow pin
    Flow {
        /// Label shown next to the pin
        name: String,
    },
    /// Typed data pin
    Data {
        /// Label shown next to the pin
        name: String,
        /// Name of the carried type
        type_name: String,
    },
}

impl PinData {
    /// Create a flow pin
    pub fn flow(name: impl Into<String>) -> Self {
        Self::Flow { name: name.into() }
    }

    /// Create a data pin
    pub fn data(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::Data {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Pin label
    pub fn name(&self) -> &str {
        match self {
            Self::Flow { name } | Self::Data { name, .. } => name,
        }
    }

    /// Whether this is an execution flow pin
    pub fn is_flow(&self) -> bool {
        matches!(self, Self::Flow { .. })
    }

    /// Carried type name, `None` for flow pins
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Flow { .. } => None,
            Self::Data { type_name, .. } => Some(type_name),
        }
    }

    /// Get the color for this pin (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self.type_name() {
            None => [255, 255, 255],
            Some("bool") => [200, 80, 80],
            Some("int") => [80, 200, 200],
            Some("float") => [80, 200, 80],
            Some("string") => [200, 80, 200],
            Some("vec2" | "vec3") => [200, 200, 80],
            Some(_) => [150, 150, 150],
        }
    }
}

/// Description of a node shown on the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    /// Title
    pub name: String,
    /// Input pins, top to bottom
    #[serde(default)]
    pub inputs: Vec<PinData>,
    /// Output pins, top to bottom
    #[serde(default)]
    pub outputs: Vec<PinData>,
}

impl NodeData {
    /// Create a node without pins
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Append an input pin
    pub fn with_input(mut self, pin: PinData) -> Self {
        self.inputs.push(pin);
        self
    }

    /// Append an output pin
    pub fn with_output(mut self, pin: PinData) -> Self {
        self.outputs.push(pin);
        self
    }

    /// Number of pin rows, the longer of both columns
    pub fn row_count(&self) -> usize {
        self.inputs.len().max(self.outputs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_accessors() {
        let exec = PinData::flow("Exec");
        let value = PinData::data("Value", "float");
        assert!(exec.is_flow());
        assert_eq!(exec.type_name(), None);
        assert_eq!(value.name(), "Value");
        assert_eq!(value.type_name(), Some("float"));
        assert_eq!(exec.color(), [255, 255, 255]);
    }

    #[test]
    fn test_row_count_uses_longer_column() {
        let node = NodeData::new("Add")
            .with_input(PinData::data("A", "float"))
            .with_input(PinData::data("B", "float"))
            .with_output(PinData::data("Sum", "float"));
        assert_eq!(node.row_count(), 2);
        assert_eq!(NodeData::new("Empty").row_count(), 0);
    }

    #[test]
    fn test_parse_from_ron() {
        let source = r#"(
            name: "Print",
            inputs: [Flow(name: "Exec"), Data(name: "Text", type_name: "string")],
        )"#;
        let node: NodeData = ron::from_str(source).unwrap();
        assert_eq!(node.name, "Print");
        assert_eq!(node.inputs.len(), 2);
        assert!(node.outputs.is_empty());
        assert_eq!(node.inputs[1], PinData::data("Text", "string"));
    }
}
