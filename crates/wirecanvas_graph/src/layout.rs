// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node box geometry computed from measured text sizes.
//!
//! A node is a title bar stacked on an IO backdrop. Input pins run down the
//! left edge, output pins down the right edge, one row per pin.
//! All positions are centers in Y-up local space.

use egui::Vec2;
use serde::{Deserialize, Serialize};

/// Spacing and sizing of node visuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeLayoutConfig {
    /// Space above and below the title text
    pub title_padding_y: f32,
    /// Distance between a pin label and the backdrop edge
    pub pin_margin: f32,
    /// Minimum space between the input and output label columns
    pub io_gap: f32,
    /// Space above the first and below the last pin row
    pub io_padding_y: f32,
    /// Space between pin rows
    pub io_row_gap: f32,
    /// Radius of data pins, half the side of flow pins
    pub pin_radius: f32,
    /// Scale of the pin under the pointer
    pub active_pin_scale: f32,
    /// Title font size
    pub title_font_size: f32,
    /// Pin label font size
    pub pin_font_size: f32,
    /// Width of the connector line
    pub line_width: f32,
}

impl Default for NodeLayoutConfig {
    fn default() -> Self {
        Self {
            title_padding_y: 5.0,
            pin_margin: 10.0,
            io_gap: 30.0,
            io_padding_y: 5.0,
            io_row_gap: 5.0,
            pin_radius: 5.0,
            active_pin_scale: 1.2,
            title_font_size: 12.0,
            pin_font_size: 12.0,
            line_width: 3.0,
        }
    }
}

/// Placement of one pin row, relative to the IO backdrop center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinSlot {
    /// Label center
    pub label: Vec2,
    /// Pin center
    pub pin: Vec2,
}

/// Computed node geometry
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    /// Width shared by the title bar and the IO backdrop
    pub content_width: f32,
    /// Title bar size; the title bar is centered on the node origin
    pub title_size: Vec2,
    /// Title text center, relative to the title bar center
    pub title_text: Vec2,
    /// IO backdrop size
    pub io_size: Vec2,
    /// IO backdrop center, relative to the node origin
    pub io_position: Vec2,
    /// Height of one pin row
    pub row_height: f32,
    /// Input rows, top to bottom
    pub inputs: Vec<PinSlot>,
    /// Output rows, top to bottom
    pub outputs: Vec<PinSlot>,
}

impl NodeLayout {
    /// Lay out a node from the measured sizes of its title and pin labels.
    ///
    /// Either pin column may be empty.
    pub fn compute(config: &NodeLayoutConfig, title: Vec2, inputs: &[Vec2], outputs: &[Vec2]) -> Self {
        let widest = |sizes: &[Vec2]| sizes.iter().map(|s| s.x).fold(0.0_f32, f32::max);
        let row_height = inputs
            .iter()
            .chain(outputs)
            .map(|s| s.y)
            .fold(0.0_f32, f32::max);

        let content_width = title
            .x
            .max(widest(inputs) + widest(outputs) + config.pin_margin * 2.0 + config.io_gap);

        let title_size = Vec2::new(content_width, title.y + config.title_padding_y * 2.0);
        let title_text = Vec2::new(
            0.0,
            title_size.y / 2.0 - config.title_padding_y - title.y / 2.0,
        );

        let rows = inputs.len().max(outputs.len()) as f32;
        let io_height = rows * (row_height + config.io_row_gap) + config.io_padding_y * 2.0;
        let io_size = Vec2::new(content_width, io_height);
        let io_position = Vec2::new(0.0, -io_height / 2.0 - title_size.y / 2.0);

        let half = io_size / 2.0;
        let row_center_y = |i: usize| {
            let row_top = i as f32 * (row_height + config.io_row_gap) + config.io_padding_y;
            half.y - row_top - row_height / 2.0
        };

        let inputs = inputs
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let y = row_center_y(i);
                PinSlot {
                    label: Vec2::new(-half.x + config.pin_margin + size.x / 2.0, y),
                    pin: Vec2::new(-half.x - config.pin_margin / 2.0 + config.pin_radius, y),
                }
            })
            .collect();

        let outputs = outputs
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let y = row_center_y(i);
                PinSlot {
                    label: Vec2::new(half.x - config.pin_margin - size.x / 2.0, y),
                    pin: Vec2::new(half.x + config.pin_margin / 2.0 - config.pin_radius, y),
                }
            })
            .collect();

        Self {
            content_width,
            title_size,
            title_text,
            io_size,
            io_position,
            row_height,
            inputs,
            outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(widths: &[f32]) -> Vec<Vec2> {
        widths.iter().map(|w| Vec2::new(*w, 15.0)).collect()
    }

    #[test]
    fn test_three_inputs_one_output() {
        let config = NodeLayoutConfig::default();
        let layout = NodeLayout::compute(
            &config,
            Vec2::new(60.0, 15.0),
            &sizes(&[30.0, 40.0, 20.0]),
            &sizes(&[50.0]),
        );

        assert_eq!(layout.content_width, 140.0);
        assert_eq!(layout.title_size, Vec2::new(140.0, 25.0));
        assert_eq!(layout.title_text, Vec2::ZERO);
        assert_eq!(layout.io_size, Vec2::new(140.0, 70.0));
        assert!(layout.io_size.y >= 3.0 * layout.row_height);
        assert_eq!(layout.io_position, Vec2::new(0.0, -47.5));

        assert_eq!(layout.inputs[0].label, Vec2::new(-45.0, 22.5));
        assert_eq!(layout.inputs[0].pin, Vec2::new(-70.0, 22.5));
        assert_eq!(layout.inputs[1].label.y, 2.5);
        assert_eq!(layout.outputs[0].label, Vec2::new(35.0, 22.5));
        assert_eq!(layout.outputs[0].pin, Vec2::new(70.0, 22.5));
    }

    #[test]
    fn test_wide_title_sets_width() {
        let layout = NodeLayout::compute(
            &NodeLayoutConfig::default(),
            Vec2::new(300.0, 15.0),
            &sizes(&[10.0]),
            &sizes(&[10.0]),
        );
        assert_eq!(layout.content_width, 300.0);
        assert_eq!(layout.outputs[0].pin.x, 150.0);
    }

    #[test]
    fn test_no_pins() {
        let layout = NodeLayout::compute(&NodeLayoutConfig::default(), Vec2::new(20.0, 15.0), &[], &[]);
        assert_eq!(layout.content_width, 50.0);
        assert_eq!(layout.io_size.y, 10.0);
        assert!(layout.inputs.is_empty());
        assert!(layout.outputs.is_empty());
    }

    #[test]
    fn test_outputs_only() {
        let layout = NodeLayout::compute(
            &NodeLayoutConfig::default(),
            Vec2::new(20.0, 15.0),
            &[],
            &sizes(&[30.0, 30.0]),
        );
        assert_eq!(layout.content_width, 80.0);
        assert_eq!(layout.io_size.y, 50.0);
        assert_eq!(layout.outputs.len(), 2);
    }
}
