// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene rendering and text measurement through egui.
//!
//! The canvas is measured in physical pixels while egui paints in points,
//! so every screen position is divided by the pixels-per-point factor.

use egui::{Align2, FontId, LayerId, Pos2, Rect, Stroke, Vec2};
use wirecanvas_runtime::{
    AnchorX, AnchorY, OrthographicView, Scene, SceneRenderer, Shape, TextMeasurer, TextShape,
    WorldTransform,
};

/// Grid lines closer than this many pixels are thinned out
const MIN_GRID_PIXELS: f32 = 8.0;

/// Maps world coordinates to egui points
#[derive(Debug, Clone, Copy)]
pub struct ScreenMapping {
    view: OrthographicView,
    pixels_per_point: f32,
}

impl ScreenMapping {
    /// Mapping for a camera view on a display with the given scale factor
    pub fn new(view: OrthographicView, pixels_per_point: f32) -> Self {
        Self {
            view,
            pixels_per_point: pixels_per_point.max(f32::EPSILON),
        }
    }

    /// World point to egui point
    pub fn to_points(&self, world: Pos2) -> Pos2 {
        let pixels = self.view.world_to_screen(world);
        Pos2::new(pixels.x / self.pixels_per_point, pixels.y / self.pixels_per_point)
    }

    /// egui points per world unit
    pub fn scale(&self) -> f32 {
        self.view.zoom / self.pixels_per_point
    }
}

/// World coordinates of the grid lines inside `[min, max]`.
///
/// Lines sit on multiples of `spacing`; the spacing doubles until lines are at
/// least [`MIN_GRID_PIXELS`] apart at `zoom`.
pub fn grid_lines(min: f32, max: f32, spacing: f32, zoom: f32) -> Vec<f32> {
    if spacing <= 0.0 || zoom <= 0.0 || max < min {
        return Vec::new();
    }
    let mut step = spacing;
    while step * zoom < MIN_GRID_PIXELS {
        step *= 2.0;
    }

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f32 * step).collect()
}

fn text_align(text: &TextShape) -> Align2 {
    match (text.anchor_x, text.anchor_y) {
        (AnchorX::Left, AnchorY::Top) => Align2::LEFT_TOP,
        (AnchorX::Left, AnchorY::Middle) => Align2::LEFT_CENTER,
        (AnchorX::Left, AnchorY::Bottom) => Align2::LEFT_BOTTOM,
        (AnchorX::Center, AnchorY::Top) => Align2::CENTER_TOP,
        (AnchorX::Center, AnchorY::Middle) => Align2::CENTER_CENTER,
        (AnchorX::Center, AnchorY::Bottom) => Align2::CENTER_BOTTOM,
        (AnchorX::Right, AnchorY::Top) => Align2::RIGHT_TOP,
        (AnchorX::Right, AnchorY::Middle) => Align2::RIGHT_CENTER,
        (AnchorX::Right, AnchorY::Bottom) => Align2::RIGHT_BOTTOM,
    }
}

/// Builds egui shapes for the scene and repaints them every egui pass
pub struct EguiSceneRenderer {
    ctx: egui::Context,
    pixels_per_point: f32,
    shapes: Vec<egui::Shape>,
}

impl EguiSceneRenderer {
    /// Create a renderer painting into `ctx`
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            pixels_per_point: 1.0,
            shapes: Vec::new(),
        }
    }

    /// Update the display scale factor
    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point;
    }

    /// Paint the shapes of the last rendered frame onto the background layer
    pub fn paint(&self) {
        self.ctx
            .layer_painter(LayerId::background())
            .extend(self.shapes.iter().cloned());
    }

    /// Number of shapes of the last rendered frame
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn push_item(&mut self, shape: &Shape, transform: &WorldTransform, mapping: &ScreenMapping) {
        let center = mapping.to_points(transform.position);
        let k = mapping.scale() * transform.scale;
        match shape {
            Shape::Group => {}
            Shape::Rect { size, fill, rounding } => {
                let rect = Rect::from_center_size(center, *size * k);
                self.shapes.push(egui::Shape::rect_filled(rect, *rounding * k, *fill));
            }
            Shape::Circle { radius, fill } => {
                self.shapes.push(egui::Shape::circle_filled(center, *radius * k, *fill));
            }
            Shape::Line { from, to, stroke } => {
                let points = [
                    mapping.to_points(transform.apply(*from)),
                    mapping.to_points(transform.apply(*to)),
                ];
                self.shapes.push(egui::Shape::line_segment(points, *stroke));
            }
            Shape::Text(text) => {
                let font = FontId::proportional((text.font_size * k).max(1.0));
                let align = text_align(text);
                let shape = self.ctx.fonts(|fonts| {
                    egui::Shape::text(fonts, center, align, &text.text, font, text.color)
                });
                self.shapes.push(shape);
            }
            Shape::Grid {
                size,
                spacing,
                background,
                line_color,
            } => {
                let rect = Rect::from_center_size(center, *size * k);
                self.shapes.push(egui::Shape::rect_filled(rect, 0.0, *background));

                let half = *size * transform.scale / 2.0;
                let world_min = transform.position - half;
                let world_max = transform.position + half;
                let zoom = mapping.view.zoom * transform.scale;
                let stroke = Stroke::new(1.0, *line_color);

                for x in grid_lines(world_min.x, world_max.x, *spacing, zoom) {
                    let top = mapping.to_points(Pos2::new(x, world_max.y));
                    let bottom = mapping.to_points(Pos2::new(x, world_min.y));
                    self.shapes.push(egui::Shape::line_segment([top, bottom], stroke));
                }
                for y in grid_lines(world_min.y, world_max.y, *spacing, zoom) {
                    let left = mapping.to_points(Pos2::new(world_min.x, y));
                    let right = mapping.to_points(Pos2::new(world_max.x, y));
                    self.shapes.push(egui::Shape::line_segment([left, right], stroke));
                }
            }
        }
    }
}

impl SceneRenderer for EguiSceneRenderer {
    fn render(&mut self, scene: &Scene, view: &OrthographicView) {
        let mapping = ScreenMapping::new(*view, self.pixels_per_point);
        self.shapes.clear();
        for item in scene.draw_list() {
            self.push_item(item.shape, &item.transform, &mapping);
        }
        tracing::trace!("Rendered {} shapes", self.shapes.len());
    }
}

/// Measures text with egui's font system, in world units at zoom 1
pub struct EguiTextMeasurer {
    ctx: egui::Context,
}

impl EguiTextMeasurer {
    /// Create a measurer using the fonts of `ctx`
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl TextMeasurer for EguiTextMeasurer {
    fn measure(&mut self, text: &TextShape) -> Vec2 {
        let font = FontId::proportional(text.font_size);
        self.ctx
            .fonts(|fonts| fonts.layout_no_wrap(text.text.clone(), font, text.color).size())
    }
}
