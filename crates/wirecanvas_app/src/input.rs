// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translation of winit window events into canvas input events.

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use wirecanvas_runtime::{InputEvent, InputQueue, PointerButton};

/// Pixels per scrolled line, matching browser wheel deltas
const LINE_HEIGHT: f32 = 100.0;

/// Map a winit mouse button
pub fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(code) => PointerButton::Other(code),
    }
}

/// Vertical wheel delta in pixels, positive when scrolling down
pub fn wheel_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    }
}

/// Events for a button press or release.
///
/// Releasing a button other than the primary one also reports an auxiliary click.
pub fn button_events(state: ElementState, button: MouseButton) -> Vec<InputEvent> {
    let button = pointer_button(button);
    match state {
        ElementState::Pressed => vec![InputEvent::PointerDown { button }],
        ElementState::Released if button == PointerButton::Primary => {
            vec![InputEvent::PointerUp { button }]
        }
        ElementState::Released => vec![
            InputEvent::PointerUp { button },
            InputEvent::AuxClick { button },
        ],
    }
}

/// Whether a window event reaches the canvas after egui has seen it.
///
/// egui keeps events it consumed, except button releases and anything during
/// a canvas drag, which always end up at the canvas.
pub fn passes_to_canvas(event: &WindowEvent, consumed: bool, dragging: bool) -> bool {
    let release = matches!(
        event,
        WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        }
    );
    routes_to_canvas(release, consumed, dragging)
}

fn routes_to_canvas(release: bool, consumed: bool, dragging: bool) -> bool {
    release || dragging || !consumed
}

/// Push the canvas events for a window event; returns whether any were produced
pub fn forward(queue: &InputQueue, event: &WindowEvent) -> bool {
    let events = match event {
        WindowEvent::CursorMoved { position, .. } => vec![InputEvent::PointerMove {
            x: position.x as f32,
            y: position.y as f32,
        }],
        WindowEvent::MouseInput { state, button, .. } => button_events(*state, *button),
        WindowEvent::MouseWheel { delta, .. } => vec![InputEvent::Wheel {
            delta_y: wheel_delta(*delta),
        }],
        WindowEvent::Resized(size) => vec![InputEvent::Resize {
            width: size.width as f32,
            height: size.height as f32,
        }],
        _ => Vec::new(),
    };

    let produced = !events.is_empty();
    for event in events {
        queue.push(event);
    }
    produced
}
