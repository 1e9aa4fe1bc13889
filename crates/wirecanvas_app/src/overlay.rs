// SPDX-License-Identifier: MIT OR Apache-2.0
//! Debug overlay window mirroring the runtime's debug messages.

use std::cell::RefCell;
use std::rc::Rc;
use wirecanvas_runtime::{DebugOverlay, ListenerId, Runtime};

/// egui window listing the visible debug messages and frame statistics
#[derive(Debug, Default)]
pub struct OverlayWindow {
    messages: Rc<RefCell<Vec<String>>>,
    listener: Option<ListenerId>,
    /// Whether the window is shown
    pub open: bool,
}

impl OverlayWindow {
    /// Create a window that is shown by default
    pub fn new(open: bool) -> Self {
        Self {
            open,
            ..Self::default()
        }
    }

    /// Subscribe to an overlay's change broadcast
    pub fn attach(&mut self, overlay: &DebugOverlay) {
        if let Some(previous) = self.listener.take() {
            overlay.on_change().remove(previous);
        }
        let sink = Rc::clone(&self.messages);
        self.listener = Some(overlay.on_change().add(move |messages| {
            sink.borrow_mut().clone_from(messages);
            Ok(())
        }));
        self.messages.borrow_mut().clone_from(&overlay.messages());
    }

    /// Messages as last broadcast
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Draw the window
    pub fn ui(&mut self, ctx: &egui::Context, runtime: &Runtime) {
        let messages = self.messages.borrow();
        let time = runtime.time();
        egui::Window::new("Debug")
            .open(&mut self.open)
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Frame {} | {:.1} ms",
                    time.frame,
                    time.delta * 1000.0
                ));
                ui.label(format!(
                    "Objects: {} | Zoom: {:.2}",
                    runtime.object_count(),
                    runtime.camera().zoom_scale()
                ));
                let position = runtime.camera().position();
                ui.label(format!("Camera: {:.0}, {:.0}", position.x, position.y));

                ui.separator();
                if messages.is_empty() {
                    ui.weak("No messages");
                }
                for message in messages.iter() {
                    ui.monospace(message);
                }
            });
    }
}
