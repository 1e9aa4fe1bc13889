// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wirecanvas - node graph canvas
//!
//! A window showing a pannable, zoomable canvas of node boxes:
//! - Drag the background to pan, scroll to zoom, middle-click to reset zoom
//! - Drag a node's title bar or body to move it
//! - Drag from a pin to stretch a connector line
//!
//! ## Architecture
//!
//! The window and GPU setup live here; the frame loop, scene graph and
//! pointer dispatch live in `wirecanvas_runtime`, the node visuals in
//! `wirecanvas_graph`. egui paints the scene through its background layer.

mod app;
mod config;
mod input;
mod overlay;
mod render;

use app::CanvasApp;
use config::AppConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wirecanvas=debug,wgpu=warn,naga=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wirecanvas v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_args(std::env::args()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = CanvasApp::run(config) {
        tracing::error!("Canvas crashed: {e}");
        std::process::exit(1);
    }
}
