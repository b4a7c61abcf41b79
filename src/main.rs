//! BIO App - a single-page personal profile editor
//!
//! Shows a profile card plus any number of extra sections, editable behind a
//! local admin password.

mod app;
mod core;
mod ui;

use app::BioApp;
use crate::core::config::AppConfig;
use eframe::egui;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize logging
    let level = config.log_level.parse().unwrap_or(LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(level)
        .init();

    if let Err(e) = &loaded {
        tracing::warn!("Using default config: {:#}", e);
    }
    tracing::info!("Starting BIO App...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([480.0, 400.0])
            .with_title("BIO App"),
        ..Default::default()
    };

    eframe::run_native(
        "BIO App",
        native_options,
        Box::new(move |cc| Ok(Box::new(BioApp::new(cc, &config)))),
    )
}
