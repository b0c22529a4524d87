mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use app::GeneCorApp;
use config::ViewerConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::load().unwrap_or_else(|e| {
        log::warn!("{e}; using default settings");
        ViewerConfig::default()
    });

    // A path on the command line wins over the configured default.
    let initial = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.default_data_path.clone());

    let mut state = AppState::new(config);
    if let Some(path) = initial {
        state.open_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Gene/Pathway Correlation Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(GeneCorApp::new(state)))),
    )
}
