mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod ui;

use std::path::Path;

use app::TwinsViewerApp;
use config::{AppConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE));
    log::info!(
        "Data directory {}, duration slider 0..={} days",
        config.data_dir.display(),
        config.max_days
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Twins Study: Gene & Oxidative Stress",
        options,
        Box::new(move |_cc| Ok(Box::new(TwinsViewerApp::new(config)))),
    )
}
