mod app;
mod color;
mod config;
mod data;
mod inference;
mod state;
mod ui;
mod view;

use app::VizApp;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::from_env();
    log::info!("reading datasets relative to {}", config.base_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        ui::panels::APP_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(VizApp::new(config)))),
    )
}
