#![warn(clippy::all, rust_2018_idioms)]

use std::path::PathBuf;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::var_os("KIDBOX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let config = kidbox::KioskConfig::load(&config_path);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("kidbox")
            .with_fullscreen(true),
        ..Default::default()
    };
    eframe::run_native(
        "kidbox",
        native_options,
        Box::new(|cc| Ok(Box::new(kidbox::KioskApp::new(cc, config)))),
    )
}
