mod app;
mod color;
mod state;
mod ui;

use app::LeagueDashApp;
use eframe::egui;
use league_dash::config::AppConfig;

fn main() -> eframe::Result {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let config = AppConfig::from_env();
    log::debug!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "League Dash – Football League Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(LeagueDashApp::new(config)))),
    )
}
