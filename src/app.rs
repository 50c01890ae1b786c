use eframe::egui;

use league_dash::config::AppConfig;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LeagueDashApp {
    pub state: AppState,
}

impl LeagueDashApp {
    /// Build the app and open the configured default file.
    pub fn new(config: AppConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_default();
        Self { state }
    }
}

impl eframe::App for LeagueDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &mut self.state);
        });
    }
}
