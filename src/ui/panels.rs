use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let seasons = dataset.seasons();
    let teams = dataset.teams();

    // ---- Season range ----
    ui.strong("Start Season");
    let mut start = state.filter.start_season;
    season_combo(ui, "start_season", &mut start, &seasons);
    if start != state.filter.start_season {
        state.set_start_season(start);
    }

    ui.strong("End Season");
    let mut end = state.filter.end_season;
    season_combo(ui, "end_season", &mut end, &seasons);
    if end != state.filter.end_season {
        state.set_end_season(end);
    }

    if let Some(err) = &state.filter_error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
    ui.separator();

    // ---- Club multiselect ----
    let n_selected = state.filter.selected_teams.len();
    ui.strong(format!("Filter by Club(s)  ({n_selected}/{})", teams.len()));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_teams();
        }
        if ui.small_button("None").clicked() {
            state.select_no_teams();
        }
        if ui.small_button("Latest season").clicked() {
            state.select_latest_clubs();
        }
    });
    if n_selected == 0 {
        ui.label(RichText::new("No clubs selected: showing all").italics());
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for team in &teams {
                let mut checked = state.filter.selected_teams.contains(team);
                let text = RichText::new(team).color(state.color_map.color_for(team));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_team(team);
                }
            }
        });
}

fn season_combo(ui: &mut Ui, id: &str, value: &mut i32, seasons: &[i32]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for &season in seasons {
                ui.selectable_value(value, season, season.to_string());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.views.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export views…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(name)) = (&state.dataset, &state.source_name) {
            ui.label(format!(
                "{name}: {} rows, {} seasons, {} clubs",
                ds.len(),
                ds.seasons().len(),
                ds.teams().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open league table")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "txt"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("Tab-delimited text", &["txt"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export derived views")
        .add_filter("JSON", &["json"])
        .set_file_name("league-views.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_views(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
