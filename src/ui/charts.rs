use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints};

use league_dash::data::aggregate::{DashboardViews, TeamValue};
use league_dash::data::schema::REQUIRED_COLUMNS;
use league_dash::data::Dataset;

use crate::color::ColorMap;
use crate::state::{AppState, Tab};

const CHART_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the overview metrics and the chart tabs.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a league table to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new("Show Raw Data")
                .default_open(false)
                .show(ui, |ui: &mut Ui| raw_data_table(ui, &dataset));

            // An invalid selection stops here: no partial dashboard.
            let Some(views) = &state.views else {
                if let Some(err) = &state.filter_error {
                    ui.label(RichText::new(err).color(Color32::RED));
                }
                return;
            };

            ui.heading("Overview");
            overview(ui, views);
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                ui.selectable_value(&mut state.active_tab, Tab::Trends, "Trends");
                ui.selectable_value(&mut state.active_tab, Tab::Performance, "Performance");
                ui.selectable_value(&mut state.active_tab, Tab::Goals, "Goals");
                ui.selectable_value(&mut state.active_tab, Tab::TopPerformers, "Top Performers");
            });
            ui.separator();

            let colors = &state.color_map;
            match state.active_tab {
                Tab::Trends => {
                    ui.heading("Team Positions Over Time");
                    positions_chart(ui, views, colors);
                    ui.heading("Points Distribution");
                    points_box_plot(ui, views, colors);
                }
                Tab::Performance => {
                    ui.heading("Average Win Percentage");
                    team_value_bars(ui, "win_pct", &views.win_percentage, "Win %", Color32::from_rgb(49, 130, 189));
                    ui.heading("Goals Against Per Game");
                    team_value_bars(
                        ui,
                        "ga_per_game",
                        &views.goals_against_per_game,
                        "Goals Against/Game",
                        Color32::from_rgb(222, 45, 38),
                    );
                }
                Tab::Goals => {
                    ui.heading("Goals For vs Goals Against");
                    goals_chart(ui, views);
                    ui.heading("Goal Difference");
                    goal_difference_chart(ui, views);
                }
                Tab::TopPerformers => {
                    ui.heading(format!("Top {}: Best Average League Position", state.config.top_n));
                    team_value_bars(
                        ui,
                        "avg_position",
                        &views.best_average_position,
                        "Average Position (Lower is Better)",
                        Color32::from_rgb(0, 128, 128),
                    );
                    ui.heading(format!("Top {}: Highest Average Points", state.config.top_n));
                    team_value_bars(
                        ui,
                        "avg_points",
                        &views.highest_average_points,
                        "Avg Points",
                        Color32::from_rgb(68, 1, 84),
                    );
                }
            }
        });
}

fn overview(ui: &mut Ui, views: &DashboardViews) {
    let s = &views.summary;
    let avg = s
        .avg_points
        .map(|p| format!("{p:.1}"))
        .unwrap_or_else(|| "no data".to_string());
    let metrics = [
        ("Seasons", views.season_label.clone()),
        ("Clubs Analyzed", s.club_count.to_string()),
        ("Total Matches", s.total_matches.to_string()),
        ("Avg Points", avg),
    ];

    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(metrics.iter()) {
            col.label(*label);
            col.label(RichText::new(value).size(22.0).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// One line per team. Positions are plotted negated so first place is on top.
fn positions_chart(ui: &mut Ui, views: &DashboardViews, colors: &ColorMap) {
    let mut per_team: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &views.positions {
        per_team
            .entry(p.team.as_str())
            .or_default()
            .push([f64::from(p.season_end_year), -f64::from(p.position)]);
    }

    Plot::new("positions")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Season")
        .y_axis_label("League Position")
        .y_axis_formatter(|mark: GridMark, _range| whole_label(-mark.value))
        .x_axis_formatter(|mark: GridMark, _range| whole_label(mark.value))
        .show(ui, |plot_ui| {
            for (team, points) in per_team {
                let line = Line::new(PlotPoints::from(points))
                    .name(team)
                    .color(colors.color_for(team))
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}

fn points_box_plot(ui: &mut Ui, views: &DashboardViews, colors: &ColorMap) {
    let names: Vec<String> = views.points.iter().map(|t| t.team.clone()).collect();

    Plot::new("points_distribution")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Points")
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&names, mark.value))
        .show(ui, |plot_ui| {
            for (i, team) in views.points.iter().enumerate() {
                let Some(s) = team.spread() else {
                    continue;
                };
                let color = colors.color_for(&team.team);
                let elem = BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                    .name(&team.team)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&team.team));
            }
        });
}

/// Horizontal bars, one per team, in the order given.
fn team_value_bars(ui: &mut Ui, id: &str, values: &[TeamValue], axis: &str, color: Color32) {
    let names: Vec<String> = values.iter().map(|v| v.team.clone()).collect();
    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            Bar::new(i as f64, v.value)
                .name(format!("{}: {:.1}", v.team, v.value))
                .fill(color)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(axis)
        .y_axis_formatter(move |mark: GridMark, _range| category_label(&names, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.7));
        });
}

fn goals_chart(ui: &mut Ui, views: &DashboardViews) {
    let names: Vec<String> = views.goals.iter().map(|g| g.team.clone()).collect();
    let gf: Vec<Bar> = views
        .goals
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64 - 0.2, g.gf_total as f64).width(0.4))
        .collect();
    let ga: Vec<Bar> = views
        .goals
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64 + 0.2, g.ga_total as f64).width(0.4))
        .collect();

    Plot::new("goals_for_against")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&names, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(gf).name("Goals For").color(Color32::DARK_GREEN));
            plot_ui.bar_chart(BarChart::new(ga).name("Goals Against").color(Color32::DARK_RED));
        });
}

fn goal_difference_chart(ui: &mut Ui, views: &DashboardViews) {
    let names: Vec<String> = views.goals.iter().map(|g| g.team.clone()).collect();
    let bars: Vec<Bar> = views
        .goals
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let fill = if g.gd_total >= 0 {
                Color32::from_rgb(26, 152, 80)
            } else {
                Color32::from_rgb(215, 48, 39)
            };
            Bar::new(i as f64, g.gd_total as f64)
                .name(format!("{}: {:+}", g.team, g.gd_total))
                .fill(fill)
        })
        .collect();

    Plot::new("goal_difference")
        .height(CHART_HEIGHT)
        .y_axis_label("Goal Difference")
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&names, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7));
        });
}

fn whole_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        String::new()
    }
}

/// Team name for an integral axis mark, blank elsewhere.
fn category_label(names: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    names.get(value as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Raw data
// ---------------------------------------------------------------------------

fn raw_data_table(ui: &mut Ui, dataset: &Dataset) {
    let rows = dataset.rows();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(300.0)
        .columns(Column::auto().at_least(48.0), REQUIRED_COLUMNS.len())
        .header(20.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let r = &rows[row.index()];
                let cells = [
                    r.season_end_year.to_string(),
                    r.team.clone(),
                    r.position.to_string(),
                    r.played.to_string(),
                    r.won.to_string(),
                    r.drawn.to_string(),
                    r.lost.to_string(),
                    r.gf.to_string(),
                    r.ga.to_string(),
                    r.gd.to_string(),
                    r.points.to_string(),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
