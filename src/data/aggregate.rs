//! Derived views over a [`FilteredView`].
//!
//! Every function here is pure: the same view always yields the same
//! output, and an empty view yields an empty output (or `None`).
//! Team groups keep the order in which a team first appears in the view,
//! and every sort is stable, so equal values stay in that order.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::filter::FilteredView;
use super::model::SeasonRow;

/// Length of the "top N" rankings.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

/// Headline numbers above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub season_count: usize,
    pub club_count: usize,
    pub total_matches: u64,
    /// `None` when the view is empty ("no data").
    pub avg_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionPoint {
    pub team: String,
    pub season_end_year: i32,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamPoints {
    pub team: String,
    pub points: Vec<u32>,
}

/// Five-number summary of one team's season points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointsSpread {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamValue {
    pub team: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamGoals {
    pub team: String,
    pub gf_total: u64,
    pub ga_total: u64,
    /// Always `gf_total - ga_total`; the input `gd` column is not used.
    pub gd_total: i64,
}

// ---------------------------------------------------------------------------
// Grouping helpers
// ---------------------------------------------------------------------------

/// Group per-row values by team, teams in first-seen order. Rows for which
/// `value` returns `None` contribute nothing, but still register the team.
fn group_by_team<'v, T>(
    rows: &[&'v SeasonRow],
    value: impl Fn(&SeasonRow) -> Option<T>,
) -> Vec<(&'v str, Vec<T>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&'v str, Vec<T>)> = Vec::new();

    for &row in rows {
        let slot = *index.entry(row.team.as_str()).or_insert_with(|| {
            groups.push((row.team.as_str(), Vec::new()));
            groups.len() - 1
        });
        if let Some(v) = value(row) {
            groups[slot].1.push(v);
        }
    }
    groups
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Per-team mean of a per-row value. Teams with no contributing rows are left out.
fn team_means(rows: &[&SeasonRow], value: impl Fn(&SeasonRow) -> Option<f64>) -> Vec<TeamValue> {
    group_by_team(rows, value)
        .into_iter()
        .filter_map(|(team, values)| {
            mean(&values).map(|value| TeamValue {
                team: team.to_string(),
                value,
            })
        })
        .collect()
}

fn sort_ascending(values: &mut [TeamValue]) {
    values.sort_by(|a, b| a.value.total_cmp(&b.value));
}

fn sort_descending(values: &mut [TeamValue]) {
    values.sort_by(|a, b| b.value.total_cmp(&a.value));
}

/// Linear-interpolation percentile over sorted values (NumPy default).
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

pub fn summary_metrics(view: &FilteredView<'_>) -> SummaryMetrics {
    let rows = view.rows();
    let seasons: BTreeSet<i32> = rows.iter().map(|r| r.season_end_year).collect();
    let clubs: BTreeSet<&str> = rows.iter().map(|r| r.team.as_str()).collect();
    let points: Vec<f64> = rows.iter().map(|r| f64::from(r.points)).collect();

    SummaryMetrics {
        season_count: seasons.len(),
        club_count: clubs.len(),
        total_matches: rows.iter().map(|r| u64::from(r.played)).sum(),
        avg_points: mean(&points),
    }
}

/// Label for a season range, e.g. `1992-1993 to 2023-2024`.
pub fn season_label(start_season: i32, end_season: i32) -> String {
    format!(
        "{}-{} to {}-{}",
        i64::from(start_season) - 1,
        start_season,
        i64::from(end_season) - 1,
        end_season
    )
}

/// One point per row, grouped by team, seasons ascending within a team.
pub fn positions_over_time(view: &FilteredView<'_>) -> Vec<PositionPoint> {
    group_by_team(view.rows(), |r| Some((r.season_end_year, r.position)))
        .into_iter()
        .flat_map(|(team, mut seasons)| {
            seasons.sort_by_key(|(season, _)| *season);
            seasons
                .into_iter()
                .map(move |(season_end_year, position)| PositionPoint {
                    team: team.to_string(),
                    season_end_year,
                    position,
                })
        })
        .collect()
}

/// Season points per team, in row order.
pub fn points_distribution(view: &FilteredView<'_>) -> Vec<TeamPoints> {
    group_by_team(view.rows(), |r| Some(r.points))
        .into_iter()
        .map(|(team, points)| TeamPoints {
            team: team.to_string(),
            points,
        })
        .collect()
}

impl TeamPoints {
    /// `None` for a team without seasons.
    pub fn spread(&self) -> Option<PointsSpread> {
        if self.points.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.points.iter().map(|&p| f64::from(p)).collect();
        sorted.sort_by(f64::total_cmp);

        Some(PointsSpread {
            min: sorted[0],
            q1: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Mean of `won / played * 100` per team, ascending. Seasons with no games
/// played are skipped.
pub fn win_percentage_by_team(view: &FilteredView<'_>) -> Vec<TeamValue> {
    let mut out = team_means(view.rows(), |r| {
        (r.played > 0).then(|| f64::from(r.won) / f64::from(r.played) * 100.0)
    });
    sort_ascending(&mut out);
    out
}

/// Mean of `ga / played` per team, ascending. Seasons with no games played
/// are skipped.
pub fn goals_against_per_game(view: &FilteredView<'_>) -> Vec<TeamValue> {
    let mut out = team_means(view.rows(), |r| {
        (r.played > 0).then(|| f64::from(r.ga) / f64::from(r.played))
    });
    sort_ascending(&mut out);
    out
}

pub fn goals_for_against(view: &FilteredView<'_>) -> Vec<TeamGoals> {
    group_by_team(view.rows(), |r| Some((r.gf, r.ga)))
        .into_iter()
        .map(|(team, goals)| {
            let gf_total: u64 = goals.iter().map(|(gf, _)| u64::from(*gf)).sum();
            let ga_total: u64 = goals.iter().map(|(_, ga)| u64::from(*ga)).sum();
            TeamGoals {
                team: team.to_string(),
                gf_total,
                ga_total,
                gd_total: gf_total as i64 - ga_total as i64,
            }
        })
        .collect()
}

/// Lowest mean league position first.
pub fn top_by_best_average_position(view: &FilteredView<'_>, n: usize) -> Vec<TeamValue> {
    let mut out = team_means(view.rows(), |r| Some(f64::from(r.position)));
    sort_ascending(&mut out);
    out.truncate(n);
    out
}

/// Highest mean points first.
pub fn top_by_highest_average_points(view: &FilteredView<'_>, n: usize) -> Vec<TeamValue> {
    let mut out = team_means(view.rows(), |r| Some(f64::from(r.points)));
    sort_descending(&mut out);
    out.truncate(n);
    out
}

// ---------------------------------------------------------------------------
// DashboardViews – everything one render cycle needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub season_label: String,
    pub summary: SummaryMetrics,
    pub positions: Vec<PositionPoint>,
    pub points: Vec<TeamPoints>,
    pub win_percentage: Vec<TeamValue>,
    pub goals_against_per_game: Vec<TeamValue>,
    pub goals: Vec<TeamGoals>,
    pub best_average_position: Vec<TeamValue>,
    pub highest_average_points: Vec<TeamValue>,
}

impl DashboardViews {
    pub fn compute(view: &FilteredView<'_>, top_n: usize) -> Self {
        let spec = view.spec();
        Self {
            season_label: season_label(spec.start_season, spec.end_season),
            summary: summary_metrics(view),
            positions: positions_over_time(view),
            points: points_distribution(view),
            win_percentage: win_percentage_by_team(view),
            goals_against_per_game: goals_against_per_game(view),
            goals: goals_for_against(view),
            best_average_position: top_by_best_average_position(view, top_n),
            highest_average_points: top_by_highest_average_points(view, top_n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSpec};
    use crate::data::model::tests::row;
    use crate::data::model::Dataset;

    fn two_team_example() -> Dataset {
        Dataset::new(
            vec![
                row(2023, "A", 1, 2, 2, 0, 0, 5, 1, 6),
                row(2023, "B", 2, 2, 0, 0, 2, 1, 5, 0),
            ],
            Vec::new(),
        )
    }

    fn league() -> Dataset {
        Dataset::new(
            vec![
                row(2022, "Leeds", 17, 38, 9, 11, 18, 42, 79, 38),
                row(2022, "Arsenal", 5, 38, 22, 3, 13, 61, 48, 69),
                row(2022, "Brighton", 9, 38, 12, 15, 11, 42, 44, 51),
                row(2023, "Arsenal", 2, 38, 26, 6, 6, 88, 43, 84),
                row(2023, "Leeds", 19, 38, 7, 10, 21, 48, 78, 31),
                row(2023, "Brighton", 6, 38, 18, 8, 12, 72, 53, 62),
            ],
            Vec::new(),
        )
    }

    fn all(ds: &Dataset) -> FilteredView<'_> {
        filter(ds, &FilterSpec::seasons(i32::MIN, i32::MAX)).unwrap()
    }

    fn teams(values: &[TeamValue]) -> Vec<&str> {
        values.iter().map(|v| v.team.as_str()).collect()
    }

    #[test]
    fn two_team_summary_and_win_percentage() {
        let ds = two_team_example();
        let view = all(&ds);

        let summary = summary_metrics(&view);
        assert_eq!(summary.club_count, 2);
        assert_eq!(summary.season_count, 1);
        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.avg_points, Some(3.0));

        let win = win_percentage_by_team(&view);
        assert_eq!(
            win,
            vec![
                TeamValue { team: "B".into(), value: 0.0 },
                TeamValue { team: "A".into(), value: 100.0 },
            ]
        );
    }

    #[test]
    fn empty_view_yields_empty_outputs() {
        let ds = league();
        let view = filter(&ds, &FilterSpec::seasons(1990, 1991)).unwrap();
        let views = DashboardViews::compute(&view, DEFAULT_TOP_N);

        assert_eq!(views.summary.avg_points, None);
        assert_eq!(views.summary.club_count, 0);
        assert_eq!(views.summary.total_matches, 0);
        assert!(views.positions.is_empty());
        assert!(views.points.is_empty());
        assert!(views.win_percentage.is_empty());
        assert!(views.goals_against_per_game.is_empty());
        assert!(views.goals.is_empty());
        assert!(views.best_average_position.is_empty());
        assert!(views.highest_average_points.is_empty());
    }

    #[test]
    fn zero_played_rows_do_not_divide() {
        let ds = Dataset::new(
            vec![
                row(2023, "A", 1, 0, 0, 0, 0, 0, 0, 0),
                row(2024, "A", 1, 4, 1, 0, 3, 2, 6, 3),
                row(2023, "Ghost", 20, 0, 0, 0, 0, 0, 0, 0),
            ],
            Vec::new(),
        );
        let view = all(&ds);

        let win = win_percentage_by_team(&view);
        assert_eq!(win, vec![TeamValue { team: "A".into(), value: 25.0 }]);

        let ga = goals_against_per_game(&view);
        assert_eq!(ga, vec![TeamValue { team: "A".into(), value: 1.5 }]);
        assert!(ga.iter().all(|v| v.value.is_finite()));
    }

    #[test]
    fn goal_difference_is_recomputed() {
        let mut rows = league().rows().to_vec();
        // Deliberately inconsistent gd in the input.
        rows[0].gd = 99;
        let ds = Dataset::new(rows, Vec::new());
        let goals = goals_for_against(&all(&ds));

        assert_eq!(goals.len(), 3);
        for g in &goals {
            assert_eq!(g.gd_total, g.gf_total as i64 - g.ga_total as i64);
        }
        let leeds = goals.iter().find(|g| g.team == "Leeds").unwrap();
        assert_eq!((leeds.gf_total, leeds.ga_total, leeds.gd_total), (90, 157, -67));
    }

    #[test]
    fn goals_keep_first_seen_team_order() {
        let ds = league();
        let names: Vec<String> = goals_for_against(&all(&ds)).into_iter().map(|g| g.team).collect();
        assert_eq!(names, vec!["Leeds", "Arsenal", "Brighton"]);
    }

    #[test]
    fn positions_are_grouped_by_team_then_season() {
        let ds = Dataset::new(
            vec![
                row(2023, "Leeds", 19, 38, 7, 10, 21, 48, 78, 31),
                row(2022, "Arsenal", 5, 38, 22, 3, 13, 61, 48, 69),
                row(2022, "Leeds", 17, 38, 9, 11, 18, 42, 79, 38),
                row(2023, "Arsenal", 2, 38, 26, 6, 6, 88, 43, 84),
            ],
            Vec::new(),
        );
        let positions = positions_over_time(&all(&ds));
        assert_eq!(positions.len(), 4);
        assert_eq!(
            positions
                .iter()
                .map(|p| (p.team.as_str(), p.season_end_year, p.position))
                .collect::<Vec<_>>(),
            vec![
                ("Leeds", 2022, 17),
                ("Leeds", 2023, 19),
                ("Arsenal", 2022, 5),
                ("Arsenal", 2023, 2),
            ]
        );
    }

    #[test]
    fn points_distribution_and_spread() {
        let ds = league();
        let dist = points_distribution(&all(&ds));
        assert_eq!(dist[0].team, "Leeds");
        assert_eq!(dist[0].points, vec![38, 31]);

        let spread = TeamPoints {
            team: "X".into(),
            points: vec![40, 10, 30, 20],
        }
        .spread()
        .unwrap();
        assert_eq!(spread.min, 10.0);
        assert_eq!(spread.max, 40.0);
        assert_eq!(spread.median, 25.0);
        assert_eq!(spread.q1, 17.5);
        assert_eq!(spread.q3, 32.5);

        let empty = TeamPoints { team: "Y".into(), points: Vec::new() };
        assert!(empty.spread().is_none());
    }

    #[test]
    fn best_average_position_is_ascending_and_truncated() {
        let ds = league();
        let view = all(&ds);

        let top = top_by_best_average_position(&view, DEFAULT_TOP_N);
        assert_eq!(teams(&top), vec!["Arsenal", "Brighton", "Leeds"]);
        assert_eq!(top[0].value, 3.5);
        assert!(top.windows(2).all(|w| w[0].value <= w[1].value));

        let top1 = top_by_best_average_position(&view, 1);
        assert_eq!(teams(&top1), vec!["Arsenal"]);
    }

    #[test]
    fn highest_average_points_is_descending() {
        let ds = league();
        let top = top_by_highest_average_points(&all(&ds), 2);
        assert_eq!(teams(&top), vec!["Arsenal", "Brighton"]);
        assert_eq!(top[0].value, 76.5);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let ds = Dataset::new(
            vec![
                row(2023, "Zulu", 3, 38, 10, 10, 18, 40, 50, 40),
                row(2023, "Alpha", 3, 38, 10, 10, 18, 40, 50, 40),
                row(2023, "Mike", 1, 38, 30, 4, 4, 90, 20, 94),
            ],
            Vec::new(),
        );
        let view = all(&ds);
        assert_eq!(
            teams(&top_by_best_average_position(&view, 10)),
            vec!["Mike", "Zulu", "Alpha"]
        );
        assert_eq!(
            teams(&top_by_highest_average_points(&view, 10)),
            vec!["Mike", "Zulu", "Alpha"]
        );
    }

    #[test]
    fn rankings_cap_at_n() {
        let rows = (0..15)
            .map(|i| row(2023, &format!("Club {i:02}"), i + 1, 38, 10, 10, 18, 40, 50, 40))
            .collect();
        let ds = Dataset::new(rows, Vec::new());
        let view = all(&ds);
        assert_eq!(top_by_best_average_position(&view, DEFAULT_TOP_N).len(), 10);
        assert_eq!(top_by_highest_average_points(&view, DEFAULT_TOP_N).len(), 10);
    }

    #[test]
    fn season_label_format() {
        assert_eq!(season_label(1993, 2024), "1992-1993 to 2023-2024");
        assert_eq!(
            season_label(i32::MIN, i32::MIN),
            "-2147483649--2147483648 to -2147483649--2147483648"
        );
    }

    #[test]
    fn dashboard_views_use_filter_range_for_label() {
        let ds = league();
        let view = filter(&ds, &FilterSpec::seasons(2022, 2023)).unwrap();
        let views = DashboardViews::compute(&view, 2);
        assert_eq!(views.season_label, "2021-2022 to 2022-2023");
        assert_eq!(views.best_average_position.len(), 2);
        assert_eq!(views.summary.season_count, 2);
        assert_eq!(views.summary.total_matches, 228);
    }

    #[test]
    fn dashboard_over_unbounded_season_range() {
        let ds = league();
        let views = DashboardViews::compute(&all(&ds), DEFAULT_TOP_N);
        assert!(views.season_label.starts_with("-2147483649-"));
        assert_eq!(views.summary.season_count, 2);
        assert_eq!(views.best_average_position.len(), 3);
    }
}
