use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Season preferred as the "current" one when it is present in the data.
pub const PREFERRED_LATEST_SEASON: i32 = 2024;

// ---------------------------------------------------------------------------
// SeasonRow – one team's record for one season
// ---------------------------------------------------------------------------

/// A single league table line.
///
/// `played = won + drawn + lost` and `gd = gf - ga` are expected to hold
/// in well-formed input but are not checked. Neither is `position >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRow {
    pub season_end_year: i32,
    pub team: String,
    pub position: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub gf: u32,
    pub ga: u32,
    pub gd: i32,
    pub points: u32,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The parsed input file. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    rows: Vec<SeasonRow>,
    /// Normalized header names in file order, including extra columns.
    columns: Vec<String>,
}

impl Dataset {
    pub fn new(rows: Vec<SeasonRow>, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    pub fn rows(&self) -> &[SeasonRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted distinct seasons.
    pub fn seasons(&self) -> Vec<i32> {
        self.rows
            .iter()
            .map(|r| r.season_end_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct team names.
    pub fn teams(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.team.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// 2024 when the data contains it, otherwise the most recent season.
    pub fn latest_season(&self) -> Option<i32> {
        if self
            .rows
            .iter()
            .any(|r| r.season_end_year == PREFERRED_LATEST_SEASON)
        {
            return Some(PREFERRED_LATEST_SEASON);
        }
        self.rows.iter().map(|r| r.season_end_year).max()
    }

    /// Sorted distinct teams that played in `season`.
    pub fn teams_in_season(&self, season: i32) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.season_end_year == season)
            .map(|r| r.team.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
