use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::model::{Dataset, SeasonRow};

/// How many clubs to preselect when the latest season lists none.
const FALLBACK_CLUB_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Filter predicate: season range + selected clubs
// ---------------------------------------------------------------------------

/// The active dashboard selection.
///
/// An empty `selected_teams` means "no team filter", not "no teams".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub start_season: i32,
    pub end_season: i32,
    pub selected_teams: BTreeSet<String>,
}

impl FilterSpec {
    /// Inclusive season range, no team filter.
    pub fn seasons(start_season: i32, end_season: i32) -> Self {
        Self {
            start_season,
            end_season,
            selected_teams: BTreeSet::new(),
        }
    }

    /// The selection shown right after a file is opened: the last three
    /// seasons and the clubs of the latest season.
    pub fn default_for(dataset: &Dataset) -> Self {
        let seasons = dataset.seasons();
        let end_season = seasons.last().copied().unwrap_or_default();
        let start_season = seasons
            .len()
            .checked_sub(3)
            .and_then(|i| seasons.get(i))
            .or_else(|| seasons.first())
            .copied()
            .unwrap_or_default();

        let mut clubs = dataset
            .latest_season()
            .map(|s| dataset.teams_in_season(s))
            .unwrap_or_default();
        if clubs.is_empty() {
            clubs = dataset.teams().into_iter().take(FALLBACK_CLUB_COUNT).collect();
        }

        Self {
            start_season,
            end_season,
            selected_teams: clubs.into_iter().collect(),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.start_season > self.end_season {
            return Err(PipelineError::InvalidRange {
                start: self.start_season,
                end: self.end_season,
            });
        }
        Ok(())
    }

    /// Whether a single row passes the filter.
    pub fn matches(&self, row: &SeasonRow) -> bool {
        (self.start_season..=self.end_season).contains(&row.season_end_year)
            && (self.selected_teams.is_empty() || self.selected_teams.contains(&row.team))
    }
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed rows passing the filter
// ---------------------------------------------------------------------------

/// Rows of a [`Dataset`] that pass a [`FilterSpec`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a SeasonRow>,
    spec: FilterSpec,
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a SeasonRow] {
        &self.rows
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Apply `spec` to `dataset`. An empty result is not an error.
pub fn filter<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> Result<FilteredView<'a>, PipelineError> {
    spec.validate()?;

    let rows: Vec<&SeasonRow> = dataset.rows().iter().filter(|r| spec.matches(r)).collect();
    log::debug!(
        "filter {}..={} ({} clubs selected): {} of {} rows",
        spec.start_season,
        spec.end_season,
        spec.selected_teams.len(),
        rows.len(),
        dataset.len()
    );

    Ok(FilteredView {
        rows,
        spec: spec.clone(),
    })
}
