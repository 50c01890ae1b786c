use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use league_dash::config::AppConfig;
use league_dash::data::{filter, DashboardViews, Dataset, FilterSpec, LoadCache, SourceFormat};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Chart tab shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Trends,
    Performance,
    Goals,
    TopPerformers,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Parsed files, keyed by content.
    cache: LoadCache,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// File name shown in the top bar.
    pub source_name: Option<String>,

    /// Current sidebar selection.
    pub filter: FilterSpec,

    /// Derived tables for the current selection; None while the filter is invalid.
    pub views: Option<DashboardViews>,

    /// Filter problem shown in the side panel instead of the charts.
    pub filter_error: Option<String>,

    /// Team colours, fixed per dataset.
    pub color_map: ColorMap,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: LoadCache::new(),
            dataset: None,
            source_name: None,
            filter: FilterSpec::seasons(0, 0),
            views: None,
            filter_error: None,
            color_map: ColorMap::default(),
            active_tab: Tab::default(),
            status_message: None,
        }
    }

    /// Open the configured default file, if there is one.
    pub fn load_default(&mut self) {
        let path = self.config.data_path.clone();
        if !path.exists() {
            log::warn!("Default data file {} not found", path.display());
            self.status_message =
                Some("Could not load default data. Please open a file.".to_string());
            return;
        }
        self.open_path(&path);
    }

    /// Load a file and report the outcome in the status line.
    pub fn open_path(&mut self, path: &Path) {
        match self.load_path(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows ({} seasons, {} clubs) from {}",
                    dataset.len(),
                    dataset.seasons().len(),
                    dataset.teams().len(),
                    path.display()
                );
                self.source_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn load_path(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let format = SourceFormat::from_path(path)?;
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let dataset = self
            .cache
            .load(&bytes, format, &self.config.encoding)
            .with_context(|| format!("loading {} as {format}", path.display()))?;
        Ok(dataset)
    }

    /// Ingest a newly loaded dataset and reset the selection.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.filter = FilterSpec::default_for(&dataset);
        self.color_map = ColorMap::new(&dataset.teams());
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute every derived view after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.views = None;
            return;
        };
        match filter(ds, &self.filter) {
            Ok(view) => {
                self.views = Some(DashboardViews::compute(&view, self.config.top_n));
                self.filter_error = None;
            }
            Err(e) => {
                log::error!("{e}");
                self.views = None;
                self.filter_error = Some(e.to_string());
            }
        }
    }

    pub fn set_start_season(&mut self, season: i32) {
        self.filter.start_season = season;
        self.refilter();
    }

    pub fn set_end_season(&mut self, season: i32) {
        self.filter.end_season = season;
        self.refilter();
    }

    /// Toggle a single club in the selection.
    pub fn toggle_team(&mut self, team: &str) {
        if !self.filter.selected_teams.remove(team) {
            self.filter.selected_teams.insert(team.to_string());
        }
        self.refilter();
    }

    /// Select every club. Equivalent to no club filter.
    pub fn select_all_teams(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filter.selected_teams = ds.teams().into_iter().collect();
            self.refilter();
        }
    }

    /// Clear the club selection, which removes the club filter.
    pub fn select_no_teams(&mut self) {
        self.filter.selected_teams.clear();
        self.refilter();
    }

    /// Select the clubs of the latest season.
    pub fn select_latest_clubs(&mut self) {
        if let Some(ds) = &self.dataset {
            if let Some(season) = ds.latest_season() {
                self.filter.selected_teams = ds.teams_in_season(season).into_iter().collect();
                self.refilter();
            }
        }
    }

    /// Write the current derived views as pretty JSON.
    pub fn export_views(&self, path: &Path) -> Result<()> {
        let views = self
            .views
            .as_ref()
            .context("no views to export; load a file and pick a valid range first")?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), views)
            .context("writing views as JSON")?;
        log::info!("Exported views to {}", path.display());
        Ok(())
    }
}
