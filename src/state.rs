use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::{filter, BinCount, DateRange, FilteredView};
use crate::data::model::CleanedDataset;

/// Shown once the user asks for the takeaway.
pub const CONCLUSION: &str =
    "Newer vehicles with lower mileage tend to be listed at higher prices.";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Cleaned datasets keyed by source identity.
    pub cache: DatasetCache,

    /// Source currently displayed.
    pub source_path: Option<PathBuf>,

    /// Loaded dataset (None until a source loads successfully).
    pub dataset: Option<Arc<CleanedDataset>>,

    /// Posting-date selection; starts as the dataset's full span.
    pub date_range: DateRange,

    /// Indices of listings passing the current date range.
    pub visible_indices: Vec<usize>,

    /// Full table vs. the first `config.head_rows` rows.
    pub show_full_table: bool,

    pub bins: BinCount,

    /// Whether the conclusion button has been clicked.
    pub show_conclusion: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            cache: DatasetCache::new(config.rules()),
            bins: config.bins(),
            config,
            source_path: None,
            dataset: None,
            date_range: DateRange::default(),
            visible_indices: Vec::new(),
            show_full_table: false,
            show_conclusion: false,
            status_message: None,
        }
    }

    /// Load the configured source. Failure leaves the dashboard empty with the
    /// error in `status_message`.
    pub fn load_configured_source(&mut self) {
        let path = self.config.source_path.clone();
        if let Err(e) = self.load_source(&path) {
            log::error!("Failed to load {}: {e:#}", path.display());
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Show the dataset for `path`, reading it only when not cached.
    pub fn load_source(&mut self, path: &Path) -> Result<()> {
        let dataset = self
            .cache
            .get_or_load(path)
            .with_context(|| format!("loading listings from {}", path.display()))?;

        if dataset.is_empty() {
            log::warn!("No listings in {} survived cleaning", path.display());
        } else {
            log::info!(
                "Showing {} listings with columns {:?}",
                dataset.len(),
                dataset.columns
            );
        }

        self.date_range = full_span(&dataset);
        self.source_path = Some(path.to_path_buf());
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
        Ok(())
    }

    /// Drop the cached copy of the current source and read it again.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = self.source_path.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        self.load_source(&path)
    }

    /// Recompute `visible_indices` after a date-range change.
    pub fn refilter(&mut self) {
        self.visible_indices = match &self.dataset {
            Some(ds) => filter(ds, &self.date_range).into_indices(),
            None => Vec::new(),
        };
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        if range != self.date_range {
            self.date_range = range;
            self.refilter();
        }
    }

    /// Back to the dataset's full posting-date span.
    pub fn reset_date_range(&mut self) {
        if let Some(ds) = &self.dataset {
            let range = full_span(ds);
            self.set_date_range(range);
        }
    }

    pub fn set_bins(&mut self, n: u32) {
        self.bins = BinCount::new(n);
    }

    pub fn reveal_conclusion(&mut self) {
        self.show_conclusion = true;
    }

    /// Listings visible for the current interaction.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        let ds = self.dataset.as_deref()?;
        Some(FilteredView::from_indices(ds, &self.visible_indices))
    }

    /// Number of rows the table should show.
    pub fn table_rows(&self) -> usize {
        if self.show_full_table {
            self.visible_indices.len()
        } else {
            self.config.head_rows.min(self.visible_indices.len())
        }
    }
}

fn full_span(dataset: &CleanedDataset) -> DateRange {
    match dataset.date_span() {
        Some((start, end)) => DateRange::new(start, end),
        None => DateRange::default(),
    }
}
