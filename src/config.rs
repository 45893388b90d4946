use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::cleaner::CleanRules;
use crate::data::filter::BinCount;

/// Optional settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default, so a partial (or absent)
/// `dashboard.json` is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listings file loaded at startup.
    pub source_path: PathBuf,
    /// Rows shown while the full table is collapsed.
    pub head_rows: usize,
    pub default_bins: u32,
    pub price_max: f64,
    pub odometer_max: f64,
    pub model_year_min: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let rules = CleanRules::default();
        Self {
            source_path: PathBuf::from("vehicles_us.csv"),
            head_rows: 10,
            default_bins: BinCount::DEFAULT,
            price_max: rules.price_max,
            odometer_max: rules.odometer_max,
            model_year_min: rules.model_year_min,
        }
    }
}

impl DashboardConfig {
    /// Read `path` if it exists. A malformed file is reported and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {} found, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Cannot read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(cfg) => {
                log::info!("Loaded settings from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Cleaning bounds, with the model-year ceiling set to the current year.
    pub fn rules(&self) -> CleanRules {
        CleanRules {
            price_max: self.price_max,
            odometer_max: self.odometer_max,
            model_year_min: self.model_year_min,
            ..CleanRules::default()
        }
    }

    pub fn bins(&self) -> BinCount {
        BinCount::new(self.default_bins)
    }
}
