//! Page configuration: which provider to use, where files live, and the
//! ordered list of locations and periods to render.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_METEOSTAT_KEY_FILE, DEFAULT_OUTPUT_PATH, DEFAULT_PRECIPITATION_FACTOR,
    DEFAULT_TEMPLATE_PATH, DEFAULT_VISUAL_CROSSING_KEY_FILE, METEOSTAT_API_BASE, NOMINATIM_API_BASE,
    VISUAL_CROSSING_API_BASE,
};
use crate::models::TemperatureField;

/// Weather data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    VisualCrossing,
    Meteostat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderKind,

    /// Root of the location and weather caches
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// HTML template containing a `{{ content }}` placeholder
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Rendered page destination
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub visual_crossing: VisualCrossingConfig,

    #[serde(default)]
    pub meteostat: MeteostatConfig,

    #[serde(default)]
    pub nominatim: NominatimConfig,

    /// Locations in render order
    #[serde(default, rename = "location")]
    pub locations: Vec<LocationEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Request timeout; requests may block indefinitely when unset
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualCrossingConfig {
    pub base_url: String,
    pub api_key_file: PathBuf,
}

impl Default for VisualCrossingConfig {
    fn default() -> Self {
        Self {
            base_url: VISUAL_CROSSING_API_BASE.to_string(),
            api_key_file: PathBuf::from(DEFAULT_VISUAL_CROSSING_KEY_FILE),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeteostatConfig {
    pub base_url: String,
    pub api_key_file: PathBuf,
    /// Multiplier from the reported precipitation unit to inches
    pub precipitation_factor: f64,
}

impl Default for MeteostatConfig {
    fn default() -> Self {
        Self {
            base_url: METEOSTAT_API_BASE.to_string(),
            api_key_file: PathBuf::from(DEFAULT_METEOSTAT_KEY_FILE),
            precipitation_factor: DEFAULT_PRECIPITATION_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_API_BASE.to_string(),
        }
    }
}

/// One rendered location and the periods to show for it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    #[serde(default = "default_months")]
    pub months: Vec<u32>,
    #[serde(default = "default_years")]
    pub years: Vec<i32>,
    #[serde(default)]
    pub temperature_field: TemperatureField,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_template() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE_PATH)
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_months() -> Vec<u32> {
    vec![2, 3]
}

fn default_years() -> Vec<i32> {
    vec![2020, 2021, 2022]
}

impl Config {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.locations.is_empty() {
            errors.push("at least one [[location]] is required".to_string());
        }
        for entry in &self.locations {
            if entry.name.trim().is_empty() {
                errors.push("location name must not be empty".to_string());
            }
            if entry.months.is_empty() {
                errors.push(format!("{}: months must not be empty", entry.name));
            }
            if entry.years.is_empty() {
                errors.push(format!("{}: years must not be empty", entry.name));
            }
            for month in entry.months.iter().filter(|m| !(1..=12u32).contains(*m)) {
                errors.push(format!("{}: month {} is not in 1..=12", entry.name, month));
            }
        }

        let factor = self.meteostat.precipitation_factor;
        if !factor.is_finite() || factor <= 0.0 {
            errors.push(format!("meteostat.precipitation_factor must be positive, got {}", factor));
        }

        if !errors.is_empty() {
            bail!(errors.join("; "));
        }
        Ok(())
    }
}

/// Read an API key from a plaintext file.
///
/// A missing or blank file yields `None`; requests that need the key fail later.
pub fn read_secret(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let key = contents.trim();
            Ok((!key.is_empty()).then(|| key.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "API key file not found, only cached data is available");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read API key file {}", path.display())),
    }
}
