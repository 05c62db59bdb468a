use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Visual Crossing API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VisualCrossingResponse {
    #[serde(rename = "resolvedAddress")]
    pub resolved_address: Option<String>,
    pub days: Vec<Map<String, Value>>,
}

/// Daily temperature field read from Visual Crossing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureField {
    #[default]
    TempMax,
    FeelsLikeMax,
}

impl TemperatureField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TempMax => "tempmax",
            Self::FeelsLikeMax => "feelslikemax",
        }
    }
}

/// Visual Crossing field holding daily precipitation in inches
pub const PRECIPITATION_FIELD: &str = "precip";

// ============================================================================
// Meteostat API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MeteostatResponse {
    #[serde(default)]
    pub data: Vec<DailyRow>,
}

/// One row of daily observations in metric units.
///
/// This is both the Meteostat API record (keyed by `date`) and the row of the
/// tabular cache dump (keyed by `time`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    #[serde(alias = "date")]
    pub time: String,
    pub tavg: Option<f64>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub prcp: Option<f64>,
    pub snow: Option<f64>,
    pub wdir: Option<f64>,
    pub wspd: Option<f64>,
    pub wpgt: Option<f64>,
    pub pres: Option<f64>,
    pub tsun: Option<f64>,
}

// ============================================================================
// Nominatim API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}
