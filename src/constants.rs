/// User agent string for HTTP requests
pub const USER_AGENT: &str = "weather-history/0.1.0";

/// Visual Crossing timeline API base URL
pub const VISUAL_CROSSING_API_BASE: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Meteostat JSON API base URL
pub const METEOSTAT_API_BASE: &str = "https://meteostat.p.rapidapi.com";

/// Nominatim (OpenStreetMap) geocoding base URL
pub const NOMINATIM_API_BASE: &str = "https://nominatim.openstreetmap.org";

pub const DEFAULT_CONFIG_PATH: &str = "weather.toml";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/main.html";
pub const DEFAULT_OUTPUT_PATH: &str = "output/weather.html";
pub const DEFAULT_VISUAL_CROSSING_KEY_FILE: &str = "secrets/visualcrossing_api_key.txt";
pub const DEFAULT_METEOSTAT_KEY_FILE: &str = "secrets/meteostat_api_key.txt";

/// File name of the location cache inside the cache directory
pub const LOCATION_CACHE_FILE: &str = "locations.json";

/// Millimeters of precipitation to inches, as used by the Meteostat page builds.
///
/// Unverified: the source unit of `prcp` was never confirmed, so this factor is
/// configurable rather than assumed correct.
pub const DEFAULT_PRECIPITATION_FACTOR: f64 = 0.0610237;

/// Template placeholder the rendered fragments are substituted into
pub const CONTENT_PLACEHOLDER: &str = "content";
