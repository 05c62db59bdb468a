//! Historical daily weather pages.
//!
//! Fetches daily max temperature and precipitation for named locations over
//! chosen months and years, caches raw provider responses on disk, and renders
//! the results as a static HTML page of bar-like divs.
//!
//! Two providers are supported: the Visual Crossing timeline API (JSON, US
//! units) and the Meteostat point API (metric rows, geocoded through
//! Nominatim). Every response is cached permanently, so rebuilding a page
//! for the same periods makes no network requests.

pub mod cache;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod formatters;
pub mod geocode;
pub mod models;
pub mod page;
pub mod service;

pub use config::{Config, LocationEntry, ProviderKind};
pub use dataset::{aggregate, Dataset, Location, ObservationSet, Period};
pub use error::Error;
pub use page::{PageBuilder, PageSummary};
