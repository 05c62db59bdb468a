//! On-disk caches for geocoded coordinates and raw provider responses.
//!
//! Both caches are append-only: an entry, once written, is never replaced or
//! expired.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::dataset::{Coordinates, Location, Period};
use crate::error::Error;

/// Display name → coordinates, loaded whole and rewritten whole.
#[derive(Debug)]
pub struct LocationCache {
    path: PathBuf,
    entries: BTreeMap<String, Coordinates>,
}

impl LocationCache {
    /// Load the cache file at `path`, creating an empty one if it does not exist.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let entries: BTreeMap<String, Coordinates> = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let cache = Self {
                    path,
                    entries: BTreeMap::new(),
                };
                cache.save().await?;
                return Ok(cache);
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded location cache");
        Ok(Self { path, entries })
    }

    pub fn get(&self, name: &str) -> Option<Coordinates> {
        self.entries.get(name).copied()
    }

    /// Add an entry. An existing entry for `name` is kept as is.
    pub fn insert(&mut self, name: &str, coordinates: Coordinates) {
        self.entries.entry(name.to_string()).or_insert(coordinates);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the whole cache file
    pub async fn save(&self) -> Result<(), Error> {
        ensure_parent(&self.path).await?;
        let contents = serde_json::to_string_pretty(&self.entries)?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| Error::io(&self.path, e))
    }
}

/// One file per (location, start, end) record under a provider directory.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    dir: PathBuf,
    extension: &'static str,
}

impl WeatherCache {
    pub fn new(dir: impl Into<PathBuf>, extension: &'static str) -> Self {
        Self {
            dir: dir.into(),
            extension,
        }
    }

    /// Path of the record for `location` over `period`,
    /// e.g. `cache/ms/Osaka,Japan_2020-4-01_2020-4-30.csv`
    pub fn record_path(&self, location: &Location, period: &Period) -> PathBuf {
        let (start, end) = period.cache_labels();
        let name = format!("{}_{}_{}.{}", location.cache_key(), start, end, self.extension);
        self.dir.join(name)
    }

    /// Raw record contents, or `None` when nothing has been cached yet
    pub async fn read(&self, location: &Location, period: &Period) -> Result<Option<String>, Error> {
        let path = self.record_path(location, period);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub async fn write(&self, location: &Location, period: &Period, raw: &str) -> Result<PathBuf, Error> {
        let path = self.record_path(location, period);
        ensure_parent(&path).await?;
        tokio::fs::write(&path, raw)
            .await
            .map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }
}

pub(crate) async fn ensure_parent(path: &Path) -> Result<(), Error> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e)),
        _ => Ok(()),
    }
}
