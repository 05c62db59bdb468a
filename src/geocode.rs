//! Forward geocoding of display names, backed by the location cache.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use reqwest::{Client, Url};
use std::sync::Arc;

use crate::cache::LocationCache;
use crate::dataset::Coordinates;
use crate::error::Error;
use crate::models::NominatimPlace;
use crate::service::{make_request, parse_base_url};

/// Nominatim search client
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Arc<Client>,
    base_url: Url,
}

impl Geocoder {
    pub fn new(client: Arc<Client>, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Best match for `name`, or `None` if Nominatim knows no such place
    pub async fn search(&self, name: &str) -> Result<Option<Coordinates>, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                url: self.base_url.to_string(),
                message: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push("search");
        url.query_pairs_mut()
            .append_pair("q", name)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        tracing::debug!(url = %url, "making geocoding request");
        let body = make_request(self.client.get(url)).await?;
        let places: Vec<NominatimPlace> = serde_json::from_str(&body)?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let latitude = parse_degrees(&place.lat)?;
        let longitude = parse_degrees(&place.lon)?;

        tracing::info!(
            name,
            latitude,
            longitude,
            matched = place.display_name.as_deref().unwrap_or_default(),
            "geocoded location"
        );
        Ok(Some(Coordinates {
            latitude,
            longitude,
        }))
    }
}

fn parse_degrees(raw: &str) -> Result<f64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid coordinate {:?}", raw)))
}

/// Maps display names to coordinates, consulting the cache before the geocoder.
#[derive(Debug)]
pub struct LocationResolver {
    cache: LocationCache,
    geocoder: Geocoder,
}

impl LocationResolver {
    pub fn new(cache: LocationCache, geocoder: Geocoder) -> Self {
        Self { cache, geocoder }
    }

    pub async fn resolve(&mut self, name: &str) -> Result<Coordinates, Error> {
        if let Some(coordinates) = self.cache.get(name) {
            tracing::debug!(name, "location cache hit");
            return Ok(coordinates);
        }

        let coordinates = self
            .geocoder
            .search(name)
            .await?
            .ok_or_else(|| Error::LocationNotFound(name.to_string()))?;
        self.cache.insert(name, coordinates);
        Ok(coordinates)
    }

    pub fn cache(&self) -> &LocationCache {
        &self.cache
    }

    /// Write the location cache back to disk
    pub async fn persist(&self) -> Result<(), Error> {
        self.cache.save().await
    }
}
