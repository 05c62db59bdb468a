use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{ensure_parent, LocationCache};
use crate::config::{read_secret, Config, HttpConfig, LocationEntry, ProviderKind};
use crate::constants::{LOCATION_CACHE_FILE, USER_AGENT};
use crate::dataset::{aggregate, Dataset, Location};
use crate::formatters::{render_dataset, render_template};
use crate::geocode::{Geocoder, LocationResolver};
use crate::service::{Meteostat, Provider, VisualCrossing, WeatherFetcher};

/// What a completed build produced
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub locations: usize,
    pub months: usize,
    pub output: PathBuf,
}

/// Builds one HTML page from a list of locations: resolve, fetch, aggregate,
/// render, then substitute into the page template.
#[derive(Debug)]
pub struct PageBuilder {
    fetcher: WeatherFetcher,
    resolver: LocationResolver,
    template: PathBuf,
    output: PathBuf,
}

/// Creates the shared HTTP client
pub fn http_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to create HTTP client")
}

impl PageBuilder {
    pub fn new(
        fetcher: WeatherFetcher,
        resolver: LocationResolver,
        template: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            template: template.into(),
            output: output.into(),
        }
    }

    /// Wire up the provider, caches and geocoder described by `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(http_client(&config.http)?);

        let provider = match config.provider {
            ProviderKind::VisualCrossing => {
                let settings = &config.visual_crossing;
                let api_key = read_secret(&settings.api_key_file)?;
                Provider::VisualCrossing(VisualCrossing::new(client.clone(), &settings.base_url, api_key)?)
            }
            ProviderKind::Meteostat => {
                let settings = &config.meteostat;
                let api_key = read_secret(&settings.api_key_file)?;
                Provider::Meteostat(Meteostat::new(
                    client.clone(),
                    &settings.base_url,
                    api_key,
                    settings.precipitation_factor,
                )?)
            }
        };
        let fetcher = WeatherFetcher::new(provider, &config.cache_dir);

        let cache_path = config.cache_dir.join(LOCATION_CACHE_FILE);
        let cache = LocationCache::load(&cache_path)
            .await
            .with_context(|| format!("Failed to load location cache {}", cache_path.display()))?;
        let geocoder = Geocoder::new(client, &config.nominatim.base_url)?;

        Ok(Self::new(
            fetcher,
            LocationResolver::new(cache, geocoder),
            &config.template,
            &config.output,
        ))
    }

    /// Render every entry in order and write the page.
    ///
    /// Any failure aborts the whole build. The location cache is saved either
    /// way so coordinates resolved before the failure are kept.
    pub async fn build(&mut self, entries: &[LocationEntry]) -> Result<PageSummary> {
        let rendered = self.render_all(entries).await;
        let persisted = self
            .resolver
            .persist()
            .await
            .context("Failed to save location cache");
        let (fragments, months) = rendered?;
        persisted?;

        let template = tokio::fs::read_to_string(&self.template)
            .await
            .with_context(|| format!("Failed to read template {}", self.template.display()))?;
        let page = render_template(&template, &fragments.join("\n"))
            .with_context(|| format!("Failed to render template {}", self.template.display()))?;

        ensure_parent(&self.output).await?;
        tokio::fs::write(&self.output, page)
            .await
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        tracing::info!(
            output = %self.output.display(),
            locations = fragments.len(),
            months,
            "page written"
        );
        Ok(PageSummary {
            locations: fragments.len(),
            months,
            output: self.output.clone(),
        })
    }

    async fn render_all(&mut self, entries: &[LocationEntry]) -> Result<(Vec<String>, usize)> {
        let mut fragments = Vec::with_capacity(entries.len());
        let mut months = 0;
        for entry in entries {
            let dataset = self.dataset(entry).await?;
            months += dataset.month_count();
            fragments.push(render_dataset(&dataset));
        }
        Ok((fragments, months))
    }

    /// Resolve (when the provider needs coordinates), fetch and aggregate one entry
    pub async fn dataset(&mut self, entry: &LocationEntry) -> Result<Dataset> {
        let mut location = Location::new(&entry.name);
        if self.fetcher.provider().needs_coordinates() {
            let coordinates = self
                .resolver
                .resolve(&entry.name)
                .await
                .with_context(|| format!("Failed to resolve {}", entry.name))?;
            location = location.with_coordinates(coordinates);
        }

        let periods = self
            .fetcher
            .fetch(&location, &entry.years, &entry.months, entry.temperature_field)
            .await
            .with_context(|| format!("Failed to fetch weather for {}", entry.name))?;
        Ok(aggregate(&location.display_name, periods))
    }
}
