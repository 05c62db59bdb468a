use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::cache::WeatherCache;
use crate::dataset::{Location, ObservationSet, Period};
use crate::error::Error;
use crate::models::{
    DailyRow, MeteostatResponse, TemperatureField, VisualCrossingResponse, PRECIPITATION_FIELD,
};

/// Header of the tabular daily dump stored for Meteostat records
pub const TABULAR_HEADER: [&str; 11] = [
    "time", "tavg", "tmin", "tmax", "prcp", "snow", "wdir", "wspd", "wpgt", "pres", "tsun",
];

/// Sends a request and returns the body, failing on any non-success status.
///
/// Errors never carry the request query string, which holds the API key.
pub(crate) async fn make_request(request: RequestBuilder) -> Result<String, Error> {
    let response = request.send().await.map_err(reqwest::Error::without_url)?;

    let status = response.status();
    if !status.is_success() {
        let mut url = response.url().clone();
        url.set_query(None);
        return Err(Error::Status {
            status,
            url: url.to_string(),
        });
    }

    Ok(response.text().await.map_err(reqwest::Error::without_url)?)
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, Error> {
    let url = Url::parse(base_url).map_err(|e| Error::InvalidUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            url: base_url.to_string(),
            message: "cannot be a base".to_string(),
        });
    }
    Ok(url)
}

/// Append path segments to a base URL parsed by [`parse_base_url`]
fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

// ============================================================================
// Visual Crossing
// ============================================================================

/// Visual Crossing timeline API: one JSON document per request, US units.
#[derive(Debug, Clone)]
pub struct VisualCrossing {
    client: Arc<Client>,
    base_url: Url,
    api_key: Option<String>,
}

impl VisualCrossing {
    const NAME: &'static str = "Visual Crossing";
    const UNIT_GROUP: &'static str = "us";
    const CONTENT_TYPE: &'static str = "json";
    const INCLUDE: &'static str = "days";

    pub fn new(client: Arc<Client>, base_url: &str, api_key: Option<String>) -> Result<Self, Error> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            api_key,
        })
    }

    fn request_url(&self, location: &Location, period: &Period, api_key: &str) -> Url {
        let start = period.first_day().to_string();
        let end = period.last_day().to_string();
        let mut url = join_segments(&self.base_url, &[&location.cache_key(), &start, &end]);
        url.query_pairs_mut()
            .append_pair("unitGroup", Self::UNIT_GROUP)
            .append_pair("contentType", Self::CONTENT_TYPE)
            .append_pair("include", Self::INCLUDE)
            .append_pair("key", api_key);
        url
    }

    async fn request(&self, location: &Location, period: &Period) -> Result<String, Error> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey(Self::NAME))?;
        let url = self.request_url(location, period, api_key);
        make_request(self.client.get(url)).await
    }

    /// One entry per day in the response, in response order.
    ///
    /// Unlike Meteostat rows these are not aligned to the calendar: the
    /// timeline API returns every day of the requested range, so a record
    /// with fewer days is rendered as it is.
    fn extract(&self, raw: &str, field: TemperatureField) -> Result<ObservationSet, Error> {
        let response: VisualCrossingResponse = serde_json::from_str(raw)?;
        if let Some(address) = &response.resolved_address {
            tracing::debug!(address = %address, days = response.days.len(), "parsed Visual Crossing response");
        }

        let value = |day: &serde_json::Map<String, Value>, key: &str| {
            day.get(key).and_then(Value::as_f64).unwrap_or(0.0)
        };

        Ok(ObservationSet {
            temperatures: response.days.iter().map(|d| value(d, field.as_str())).collect(),
            precipitation: response.days.iter().map(|d| value(d, PRECIPITATION_FIELD)).collect(),
        })
    }
}

// ============================================================================
// Meteostat
// ============================================================================

/// Meteostat point/daily API: metric rows stored as a tabular dump.
#[derive(Debug, Clone)]
pub struct Meteostat {
    client: Arc<Client>,
    base_url: Url,
    api_key: Option<String>,
    precipitation_factor: f64,
}

impl Meteostat {
    const NAME: &'static str = "Meteostat";

    pub fn new(
        client: Arc<Client>,
        base_url: &str,
        api_key: Option<String>,
        precipitation_factor: f64,
    ) -> Result<Self, Error> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            api_key,
            precipitation_factor,
        })
    }

    async fn request(&self, location: &Location, period: &Period) -> Result<String, Error> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey(Self::NAME))?;
        let coordinates = location
            .coordinates
            .ok_or_else(|| Error::LocationNotFound(location.display_name.clone()))?;

        let mut url = join_segments(&self.base_url, &["point", "daily"]);
        url.query_pairs_mut()
            .append_pair("lat", &coordinates.latitude.to_string())
            .append_pair("lon", &coordinates.longitude.to_string())
            .append_pair("start", &period.first_day().to_string())
            .append_pair("end", &period.last_day().to_string());

        let mut request = self.client.get(url).header("x-rapidapi-key", api_key);
        if let Some(host) = self.base_url.host_str() {
            request = request.header("x-rapidapi-host", host);
        }

        let body = make_request(request).await?;
        let response: MeteostatResponse = serde_json::from_str(&body)?;
        to_tabular(&response.data)
    }

    fn extract(&self, raw: &str, period: &Period) -> Result<ObservationSet, Error> {
        let mut by_day = HashMap::new();
        let mut reader = csv::Reader::from_reader(raw.as_bytes());
        for row in reader.deserialize() {
            let row: DailyRow = row?;
            by_day.insert(parse_day(&row.time)?, row);
        }

        let mut observations = ObservationSet::default();
        for day in period.days() {
            let row = by_day.get(&day);
            let tmax = row.and_then(|r| r.tmax).unwrap_or(0.0);
            let prcp = row.and_then(|r| r.prcp).unwrap_or(0.0);
            observations.temperatures.push(celsius_to_fahrenheit(tmax));
            observations.precipitation.push(prcp * self.precipitation_factor);
        }
        Ok(observations)
    }
}

/// Serialize daily rows with the tabular header, even when there are no rows
pub fn to_tabular(rows: &[DailyRow]) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(TABULAR_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Parse(format!("unable to flush tabular rows: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Parse(e.to_string()))
}

/// Accepts `2020-04-01` as well as timestamps such as `2020-04-01 00:00:00`
fn parse_day(time: &str) -> Result<NaiveDate, Error> {
    let date = time.get(..10).unwrap_or(time);
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| Error::Parse(format!("invalid row date {:?}: {}", time, e)))
}

// ============================================================================
// Fetcher
// ============================================================================

#[derive(Debug, Clone)]
pub enum Provider {
    VisualCrossing(VisualCrossing),
    Meteostat(Meteostat),
}

impl Provider {
    /// Cache subdirectory for this provider's records
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::VisualCrossing(_) => "vc",
            Self::Meteostat(_) => "ms",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::VisualCrossing(_) => "json",
            Self::Meteostat(_) => "csv",
        }
    }

    /// Whether locations must be geocoded before requesting data
    pub fn needs_coordinates(&self) -> bool {
        matches!(self, Self::Meteostat(_))
    }

    async fn request(&self, location: &Location, period: &Period) -> Result<String, Error> {
        match self {
            Self::VisualCrossing(p) => p.request(location, period).await,
            Self::Meteostat(p) => p.request(location, period).await,
        }
    }

    fn extract(&self, raw: &str, period: &Period, field: TemperatureField) -> Result<ObservationSet, Error> {
        match self {
            Self::VisualCrossing(p) => p.extract(raw, field),
            Self::Meteostat(p) => p.extract(raw, period),
        }
    }
}

/// Fetches daily observations per period, reading through the weather cache.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    provider: Provider,
    cache: WeatherCache,
}

impl WeatherFetcher {
    pub fn new(provider: Provider, cache_dir: &Path) -> Self {
        let cache = WeatherCache::new(cache_dir.join(provider.namespace()), provider.extension());
        Self { provider, cache }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Observations for every (year, month) pair, years outermost, in the
    /// order given.
    pub async fn fetch(
        &self,
        location: &Location,
        years: &[i32],
        months: &[u32],
        field: TemperatureField,
    ) -> Result<Vec<(Period, ObservationSet)>, Error> {
        let mut periods = Vec::with_capacity(years.len() * months.len());
        for &year in years {
            for &month in months {
                let period = Period::new(year, month)?;
                let observations = self.fetch_period(location, &period, field).await?;
                periods.push((period, observations));
            }
        }
        Ok(periods)
    }

    /// Observations for one period. A fresh response is only cached once it
    /// has been extracted successfully.
    pub async fn fetch_period(
        &self,
        location: &Location,
        period: &Period,
        field: TemperatureField,
    ) -> Result<ObservationSet, Error> {
        if let Some(raw) = self.cache.read(location, period).await? {
            tracing::debug!(
                location = %location.display_name,
                year = period.year(),
                month = period.month(),
                "weather cache hit"
            );
            return self.provider.extract(&raw, period, field);
        }

        tracing::info!(
            location = %location.display_name,
            year = period.year(),
            month = period.month(),
            provider = self.provider.namespace(),
            "requesting weather data"
        );
        let raw = self.provider.request(location, period).await?;
        let observations = self.provider.extract(&raw, period, field)?;
        let path = self.cache.write(location, period, &raw).await?;
        tracing::info!(path = %path.display(), "saved weather data to cache");
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Coordinates;
    use crate::constants::DEFAULT_PRECIPITATION_FACTOR;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMELINE_PATH: &str = "/VisualCrossingWebServices/rest/services/timeline";

    fn client() -> Arc<Client> {
        Arc::new(Client::new())
    }

    fn visual_crossing(server: &MockServer, key: Option<&str>) -> Provider {
        let base = format!("{}{}", server.uri(), TIMELINE_PATH);
        Provider::VisualCrossing(VisualCrossing::new(client(), &base, key.map(String::from)).unwrap())
    }

    fn meteostat(server: &MockServer, key: Option<&str>) -> Provider {
        Provider::Meteostat(
            Meteostat::new(client(), &server.uri(), key.map(String::from), DEFAULT_PRECIPITATION_FACTOR).unwrap(),
        )
    }

    fn osaka() -> Location {
        Location::new("Osaka, Japan").with_coordinates(Coordinates::from((34.6937, 135.5023)))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert_close(celsius_to_fahrenheit(20.0), 68.0);
        assert_close(celsius_to_fahrenheit(0.0), 32.0);
        assert_close(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_meteostat_extract_converts_units() {
        let provider = Meteostat::new(client(), "http://localhost", None, DEFAULT_PRECIPITATION_FACTOR).unwrap();
        let period = Period::new(2022, 4).unwrap();
        let raw = "time,tavg,tmin,tmax,prcp,snow,wdir,wspd,wpgt,pres,tsun\n\
                   2022-04-01,15.0,10.0,20.0,5.0,,,,,,\n";

        let obs = provider.extract(raw, &period).unwrap();

        assert_eq!(obs.temperatures.len(), 30);
        assert_close(obs.temperatures[0], 68.0);
        assert_close(obs.precipitation[0], 5.0 * 0.0610237);
        assert_close(obs.precipitation[0], 0.3051185);
    }

    #[test]
    fn test_meteostat_extract_missing_values_are_zero() {
        let provider = Meteostat::new(client(), "http://localhost", None, DEFAULT_PRECIPITATION_FACTOR).unwrap();
        let period = Period::new(2021, 2).unwrap();
        let raw = "time,tmax,prcp\n2021-02-01,,\n2021-02-03 00:00:00,10.0,\n";

        let obs = provider.extract(raw, &period).unwrap();

        assert_eq!(obs.temperatures.len(), 28);
        assert_eq!(obs.precipitation.len(), 28);
        // null and absent days both count as 0 °C
        assert_close(obs.temperatures[0], 32.0);
        assert_close(obs.temperatures[1], 32.0);
        assert_close(obs.temperatures[2], 50.0);
        assert!(obs.precipitation.iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_meteostat_extract_header_only() {
        let provider = Meteostat::new(client(), "http://localhost", None, DEFAULT_PRECIPITATION_FACTOR).unwrap();
        let period = Period::new(2020, 6).unwrap();
        let raw = to_tabular(&[]).unwrap();

        let obs = provider.extract(&raw, &period).unwrap();

        assert_eq!(obs.temperatures.len(), 30);
    }

    #[test]
    fn test_meteostat_extract_bad_date() {
        let provider = Meteostat::new(client(), "http://localhost", None, DEFAULT_PRECIPITATION_FACTOR).unwrap();
        let period = Period::new(2020, 6).unwrap();

        let result = provider.extract("time,tmax,prcp\nyesterday,1.0,2.0\n", &period);

        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_to_tabular_header_and_empty_fields() {
        let rows = vec![DailyRow {
            time: "2020-04-01".to_string(),
            tmax: Some(20.5),
            prcp: None,
            ..Default::default()
        }];

        let raw = to_tabular(&rows).unwrap();
        let mut lines = raw.lines();

        assert_eq!(lines.next(), Some("time,tavg,tmin,tmax,prcp,snow,wdir,wspd,wpgt,pres,tsun"));
        assert_eq!(lines.next(), Some("2020-04-01,,,20.5,,,,,,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_visual_crossing_extract_selects_field() {
        let provider = VisualCrossing::new(client(), "http://localhost/timeline", None).unwrap();
        let raw = serde_json::json!({
            "resolvedAddress": "Tirana, Albania",
            "days": [
                {"tempmax": 61.3, "feelslikemax": 59.0, "precip": 0.12},
                {"tempmax": 64.0, "feelslikemax": null}
            ]
        })
        .to_string();

        let max = provider.extract(&raw, TemperatureField::TempMax).unwrap();
        let feels = provider.extract(&raw, TemperatureField::FeelsLikeMax).unwrap();

        assert_eq!(max.temperatures, vec![61.3, 64.0]);
        assert_eq!(max.precipitation, vec![0.12, 0.0]);
        assert_eq!(feels.temperatures, vec![59.0, 0.0]);
    }

    #[tokio::test]
    async fn test_visual_crossing_fetch_caches_response() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "days": [{"tempmax": 70.5, "precip": 0.0}, {"tempmax": 91.0, "precip": 0.3}]
        })
        .to_string();
        Mock::given(method("GET"))
            .and(path(format!("{}/Osaka,Japan/2020-04-01/2020-04-30", TIMELINE_PATH)))
            .and(query_param("unitGroup", "us"))
            .and(query_param("contentType", "json"))
            .and(query_param("include", "days"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(visual_crossing(&server, Some("secret")), dir.path());
        let location = Location::new("Osaka, Japan");
        let period = Period::new(2020, 4).unwrap();

        let first = fetcher.fetch_period(&location, &period, TemperatureField::TempMax).await.unwrap();
        let second = fetcher.fetch_period(&location, &period, TemperatureField::TempMax).await.unwrap();

        assert_eq!(first.temperatures, vec![70.5, 91.0]);
        assert_eq!(first, second);
        let cached = std::fs::read_to_string(dir.path().join("vc/Osaka,Japan_2020-4-01_2020-4-30.json")).unwrap();
        assert_eq!(cached, body);
    }

    #[tokio::test]
    async fn test_cached_period_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vc")).unwrap();
        std::fs::write(
            dir.path().join("vc/Tirana,Albania_2021-3-01_2021-3-31.json"),
            r#"{"days": [{"tempmax": 55.0, "precip": 0.5}]}"#,
        )
        .unwrap();

        let fetcher = WeatherFetcher::new(visual_crossing(&server, None), dir.path());
        let period = Period::new(2021, 3).unwrap();
        let obs = fetcher
            .fetch_period(&Location::new("Tirana, Albania"), &period, TemperatureField::TempMax)
            .await
            .unwrap();

        assert_eq!(obs.temperatures, vec![55.0]);
        assert_eq!(obs.precipitation, vec![0.5]);
    }

    #[tokio::test]
    async fn test_bad_status_aborts_without_caching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(visual_crossing(&server, Some("secret")), dir.path());
        let location = Location::new("Belgrade, Serbia");
        let period = Period::new(2020, 2).unwrap();

        let result = fetcher.fetch_period(&location, &period, TemperatureField::TempMax).await;

        match result {
            Err(Error::Status { status, url }) => {
                assert_eq!(status.as_u16(), 429);
                assert!(!url.contains("secret"));
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(!dir.path().join("vc/Belgrade,Serbia_2020-2-01_2020-2-29.json").exists());
    }

    #[tokio::test]
    async fn test_unparseable_response_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(visual_crossing(&server, Some("secret")), dir.path());
        let location = Location::new("Osaka, Japan");
        let period = Period::new(2020, 4).unwrap();

        for _ in 0..2 {
            let result = fetcher.fetch_period(&location, &period, TemperatureField::TempMax).await;
            assert!(matches!(result, Err(Error::Json(_))));
        }
        assert!(!dir.path().join("vc/Osaka,Japan_2020-4-01_2020-4-30.json").exists());
    }

    #[tokio::test]
    async fn test_connection_error_hides_api_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{}/timeline", addr);
        let provider = VisualCrossing::new(client(), &base, Some("TOPSECRETKEY".to_string())).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(Provider::VisualCrossing(provider), dir.path());
        let period = Period::new(2020, 4).unwrap();

        let err = fetcher
            .fetch_period(&Location::new("Osaka, Japan"), &period, TemperatureField::TempMax)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert!(!err.to_string().contains("TOPSECRETKEY"));
        assert!(!format!("{:?}", err).contains("TOPSECRETKEY"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_on_cache_miss() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(visual_crossing(&server, None), dir.path());
        let period = Period::new(2020, 2).unwrap();

        let result = fetcher
            .fetch_period(&Location::new("Sarajevo, Bosnia"), &period, TemperatureField::TempMax)
            .await;

        assert!(matches!(result, Err(Error::MissingApiKey(_))));
    }

    #[tokio::test]
    async fn test_meteostat_fetch_writes_tabular_dump() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/point/daily"))
            .and(query_param("lat", "34.6937"))
            .and(query_param("lon", "135.5023"))
            .and(query_param("start", "2021-05-01"))
            .and(query_param("end", "2021-05-31"))
            .and(header("x-rapidapi-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"generated": "2024-01-01 00:00:00"},
                "data": [
                    {"date": "2021-05-01", "tavg": 18.0, "tmin": 14.0, "tmax": 20.0, "prcp": 5.0},
                    {"date": "2021-05-02", "tavg": 19.0, "tmin": 15.0, "tmax": 25.0, "prcp": null}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(meteostat(&server, Some("secret")), dir.path());
        let period = Period::new(2021, 5).unwrap();

        let obs = fetcher.fetch_period(&osaka(), &period, TemperatureField::TempMax).await.unwrap();

        assert_eq!(obs.temperatures.len(), 31);
        assert_close(obs.temperatures[0], 68.0);
        assert_close(obs.temperatures[1], 77.0);
        assert_close(obs.precipitation[0], 0.3051185);
        assert_close(obs.precipitation[1], 0.0);

        let cached = std::fs::read_to_string(dir.path().join("ms/Osaka,Japan_2021-5-01_2021-5-31.csv")).unwrap();
        assert!(cached.starts_with("time,tavg,tmin,tmax,prcp,snow,wdir,wspd,wpgt,pres,tsun\n"));
        assert_eq!(cached.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_meteostat_requires_coordinates() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(meteostat(&server, Some("secret")), dir.path());
        let period = Period::new(2021, 5).unwrap();

        let result = fetcher
            .fetch_period(&Location::new("Osaka, Japan"), &period, TemperatureField::TempMax)
            .await;

        assert!(matches!(result, Err(Error::LocationNotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_iterates_years_then_months() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let location = Location::new("Okinawa, Japan");
        let fetcher = WeatherFetcher::new(visual_crossing(&server, None), dir.path());

        let cache = WeatherCache::new(dir.path().join("vc"), "json");
        for year in [2021, 2020] {
            for month in [3, 1] {
                let period = Period::new(year, month).unwrap();
                let raw = format!(r#"{{"days": [{{"tempmax": {}, "precip": 0}}]}}"#, year * 100 + month as i32);
                cache.write(&location, &period, &raw).await.unwrap();
            }
        }

        let periods = fetcher
            .fetch(&location, &[2021, 2020], &[3, 1], TemperatureField::TempMax)
            .await
            .unwrap();

        let order: Vec<(i32, u32)> = periods.iter().map(|(p, _)| (p.year(), p.month())).collect();
        assert_eq!(order, vec![(2021, 3), (2021, 1), (2020, 3), (2020, 1)]);
        assert_eq!(periods[0].1.temperatures, vec![202103.0]);
        assert_eq!(periods[3].1.temperatures, vec![202001.0]);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_month() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let fetcher = WeatherFetcher::new(visual_crossing(&server, None), dir.path());

        let result = fetcher
            .fetch(&Location::new("Osaka, Japan"), &[2020], &[13], TemperatureField::TempMax)
            .await;

        assert!(matches!(result, Err(Error::InvalidPeriod { .. })));
    }
}
