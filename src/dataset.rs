//! Locations, calendar periods and the nested location → year → month dataset.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Geographic coordinates, persisted as a `[latitude, longitude]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(c: Coordinates) -> Self {
        (c.latitude, c.longitude)
    }
}

/// A named place, e.g. "Osaka, Japan"
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub display_name: String,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Display name with all whitespace removed, used in cache file names and
    /// as the Visual Crossing location segment.
    pub fn cache_key(&self) -> String {
        self.display_name.split_whitespace().collect()
    }
}

/// One calendar month of one year, covering `first..=last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    year: i32,
    month: u32,
    first: NaiveDate,
    last: NaiveDate,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriod { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            first,
            last,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn day_count(&self) -> usize {
        self.last.day() as usize
    }

    /// Every calendar day of the period in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.day_count())
    }

    /// English month name, e.g. "April"
    pub fn month_name(&self) -> String {
        self.first.format("%B").to_string()
    }

    /// Start and end labels used in cache record names.
    ///
    /// The month is not zero padded (`2020-4-01`, `2020-4-30`) so that record
    /// names match caches written by earlier runs.
    pub fn cache_labels(&self) -> (String, String) {
        (
            format!("{}-{}-01", self.year, self.month),
            format!("{}-{}-{}", self.year, self.month, self.last.day()),
        )
    }
}

/// Daily max temperature (°F) and precipitation (inches) for one period.
///
/// Both sequences have one entry per day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    pub temperatures: Vec<f64>,
    pub precipitation: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSeries {
    pub period: Period,
    pub observations: ObservationSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub year: i32,
    pub months: Vec<MonthSeries>,
}

/// Everything rendered for one location, in the order the periods were requested
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub location: String,
    pub years: Vec<YearSeries>,
}

impl Dataset {
    pub fn month_count(&self) -> usize {
        self.years.iter().map(|y| y.months.len()).sum()
    }
}

/// Group fetched periods into a [`Dataset`].
///
/// Consecutive periods of the same year share a [`YearSeries`]. Nothing is
/// sorted, so the caller's years/months order carries through to rendering.
pub fn aggregate(location: &str, periods: Vec<(Period, ObservationSet)>) -> Dataset {
    let mut years: Vec<YearSeries> = Vec::new();

    for (period, observations) in periods {
        let month = MonthSeries {
            period,
            observations,
        };
        match years.last_mut() {
            Some(series) if series.year == period.year() => series.months.push(month),
            _ => years.push(YearSeries {
                year: period.year(),
                months: vec![month],
            }),
        }
    }

    Dataset {
        location: location.to_string(),
        years,
    }
}
