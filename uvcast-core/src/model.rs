use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// What to ask the forecast endpoint about.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinate(Coordinate),
    Place(String),
}

impl LocationQuery {
    /// Value of the `q` request parameter.
    pub fn as_param(&self) -> String {
        match self {
            LocationQuery::Coordinate(c) => c.to_string(),
            LocationQuery::Place(name) => name.clone(),
        }
    }
}

impl From<Coordinate> for LocationQuery {
    fn from(c: Coordinate) -> Self {
        LocationQuery::Coordinate(c)
    }
}

// Raw forecast payload. Every field is optional so that a partial response
// degrades individual values instead of failing the whole fetch.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub location: Option<PlaceInfo>,
    #[serde(default)]
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub forecast: Option<Forecast>,
}

impl ForecastPayload {
    pub fn days(&self) -> &[ForecastDay] {
        self.forecast.as_ref().map(|f| f.forecastday.as_slice()).unwrap_or_default()
    }

    pub fn today(&self) -> Option<&ForecastDay> {
        self.days().first()
    }

    pub fn condition_text(&self) -> Option<&str> {
        self.current.as_ref()?.condition.as_ref()?.text.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: Option<f64>,
    pub condition: Option<Condition>,
    pub humidity: Option<f64>,
    pub uv: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: Option<String>,
    pub day: Option<DayStats>,
    pub astro: Option<Astro>,
    #[serde(default)]
    pub hour: Vec<HourForecast>,
}

impl ForecastDay {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub uv: Option<f64>,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourForecast {
    /// Local time as `YYYY-MM-DD HH:MM`.
    pub time: Option<String>,
    pub uv: Option<f64>,
}

impl HourForecast {
    pub fn hour(&self) -> Option<u32> {
        NaiveDateTime::parse_from_str(self.time.as_deref()?, "%Y-%m-%d %H:%M")
            .ok()
            .map(|t| t.hour())
    }
}

/// Place candidate as returned by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    City,
    District,
}

/// A ranked search hit with its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub place: PlaceCandidate,
    pub display_name: String,
    pub kind: PlaceKind,
}

/// A place the user chose to keep. Carries its own copy of the place fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlace {
    pub id: String,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl SavedPlace {
    pub fn from_search_result(result: &SearchResult) -> Self {
        let p = &result.place;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: p.name.clone(),
            region: p.region.clone(),
            country: p.country.clone(),
            lat: p.lat,
            lon: p.lon,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}
