use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, LocationError};

/// Opaque place identifier accepted by the provider: a place name,
/// a "region, country" string or a "lat,lon" pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Build a query from free text. Surrounding whitespace is dropped and
    /// the result must not be empty.
    pub fn new(text: impl Into<String>) -> Result<Self, LocationError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LocationError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a "lat,lon" query from device coordinates.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self(format!("{},{}", latitude, longitude)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LocationQuery {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for LocationQuery {
    type Error = LocationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationQuery> for String {
    fn from(query: LocationQuery) -> Self {
        query.0
    }
}

/// Geographic coordinates as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Resolved location attached to current and forecast data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLocation {
    pub name: String,
    pub region: String,
    pub country: String,
    /// Provider local time, passed through unchanged ("2024-06-01 14:05")
    pub localtime: String,
    pub coordinates: Coordinates,
}

/// Current conditions in both metric and imperial units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: f64,
    pub temperature_f: f64,
    pub feels_like: f64,
    pub feels_like_f: f64,
    pub condition: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_speed_mph: f64,
    pub wind_direction: String,
    pub visibility: f64,
    pub visibility_miles: f64,
    pub uv_index: f64,
    pub cloud_cover: u8,
    pub last_updated: String,
}

/// Air quality readings, present only when the provider returned them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQuality {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    #[serde(rename = "pm2_5")]
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub us_epa_index: Option<u8>,
    pub gb_defra_index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCurrent {
    pub location: NormalizedLocation,
    pub conditions: CurrentConditions,
    pub air_quality: Option<AirQuality>,
}

/// Daily aggregates for one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub max_temp: f64,
    pub max_temp_f: f64,
    pub min_temp: f64,
    pub min_temp_f: f64,
    pub avg_temp: f64,
    pub avg_temp_f: f64,
    pub condition: String,
    pub icon: String,
    pub max_wind: f64,
    pub max_wind_mph: f64,
    pub total_precip: f64,
    pub total_precip_in: f64,
    pub avg_humidity: f64,
    pub will_it_rain: bool,
    pub chance_of_rain: u8,
    pub will_it_snow: bool,
    pub chance_of_snow: u8,
    pub uv_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub moon_illumination: f64,
}

/// Hourly forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedHour {
    pub time: String,
    pub time_epoch: i64,
    pub temp: f64,
    pub temp_f: f64,
    pub condition: String,
    pub icon: String,
    pub wind_speed: f64,
    pub wind_speed_mph: f64,
    pub wind_direction: String,
    pub humidity: u8,
    pub cloud_cover: u8,
    pub feels_like: f64,
    pub feels_like_f: f64,
    pub visibility: f64,
    pub visibility_miles: f64,
    pub uv_index: f64,
    pub will_it_rain: bool,
    pub chance_of_rain: u8,
    pub will_it_snow: bool,
    pub chance_of_snow: u8,
    pub precipitation: f64,
    pub precipitation_in: f64,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedForecastDay {
    pub date: NaiveDate,
    pub date_epoch: i64,
    pub day: DaySummary,
    pub astro: Astro,
    pub hours: Vec<NormalizedHour>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedForecast {
    pub location: NormalizedLocation,
    pub days: Vec<NormalizedForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAlert {
    pub headline: String,
    pub msg_type: String,
    pub severity: String,
    pub urgency: String,
    pub areas: String,
    pub category: String,
    pub certainty: String,
    pub event: String,
    pub note: String,
    pub effective: String,
    pub expires: String,
    pub description: String,
    pub instruction: String,
}

/// Autocomplete entry returned by a location search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub url: String,
}

impl LocationSuggestion {
    /// Query string for this place: "name, region, country", region
    /// omitted when the provider left it empty.
    pub fn to_query(&self) -> String {
        place_query(&self.name, &self.region, &self.country)
    }
}

pub(crate) fn place_query(name: &str, region: &str, country: &str) -> String {
    if region.is_empty() {
        format!("{}, {}", name, country)
    } else {
        format!("{}, {}, {}", name, region, country)
    }
}

/// Result of one complete weather lookup.
///
/// `current` and `forecast` are either fully normalized or absent.
/// `errors` holds one entry per failed sub-request; alerts that are simply
/// unavailable leave `alerts` empty without adding an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedWeather {
    pub current: Option<NormalizedCurrent>,
    pub forecast: Option<NormalizedForecast>,
    pub alerts: Vec<NormalizedAlert>,
    pub errors: Vec<FetchError>,
}

impl AggregatedWeather {
    /// True when every sub-request succeeded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.current.is_some() && self.forecast.is_some()
    }

    /// True when there is nothing meaningful to show: current conditions
    /// are missing.
    pub fn has_blocking_error(&self) -> bool {
        self.current.is_none()
    }
}
