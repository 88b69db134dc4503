//! Wire shapes of the provider's JSON responses.
//!
//! Only fields the normalizers read are declared; everything else in the
//! payload is ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::ProviderErrorDetail;

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ProviderErrorDetail,
}

/// Extract the provider error object from a decoded body, if any.
pub(crate) fn error_in(payload: &serde_json::Value) -> Option<ProviderErrorDetail> {
    let error = payload.get("error")?;
    if error.is_null() {
        return None;
    }
    Some(
        ProviderErrorDetail::deserialize(error).unwrap_or(ProviderErrorDetail {
            code: None,
            message: None,
        }),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Condition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Current {
    pub temp_c: f64,
    pub temp_f: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub wind_dir: String,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub uv: f64,
    pub cloud: u8,
    pub last_updated: String,
    #[serde(default)]
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirQuality {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    #[serde(rename = "us-epa-index")]
    pub us_epa_index: Option<u8>,
    #[serde(rename = "gb-defra-index")]
    pub gb_defra_index: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub location: Location,
    pub forecast: Forecast,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastDay {
    pub date: NaiveDate,
    pub date_epoch: i64,
    pub day: Day,
    pub astro: Astro,
    #[serde(default)]
    pub hour: Vec<Hour>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Day {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub avgtemp_c: f64,
    pub avgtemp_f: f64,
    pub condition: Condition,
    pub maxwind_kph: f64,
    pub maxwind_mph: f64,
    pub totalprecip_mm: f64,
    pub totalprecip_in: f64,
    pub avghumidity: f64,
    #[serde(deserialize_with = "flag")]
    pub daily_will_it_rain: bool,
    #[serde(deserialize_with = "percent")]
    pub daily_chance_of_rain: u8,
    #[serde(deserialize_with = "flag")]
    pub daily_will_it_snow: bool,
    #[serde(deserialize_with = "percent")]
    pub daily_chance_of_snow: u8,
    pub uv: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    #[serde(deserialize_with = "number")]
    pub moon_illumination: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hour {
    pub time: String,
    pub time_epoch: i64,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub wind_dir: String,
    pub humidity: u8,
    pub cloud: u8,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub uv: f64,
    #[serde(deserialize_with = "flag")]
    pub will_it_rain: bool,
    #[serde(deserialize_with = "percent")]
    pub chance_of_rain: u8,
    #[serde(deserialize_with = "flag")]
    pub will_it_snow: bool,
    #[serde(deserialize_with = "percent")]
    pub chance_of_snow: u8,
    pub precip_mm: f64,
    pub precip_in: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertsResponse {
    #[serde(default)]
    pub alerts: Option<Alerts>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Alerts {
    #[serde(default)]
    pub alert: Option<Vec<Alert>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Alert {
    pub headline: Option<String>,
    pub msgtype: Option<String>,
    pub severity: Option<String>,
    pub urgency: Option<String>,
    pub areas: Option<String>,
    pub category: Option<String>,
    pub certainty: Option<String>,
    pub event: Option<String>,
    pub note: Option<String>,
    pub effective: Option<String>,
    pub expires: Option<String>,
    pub desc: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub url: String,
}

/// Numbers occasionally arrive as strings ("45" instead of 45)
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = number(deserializer)?;
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(number(deserializer)? != 0.0)
}
