//! Pure mapping from provider payloads to the internal weather records.
//!
//! Every function here is deterministic: the same payload always yields the
//! same record, and nothing touches the network, the cache or the clock.

use serde::Deserialize;
use serde_json::Value;

use crate::provider;
use crate::types::{
    AirQuality, Astro, Coordinates, CurrentConditions, DaySummary, LocationSuggestion,
    NormalizedAlert, NormalizedCurrent, NormalizedForecast, NormalizedForecastDay,
    NormalizedHour, NormalizedLocation,
};

pub fn current(payload: &Value) -> Result<NormalizedCurrent, serde_json::Error> {
    let provider::CurrentResponse { location: loc, current } =
        provider::CurrentResponse::deserialize(payload)?;

    Ok(NormalizedCurrent {
        location: location(loc),
        conditions: CurrentConditions {
            temperature: current.temp_c,
            temperature_f: current.temp_f,
            feels_like: current.feelslike_c,
            feels_like_f: current.feelslike_f,
            condition: current.condition.text,
            icon: current.condition.icon,
            humidity: current.humidity,
            wind_speed: current.wind_kph,
            wind_speed_mph: current.wind_mph,
            wind_direction: current.wind_dir,
            visibility: current.vis_km,
            visibility_miles: current.vis_miles,
            uv_index: current.uv,
            cloud_cover: current.cloud,
            last_updated: current.last_updated,
        },
        air_quality: current.air_quality.map(air_quality),
    })
}

pub fn forecast(payload: &Value) -> Result<NormalizedForecast, serde_json::Error> {
    let provider::ForecastResponse { location: loc, forecast } =
        provider::ForecastResponse::deserialize(payload)?;

    Ok(NormalizedForecast {
        location: location(loc),
        days: forecast
            .forecastday
            .into_iter()
            .map(forecast_day)
            .collect(),
    })
}

/// Alerts, or an empty list when the payload carries none.
pub fn alerts(payload: &Value) -> Result<Vec<NormalizedAlert>, serde_json::Error> {
    let response = provider::AlertsResponse::deserialize(payload)?;

    Ok(response
        .alerts
        .and_then(|a| a.alert)
        .unwrap_or_default()
        .into_iter()
        .map(alert)
        .collect())
}

pub fn search(payload: &Value) -> Result<Vec<LocationSuggestion>, serde_json::Error> {
    let results = Vec::<provider::SearchResult>::deserialize(payload)?;

    Ok(results
        .into_iter()
        .map(|r| LocationSuggestion {
            id: r.id,
            name: r.name,
            region: r.region,
            country: r.country,
            lat: r.lat,
            lon: r.lon,
            url: r.url,
        })
        .collect())
}

fn location(l: provider::Location) -> NormalizedLocation {
    NormalizedLocation {
        name: l.name,
        region: l.region,
        country: l.country,
        localtime: l.localtime,
        coordinates: Coordinates {
            lat: l.lat,
            lon: l.lon,
        },
    }
}

fn air_quality(aq: provider::AirQuality) -> AirQuality {
    AirQuality {
        co: aq.co,
        no2: aq.no2,
        o3: aq.o3,
        so2: aq.so2,
        pm2_5: aq.pm2_5,
        pm10: aq.pm10,
        us_epa_index: aq.us_epa_index,
        gb_defra_index: aq.gb_defra_index,
    }
}

fn forecast_day(fd: provider::ForecastDay) -> NormalizedForecastDay {
    let d = fd.day;
    let a = fd.astro;

    NormalizedForecastDay {
        date: fd.date,
        date_epoch: fd.date_epoch,
        day: DaySummary {
            max_temp: d.maxtemp_c,
            max_temp_f: d.maxtemp_f,
            min_temp: d.mintemp_c,
            min_temp_f: d.mintemp_f,
            avg_temp: d.avgtemp_c,
            avg_temp_f: d.avgtemp_f,
            condition: d.condition.text,
            icon: d.condition.icon,
            max_wind: d.maxwind_kph,
            max_wind_mph: d.maxwind_mph,
            total_precip: d.totalprecip_mm,
            total_precip_in: d.totalprecip_in,
            avg_humidity: d.avghumidity,
            will_it_rain: d.daily_will_it_rain,
            chance_of_rain: d.daily_chance_of_rain,
            will_it_snow: d.daily_will_it_snow,
            chance_of_snow: d.daily_chance_of_snow,
            uv_index: d.uv,
        },
        astro: Astro {
            sunrise: a.sunrise,
            sunset: a.sunset,
            moonrise: a.moonrise,
            moonset: a.moonset,
            moon_phase: a.moon_phase,
            moon_illumination: a.moon_illumination,
        },
        hours: fd.hour.into_iter().map(hour).collect(),
    }
}

fn hour(h: provider::Hour) -> NormalizedHour {
    NormalizedHour {
        time: h.time,
        time_epoch: h.time_epoch,
        temp: h.temp_c,
        temp_f: h.temp_f,
        condition: h.condition.text,
        icon: h.condition.icon,
        wind_speed: h.wind_kph,
        wind_speed_mph: h.wind_mph,
        wind_direction: h.wind_dir,
        humidity: h.humidity,
        cloud_cover: h.cloud,
        feels_like: h.feelslike_c,
        feels_like_f: h.feelslike_f,
        visibility: h.vis_km,
        visibility_miles: h.vis_miles,
        uv_index: h.uv,
        will_it_rain: h.will_it_rain,
        chance_of_rain: h.chance_of_rain,
        will_it_snow: h.will_it_snow,
        chance_of_snow: h.chance_of_snow,
        precipitation: h.precip_mm,
        precipitation_in: h.precip_in,
    }
}

fn alert(a: provider::Alert) -> NormalizedAlert {
    NormalizedAlert {
        headline: a.headline.unwrap_or_default(),
        msg_type: a.msgtype.unwrap_or_default(),
        severity: a.severity.unwrap_or_default(),
        urgency: a.urgency.unwrap_or_default(),
        areas: a.areas.unwrap_or_default(),
        category: a.category.unwrap_or_default(),
        certainty: a.certainty.unwrap_or_default(),
        event: a.event.unwrap_or_default(),
        note: a.note.unwrap_or_default(),
        effective: a.effective.unwrap_or_default(),
        expires: a.expires.unwrap_or_default(),
        description: a.desc.unwrap_or_default(),
        instruction: a.instruction.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[test]
    fn test_current_maps_fields() {
        let c = current(&fixtures::current("Hyderabad")).unwrap();
        assert_eq!(c.location.name, "Hyderabad");
        assert_eq!(c.location.coordinates, Coordinates { lat: 17.38, lon: 78.47 });
        assert_eq!(c.conditions.temperature, 31.2);
        assert_eq!(c.conditions.feels_like_f, 93.2);
        assert_eq!(c.conditions.condition, "Partly cloudy");
        assert_eq!(c.conditions.wind_direction, "WNW");
        assert_eq!(c.conditions.cloud_cover, 50);

        let aq = c.air_quality.unwrap();
        assert_eq!(aq.pm2_5, Some(21.3));
        assert_eq!(aq.us_epa_index, Some(2));
    }

    #[test]
    fn test_current_without_air_quality() {
        let mut payload = fixtures::current("Oslo");
        payload["current"]
            .as_object_mut()
            .unwrap()
            .remove("air_quality");
        let c = current(&payload).unwrap();
        assert!(c.air_quality.is_none());
    }

    #[test]
    fn test_current_is_deterministic() {
        let payload = fixtures::current("Hyderabad");
        let a = serde_json::to_vec(&current(&payload).unwrap()).unwrap();
        let b = serde_json::to_vec(&current(&payload).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_current_rejects_missing_section() {
        let payload = json!({ "location": fixtures::location("Oslo") });
        assert!(current(&payload).is_err());
    }

    #[test]
    fn test_forecast_maps_days_and_hours() {
        let f = forecast(&fixtures::forecast("Hyderabad", 7)).unwrap();
        assert_eq!(f.days.len(), 7);
        assert_eq!(f.location.name, "Hyderabad");

        let first = &f.days[0];
        assert_eq!(first.date.to_string(), "2024-06-01");
        assert_eq!(first.day.max_temp, 34.1);
        assert!(first.day.will_it_rain);
        assert!(!first.day.will_it_snow);
        assert_eq!(first.day.chance_of_rain, 80);
        assert_eq!(first.astro.moon_illumination, 24.0);
        assert_eq!(first.hours.len(), 24);
        assert_eq!(first.hours[3].time, "2024-06-01 03:00");
        assert_eq!(first.hours[3].chance_of_rain, 12);
    }

    #[test]
    fn test_alerts_empty_when_absent() {
        assert!(alerts(&json!({})).unwrap().is_empty());
        assert!(alerts(&json!({"alerts": {}})).unwrap().is_empty());
        assert!(alerts(&json!({"alerts": {"alert": null}})).unwrap().is_empty());
        assert!(alerts(&json!({"alerts": {"alert": []}})).unwrap().is_empty());
    }

    #[test]
    fn test_alerts_map_fields() {
        let list = alerts(&fixtures::alerts(&["Flood Watch", "Heat Advisory"])).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].headline, "Flood Watch");
        assert_eq!(list[0].msg_type, "Alert");
        assert_eq!(list[0].description, "Heavy rain expected.");
        assert_eq!(list[1].headline, "Heat Advisory");
    }

    #[test]
    fn test_search_results() {
        let payload = json!([
            {"id": 1, "name": "London", "region": "City of London, Greater London",
             "country": "United Kingdom", "lat": 51.52, "lon": -0.11, "url": "london-city-of-london-greater-london-united-kingdom"},
            {"id": 2, "name": "London", "region": "Ontario", "country": "Canada",
             "lat": 42.98, "lon": -81.25, "url": "london-ontario-canada"}
        ]);
        let results = search(&payload).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].to_query(), "London, Ontario, Canada");
    }

    #[test]
    fn test_search_rejects_non_list() {
        assert!(search(&json!({"name": "London"})).is_err());
    }
}
