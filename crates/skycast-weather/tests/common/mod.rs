//! Sample WeatherAPI payloads shared by the unit and integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn location(name: &str) -> Value {
    json!({
        "name": name,
        "region": "Telangana",
        "country": "India",
        "lat": 17.38,
        "lon": 78.47,
        "tz_id": "Asia/Kolkata",
        "localtime_epoch": 1717230300,
        "localtime": "2024-06-01 14:05"
    })
}

pub fn condition(text: &str) -> Value {
    json!({
        "text": text,
        "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
        "code": 1003
    })
}

pub fn current(name: &str) -> Value {
    json!({
        "location": location(name),
        "current": {
            "last_updated": "2024-06-01 14:00",
            "temp_c": 31.2,
            "temp_f": 88.2,
            "is_day": 1,
            "condition": condition("Partly cloudy"),
            "wind_mph": 9.4,
            "wind_kph": 15.1,
            "wind_dir": "WNW",
            "pressure_mb": 1004.0,
            "humidity": 55,
            "cloud": 50,
            "feelslike_c": 34.0,
            "feelslike_f": 93.2,
            "vis_km": 6.0,
            "vis_miles": 3.0,
            "uv": 8.0,
            "air_quality": {
                "co": 390.5,
                "no2": 12.1,
                "o3": 80.0,
                "so2": 6.4,
                "pm2_5": 21.3,
                "pm10": 40.2,
                "us-epa-index": 2,
                "gb-defra-index": 2
            }
        }
    })
}

pub fn hour(day: &str, h: u32) -> Value {
    json!({
        "time_epoch": 1717180200 + i64::from(h) * 3600,
        "time": format!("{} {:02}:00", day, h),
        "temp_c": 26.0 + f64::from(h) / 4.0,
        "temp_f": 78.8,
        "condition": condition("Clear"),
        "wind_mph": 6.0,
        "wind_kph": 9.7,
        "wind_dir": "W",
        "humidity": 60,
        "cloud": 10,
        "feelslike_c": 27.5,
        "feelslike_f": 81.5,
        "vis_km": 10.0,
        "vis_miles": 6.0,
        "uv": 1.0,
        "will_it_rain": 0,
        "chance_of_rain": 12,
        "will_it_snow": 0,
        "chance_of_snow": 0,
        "precip_mm": 0.0,
        "precip_in": 0.0
    })
}

pub fn forecast_day(index: u32) -> Value {
    let date = format!("2024-06-{:02}", index + 1);
    let hours: Vec<Value> = (0..24).map(|h| hour(&date, h)).collect();
    json!({
        "date": date,
        "date_epoch": 1717200000 + i64::from(index) * 86400,
        "day": {
            "maxtemp_c": 34.1,
            "maxtemp_f": 93.4,
            "mintemp_c": 24.3,
            "mintemp_f": 75.7,
            "avgtemp_c": 28.6,
            "avgtemp_f": 83.5,
            "maxwind_mph": 12.1,
            "maxwind_kph": 19.4,
            "totalprecip_mm": 1.2,
            "totalprecip_in": 0.05,
            "avghumidity": 58,
            "daily_will_it_rain": 1,
            "daily_chance_of_rain": 80,
            "daily_will_it_snow": 0,
            "daily_chance_of_snow": 0,
            "condition": condition("Patchy rain nearby"),
            "uv": 9.0
        },
        "astro": {
            "sunrise": "05:42 AM",
            "sunset": "06:48 PM",
            "moonrise": "02:10 AM",
            "moonset": "03:01 PM",
            "moon_phase": "Waning Crescent",
            "moon_illumination": 24
        },
        "hour": hours
    })
}

pub fn forecast(name: &str, days: u32) -> Value {
    let forecastday: Vec<Value> = (0..days).map(forecast_day).collect();
    json!({
        "location": location(name),
        "current": current(name)["current"].clone(),
        "forecast": {
            "forecastday": forecastday
        }
    })
}

pub fn alert(headline: &str) -> Value {
    json!({
        "headline": headline,
        "msgtype": "Alert",
        "severity": "Moderate",
        "urgency": "Expected",
        "areas": "Hyderabad",
        "category": "Met",
        "certainty": "Likely",
        "event": "Heavy Rain",
        "note": "",
        "effective": "2024-06-01T10:00:00+05:30",
        "expires": "2024-06-02T10:00:00+05:30",
        "desc": "Heavy rain expected.",
        "instruction": "Avoid low-lying areas."
    })
}

pub fn alerts(headlines: &[&str]) -> Value {
    let alert_list: Vec<Value> = headlines.iter().map(|h| alert(h)).collect();
    json!({
        "location": location("Hyderabad"),
        "alerts": { "alert": alert_list }
    })
}

pub fn provider_error(code: i64, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}
