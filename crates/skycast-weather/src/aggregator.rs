//! Concurrent current + forecast + alerts lookup folded into one envelope.

use std::sync::Arc;

use serde_json::Value;
use skycast_core::WeatherConfig;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{AggregateError, FetchError};
use crate::gateway::FetchGateway;
use crate::normalize;
use crate::request::{params, EndpointKind, Params};
use crate::types::{
    AggregatedWeather, LocationQuery, NormalizedAlert, NormalizedCurrent, NormalizedForecast,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Days requested from the forecast endpoint
    pub forecast_days: u8,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { forecast_days: 7 }
    }
}

impl From<&WeatherConfig> for AggregatorConfig {
    fn from(config: &WeatherConfig) -> Self {
        Self {
            forecast_days: config.forecast_days,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    gateway: Arc<FetchGateway>,
    config: AggregatorConfig,
}

impl WeatherAggregator {
    pub fn new(gateway: Arc<FetchGateway>, config: AggregatorConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &Arc<FetchGateway> {
        &self.gateway
    }

    pub fn config(&self) -> AggregatorConfig {
        self.config
    }

    /// Fetch current conditions, forecast and alerts for `location`.
    ///
    /// All three requests are issued together and each one settles before
    /// this returns. A failed branch leaves its slot empty and adds one
    /// entry to `errors`; it never discards what the other branches
    /// produced. Unavailable alerts become an empty list with no error.
    pub async fn get_complete_weather_data(
        &self,
        location: &str,
    ) -> Result<AggregatedWeather, AggregateError> {
        self.get_complete_weather_data_with_cancel(location, &CancellationToken::new())
            .await
    }

    /// Same as [`get_complete_weather_data`](Self::get_complete_weather_data);
    /// branches still pending when `token` fires report `Cancelled`.
    #[instrument(skip(self, token), level = "info")]
    pub async fn get_complete_weather_data_with_cancel(
        &self,
        location: &str,
        token: &CancellationToken,
    ) -> Result<AggregatedWeather, AggregateError> {
        let query = LocationQuery::new(location)
            .map_err(|e| AggregateError::InternalFault(e.to_string()))?;
        let forecast_params = self.forecast_params(self.config.forecast_days)?;

        let (current, forecast, alerts) = tokio::join!(
            self.gateway
                .request_with_cancel(EndpointKind::Current, &query, Params::new(), token),
            self.gateway
                .request_with_cancel(EndpointKind::Forecast, &query, forecast_params, token),
            self.gateway
                .request_with_cancel(EndpointKind::Alerts, &query, Params::new(), token),
        );

        let mut weather = AggregatedWeather::default();

        match settle(EndpointKind::Current, current, normalize::current) {
            Ok(c) => weather.current = Some(c),
            Err(e) => weather.errors.push(e),
        }
        match settle(EndpointKind::Forecast, forecast, normalize::forecast) {
            Ok(f) => weather.forecast = Some(f),
            Err(e) => weather.errors.push(e),
        }
        match absorb_absence(settle(EndpointKind::Alerts, alerts, normalize::alerts)) {
            Ok(a) => weather.alerts = a,
            Err(e) => weather.errors.push(e),
        }

        tracing::info!(
            q = %query,
            current = weather.current.is_some(),
            forecast_days = weather.forecast.as_ref().map_or(0, |f| f.days.len()),
            alerts = weather.alerts.len(),
            errors = weather.errors.len(),
            "Weather aggregation finished"
        );

        Ok(weather)
    }

    pub async fn current(&self, query: &LocationQuery) -> Result<NormalizedCurrent, FetchError> {
        let payload = self
            .gateway
            .request(EndpointKind::Current, query, Params::new())
            .await;
        settle(EndpointKind::Current, payload, normalize::current)
    }

    pub async fn forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<NormalizedForecast, FetchError> {
        let payload = self
            .gateway
            .request(EndpointKind::Forecast, query, params([("days", days)]))
            .await;
        settle(EndpointKind::Forecast, payload, normalize::forecast)
    }

    /// Active alerts; an unavailable alerts feature yields an empty list.
    pub async fn alerts(&self, query: &LocationQuery) -> Result<Vec<NormalizedAlert>, FetchError> {
        let payload = self
            .gateway
            .request(EndpointKind::Alerts, query, Params::new())
            .await;
        absorb_absence(settle(EndpointKind::Alerts, payload, normalize::alerts))
    }

    fn forecast_params(&self, days: u8) -> Result<Params, AggregateError> {
        if days == 0 {
            return Err(AggregateError::InternalFault(
                "forecast_days must be at least 1".to_string(),
            ));
        }
        Ok(params([("days", days)]))
    }
}

/// Normalize a fetched payload; a payload that does not match the expected
/// shape is reported against its endpoint.
fn settle<T>(
    endpoint: EndpointKind,
    fetched: Result<Arc<Value>, FetchError>,
    normalize: fn(&Value) -> Result<T, serde_json::Error>,
) -> Result<T, FetchError> {
    let payload = fetched?;
    normalize(payload.as_ref()).map_err(|e| {
        tracing::warn!(%endpoint, "Failed to normalize payload: {}", e);
        FetchError::invalid_payload(endpoint, e)
    })
}

fn absorb_absence(
    alerts: Result<Vec<NormalizedAlert>, FetchError>,
) -> Result<Vec<NormalizedAlert>, FetchError> {
    match alerts {
        Err(e) if e.is_recoverable_absence() => {
            tracing::warn!(status = ?e.status, "Alerts unavailable, treating as none: {}", e.message);
            Ok(Vec::new())
        }
        other => other,
    }
}
