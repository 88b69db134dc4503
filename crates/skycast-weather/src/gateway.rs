//! Single entry point for provider HTTP requests.
//!
//! Every request is resolved against the endpoint defaults, looked up in the
//! response cache and only then sent over the wire. Failures are classified
//! into [`FetchErrorKind`](crate::error::FetchErrorKind) values and never
//! cached.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use skycast_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::error::FetchError;
use crate::provider::{self, ErrorBody};
use crate::request::{params, CacheKey, DefaultParams, EndpointKind, Params, WeatherRequest};
use crate::types::LocationQuery;

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Derives the cache slot for a resolved request
pub type KeyFn = Arc<dyn Fn(&WeatherRequest) -> CacheKey + Send + Sync>;

#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_ttl: Duration,
    /// Whole-request timeout; `None` leaves it to the HTTP client
    pub request_timeout: Option<Duration>,
    pub defaults: DefaultParams,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: None,
            defaults: DefaultParams::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl From<&WeatherConfig> for GatewayConfig {
    fn from(config: &WeatherConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            request_timeout: (config.request_timeout_secs > 0)
                .then(|| Duration::from_secs(config.request_timeout_secs)),
            defaults: DefaultParams {
                air_quality: config.air_quality,
                forecast_days: config.forecast_days,
                alerts: config.alerts,
            },
        }
    }
}

pub struct FetchGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    cache: TtlCache<CacheKey, Arc<Value>>,
    key_fn: KeyFn,
}

impl FetchGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, NetworkError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Gateway whose cache reads time from `clock`
    pub fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self, NetworkError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| e.into_network_error())?;

        Ok(Self {
            client,
            cache: TtlCache::with_clock(config.cache_ttl, clock),
            config,
            key_fn: Arc::new(CacheKey::from_request),
        })
    }

    /// Replace the cache key derivation
    pub fn with_key_fn<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&WeatherRequest) -> CacheKey + Send + Sync + 'static,
    {
        self.key_fn = Arc::new(key_fn);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fetch `endpoint` for `query`, serving from cache while fresh.
    ///
    /// `extra` overrides the endpoint defaults. Only successful payloads are
    /// cached; a failure leaves the slot untouched.
    #[instrument(skip(self, extra))]
    pub async fn request(
        &self,
        endpoint: EndpointKind,
        query: &LocationQuery,
        extra: Params,
    ) -> Result<Arc<Value>, FetchError> {
        let request =
            WeatherRequest::resolve(endpoint, query.clone(), &self.config.defaults, extra);
        let key = (self.key_fn)(&request);

        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let payload = Arc::new(self.execute(&request).await?);
        self.cache.insert(key, payload.clone());
        Ok(payload)
    }

    /// Like [`request`](Self::request), aborted with a `Cancelled` error as
    /// soon as `token` fires. Nothing is cached for an aborted request.
    pub async fn request_with_cancel(
        &self,
        endpoint: EndpointKind,
        query: &LocationQuery,
        extra: Params,
        token: &CancellationToken,
    ) -> Result<Arc<Value>, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::cancelled(endpoint));
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(%endpoint, "Request cancelled");
                Err(FetchError::cancelled(endpoint))
            }
            result = self.request(endpoint, query, extra) => result,
        }
    }

    async fn execute(&self, request: &WeatherRequest) -> Result<Value, FetchError> {
        let endpoint = request.endpoint;
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.path()
        );

        let mut query = vec![("key".to_string(), self.config.api_key.clone())];
        query.extend(request.query_pairs());

        tracing::debug!(%endpoint, q = %request.query, "Fetching from provider");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let err = e.without_url().into_network_error();
                tracing::warn!(%endpoint, "Request failed: {}", err);
                FetchError::transport(endpoint, err.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            FetchError::transport(endpoint, e.without_url().into_network_error().to_string())
        })?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            let err = FetchError::from_response(endpoint, status, detail);
            tracing::warn!(%endpoint, status = status.as_u16(), kind = ?err.kind, "{}", err.message);
            return Err(err);
        }

        let payload: Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(%endpoint, "Response is not valid JSON: {}", e);
            FetchError::invalid_payload(endpoint, e)
        })?;

        if let Some(detail) = provider::error_in(&payload) {
            let err = FetchError::from_response(endpoint, status, Some(detail));
            tracing::warn!(%endpoint, kind = ?err.kind, "Provider error: {}", err.message);
            return Err(err);
        }

        Ok(payload)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Weather cache cleared");
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub async fn current(&self, query: &LocationQuery) -> Result<Arc<Value>, FetchError> {
        self.request(EndpointKind::Current, query, Params::new()).await
    }

    pub async fn forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<Arc<Value>, FetchError> {
        self.request(EndpointKind::Forecast, query, params([("days", days)]))
            .await
    }

    pub async fn search(&self, query: &LocationQuery) -> Result<Arc<Value>, FetchError> {
        self.request(EndpointKind::Search, query, Params::new()).await
    }

    pub async fn alerts(&self, query: &LocationQuery) -> Result<Arc<Value>, FetchError> {
        self.request(EndpointKind::Alerts, query, Params::new()).await
    }

    pub async fn current_by_coords(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Arc<Value>, FetchError> {
        let query = coordinate_query(EndpointKind::Current, latitude, longitude)?;
        self.current(&query).await
    }

    pub async fn forecast_by_coords(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<Arc<Value>, FetchError> {
        let query = coordinate_query(EndpointKind::Forecast, latitude, longitude)?;
        self.forecast(&query, days).await
    }
}

fn coordinate_query(
    endpoint: EndpointKind,
    latitude: f64,
    longitude: f64,
) -> Result<LocationQuery, FetchError> {
    LocationQuery::from_coordinates(latitude, longitude)
        .map_err(|e| FetchError::invalid_request(endpoint, e))
}

impl fmt::Debug for FetchGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchGateway")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}
