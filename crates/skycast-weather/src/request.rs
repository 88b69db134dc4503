//! Typed request descriptors and the cache keys derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::LocationQuery;

/// Provider endpoint a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Current,
    Forecast,
    Search,
    Alerts,
}

impl EndpointKind {
    /// Path appended to the provider base URL
    pub fn path(&self) -> &'static str {
        match self {
            Self::Current => "/current.json",
            Self::Forecast => "/forecast.json",
            Self::Search => "/search.json",
            Self::Alerts => "/alerts.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
            Self::Search => "search",
            Self::Alerts => "alerts",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar query parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    /// Rendered as "yes"/"no", the provider's boolean convention
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
            Self::Flag(true) => f.write_str("yes"),
            Self::Flag(false) => f.write_str("no"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u8> for ParamValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Ordered parameter map; ordering makes resolved requests and their keys
/// independent of insertion order.
pub type Params = BTreeMap<String, ParamValue>;

/// Build a `Params` map from `(name, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Per-endpoint default parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultParams {
    pub air_quality: bool,
    pub forecast_days: u8,
    pub alerts: bool,
}

impl Default for DefaultParams {
    fn default() -> Self {
        Self {
            air_quality: true,
            forecast_days: 7,
            alerts: true,
        }
    }
}

impl DefaultParams {
    pub fn for_endpoint(&self, endpoint: EndpointKind) -> Params {
        let mut out = Params::new();
        match endpoint {
            EndpointKind::Current => {
                out.insert("aqi".into(), self.air_quality.into());
            }
            EndpointKind::Forecast => {
                out.insert("aqi".into(), self.air_quality.into());
                out.insert("days".into(), self.forecast_days.into());
                out.insert("alerts".into(), self.alerts.into());
            }
            EndpointKind::Search | EndpointKind::Alerts => {}
        }
        out
    }
}

/// Fully resolved request: endpoint, location and effective parameters.
/// The API key is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeatherRequest {
    pub endpoint: EndpointKind,
    pub query: LocationQuery,
    pub params: Params,
}

impl WeatherRequest {
    /// Merge endpoint defaults with per-call overrides; overrides win.
    pub fn resolve(
        endpoint: EndpointKind,
        query: LocationQuery,
        defaults: &DefaultParams,
        extra: Params,
    ) -> Self {
        let mut params = defaults.for_endpoint(endpoint);
        params.extend(extra);
        // "q" always comes from the query itself
        params.remove("q");
        Self {
            endpoint,
            query,
            params,
        }
    }

    /// Query string pairs, location first
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        std::iter::once(("q".to_string(), self.query.as_str().to_string()))
            .chain(self.params.iter().map(|(k, v)| (k.clone(), v.to_string())))
            .collect()
    }
}

/// Cache slot identity for a resolved request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: EndpointKind,
    query: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(
        endpoint: EndpointKind,
        query: impl Into<String>,
        params: Vec<(String, String)>,
    ) -> Self {
        Self {
            endpoint,
            query: query.into(),
            params,
        }
    }

    /// Default derivation: endpoint, query and every resolved parameter.
    pub fn from_request(request: &WeatherRequest) -> Self {
        Self::new(
            request.endpoint,
            request.query.as_str(),
            request
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
        )
    }

    pub fn endpoint(&self) -> EndpointKind {
        self.endpoint
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|q={}", self.endpoint, self.query)?;
        for (k, v) in &self.params {
            write!(f, "|{}={}", k, v)?;
        }
        Ok(())
    }
}
