//! Weather data for Skycast
//!
//! Fetches current conditions, forecasts, alerts and place suggestions from
//! WeatherAPI.com through a single cached gateway, and folds concurrent
//! lookups into one [`AggregatedWeather`] envelope with per-request errors.

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod gateway;
pub mod location;
pub mod normalize;
mod provider;
pub mod recent;
pub mod refresh;
pub mod request;
pub mod types;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod fixtures;

pub use aggregator::{AggregatorConfig, WeatherAggregator};
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use error::{classify_failure, AggregateError, FetchError, FetchErrorKind, LocationError};
pub use gateway::{FetchGateway, GatewayConfig, KeyFn};
pub use location::{locate_with_timeout, LocationInput, LocationResolver, Position};
pub use recent::{RecentSearch, RecentSearchStore, RecentSearches};
pub use refresh::spawn_refresh;
pub use request::{params, CacheKey, DefaultParams, EndpointKind, ParamValue, Params, WeatherRequest};
pub use types::*;
