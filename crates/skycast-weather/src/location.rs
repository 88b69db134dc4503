//! Turning user input and device positions into provider location queries.
//!
//! Acquiring a position is the caller's job; this module only bounds how long
//! it may take and converts the result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skycast_core::LocationConfig;
use tracing::instrument;

use crate::error::{FetchError, LocationError};
use crate::gateway::FetchGateway;
use crate::normalize;
use crate::request::{EndpointKind, Params};
use crate::types::{LocationQuery, LocationSuggestion};

/// Shortest text worth sending to the search endpoint
pub const MIN_SEARCH_LEN: usize = 2;

/// How long a position lookup may take unless configured otherwise
pub const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Device position as reported by a positioning source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

/// What the user gave us to look up
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Text(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationInput {
    pub fn into_query(self) -> Result<LocationQuery, LocationError> {
        match self {
            Self::Text(text) => LocationQuery::new(text),
            Self::Coordinates {
                latitude,
                longitude,
            } => LocationQuery::from_coordinates(latitude, longitude),
        }
    }
}

impl From<Position> for LocationInput {
    fn from(position: Position) -> Self {
        Self::Coordinates {
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    gateway: Arc<FetchGateway>,
    locate_timeout: Duration,
}

impl LocationResolver {
    pub fn new(gateway: Arc<FetchGateway>) -> Self {
        Self {
            gateway,
            locate_timeout: DEFAULT_LOCATE_TIMEOUT,
        }
    }

    /// Resolver whose position lookups are bounded by
    /// `geolocation_timeout_secs`.
    pub fn from_config(gateway: Arc<FetchGateway>, config: &LocationConfig) -> Self {
        Self {
            gateway,
            locate_timeout: Duration::from_secs(config.geolocation_timeout_secs),
        }
    }

    pub fn locate_timeout(&self) -> Duration {
        self.locate_timeout
    }

    /// Autocomplete suggestions for partial input.
    ///
    /// Input shorter than [`MIN_SEARCH_LEN`] characters after trimming
    /// returns no suggestions without a request.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, text: &str) -> Result<Vec<LocationSuggestion>, FetchError> {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        let query = match LocationQuery::new(trimmed) {
            Ok(q) => q,
            Err(_) => return Ok(Vec::new()),
        };

        let payload = self
            .gateway
            .request(EndpointKind::Search, &query, Params::new())
            .await?;
        normalize::search(&payload)
            .map_err(|e| FetchError::invalid_payload(EndpointKind::Search, e))
    }

    pub fn resolve(&self, input: LocationInput) -> Result<LocationQuery, LocationError> {
        input.into_query()
    }

    /// Wait for a device position within the configured timeout and turn it
    /// into a query.
    pub async fn locate<F>(&self, locate: F) -> Result<LocationQuery, LocationError>
    where
        F: Future<Output = Result<Position, LocationError>>,
    {
        let position = locate_with_timeout(locate, self.locate_timeout).await?;
        self.resolve(LocationInput::from(position))
    }
}

/// Wait at most `timeout` for a position.
pub async fn locate_with_timeout<F>(locate: F, timeout: Duration) -> Result<Position, LocationError>
where
    F: Future<Output = Result<Position, LocationError>>,
{
    match tokio::time::timeout(timeout, locate).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Location request timed out after {:?}", timeout);
            Err(LocationError::Timeout)
        }
    }
}
