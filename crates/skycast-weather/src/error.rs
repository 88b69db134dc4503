//! Failure types for provider requests and aggregation.

use serde::Serialize;
use thiserror::Error;

use crate::request::EndpointKind;

/// Provider code for "API key does not have access to the resource"
pub const PLAN_RESTRICTED_CODE: i64 = 2009;
/// Provider code for "No matching location found"
pub const LOCATION_NOT_FOUND_CODE: i64 = 1006;
/// Provider codes for missing, invalid or disabled keys
pub const INVALID_KEY_CODES: [i64; 3] = [1002, 2006, 2008];

/// How a sub-request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Network failure, timeout or non-success HTTP status
    Transport,
    /// Successful response carrying a provider-declared error
    ProviderError,
    /// Feature not available for this plan or location; callers treat it
    /// as an empty result
    RecoverableAbsence,
    /// Successful response whose body does not have the expected shape
    InvalidPayload,
    /// Aborted through a cancellation token
    Cancelled,
    /// Caller input rejected before any request was sent
    InvalidRequest,
}

/// Error object the provider embeds in its JSON bodies
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ProviderErrorDetail {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{endpoint} request failed: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
    #[serde(rename = "sourceEndpoint")]
    pub endpoint: EndpointKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<i64>,
}

impl FetchError {
    /// Network-level failure before any response arrived
    pub fn transport(endpoint: EndpointKind, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
            endpoint,
            status: None,
            provider_code: None,
        }
    }

    /// A response arrived but signalled failure, through its status, its
    /// body, or both.
    pub fn from_response(
        endpoint: EndpointKind,
        status: reqwest::StatusCode,
        provider: Option<ProviderErrorDetail>,
    ) -> Self {
        let provider_code = provider.as_ref().and_then(|p| p.code);
        let provider_message = provider.and_then(|p| p.message);
        let kind = classify_failure(endpoint, status.as_u16(), provider_code);

        let message = if status.is_success() {
            provider_message.unwrap_or_else(|| "API Error".to_string())
        } else {
            let base = format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            );
            match provider_message {
                Some(detail) => format!("{} ({})", base, detail),
                None => base,
            }
        };

        Self {
            kind,
            message,
            endpoint,
            status: Some(status.as_u16()),
            provider_code,
        }
    }

    pub fn invalid_payload(endpoint: EndpointKind, detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FetchErrorKind::InvalidPayload,
            message: format!("Unexpected response shape: {}", detail),
            endpoint,
            status: None,
            provider_code: None,
        }
    }

    /// The caller asked for something that cannot be sent to the provider
    pub fn invalid_request(endpoint: EndpointKind, detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FetchErrorKind::InvalidRequest,
            message: format!("Invalid request: {}", detail),
            endpoint,
            status: None,
            provider_code: None,
        }
    }

    pub fn cancelled(endpoint: EndpointKind) -> Self {
        Self {
            kind: FetchErrorKind::Cancelled,
            message: "Request cancelled".to_string(),
            endpoint,
            status: None,
            provider_code: None,
        }
    }

    pub fn is_recoverable_absence(&self) -> bool {
        self.kind == FetchErrorKind::RecoverableAbsence
    }
}

/// Decide the kind of a failed response.
///
/// Only the alerts endpoint can be a recoverable absence: either the plan
/// has no access to it or the endpoint does not exist. Any other non-2xx
/// status is a transport failure; a 2xx response only fails when its body
/// carries a provider error.
pub fn classify_failure(
    endpoint: EndpointKind,
    status: u16,
    provider_code: Option<i64>,
) -> FetchErrorKind {
    let unavailable = provider_code == Some(PLAN_RESTRICTED_CODE) || status == 404;
    if endpoint == EndpointKind::Alerts && unavailable {
        return FetchErrorKind::RecoverableAbsence;
    }

    if (200..300).contains(&status) {
        FetchErrorKind::ProviderError
    } else {
        FetchErrorKind::Transport
    }
}

impl From<&FetchError> for skycast_core::WeatherError {
    fn from(err: &FetchError) -> Self {
        use skycast_core::WeatherError;

        match (err.kind, err.provider_code, err.status) {
            (FetchErrorKind::Cancelled, _, _) => WeatherError::Cancelled,
            (FetchErrorKind::RecoverableAbsence, _, _) => {
                WeatherError::PlanRestricted(err.endpoint.to_string())
            }
            (_, Some(LOCATION_NOT_FOUND_CODE), _) => {
                WeatherError::LocationNotFound(err.message.clone())
            }
            (_, Some(code), _) if INVALID_KEY_CODES.contains(&code) => WeatherError::InvalidApiKey,
            (_, _, Some(401)) => WeatherError::InvalidApiKey,
            (FetchErrorKind::Transport, _, None) => WeatherError::ServiceUnavailable,
            (FetchErrorKind::Transport, _, Some(status)) if status >= 500 => {
                WeatherError::ServiceUnavailable
            }
            _ => WeatherError::ApiError(err.message.clone()),
        }
    }
}

/// Failure of a whole aggregation, as opposed to one of its sub-requests
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Internal fault: {0}")]
    InternalFault(String),
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Location query is empty")]
    EmptyQuery,
    #[error("Invalid coordinates: {latitude},{longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("Location access denied by user")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use skycast_core::WeatherError;

    #[test]
    fn test_alerts_plan_restriction_is_recoverable() {
        assert_eq!(
            classify_failure(EndpointKind::Alerts, 403, Some(PLAN_RESTRICTED_CODE)),
            FetchErrorKind::RecoverableAbsence
        );
        assert_eq!(
            classify_failure(EndpointKind::Alerts, 404, None),
            FetchErrorKind::RecoverableAbsence
        );
        assert_eq!(
            classify_failure(EndpointKind::Alerts, 200, Some(PLAN_RESTRICTED_CODE)),
            FetchErrorKind::RecoverableAbsence
        );
    }

    #[test]
    fn test_alerts_outage_is_transport() {
        assert_eq!(
            classify_failure(EndpointKind::Alerts, 500, None),
            FetchErrorKind::Transport
        );
        assert_eq!(
            classify_failure(EndpointKind::Alerts, 403, Some(2007)),
            FetchErrorKind::Transport
        );
    }

    #[test]
    fn test_plan_restriction_on_other_endpoints_is_not_absorbed() {
        assert_eq!(
            classify_failure(EndpointKind::Current, 403, Some(PLAN_RESTRICTED_CODE)),
            FetchErrorKind::Transport
        );
        assert_eq!(
            classify_failure(EndpointKind::Forecast, 404, None),
            FetchErrorKind::Transport
        );
    }

    #[test]
    fn test_success_status_with_error_body_is_provider_error() {
        assert_eq!(
            classify_failure(EndpointKind::Current, 200, Some(LOCATION_NOT_FOUND_CODE)),
            FetchErrorKind::ProviderError
        );
    }

    #[test]
    fn test_from_response_messages() {
        let http = FetchError::from_response(
            EndpointKind::Current,
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
        );
        assert_eq!(http.message, "HTTP 500: Internal Server Error");
        assert_eq!(http.status, Some(500));

        let body = FetchError::from_response(
            EndpointKind::Forecast,
            StatusCode::OK,
            Some(ProviderErrorDetail {
                code: Some(1006),
                message: Some("No matching location found.".into()),
            }),
        );
        assert_eq!(body.kind, FetchErrorKind::ProviderError);
        assert_eq!(body.message, "No matching location found.");

        let anonymous = FetchError::from_response(
            EndpointKind::Forecast,
            StatusCode::OK,
            Some(ProviderErrorDetail {
                code: None,
                message: None,
            }),
        );
        assert_eq!(anonymous.message, "API Error");
    }

    #[test]
    fn test_non_success_keeps_provider_text() {
        let err = FetchError::from_response(
            EndpointKind::Current,
            StatusCode::BAD_REQUEST,
            Some(ProviderErrorDetail {
                code: Some(LOCATION_NOT_FOUND_CODE),
                message: Some("No matching location found.".into()),
            }),
        );
        assert_eq!(err.kind, FetchErrorKind::Transport);
        assert!(err.message.contains("400"));
        assert!(err.message.contains("No matching location found."));
        assert_eq!(err.provider_code, Some(LOCATION_NOT_FOUND_CODE));
    }

    #[test]
    fn test_weather_error_mapping() {
        let not_found = FetchError::from_response(
            EndpointKind::Current,
            StatusCode::BAD_REQUEST,
            Some(ProviderErrorDetail {
                code: Some(LOCATION_NOT_FOUND_CODE),
                message: None,
            }),
        );
        assert!(matches!(
            WeatherError::from(&not_found),
            WeatherError::LocationNotFound(_)
        ));

        let bad_key = FetchError::from_response(
            EndpointKind::Current,
            StatusCode::FORBIDDEN,
            Some(ProviderErrorDetail {
                code: Some(2008),
                message: None,
            }),
        );
        assert!(matches!(WeatherError::from(&bad_key), WeatherError::InvalidApiKey));

        let offline = FetchError::transport(EndpointKind::Forecast, "connection refused");
        assert!(matches!(
            WeatherError::from(&offline),
            WeatherError::ServiceUnavailable
        ));

        let cancelled = FetchError::cancelled(EndpointKind::Alerts);
        assert!(matches!(WeatherError::from(&cancelled), WeatherError::Cancelled));

        let rejected = FetchError::invalid_request(EndpointKind::Current, "latitude out of range");
        assert!(matches!(WeatherError::from(&rejected), WeatherError::ApiError(_)));
        assert_eq!(serde_json::to_value(&rejected).unwrap()["kind"], "invalid_request");
    }

    #[test]
    fn test_serialized_shape() {
        let err = FetchError::transport(EndpointKind::Current, "boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "transport");
        assert_eq!(json["sourceEndpoint"], "current");
        assert_eq!(json["message"], "boom");
        assert!(json.get("status").is_none());
    }
}
