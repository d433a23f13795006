use serde::Serialize;
use thiserror::Error;

/// Everything that could be salvaged from a failed outbound call before it
/// was normalized: request URL, response status/status text, the underlying
/// transport message, and the response body (JSON when it parses).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiErrorDetail {
    pub url: Option<String>,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub message: String,
    pub body: Option<serde_json::Value>,
}

impl ApiErrorDetail {
    /// Status tag used in the normalized message: the numeric code when a
    /// response was received, `NETWORK` when the failure never produced one.
    pub fn status_label(&self) -> String {
        match self.status {
            Some(code) => code.to_string(),
            None => "NETWORK".to_string(),
        }
    }
}

/// Core error type for the weather proxy.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
#[derive(Debug, Error)]
pub enum WeatherProxyError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("http client '{0}' is not configured")]
    ClientNotConfigured(String),

    /// The single shape every outbound transport/remote failure is
    /// normalized into at the HTTP client boundary.
    #[error("API Error [{}]: {}", .0.status_label(), .0.message)]
    Api(ApiErrorDetail),

    // The two messages below are part of the response envelope contract;
    // existing consumers match on them verbatim.
    #[error("No location found for city: {0}")]
    CityNotFound(String),

    #[error("Invalid geocoding data for city: {0}")]
    MalformedGeoData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = std::result::Result<T, WeatherProxyError>;
