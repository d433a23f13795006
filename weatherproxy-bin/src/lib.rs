//! HTTP surface for the weather proxy: a single `/weather` endpoint whose
//! every outcome, success or failure, is wrapped in a uniform envelope
//! with transport status 200.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use weatherproxy_core::model::WeatherReport;
use weatherproxy_core::service::WeatherService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
}

/// Response envelope: failures are reported in-band via `success`/`message`,
/// never as a transport-level error.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// May be absent or empty; the lookup service decides what that means.
    #[serde(default)]
    pub city: String,
}

/// Build the router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(weather_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle GET /weather?city=<name>.
async fn weather_handler(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Json<Envelope<WeatherReport>> {
    info!(city = %query.city, "handling weather request");

    match state.weather.current_weather(&query.city).await {
        Ok(report) => Json(Envelope::ok(report)),
        Err(err) => {
            tracing::error!(city = %query.city, error = %err, "weather lookup failed");
            Json(Envelope::fail(err.to_string()))
        }
    }
}
