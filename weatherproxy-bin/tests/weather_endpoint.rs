use std::sync::Arc;

use axum_test::TestServer;
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::{Value, json};

use weatherproxy_bin::{AppState, app};
use weatherproxy_core::config::{ClientCfg, Config};
use weatherproxy_core::interceptor::{KNOWN_CLIENTS, install_logging};
use weatherproxy_core::registry::ClientRegistry;
use weatherproxy_core::service::WeatherService;

/// Stock configuration with `weatherApi` pointed at the mock upstream.
fn state_for(mock: &MockServer) -> AppState {
    let mut cfg = Config::default();
    cfg.clients.insert(
        "weatherApi".to_string(),
        ClientCfg {
            base_url: Some(mock.base_url()),
            timeout_ms: 5_000,
            pool_max_idle_per_host: None,
        },
    );
    let registry = ClientRegistry::from_config(&cfg).unwrap();
    install_logging(&registry, KNOWN_CLIENTS);

    let http = registry.get("weatherApi").unwrap();
    AppState {
        weather: Arc::new(WeatherService::with_fixed_key(http, "test-key")),
    }
}

#[tokio::test]
async fn weather_success_envelope() {
    let mock = MockServer::start();
    let geo = mock.mock(|when, then| {
        when.method(GET)
            .path("/geo/1.0/direct")
            .query_param("q", "Taipei")
            .query_param("limit", "1")
            .query_param("appid", "test-key");
        then.status(200)
            .json_body(json!([{"name": "Taipei", "lat": 25.03, "lon": 121.56}]));
    });
    let weather = mock.mock(|when, then| {
        when.method(GET)
            .path("/data/2.5/weather")
            .query_param("lat", "25.03")
            .query_param("lon", "121.56")
            .query_param("units", "metric");
        then.status(200).json_body(json!({"main": {"temp": 27.3}}));
    });

    let server = TestServer::new(app(state_for(&mock))).unwrap();
    let response = server.get("/weather").add_query_param("city", "Taipei").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("OK"));
    assert_eq!(body["data"]["city"], json!("Taipei"));
    // Legacy wire name: the `weather` field carries the temperature.
    assert_eq!(body["data"]["weather"], json!(27.3));

    geo.assert_hits(1);
    weather.assert_hits(1);
}

#[tokio::test]
async fn unknown_city_fails_in_band_with_status_200() {
    let mock = MockServer::start();
    let _geo = mock.mock(|when, then| {
        when.method(GET).path("/geo/1.0/direct");
        then.status(200).json_body(json!([]));
    });
    let weather = mock.mock(|when, then| {
        when.method(GET).path("/data/2.5/weather");
        then.status(200).json_body(json!({"main": {"temp": 0.0}}));
    });

    let server = TestServer::new(app(state_for(&mock))).unwrap();
    let response = server
        .get("/weather")
        .add_query_param("city", "Atlantis")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("No location found for city: Atlantis"));
    assert!(body["data"].is_null());

    weather.assert_hits(0);
}

#[tokio::test]
async fn upstream_error_is_normalized_in_the_envelope() {
    let mock = MockServer::start();
    let _geo = mock.mock(|when, then| {
        when.method(GET).path("/geo/1.0/direct");
        then.status(404).json_body(json!({"message": "city not found"}));
    });

    let server = TestServer::new(app(state_for(&mock))).unwrap();
    let response = server.get("/weather").add_query_param("city", "Taipei").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    let message = body["message"].as_str().unwrap();
    assert!(
        message.starts_with("API Error [404]:"),
        "got message: {message}"
    );
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn missing_city_parameter_is_passed_through_unvalidated() {
    let mock = MockServer::start();
    let geo = mock.mock(|when, then| {
        when.method(GET).path("/geo/1.0/direct").query_param("q", "");
        then.status(200).json_body(json!([]));
    });

    let server = TestServer::new(app(state_for(&mock))).unwrap();
    let response = server.get("/weather").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("No location found for city: "));
    assert!(body["data"].is_null());

    geo.assert_hits(1);
}
