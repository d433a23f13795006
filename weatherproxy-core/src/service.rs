use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{CoreResult, WeatherProxyError};
use crate::http_client::{HttpClient, RequestOpts};
use crate::model::{GeoPoint, WeatherReport};
use crate::registry::ClientRegistry;

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Where the API key comes from. `Env` is re-read on every call so a key
/// rotated in the environment takes effect without a restart.
#[derive(Debug)]
enum ApiKey {
    Env(String),
    #[cfg(any(test, feature = "test-utils"))]
    Fixed(String),
}

/// City-name weather lookup: geocode first, then fetch current weather at
/// the resolved coordinates. Both steps go through the same named client.
#[derive(Debug)]
pub struct WeatherService {
    http: HttpClient,
    key: ApiKey,
}

impl WeatherService {
    /// Resolve the configured client once. A missing client is a startup
    /// failure here, not something rediscovered per request.
    pub fn from_registry(registry: &ClientRegistry, cfg: &Config) -> CoreResult<Self> {
        let http = registry.get(&cfg.weather.client)?;
        Ok(Self {
            http,
            key: ApiKey::Env(cfg.weather.api_key_env.clone()),
        })
    }

    /// Build a service with a fixed API key, bypassing the environment.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_fixed_key(http: HttpClient, api_key: &str) -> Self {
        Self {
            http,
            key: ApiKey::Fixed(api_key.to_string()),
        }
    }

    fn api_key(&self) -> CoreResult<SecretString> {
        match &self.key {
            ApiKey::Env(var) => std::env::var(var).map(SecretString::from).map_err(|_| {
                WeatherProxyError::Validation(format!("environment variable {var} is not set"))
            }),
            #[cfg(any(test, feature = "test-utils"))]
            ApiKey::Fixed(key) => Ok(SecretString::from(key.clone())),
        }
    }

    /// Resolve a city name to coordinates via the geocoding endpoint.
    pub async fn geocode(&self, city: &str) -> CoreResult<GeoPoint> {
        let key = self.api_key()?;
        let query = [
            ("q", city.to_string()),
            ("limit", "1".to_string()),
            ("appid", key.expose_secret().to_string()),
        ];
        let entries: Vec<GeoEntry> = self
            .http
            .get_json(GEOCODE_PATH, &query, &RequestOpts::default())
            .await?;

        let Some(first) = entries.first() else {
            return Err(WeatherProxyError::CityNotFound(city.to_string()));
        };
        match (first.lat, first.lon) {
            (Some(lat), Some(lon)) => Ok(GeoPoint { lat, lon }),
            _ => Err(WeatherProxyError::MalformedGeoData(city.to_string())),
        }
    }

    /// Current weather for a city. The weather call only happens once
    /// geocoding has produced coordinates.
    pub async fn current_weather(&self, city: &str) -> CoreResult<WeatherReport> {
        let point = self.geocode(city).await?;
        let key = self.api_key()?;
        let query = [
            ("lat", point.lat.to_string()),
            ("lon", point.lon.to_string()),
            ("appid", key.expose_secret().to_string()),
            ("units", "metric".to_string()),
        ];
        let body: CurrentWeather = self
            .http
            .get_json(CURRENT_WEATHER_PATH, &query, &RequestOpts::default())
            .await?;

        Ok(WeatherReport {
            city: city.to_string(),
            temperature_c: body.main.temp,
        })
    }
}

// ---- Wire structs (minimal) ----

/// One geocoding match. lat/lon stay optional so an entry missing either
/// field is distinguishable from an empty result list.
#[derive(Deserialize)]
struct GeoEntry {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    main: CurrentMain,
}

#[derive(Deserialize)]
struct CurrentMain {
    temp: f64,
}
