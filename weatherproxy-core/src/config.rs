use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

/// Configuration for one named outbound HTTP client. Immutable after startup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientCfg {
    /// Base URL prepended to relative request paths. Clients without one
    /// can only issue requests with absolute URLs.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Total request timeout in milliseconds (default 10000ms)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional per-host idle connection pool cap (None = reqwest default)
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for ClientCfg {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            pool_max_idle_per_host: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Which client the weather lookup uses and where its API key comes from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WeatherCfg {
    /// Name of the registered client used for both lookup steps.
    #[serde(default = "default_weather_client")]
    pub client: String,
    /// Name of the environment variable that contains the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for WeatherCfg {
    fn default() -> Self {
        Self {
            client: default_weather_client(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_weather_client() -> String {
    "weatherApi".to_string()
}

fn default_api_key_env() -> String {
    "OPENWEATHERMAP_API_KEY".to_string()
}

pub const OPENWEATHER_BASE_URL: &str = "http://api.openweathermap.org";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Named outbound clients, keyed by the name the registry resolves.
    #[serde(default)]
    pub clients: HashMap<String, ClientCfg>,
    #[serde(default)]
    pub weather: WeatherCfg,
}

impl Default for Config {
    /// The stock configuration: a `default` client for internal calls with
    /// no base URL, and a `weatherApi` client pointed at OpenWeather.
    fn default() -> Self {
        let mut clients = HashMap::new();
        clients.insert("default".to_string(), ClientCfg::default());
        clients.insert(
            "weatherApi".to_string(),
            ClientCfg {
                base_url: Some(OPENWEATHER_BASE_URL.to_string()),
                timeout_ms: 5_000,
                pool_max_idle_per_host: None,
            },
        );
        Self {
            clients,
            weather: WeatherCfg::default(),
        }
    }
}

impl Config {
    /// Load a Config from a file path (JSON or TOML by extension). If the
    /// extension is missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::error::CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(crate::error::WeatherProxyError::from)?;
        let s = std::str::from_utf8(&bytes)
            .map_err(|e| crate::error::WeatherProxyError::Other(e.into()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::WeatherProxyError::Other(e.into()))?,
            Some("toml") => toml::from_str::<Self>(s)
                .map_err(|e| crate::error::WeatherProxyError::Other(e.into()))?,
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::WeatherProxyError::Other(e.into()))
                .or_else(|_| {
                    toml::from_str::<Self>(s)
                        .map_err(|e| crate::error::WeatherProxyError::Other(e.into()))
                })?,
        };
        Ok(cfg)
    }
}
