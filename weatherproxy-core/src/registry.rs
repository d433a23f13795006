use std::collections::HashMap;

use crate::config::Config;
use crate::error::{CoreResult, WeatherProxyError};
use crate::http_client::HttpClient;

/// Registry of outbound HTTP clients by name.
/// Names correspond to config keys (e.g., "default", "weatherApi").
pub struct ClientRegistry {
    clients: HashMap<String, HttpClient>,
}

impl ClientRegistry {
    /// Build every configured client eagerly, once, at startup. A bad
    /// timeout or unparseable base URL fails here, not mid-request.
    pub fn from_config(cfg: &Config) -> CoreResult<Self> {
        let mut clients: HashMap<String, HttpClient> = HashMap::new();
        for (name, client_cfg) in &cfg.clients {
            clients.insert(name.clone(), HttpClient::from_cfg(name, client_cfg)?);
        }
        Ok(Self { clients })
    }

    /// Look up a client by name. The returned handle is a clone sharing the
    /// connection pool and interceptor slot with every other handle for the
    /// same name, so interceptors are never attached to a private copy.
    pub fn get(&self, name: &str) -> CoreResult<HttpClient> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| WeatherProxyError::ClientNotConfigured(name.to_string()))
    }

    /// Names with a registered client.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }
}
