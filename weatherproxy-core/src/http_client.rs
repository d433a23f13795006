use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::ClientCfg;
use crate::error::{ApiErrorDetail, CoreResult, WeatherProxyError};
use crate::interceptor::{Interceptor, RequestInfo, ResponseInfo};

/// Per-request options. `Default` means "use the client's configuration".
#[derive(Clone, Copy, Default)]
pub struct RequestOpts {
    /// Overrides the client-level total timeout for this request only.
    pub timeout: Option<Duration>,
}

/// Thin wrapper around reqwest::Client bound to one named client config.
///
/// Clones share the underlying connection pool and the interceptor slot, so
/// a handle obtained from the registry twice is the same client: installing
/// an interceptor through one handle is visible through every other.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    name: String,
    base: Option<String>,
    user_agent: String,
    interceptor: Arc<OnceCell<Arc<dyn Interceptor>>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("name", &self.name)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn from_cfg(name: &str, cfg: &ClientCfg) -> CoreResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_millis(cfg.timeout_ms));
        if let Some(cap) = cfg.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(cap);
        }
        let inner = builder
            .build()
            .map_err(|e| WeatherProxyError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            name: name.to_string(),
            base: cfg.base_url.clone(),
            user_agent: "weatherproxy/0.1".to_string(),
            interceptor: Arc::new(OnceCell::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach an interceptor to this client. Write-once for the process
    /// lifetime; returns `false` if one is already installed. Installing
    /// twice therefore cannot double-log a call.
    pub fn install_interceptor(&self, interceptor: Arc<dyn Interceptor>) -> bool {
        self.interceptor.set(interceptor).is_ok()
    }

    /// Absolute URLs pass through untouched (the `default` client has no
    /// base URL and is used exactly that way); relative paths are appended
    /// to the configured base.
    fn resolve_url(&self, path: &str) -> CoreResult<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }
        match &self.base {
            Some(base) => Ok(format!("{}{}", base.trim_end_matches('/'), path)),
            None => Err(WeatherProxyError::Validation(format!(
                "client '{}' has no base url; cannot resolve relative path '{path}'",
                self.name
            ))),
        }
    }

    /// GET a JSON resource. Every failure mode past URL resolution (DNS,
    /// connect, timeout, non-2xx status, undecodable body) comes back as
    /// `WeatherProxyError::Api` with whatever detail was salvageable, after
    /// the error hook has seen it.
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        opts: &RequestOpts,
    ) -> CoreResult<R> {
        let url = self.resolve_url(path)?;

        if let Some(hook) = self.interceptor.get() {
            hook.before_request(&RequestInfo {
                client: &self.name,
                method: "GET",
                url: &url,
                query,
            });
        }

        let mut req = self
            .inner
            .get(&url)
            .query(query)
            .header("User-Agent", &self.user_agent);
        if let Some(timeout) = opts.timeout {
            req = req.timeout(timeout);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Err(self.fail(ApiErrorDetail {
                    url: Some(url),
                    status: None,
                    status_text: None,
                    message: e.to_string(),
                    body: None,
                }));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(self.fail(ApiErrorDetail {
                url: Some(url),
                status: Some(status.as_u16()),
                status_text: status.canonical_reason().map(str::to_string),
                message: format!("request failed with status code {}", status.as_u16()),
                body: parse_body(&text),
            }));
        }

        if let Some(hook) = self.interceptor.get() {
            hook.after_response(&ResponseInfo {
                client: &self.name,
                url: &url,
                status: status.as_u16(),
            });
        }

        match resp.json::<R>().await {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(self.fail(ApiErrorDetail {
                url: Some(url),
                status: Some(status.as_u16()),
                status_text: status.canonical_reason().map(str::to_string),
                message: format!("json decode error: {e}"),
                body: None,
            })),
        }
    }

    /// The single normalization point: run the error hook, wrap the detail.
    fn fail(&self, detail: ApiErrorDetail) -> WeatherProxyError {
        if let Some(hook) = self.interceptor.get() {
            hook.on_error(&self.name, &detail);
        }
        WeatherProxyError::Api(detail)
    }
}

/// Keep whatever the upstream sent: parsed JSON when the body is JSON, the
/// (truncated) raw text otherwise, nothing for an empty body.
fn parse_body(text: &str) -> Option<serde_json::Value> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(v) => Some(v),
        Err(_) => Some(serde_json::Value::String(truncate(text, 300))),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut t = s[..max].to_string();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}
