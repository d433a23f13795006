//! Cross-cutting hooks applied uniformly to every registered HTTP client.
//! By default no hooks run; a policy is installed once per client via
//! `HttpClient::install_interceptor` (see [`install_logging`]).

use std::sync::Arc;

use crate::error::ApiErrorDetail;
use crate::registry::ClientRegistry;

/// Client names interceptors are installed for at startup. Configured
/// clients may legitimately be a subset of this list.
pub const KNOWN_CLIENTS: &[&str] = &["default", "weatherApi"];

/// Snapshot of an outbound request just before dispatch.
#[derive(Debug, Clone, Copy)]
pub struct RequestInfo<'a> {
    pub client: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub query: &'a [(&'a str, String)],
}

/// Snapshot of a successfully received response.
#[derive(Debug, Clone, Copy)]
pub struct ResponseInfo<'a> {
    pub client: &'a str,
    pub url: &'a str,
    pub status: u16,
}

/// Implement this to observe outbound traffic on one client.
///
/// Requirements:
/// - Implementations must be thread-safe (`Send + Sync`) and `'static`.
/// - Hooks **may** be called from any thread; implementations should avoid
///   panicking.
/// - Hooks observe only: the request goes out and the normalized error is
///   constructed whether or not an interceptor is installed.
pub trait Interceptor: Send + Sync + 'static {
    fn before_request(&self, req: &RequestInfo<'_>);
    fn after_response(&self, resp: &ResponseInfo<'_>);
    fn on_error(&self, client: &str, detail: &ApiErrorDetail);
}

/// Standard logging policy: one request line, one response line, one error
/// line per call, all tagged with the client name.
pub struct LogInterceptor;

impl Interceptor for LogInterceptor {
    fn before_request(&self, req: &RequestInfo<'_>) {
        tracing::info!(
            client = req.client,
            method = req.method,
            url = req.url,
            query = ?req.query,
            "outbound request"
        );
    }

    fn after_response(&self, resp: &ResponseInfo<'_>) {
        tracing::info!(
            client = resp.client,
            url = resp.url,
            status = resp.status,
            "outbound response ok"
        );
    }

    fn on_error(&self, client: &str, detail: &ApiErrorDetail) {
        tracing::error!(
            client,
            url = detail.url.as_deref().unwrap_or("-"),
            status = detail.status,
            status_text = detail.status_text.as_deref().unwrap_or("-"),
            error = %detail.message,
            body = ?detail.body,
            "outbound call failed"
        );
    }
}

/// Attach the logging policy to each named client, exactly once per process
/// lifetime. A name with no registered client is logged as a warning and
/// skipped; a client that already has an interceptor is left untouched, so
/// calling this twice cannot duplicate log lines.
pub fn install_logging(registry: &ClientRegistry, names: &[&str]) {
    for &name in names {
        match registry.get(name) {
            Ok(client) => {
                if client.install_interceptor(Arc::new(LogInterceptor)) {
                    tracing::debug!(client = name, "logging interceptor installed");
                } else {
                    tracing::debug!(client = name, "interceptor already installed, skipping");
                }
            }
            Err(_) => {
                tracing::warn!(client = name, "client not configured, skipping interceptors");
            }
        }
    }
}
