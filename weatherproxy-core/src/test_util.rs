#![cfg(test)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_core::field::{Field, Visit};
use tracing_subscriber::layer::Context;
use tracing_subscriber::{Layer, registry};

use crate::error::ApiErrorDetail;
use crate::interceptor::{Interceptor, RequestInfo, ResponseInfo};

/// Interceptor that records one line per hook invocation, so tests can
/// assert on hook counts and ordering without touching global output.
#[derive(Default)]
pub struct CaptureInterceptor {
    lines: Mutex<Vec<String>>,
}

impl CaptureInterceptor {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.count("request ")
    }

    pub fn responses(&self) -> usize {
        self.count("response ")
    }

    pub fn errors(&self) -> usize {
        self.count("error ")
    }

    fn count(&self, prefix: &str) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

impl Interceptor for CaptureInterceptor {
    fn before_request(&self, req: &RequestInfo<'_>) {
        self.push(format!("request {} {} {}", req.client, req.method, req.url));
    }

    fn after_response(&self, resp: &ResponseInfo<'_>) {
        self.push(format!("response {} {} {}", resp.client, resp.url, resp.status));
    }

    fn on_error(&self, client: &str, detail: &ApiErrorDetail) {
        self.push(format!(
            "error {} [{}] {}",
            client,
            detail.status_label(),
            detail.message
        ));
    }
}

/// One captured tracing event: level plus stringified fields.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub fields: HashMap<String, String>, // stringified values via Debug
}

#[derive(Default, Debug)]
pub struct EventStore {
    pub events: Mutex<Vec<CapturedEvent>>,
}

#[derive(Clone)]
pub struct CaptureLayer {
    pub store: Arc<EventStore>,
}

struct MapVisitor<'a> {
    map: &'a mut HashMap<String, String>,
}

impl<'a> Visit for MapVisitor<'a> {
    fn record_debug(&mut self, field: &Field, value: &dyn core::fmt::Debug) {
        self.map
            .insert(field.name().to_string(), format!("{value:?}"));
    }
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.map.insert(field.name().to_string(), value.to_string());
    }
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.map.insert(field.name().to_string(), value.to_string());
    }
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.map.insert(field.name().to_string(), value.to_string());
    }
    fn record_str(&mut self, field: &Field, value: &str) {
        self.map.insert(field.name().to_string(), value.to_string());
    }
    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.map.insert(field.name().to_string(), format!("{value}"));
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut MapVisitor { map: &mut fields });
        self.store.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}

/// Install an event-capturing subscriber for the current test thread. Keep
/// the guard alive for as long as events should be captured.
pub fn install_event_capture() -> (Arc<EventStore>, tracing::subscriber::DefaultGuard) {
    use tracing_subscriber::prelude::*;
    let store = Arc::new(EventStore::default());
    let layer = CaptureLayer {
        store: store.clone(),
    };
    let subscriber = registry::Registry::default().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);
    (store, guard)
}
