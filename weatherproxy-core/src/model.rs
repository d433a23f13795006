use serde::{Deserialize, Serialize};

/// Coordinates resolved by the geocoding step. Produced and consumed within
/// a single lookup; never stored.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Current weather for a city, as returned to API consumers.
///
/// The wire field is named `weather` even though it carries the temperature
/// in degrees Celsius; existing consumers depend on that name, so only the
/// Rust-side field says what the value means.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    #[serde(rename = "weather")]
    pub temperature_c: f64,
}
