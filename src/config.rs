use std::{env, time::Duration};

use crate::{models::Location, ws::ReconnectPolicy};

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub alerts_ws_url: String,
    pub request_timeout: Duration,

    // live channel
    pub live_log_capacity: usize,
    pub ws_max_reconnects: u32,
    pub ws_reconnect_base: Duration,
    pub ws_reconnect_max: Duration,

    /// Static device position; `None` means the device cannot report one.
    pub device_location: Option<Location>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            alerts_ws_url: "ws://localhost:8080/api/alerts/ws".to_string(),
            request_timeout: Duration::from_secs(30),
            live_log_capacity: 256,
            ws_max_reconnects: 5,
            ws_reconnect_base: Duration::from_millis(500),
            ws_reconnect_max: Duration::from_millis(10_000),
            device_location: None,
        }
    }
}

impl Settings {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.ws_max_reconnects,
            base_delay: self.ws_reconnect_base,
            max_delay: self.ws_reconnect_max,
        }
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    from_lookup(|key| env::var(key).ok())
}

/// Builds settings from an arbitrary key lookup, falling back to defaults for
/// anything missing or unparseable.
pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Settings {
    let defaults = Settings::default();

    let api_base_url = get("API_BASE_URL").unwrap_or(defaults.api_base_url);
    let alerts_ws_url = get("ALERTS_WS_URL").unwrap_or(defaults.alerts_ws_url);

    let request_timeout = get("REQUEST_TIMEOUT_SECS")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout);

    let live_log_capacity = get("LIVE_LOG_CAPACITY")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(defaults.live_log_capacity);

    let ws_max_reconnects = get("WS_MAX_RECONNECTS")
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(defaults.ws_max_reconnects);

    let ws_reconnect_base = get("WS_RECONNECT_BASE_MS")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(defaults.ws_reconnect_base);

    let ws_reconnect_max = get("WS_RECONNECT_MAX_MS")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(defaults.ws_reconnect_max);

    let lat = get("DEVICE_LAT").and_then(|s| s.trim().parse::<f64>().ok());
    let lon = get("DEVICE_LON").and_then(|s| s.trim().parse::<f64>().ok());
    let device_location = match (lat, lon) {
        (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
        _ => None,
    };

    Settings {
        api_base_url,
        alerts_ws_url,
        request_timeout,
        live_log_capacity,
        ws_max_reconnects,
        ws_reconnect_base,
        ws_reconnect_max,
        device_location,
    }
}
