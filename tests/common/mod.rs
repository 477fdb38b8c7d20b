#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering::SeqCst},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tokio::sync::broadcast;
use weather_dash::{
    config::Settings,
    models::{
        Alert, AlertRequest, Combinator, Condition, Notification, Operator, Parameter,
        StatisticsRequest, WeatherReport, WeatherStatistics,
    },
};

/// Pushed to make the server send a close frame.
pub const CLOSE: &str = "__close__";
/// Pushed to make the server drop the socket without a close frame.
pub const DROP: &str = "__drop__";

#[derive(Default)]
pub struct FakeApi {
    pub alerts: Mutex<Vec<Alert>>,
    pub created: Mutex<Vec<serde_json::Value>>,
    pub status_updates: Mutex<Vec<(String, bool)>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub cache_mb: Mutex<f64>,
    pub statistics_requests: Mutex<Vec<serde_json::Value>>,
    pub forecast_queries: Mutex<Vec<HashMap<String, String>>>,

    pub list_calls: AtomicUsize,
    // per-call artificial delay for GET /alerts, in ms
    pub list_delays: Mutex<VecDeque<u64>>,
    // artificial delay for POST /alerts, in ms
    pub create_delay_ms: AtomicU64,

    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_status: AtomicBool,
    pub fail_weather: AtomicBool,
    pub fail_cache: AtomicBool,

    pub ws_connections: AtomicUsize,
    pub ws_disconnects: AtomicUsize,
    live_tx: Mutex<Option<broadcast::Sender<String>>>,
}

impl FakeApi {
    pub fn push(&self, text: &str) {
        if let Some(tx) = self.live_tx.lock().unwrap().as_ref() {
            let _ = tx.send(text.to_string());
        }
    }

    pub fn set_alerts(&self, alerts: Vec<Alert>) {
        *self.alerts.lock().unwrap() = alerts;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(SeqCst)
    }
}

pub struct TestServer {
    pub api: Arc<FakeApi>,
    pub base_url: String,
    pub ws_url: String,
}

impl TestServer {
    pub fn settings(&self) -> Settings {
        Settings {
            api_base_url: self.base_url.clone(),
            alerts_ws_url: self.ws_url.clone(),
            request_timeout: Duration::from_secs(5),
            live_log_capacity: 16,
            ws_max_reconnects: 3,
            ws_reconnect_base: Duration::from_millis(20),
            ws_reconnect_max: Duration::from_millis(100),
            device_location: None,
        }
    }
}

pub async fn spawn() -> TestServer {
    let api = Arc::new(FakeApi::default());
    *api.cache_mb.lock().unwrap() = 12.5;
    let (tx, _rx) = broadcast::channel(64);
    *api.live_tx.lock().unwrap() = Some(tx);

    let app = Router::new()
        .route("/api/alerts", post(create_alert).get(list_alerts))
        .route("/api/alerts/:id/status", put(update_status))
        .route("/api/alerts/notifications", get(list_notifications))
        .route("/api/alerts/ws", get(live_ws))
        .route("/api/weather/report", get(weather_report))
        .route("/api/weather/forecast", get(weather_forecast))
        .route("/api/statistics", post(statistics))
        .route("/api/storage/cache/size", get(cache_size))
        .route("/api/storage/cache/clear", post(cache_clear))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        api,
        base_url: format!("http://{addr}/api"),
        ws_url: format!("ws://{addr}/api/alerts/ws"),
    }
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

pub fn created_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn alert(id: &str, parameter: Parameter, operator: Operator, threshold: f64) -> Alert {
    Alert {
        id: id.to_string(),
        active: true,
        conditions: vec![Condition {
            parameter,
            operator,
            threshold,
        }],
        combinator: Combinator::And,
        created: created_at(),
    }
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn create_alert(State(api): State<Arc<FakeApi>>, Json(body): Json<serde_json::Value>) -> Response {
    let delay = api.create_delay_ms.load(SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if api.fail_create.load(SeqCst) {
        return failure();
    }
    let req: AlertRequest = match serde_json::from_value(body.clone()) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    api.created.lock().unwrap().push(body);

    let mut alerts = api.alerts.lock().unwrap();
    let created = Alert {
        id: format!("alert-{}", alerts.len() + 1),
        active: true,
        conditions: req.conditions,
        combinator: req.combinator,
        created: created_at(),
    };
    alerts.push(created.clone());
    Json(created).into_response()
}

async fn list_alerts(State(api): State<Arc<FakeApi>>) -> Response {
    api.list_calls.fetch_add(1, SeqCst);
    let snapshot: Vec<Alert> = api
        .alerts
        .lock()
        .unwrap()
        .iter()
        .filter(|a| a.active)
        .cloned()
        .collect();
    let fail = api.fail_list.load(SeqCst);
    let delay = api.list_delays.lock().unwrap().pop_front().unwrap_or(0);

    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if fail {
        return failure();
    }
    Json(snapshot).into_response()
}

#[derive(Deserialize)]
struct StatusQuery {
    active: bool,
}

async fn update_status(
    State(api): State<Arc<FakeApi>>,
    Path(id): Path<String>,
    Query(q): Query<StatusQuery>,
) -> Response {
    if api.fail_status.load(SeqCst) {
        return failure();
    }
    api.status_updates.lock().unwrap().push((id.clone(), q.active));
    for a in api.alerts.lock().unwrap().iter_mut().filter(|a| a.id == id) {
        a.active = q.active;
    }
    StatusCode::OK.into_response()
}

async fn list_notifications(State(api): State<Arc<FakeApi>>) -> Response {
    if api.fail_list.load(SeqCst) {
        return failure();
    }
    Json(api.notifications.lock().unwrap().clone()).into_response()
}

async fn live_ws(ws: WebSocketUpgrade, State(api): State<Arc<FakeApi>>) -> Response {
    ws.on_upgrade(move |socket| live_socket(socket, api))
}

async fn live_socket(mut socket: WebSocket, api: Arc<FakeApi>) {
    let mut rx = match api.live_tx.lock().unwrap().as_ref() {
        Some(tx) => tx.subscribe(),
        None => return,
    };
    api.ws_connections.fetch_add(1, SeqCst);

    loop {
        tokio::select! {
            pushed = rx.recv() => match pushed {
                Ok(text) if text == CLOSE => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                Ok(text) if text == DROP => break,
                Ok(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            }
        }
    }

    api.ws_disconnects.fetch_add(1, SeqCst);
}

pub fn sample_report(location: &str, date: NaiveDate) -> WeatherReport {
    WeatherReport {
        location: location.to_string(),
        date,
        high_temp: 24.0,
        low_temp: 15.0,
        humidity: 55.0,
        wind_speed: 8.0,
        wind_direction: Some("NW".to_string()),
        precipitation_chance: 20.0,
    }
}

async fn weather_report(
    State(api): State<Arc<FakeApi>>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if api.fail_weather.load(SeqCst) {
        return failure();
    }
    let date = NaiveDate::parse_from_str(&q["date"], "%Y-%m-%d").unwrap();
    Json(sample_report(&q["location"], date)).into_response()
}

async fn weather_forecast(
    State(api): State<Arc<FakeApi>>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if api.fail_weather.load(SeqCst) {
        return failure();
    }
    api.forecast_queries.lock().unwrap().push(q.clone());
    let start = NaiveDate::parse_from_str(&q["startDate"], "%Y-%m-%d").unwrap();
    let days: Vec<WeatherReport> = (0..7)
        .map(|i| sample_report(&q["location"], start.checked_add_days(Days::new(i)).unwrap()))
        .collect();
    Json(days).into_response()
}

async fn statistics(
    State(api): State<Arc<FakeApi>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if api.fail_weather.load(SeqCst) {
        return failure();
    }
    api.statistics_requests.lock().unwrap().push(body.clone());
    let req: StatisticsRequest = serde_json::from_value(body).unwrap();
    Json(WeatherStatistics {
        location: req.location,
        start_date: req.start_date,
        end_date: req.end_date,
        average_temperature: 18.2,
        average_precipitation: 31.0,
        average_wind_speed: 9.4,
        average_humidity: 61.5,
        calculated: created_at(),
    })
    .into_response()
}

async fn cache_size(State(api): State<Arc<FakeApi>>) -> Response {
    if api.fail_cache.load(SeqCst) {
        return failure();
    }
    Json(*api.cache_mb.lock().unwrap()).into_response()
}

async fn cache_clear(State(api): State<Arc<FakeApi>>) -> Response {
    if api.fail_cache.load(SeqCst) {
        return failure();
    }
    *api.cache_mb.lock().unwrap() = 0.0;
    StatusCode::OK.into_response()
}
