use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::{
    config::Settings,
    error::{AlertError, EditorError, LocationError},
    models::{Alert, LiveMessage, Notification},
    services::{api_client::ApiClient, geolocation::LocationProvider},
    ws::{ChannelState, LiveChannel, LiveEvent},
};

use super::rule_editor::RuleEditor;

pub const FETCH_ALERTS_FAILED: &str = "Failed to fetch alerts";
pub const DISABLE_ALERT_FAILED: &str = "Failed to disable alert";
pub const SAVE_ALERT_FAILED: &str = "Failed to save alert";
pub const FETCH_NOTIFICATIONS_FAILED: &str = "Failed to fetch notifications";
pub const LOCATION_FAILED: &str = "Failed to retrieve location";
pub const LOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this device.";
pub const INCOMPLETE_CONDITIONS: &str = "Please fill in all condition fields";
pub const INVALID_THRESHOLD: &str = "Please enter a numeric threshold";
pub const MISSING_LOCATION: &str = "Unable to retrieve location.";

fn editor_message(e: &EditorError) -> &'static str {
    match e {
        EditorError::IncompleteConditions
        | EditorError::NoSuchCondition(_)
        | EditorError::UnknownValue { .. } => INCOMPLETE_CONDITIONS,
        EditorError::InvalidThreshold(_) => INVALID_THRESHOLD,
        EditorError::MissingLocation => MISSING_LOCATION,
    }
}

fn location_message(e: LocationError) -> &'static str {
    match e {
        LocationError::Denied => LOCATION_FAILED,
        LocationError::Unsupported => LOCATION_UNSUPPORTED,
    }
}

/// What the alert section shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertSectionState {
    pub loading: bool,
    pub error: Option<String>,
    pub alerts: Vec<Alert>,
}

#[derive(Default)]
struct Inner {
    view: AlertSectionState,
    // ticket of the newest fetch issued
    issued: u64,
    // fetches and saves not yet finished or dropped
    in_flight: usize,
}

/// Counts one pending operation; `loading` is on while any guard is alive.
/// Dropping the guard (completion, cancellation, task abort) releases it.
struct InFlight {
    inner: Arc<Mutex<Inner>>,
}

impl InFlight {
    fn start(inner: &Arc<Mutex<Inner>>) -> Self {
        let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.in_flight += 1;
        guard.view.loading = true;
        Self {
            inner: inner.clone(),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.in_flight = guard.in_flight.saturating_sub(1);
        guard.view.loading = guard.in_flight > 0;
    }
}

/// Refreshes the cached alert list from the server. Shared between user
/// actions and the live-update task.
#[derive(Clone)]
pub struct Reconciler {
    api: ApiClient,
    inner: Arc<Mutex<Inner>>,
}

impl Reconciler {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> AlertSectionState {
        self.lock().view.clone()
    }

    pub fn set_error(&self, msg: &str) {
        self.lock().view.error = Some(msg.to_string());
    }

    fn pending(&self) -> InFlight {
        InFlight::start(&self.inner)
    }

    fn clear_error(&self) {
        self.lock().view.error = None;
    }

    /// Replaces the alert list with the server's. Only the newest of several
    /// overlapping fetches is applied; a failure keeps the previous list.
    pub async fn fetch_alerts(&self) {
        // declared first so it drops after the lock below is released
        let _pending = self.pending();
        let ticket = {
            let mut inner = self.lock();
            inner.issued += 1;
            inner.issued
        };

        let res = self.api.active_alerts().await;

        let mut inner = self.lock();
        if ticket != inner.issued {
            tracing::debug!(
                "discarding alert list from fetch {} (newest is {})",
                ticket,
                inner.issued
            );
            return;
        }

        match res {
            Ok(alerts) => {
                inner.view.alerts = alerts;
                inner.view.error = None;
            }
            Err(e) => {
                tracing::error!("error fetching alerts: {}", e);
                inner.view.error = Some(FETCH_ALERTS_FAILED.to_string());
            }
        }
    }

    pub async fn disable_alert(&self, alert_id: &str) {
        match self.api.update_alert_status(alert_id, false).await {
            Ok(()) => self.fetch_alerts().await,
            Err(e) => {
                tracing::error!("error disabling alert {}: {}", alert_id, e);
                self.set_error(DISABLE_ALERT_FAILED);
            }
        }
    }
}

/// The alert panel: rule editor, active alert list and the live channel
/// that keeps the list fresh.
///
/// Mounting opens the live channel; [`AlertSection::unmount`] (or dropping
/// the section) closes it.
pub struct AlertSection {
    reconciler: Reconciler,
    editor: RuleEditor,
    channel: Option<LiveChannel>,
    refresher: Option<JoinHandle<()>>,
}

impl AlertSection {
    pub async fn mount(
        api: ApiClient,
        locator: &dyn LocationProvider,
        settings: &Settings,
    ) -> Self {
        let reconciler = Reconciler::new(api);

        let (channel, mut triggers) = LiveChannel::open(
            settings.alerts_ws_url.clone(),
            settings.live_log_capacity,
            settings.reconnect_policy(),
        );

        let refresh = reconciler.clone();
        let refresher = tokio::spawn(async move {
            while let Some(event) = triggers.recv().await {
                match event {
                    LiveEvent::Message(msg) => {
                        tracing::info!("new live alert received: {}", msg)
                    }
                    LiveEvent::Reconnected => {
                        tracing::info!("live channel reconnected, refreshing alerts")
                    }
                }
                refresh.fetch_alerts().await;
            }
        });

        reconciler.fetch_alerts().await;

        let mut editor = RuleEditor::new();
        if let Err(e) = editor.resolve_location(locator) {
            reconciler.set_error(location_message(e));
        }

        Self {
            reconciler,
            editor,
            channel: Some(channel),
            refresher: Some(refresher),
        }
    }

    pub fn state(&self) -> AlertSectionState {
        self.reconciler.state()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn editor(&self) -> &RuleEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RuleEditor {
        &mut self.editor
    }

    pub async fn fetch_alerts(&self) {
        self.reconciler.fetch_alerts().await;
    }

    pub async fn disable_alert(&self, alert_id: &str) {
        self.reconciler.disable_alert(alert_id).await;
    }

    /// Validates and submits the editor's rule, then refreshes the list.
    /// Failures are also reported through the section's error message.
    pub async fn save_alert(&mut self) -> Result<Alert, AlertError> {
        if let Err(e) = self.editor.validate() {
            self.reconciler.set_error(editor_message(&e));
            return Err(e.into());
        }

        let _pending = self.reconciler.pending();
        self.reconciler.clear_error();

        match self.editor.submit(self.reconciler.api()).await {
            Ok(alert) => {
                tracing::info!("alert {} created", alert.id);
                self.reconciler.fetch_alerts().await;
                Ok(alert)
            }
            Err(e) => {
                tracing::error!("error saving alert: {}", e);
                let msg = match &e {
                    AlertError::Validation(v) => editor_message(v),
                    AlertError::SaveFailed(_) => SAVE_ALERT_FAILED,
                };
                self.reconciler.set_error(msg);
                Err(e)
            }
        }
    }

    /// Notification history; empty (with the error set) when unavailable.
    pub async fn notifications(&self) -> Vec<Notification> {
        match self.reconciler.api().notifications().await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("error fetching notifications: {}", e);
                self.reconciler.set_error(FETCH_NOTIFICATIONS_FAILED);
                Vec::new()
            }
        }
    }

    pub fn live_messages(&self) -> Vec<LiveMessage> {
        self.channel
            .as_ref()
            .map(LiveChannel::messages)
            .unwrap_or_default()
    }

    pub fn live_total(&self) -> u64 {
        self.channel
            .as_ref()
            .map(LiveChannel::total_received)
            .unwrap_or(0)
    }

    pub fn live_state(&self) -> ChannelState {
        self.channel
            .as_ref()
            .map(LiveChannel::state)
            .unwrap_or(ChannelState::Closed)
    }

    pub async fn unmount(mut self) {
        if let Some(task) = self.refresher.take() {
            task.abort();
        }
        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
    }
}

impl Drop for AlertSection {
    fn drop(&mut self) {
        if let Some(task) = self.refresher.take() {
            task.abort();
        }
        // LiveChannel closes itself on drop
    }
}
