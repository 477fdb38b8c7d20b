use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message as TMessage, MaybeTlsStream, WebSocketStream,
};

use crate::models::LiveMessage;

type LiveStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Consecutive failed connections tolerated before giving up.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    pub fn never() -> Self {
        Self {
            max_attempts: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff before reconnect attempt `attempt` (1-based): doubles each
    /// time, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

/// What the channel forwards on its trigger receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Message(LiveMessage),
    /// The connection is open again after one or more failed or lost
    /// connections. Anything pushed in between was missed.
    Reconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Reconnecting { attempt: u32 },
    Closed,
}

/// Ordered log of received messages, oldest first, holding at most
/// `capacity` entries.
#[derive(Debug)]
pub struct MessageLog {
    capacity: usize,
    entries: VecDeque<LiveMessage>,
    total: u64,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
            total: 0,
        }
    }

    pub fn push(&mut self, msg: LiveMessage) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(msg);
        self.total += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every message ever pushed, including evicted ones.
    pub fn total_received(&self) -> u64 {
        self.total
    }

    pub fn latest(&self) -> Option<&LiveMessage> {
        self.entries.back()
    }

    pub fn snapshot(&self) -> Vec<LiveMessage> {
        self.entries.iter().cloned().collect()
    }
}

struct Shared {
    log: MessageLog,
    state: ChannelState,
}

/// Long-lived push connection to the alert service.
///
/// Every received message is appended to the log and forwarded once on the
/// trigger receiver returned by [`LiveChannel::open`], along with a
/// [`LiveEvent::Reconnected`] after each recovered connection. Dropping the
/// channel closes the connection.
pub struct LiveChannel {
    shared: Arc<Mutex<Shared>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveChannel {
    pub fn open(
        url: impl Into<String>,
        log_capacity: usize,
        policy: ReconnectPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<LiveEvent>) {
        let url = url.into();
        let shared = Arc::new(Mutex::new(Shared {
            log: MessageLog::new(log_capacity),
            state: ChannelState::Connecting,
        }));
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(url, policy, shared.clone(), trigger_tx, shutdown_rx));

        let channel = Self {
            shared,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        };
        (channel, trigger_rx)
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ChannelState {
        self.lock().state
    }

    pub fn messages(&self) -> Vec<LiveMessage> {
        self.lock().log.snapshot()
    }

    pub fn total_received(&self) -> u64 {
        self.lock().log.total_received()
    }

    /// Sends a close frame and waits for the connection task to finish.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn set_state(shared: &Mutex<Shared>, state: ChannelState) {
    shared.lock().unwrap_or_else(PoisonError::into_inner).state = state;
}

fn record(shared: &Mutex<Shared>, trigger: &mpsc::UnboundedSender<LiveEvent>, msg: LiveMessage) {
    tracing::debug!("live message received: {}", msg);
    shared
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .log
        .push(msg.clone());
    // receiver may be gone during teardown
    let _ = trigger.send(LiveEvent::Message(msg));
}

enum PumpEnd {
    Shutdown,
    ServerClosed,
    Lost,
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    shared: Arc<Mutex<Shared>>,
    trigger: mpsc::UnboundedSender<LiveEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut failures: u32 = 0;

    loop {
        let connected = tokio::select! {
            _ = &mut shutdown => break,
            res = connect_async(url.as_str()) => res,
        };

        match connected {
            Ok((stream, _)) => {
                set_state(&shared, ChannelState::Open);
                tracing::info!("live channel connected: {}", url);
                if failures > 0 {
                    let _ = trigger.send(LiveEvent::Reconnected);
                }
                failures = 0;

                match pump(stream, &shared, &trigger, &mut shutdown).await {
                    PumpEnd::Shutdown => break,
                    PumpEnd::ServerClosed => {
                        tracing::info!("live channel closed by server");
                        break;
                    }
                    PumpEnd::Lost => tracing::warn!("live channel connection lost"),
                }
            }
            Err(err) => {
                tracing::error!("live channel connect failed: {}", err);
            }
        }

        failures += 1;
        if failures > policy.max_attempts {
            tracing::error!("live channel giving up after {} failed attempts", failures);
            break;
        }

        set_state(&shared, ChannelState::Reconnecting { attempt: failures });
        let delay = policy.delay_for(failures);
        tracing::warn!("live channel reconnecting in {:?} (attempt {})", delay, failures);

        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    set_state(&shared, ChannelState::Closed);
    tracing::info!("live channel closed");
}

async fn pump(
    stream: LiveStream,
    shared: &Mutex<Shared>,
    trigger: &mpsc::UnboundedSender<LiveEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> PumpEnd {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = &mut *shutdown => {
                let _ = write.send(TMessage::Close(None)).await;
                return PumpEnd::Shutdown;
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(TMessage::Text(txt))) => {
                        record(shared, trigger, LiveMessage::parse(&txt));
                    }
                    Some(Ok(TMessage::Binary(bin))) => {
                        record(shared, trigger, LiveMessage::parse(&String::from_utf8_lossy(&bin)));
                    }
                    Some(Ok(TMessage::Ping(payload))) => {
                        let _ = write.send(TMessage::Pong(payload)).await;
                    }
                    Some(Ok(TMessage::Close(_))) => return PumpEnd::ServerClosed,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::error!("live channel error: {}", err);
                        return PumpEnd::Lost;
                    }
                    None => return PumpEnd::Lost,
                }
            }
        }
    }
}
