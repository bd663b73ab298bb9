//! Registry of admitted live-telemetry connections.
//!
//! Each [`LiveConnection`] owns the sending half of a bounded outbound
//! queue; the socket writer task owns the receiving half. The registry
//! tracks which connections are active and fans messages out to them.
//!
//! Admission hands back a [`Registration`] guard. Dropping the guard
//! removes the connection, so a stream task that returns, errors, panics,
//! or is aborted at shutdown never leaves a stale entry behind.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use pitlane_types::{ConnectionId, LiveMessage};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tracing::{debug, info, warn};

/// How long a personal send waits for queue space by default.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// A message queued for one connection's socket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A JSON text frame.
    Text(Arc<str>),
    /// A pong answering a client ping.
    Pong(Vec<u8>),
}

impl From<String> for Outbound {
    fn from(text: String) -> Self {
        Self::Text(Arc::from(text))
    }
}

impl From<Arc<str>> for Outbound {
    fn from(text: Arc<str>) -> Self {
        Self::Text(text)
    }
}

/// Why a message could not be handed to a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The socket writer has gone away.
    #[error("connection closed")]
    Closed,

    /// The outbound queue is full (broadcast does not wait).
    #[error("outbound queue full")]
    Full,

    /// The outbound queue stayed full past the send deadline.
    #[error("outbound queue stalled for {0:?}")]
    TimedOut(Duration),
}

/// Errors from registry membership operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The connection is already in the active set.
    #[error("connection {0} is already admitted")]
    AlreadyAdmitted(ConnectionId),
}

/// Handle to one live-streaming client.
#[derive(Debug)]
pub struct LiveConnection {
    id: ConnectionId,
    session_id: String,
    tx: mpsc::Sender<Outbound>,
}

impl LiveConnection {
    /// Create a connection for `session_id` with an outbound queue of the
    /// given capacity. Returns the receiver the socket writer drains.
    pub fn new(
        session_id: impl Into<String>,
        queue_capacity: usize,
    ) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let connection = Self {
            id: ConnectionId::new(),
            session_id: session_id.into(),
            tx,
        };
        (connection, rx)
    }

    /// Unique identity of this connection.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// The session identifier the client subscribed with.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn try_deliver(&self, message: Outbound) -> Result<(), DeliveryError> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    async fn deliver(&self, message: Outbound, timeout: Duration) -> Result<(), DeliveryError> {
        self.tx
            .send_timeout(message, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => DeliveryError::TimedOut(timeout),
                SendTimeoutError::Closed(_) => DeliveryError::Closed,
            })
    }
}

/// Outcome of a [`ConnectionRegistry::broadcast`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BroadcastReport {
    /// Connections the message was queued for.
    pub delivered: usize,
    /// Connections that could not accept it.
    pub failed: usize,
}

/// One entry in the active set, tagged with the admission that created it.
#[derive(Debug)]
struct Admitted {
    connection: Arc<LiveConnection>,
    admission: u64,
}

type ActiveSet = HashMap<ConnectionId, Admitted>;

/// The set of currently admitted live connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<ActiveSet>,
    next_admission: AtomicU64,
    delivery_failures: AtomicU64,
    send_timeout: Duration,
}

impl ConnectionRegistry {
    /// Create an empty registry with the default send deadline.
    pub fn new() -> Self {
        Self::with_send_timeout(DEFAULT_SEND_TIMEOUT)
    }

    /// Create an empty registry whose personal sends give up after
    /// `send_timeout` of queue back-pressure.
    pub fn with_send_timeout(send_timeout: Duration) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_admission: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            send_timeout,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ActiveSet> {
        self.connections.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ActiveSet> {
        self.connections.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a connection whose handshake has completed to the active set.
    ///
    /// The returned guard removes the connection when dropped, unless it
    /// was already removed. A guard from an earlier admission never evicts
    /// a later re-admission of the same connection.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyAdmitted`] if the same connection is
    /// already registered; the active set is left unchanged.
    pub fn admit(
        self: &Arc<Self>,
        connection: Arc<LiveConnection>,
    ) -> Result<Registration, RegistryError> {
        let id = connection.id();
        let admission = self.next_admission.fetch_add(1, Ordering::Relaxed);
        let active = {
            let mut conns = self.write();
            match conns.entry(id) {
                Entry::Occupied(_) => return Err(RegistryError::AlreadyAdmitted(id)),
                Entry::Vacant(slot) => {
                    let _ = slot.insert(Admitted {
                        connection: Arc::clone(&connection),
                        admission,
                    });
                }
            }
            conns.len()
        };
        info!(
            conn_id = %id,
            session_id = connection.session_id(),
            active,
            "live connection admitted"
        );
        Ok(Registration {
            registry: Arc::clone(self),
            connection,
            admission,
        })
    }

    /// Remove a connection. Returns whether it was present; removing an
    /// absent connection is a no-op.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.remove_matching(id, None)
    }

    /// Remove `id` if present and, when `admission` is given, only if the
    /// entry came from that admission.
    fn remove_matching(&self, id: ConnectionId, admission: Option<u64>) -> bool {
        let (removed, active) = {
            let mut conns = self.write();
            let removed = match conns.entry(id) {
                Entry::Occupied(slot)
                    if admission.is_none_or(|token| slot.get().admission == token) =>
                {
                    Some(slot.remove())
                }
                Entry::Occupied(_) | Entry::Vacant(_) => None,
            };
            (removed, conns.len())
        };
        match removed {
            Some(entry) => {
                info!(
                    conn_id = %id,
                    session_id = entry.connection.session_id(),
                    active,
                    "live connection removed"
                );
                true
            }
            None => false,
        }
    }

    /// Queue `message` for every active connection.
    ///
    /// A connection that is closed or backed up is skipped, logged, and
    /// counted in [`delivery_failures`](Self::delivery_failures). Delivery
    /// to the remaining connections always proceeds.
    pub fn broadcast(&self, message: &LiveMessage) -> BroadcastReport {
        match serde_json::to_string(message) {
            Ok(json) => self.broadcast_text(Arc::from(json)),
            Err(e) => {
                warn!(error = %e, "failed to serialize broadcast message");
                BroadcastReport::default()
            }
        }
    }

    /// Queue pre-serialized text for every active connection.
    pub fn broadcast_text(&self, text: Arc<str>) -> BroadcastReport {
        let recipients: Vec<Arc<LiveConnection>> = self
            .read()
            .values()
            .map(|entry| Arc::clone(&entry.connection))
            .collect();

        let mut report = BroadcastReport::default();
        for conn in &recipients {
            match conn.try_deliver(Outbound::Text(Arc::clone(&text))) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(e) => {
                    report.failed = report.failed.saturating_add(1);
                    let total = self
                        .delivery_failures
                        .fetch_add(1, Ordering::Relaxed)
                        .saturating_add(1);
                    warn!(
                        conn_id = %conn.id(),
                        session_id = conn.session_id(),
                        error = %e,
                        total_failures = total,
                        "broadcast delivery failed"
                    );
                }
            }
        }
        debug!(
            delivered = report.delivered,
            failed = report.failed,
            "broadcast complete"
        );
        report
    }

    /// Send to exactly one connection, waiting for queue space up to the
    /// registry's send deadline.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Closed`] if the writer is gone or
    /// [`DeliveryError::TimedOut`] if the queue stayed full.
    pub async fn send_personal(
        &self,
        message: impl Into<Outbound>,
        connection: &LiveConnection,
    ) -> Result<(), DeliveryError> {
        connection.deliver(message.into(), self.send_timeout).await
    }

    /// Number of active connections.
    pub fn active_count(&self) -> usize {
        self.read().len()
    }

    /// Whether the connection is in the active set.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.read().contains_key(&id)
    }

    /// Identifiers of all active connections, sorted.
    pub fn active_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Active connection counts keyed by session identifier.
    pub fn sessions(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.read().values() {
            let count = counts
                .entry(entry.connection.session_id().to_owned()).or_insert(0_usize);
            *count = count.saturating_add(1);
        }
        counts
    }

    /// Total broadcast deliveries that failed since start-up.
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of admission. Removes the connection from the registry on drop.
#[derive(Debug)]
pub struct Registration {
    registry: Arc<ConnectionRegistry>,
    connection: Arc<LiveConnection>,
    admission: u64,
}

impl Registration {
    /// The admitted connection.
    pub const fn connection(&self) -> &Arc<LiveConnection> {
        &self.connection
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let _ = self
            .registry
            .remove_matching(self.connection.id(), Some(self.admission));
    }
}
