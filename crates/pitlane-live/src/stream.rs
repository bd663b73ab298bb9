//! Per-connection live telemetry loop.
//!
//! [`run_stream`] admits one connection, then alternates between two
//! cancellable waits: the next pacing tick, and the next inbound event from
//! the client. Each tick produces one [`TelemetryFrame`] for the
//! connection's session and delivers it in order. The loop ends when the
//! client closes, the transport errors, or delivery fails, and the
//! registration guard removes the connection on every one of those paths.
//!
//! [`TelemetryFrame`]: pitlane_types::TelemetryFrame

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use pitlane_data::TelemetryGenerator;
use pitlane_types::{Driver, LiveMessage};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::registry::{ConnectionRegistry, DeliveryError, LiveConnection, Outbound, RegistryError};

/// What the client side of the socket did, reduced to what the loop cares
/// about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The client pinged; answer with a pong carrying the same payload.
    Ping(Vec<u8>),
    /// The client sent a close frame.
    Close,
    /// Any other client message. Ignored.
    Other,
    /// The transport failed while reading.
    Error(String),
}

/// Why a stream loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The client closed the socket or the inbound side ended.
    ClientClosed,
    /// Reading from the socket failed.
    TransportError(String),
    /// A frame or pong could not be delivered.
    DeliveryFailed(DeliveryError),
}

/// Shared inputs for every stream loop.
#[derive(Debug, Clone)]
pub struct StreamSpec {
    /// Generator for each tick's frame.
    pub generator: Arc<TelemetryGenerator>,
    /// The field every frame covers, in output order.
    pub drivers: &'static [Driver],
    /// Time between frames.
    pub tick_interval: Duration,
}

/// Drive one live connection until it terminates.
///
/// The first frame goes out immediately; later frames follow every
/// `tick_interval`. A tick that runs late delays the following ticks rather
/// than bursting to catch up.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyAdmitted`] if `connection` is already
/// registered. No frames are sent in that case.
pub async fn run_stream<S>(
    registry: Arc<ConnectionRegistry>,
    connection: Arc<LiveConnection>,
    mut inbound: S,
    spec: &StreamSpec,
) -> Result<StreamEnd, RegistryError>
where
    S: Stream<Item = InboundEvent> + Unpin,
{
    let registration = registry.admit(connection)?;
    let conn = Arc::clone(registration.connection());

    let mut ticker = interval(spec.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut frames_sent: u64 = 0;

    let end = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(json) = next_frame(spec, conn.session_id()) else {
                    continue;
                };
                if let Err(e) = registry.send_personal(json, &conn).await {
                    break StreamEnd::DeliveryFailed(e);
                }
                frames_sent = frames_sent.saturating_add(1);
            }
            event = inbound.next() => {
                match event {
                    Some(InboundEvent::Close) | None => break StreamEnd::ClientClosed,
                    Some(InboundEvent::Error(e)) => break StreamEnd::TransportError(e),
                    Some(InboundEvent::Ping(data)) => {
                        if let Err(e) = registry.send_personal(Outbound::Pong(data), &conn).await {
                            break StreamEnd::DeliveryFailed(e);
                        }
                    }
                    Some(InboundEvent::Other) => {}
                }
            }
        }
    };

    debug!(
        conn_id = %conn.id(),
        session_id = conn.session_id(),
        frames_sent,
        reason = ?end,
        "live stream ended"
    );
    drop(registration);
    Ok(end)
}

/// Generate and serialize one frame. Returns `None` if serialization fails.
fn next_frame(spec: &StreamSpec, session_id: &str) -> Option<String> {
    let frame = {
        let mut rng = rand::rng();
        spec.generator.frame(&mut rng, session_id, spec.drivers)
    };
    match serde_json::to_string(&LiveMessage::from(frame)) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(session_id, error = %e, "failed to serialize telemetry frame");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeSet;

    use futures::stream;
    use pitlane_data::tables::drivers;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;

    fn spec() -> StreamSpec {
        StreamSpec {
            generator: Arc::new(TelemetryGenerator::default()),
            drivers: drivers(),
            tick_interval: Duration::from_millis(100),
        }
    }

    fn decode(out: Outbound) -> Option<serde_json::Value> {
        match out {
            Outbound::Text(text) => serde_json::from_str(&text).ok(),
            Outbound::Pong(_) => None,
        }
    }

    /// An inbound side that stays silent until `close_after`, then closes.
    fn close_after(delay: Duration) -> impl Stream<Item = InboundEvent> + Unpin {
        Box::pin(stream::once(async move {
            tokio::time::sleep(delay).await;
            InboundEvent::Close
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn emits_one_frame_per_tick() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, mut rx) = LiveConnection::new("monaco_2024_race", 64);

        let end = run_stream(
            Arc::clone(&registry),
            Arc::new(conn),
            close_after(Duration::from_millis(1_050)),
            &spec(),
        )
        .await;
        assert_eq!(end, Ok(StreamEnd::ClientClosed));

        let mut frames = Vec::new();
        while let Ok(out) = rx.try_recv() {
            frames.extend(decode(out));
        }
        // Ticks at 0, 100, ..., 1000 ms.
        assert!((10..=12).contains(&frames.len()), "got {} frames", frames.len());

        let expected: BTreeSet<String> = drivers().iter().map(|d| d.id.clone()).collect();
        for frame in &frames {
            assert_eq!(frame["type"], "telemetry");
            assert_eq!(frame["session_id"], "monaco_2024_race");
            let samples = frame["drivers"].as_array().map_or(&[][..], Vec::as_slice);
            assert_eq!(samples.len(), expected.len());
            let ids: BTreeSet<String> = samples
                .iter()
                .filter_map(|s| s["driver_id"].as_str().map(str::to_owned))
                .collect();
            assert_eq!(ids, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timestamps_never_go_backwards() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, mut rx) = LiveConnection::new("s", 64);

        let _ = run_stream(
            registry,
            Arc::new(conn),
            close_after(Duration::from_millis(450)),
            &spec(),
        )
        .await;

        let mut stamps = Vec::new();
        while let Ok(out) = rx.try_recv() {
            if let Some(frame) = decode(out) {
                let raw = frame["timestamp"].as_str().unwrap_or_default().to_owned();
                stamps.extend(chrono::DateTime::parse_from_rfc3339(&raw).ok());
            }
        }
        assert!(stamps.len() >= 4);
        assert!(stamps.windows(2).all(|w| match w {
            [a, b] => a <= b,
            _ => true,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn close_removes_connection_promptly() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, _rx) = LiveConnection::new("s", 64);
        let id = conn.id();
        let (tx, rx) = mpsc::unbounded_channel::<InboundEvent>();
        let inbound = tokio_stream_from(rx);

        let task = tokio::spawn({
            let registry = Arc::clone(&registry);
            let spec = spec();
            async move { run_stream(registry, Arc::new(conn), inbound, &spec).await }
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(registry.contains(id));

        let closed_at = Instant::now();
        assert!(tx.send(InboundEvent::Close).is_ok());
        let end = task.await.ok();
        assert_eq!(end, Some(Ok(StreamEnd::ClientClosed)));
        assert!(closed_at.elapsed() <= Duration::from_millis(100));
        assert!(!registry.contains(id));
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_failure_terminates_and_cleans_up() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, rx) = LiveConnection::new("s", 64);
        drop(rx);

        let end = run_stream(
            Arc::clone(&registry),
            Arc::new(conn),
            stream::pending(),
            &spec(),
        )
        .await;
        assert_eq!(end, Ok(StreamEnd::DeliveryFailed(DeliveryError::Closed)));
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_client_times_out() {
        let registry = Arc::new(ConnectionRegistry::with_send_timeout(Duration::from_millis(500)));
        // Nobody drains this queue.
        let (conn, _rx) = LiveConnection::new("s", 2);

        let end = run_stream(
            Arc::clone(&registry),
            Arc::new(conn),
            stream::pending(),
            &spec(),
        )
        .await;
        assert_eq!(
            end,
            Ok(StreamEnd::DeliveryFailed(DeliveryError::TimedOut(
                Duration::from_millis(500)
            )))
        );
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_terminates() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, _rx) = LiveConnection::new("s", 64);
        let inbound = stream::iter(vec![
            InboundEvent::Other,
            InboundEvent::Error(String::from("connection reset")),
        ]);

        let end = run_stream(Arc::clone(&registry), Arc::new(conn), inbound, &spec()).await;
        assert_eq!(
            end,
            Ok(StreamEnd::TransportError(String::from("connection reset")))
        );
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ping_is_answered_in_order() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, mut rx) = LiveConnection::new("s", 64);
        let inbound = Box::pin(
            stream::iter(vec![InboundEvent::Ping(vec![1, 2, 3])]).chain(stream::once(async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                InboundEvent::Close
            })),
        );

        let _ = run_stream(registry, Arc::new(conn), inbound, &spec()).await;

        let mut pongs = 0;
        while let Ok(out) = rx.try_recv() {
            if out == Outbound::Pong(vec![1, 2, 3]) {
                pongs += 1;
            }
        }
        assert_eq!(pongs, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_admission_sends_nothing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, mut rx) = LiveConnection::new("s", 64);
        let conn = Arc::new(conn);
        let _guard = registry.admit(Arc::clone(&conn));

        let end = run_stream(Arc::clone(&registry), conn, stream::pending(), &spec()).await;
        assert!(matches!(end, Err(RegistryError::AlreadyAdmitted(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.active_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_sessions_do_not_cross_talk() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (race, mut race_rx) = LiveConnection::new("monaco_2024_race", 64);
        let (quali, mut quali_rx) = LiveConnection::new("monaco_2024_q3", 64);

        let spec = spec();
        let (a, b) = tokio::join!(
            run_stream(
                Arc::clone(&registry),
                Arc::new(race),
                close_after(Duration::from_millis(350)),
                &spec
            ),
            run_stream(
                Arc::clone(&registry),
                Arc::new(quali),
                close_after(Duration::from_millis(550)),
                &spec
            ),
        );
        assert_eq!(a, Ok(StreamEnd::ClientClosed));
        assert_eq!(b, Ok(StreamEnd::ClientClosed));

        let drain = |rx: &mut mpsc::Receiver<Outbound>| {
            let mut sessions = Vec::new();
            while let Ok(out) = rx.try_recv() {
                if let Some(frame) = decode(out) {
                    sessions.push(frame["session_id"].as_str().unwrap_or_default().to_owned());
                }
            }
            sessions
        };
        let race_sessions = drain(&mut race_rx);
        let quali_sessions = drain(&mut quali_rx);

        assert!(race_sessions.len() >= 3);
        assert!(quali_sessions.len() > race_sessions.len());
        assert!(race_sessions.iter().all(|s| s == "monaco_2024_race"));
        assert!(quali_sessions.iter().all(|s| s == "monaco_2024_q3"));
        assert_eq!(registry.active_count(), 0);
    }

    /// Adapt an unbounded receiver into a `Stream` for the loop's inbound side.
    fn tokio_stream_from(
        rx: mpsc::UnboundedReceiver<InboundEvent>,
    ) -> impl Stream<Item = InboundEvent> + Unpin {
        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }
}
