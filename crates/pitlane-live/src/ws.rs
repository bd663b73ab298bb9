//! `WebSocket` handler for live telemetry streaming.
//!
//! Clients connect to `GET /ws/live/{session_id}` and receive one JSON
//! [`LiveMessage`](pitlane_types::LiveMessage) per tick until they close.
//! The socket is split: a writer task drains the connection's outbound
//! queue into the sink, while the stream loop reads client events and
//! paces frames.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::registry::{LiveConnection, Outbound};
use crate::state::AppState;
use crate::stream::{InboundEvent, StreamEnd, run_stream};

/// How long the writer may keep flushing after the stream loop ends.
const WRITER_GRACE: Duration = Duration::from_secs(1);

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming telemetry for `session_id`.
///
/// # Route
///
/// `GET /ws/live/{session_id}`
pub async fn ws_live(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, session_id, state))
}

/// Handle the `WebSocket` lifecycle for one client.
async fn handle_ws(socket: WebSocket, session_id: String, state: Arc<AppState>) {
    let (sink, stream) = socket.split();
    let (connection, rx) = LiveConnection::new(session_id, state.stream.outbound_queue);
    let connection = Arc::new(connection);
    let conn_id = connection.id();

    debug!(%conn_id, session_id = connection.session_id(), "WebSocket client connected");

    let mut writer = tokio::spawn(pump_outbound(sink, rx));

    let inbound = stream.map(|msg| match msg {
        Ok(Message::Close(_)) => InboundEvent::Close,
        Ok(Message::Ping(data)) => InboundEvent::Ping(data.to_vec()),
        Ok(_) => InboundEvent::Other,
        Err(e) => InboundEvent::Error(e.to_string()),
    });

    let spec = state.stream_spec();
    match run_stream(Arc::clone(&state.registry), connection, inbound, &spec).await {
        Ok(StreamEnd::ClientClosed) => debug!(%conn_id, "WebSocket client disconnected"),
        Ok(StreamEnd::TransportError(e)) => debug!(%conn_id, error = %e, "WebSocket error"),
        Ok(StreamEnd::DeliveryFailed(e)) => {
            warn!(%conn_id, error = %e, "live stream stopped: delivery failed");
        }
        Err(e) => warn!(%conn_id, error = %e, "live stream rejected"),
    }

    // The loop has dropped its sender, so the writer drains and exits.
    if tokio::time::timeout(WRITER_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }
}

/// Forward queued messages to the socket until the queue closes or a send
/// fails.
async fn pump_outbound(mut sink: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(out) = rx.recv().await {
        let msg = match out {
            Outbound::Text(text) => Message::Text(text.as_ref().into()),
            Outbound::Pong(data) => Message::Pong(data.into()),
        };
        if sink.send(msg).await.is_err() {
            debug!("WebSocket send failed, stopping writer");
            break;
        }
    }
    let _ = sink.close().await;
}
