// ============================
// parley-backend-lib/src/ws_router.rs
// ============================
//! Router and WebSocket connection gateway. Each accepted connection gets a
//! fresh connection id and runs its own task; chat events are dispatched
//! into the broadcast hub and cleanup fires exactly once on close.
use crate::handlers;
use crate::hub::peer_channel;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use parley_common::{ClientEvent, ConnId};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Create the full application router: auth endpoints, the WebSocket
/// upgrade, and the static client pages.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_dir = state.settings.public_dir.clone();
    let entry_page = ServeFile::new(public_dir.join("login.html"));

    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/ws", get(ws_handler))
        .route_service("/", entry_page)
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for WebSocket connections
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);

    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn: ConnId = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    // Per-connection outbound queue; the hub never writes to the socket
    // directly, so one slow client cannot stall the broadcaster.
    let (event_tx, mut event_rx) = peer_channel();
    state.hub.attach(conn, event_tx);
    info!(%conn, "new connection");

    // Forward hub events to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(_) => continue,
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Connection state machine: Connected until the first identity
    // announcement, then Identified; leave events fire only for identified
    // connections.
    let mut identified = false;

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::NewUser(username)) => {
                    identified = true;
                    state.hub.announce_join(conn, username);
                },
                // sending is permitted before identification
                Ok(ClientEvent::SendMessage(msg)) => {
                    state.hub.relay_message(msg.user, msg.text);
                },
                // one connection's bad input must never take down the room
                Err(err) => {
                    warn!(%conn, error = %err, "ignoring malformed event");
                },
            },
            Message::Close(_) => break,
            _ => {},
        }
    }

    // Cleanup runs once, whether the close was clean or a network drop.
    // Detach first so the leave broadcast only reaches remaining peers.
    state.hub.detach(conn);
    if identified {
        state.hub.announce_leave(conn);
    }
    info!(%conn, "connection closed");

    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);

    send_task.abort();
}
