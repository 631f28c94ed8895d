use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, interval_at};
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::room_registry::RoomRegistry;
use crate::round_timer::RoundTimers;
use wordroom_core::IdentityProvider;
use wordroom_types::ClientMessage;

pub mod connection;
pub mod handlers;
pub mod rate_limiter;


pub use connection::{ConnectionId, ConnectionManager, Outbox};
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

/// Keeps quiet sockets answering; every pong counts as activity.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Serve one WebSocket until either side goes away, then run the
/// disconnect path for whatever player it was bound to.
pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<RoomRegistry>,
    timers: RoundTimers,
    identity: Arc<dyn IdentityProvider>,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (sink, stream) = websocket.split();
    let outbox = connection_manager.create_connection(connection_id).await;
    let handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        registry,
        timers,
        identity,
    );

    tokio::select! {
        _ = read_loop(stream, &handler, connection_id) => {},
        _ = write_loop(sink, outbox, connection_id) => {},
    }

    info!("Connection {} disconnected", connection_id);
    handler.handle_disconnect().await;
    connection_manager.remove_connection(connection_id).await;
}

async fn read_loop(
    mut stream: SplitStream<WebSocket>,
    handler: &MessageHandler,
    connection_id: ConnectionId,
) {
    let mut rate_limiter = RateLimiter::new();

    while let Some(frame) = stream.next().await {
        let msg = match frame {
            Ok(msg) if msg.is_close() => break,
            Ok(msg) => msg,
            Err(e) => {
                warn!("WebSocket error for {}: {}", connection_id, e);
                break;
            }
        };

        if let Err(e) = dispatch(msg, &mut rate_limiter, handler).await {
            error!("Error handling message for {}: {}", connection_id, e);
            break;
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox: Outbox,
    connection_id: ConnectionId,
) {
    let mut ping = interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);

    loop {
        let frame = tokio::select! {
            next = outbox.recv() => match next {
                Some(message) => match serde_json::to_string(&message) {
                    Ok(text) => Message::text(text),
                    Err(e) => {
                        error!("Failed to serialize {:?}: {}", message, e);
                        continue;
                    }
                },
                // Outbox closed by the idle sweep
                None => break,
            },
            _ = ping.tick() => Message::ping(Vec::new()),
        };

        if let Err(e) = sink.send(frame).await {
            warn!("Failed to send message to {}: {}", connection_id, e);
            return;
        }
    }

    let _ = sink.close().await;
}

/// Returns `Err` only when the connection can no longer be answered.
async fn dispatch(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    handler: &MessageHandler,
) -> Result<(), String> {
    handler.touch().await;

    // Pings, pongs and binary frames carry no actions
    let Ok(text) = msg.to_str() else {
        return Ok(());
    };

    if !rate_limiter.check_rate_limit() {
        return handler.reject("Too many messages, slow down").await;
    }

    match serde_json::from_str::<ClientMessage>(text) {
        Ok(client_message) => handler.handle_message(client_message).await,
        Err(e) => handler.reject(&format!("Invalid message: {}", e)).await,
    }
}
