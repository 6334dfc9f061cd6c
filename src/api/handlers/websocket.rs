//! WebSocket handler for real-time catalog updates.
//!
//! Forwards the ledger's creation events so clients can refresh their view
//! without polling.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::api::ApiState;

/// WebSocket message types.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A new record was written to the catalog.
    VideoRecorded {
        id: u64,
        content_id: String,
        title: String,
        author: String,
    },

    /// The client fell behind the event stream and should reload the
    /// catalog.
    Resync { missed: u64 },
}

/// WebSocket upgrade handler.
pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.ledger.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => {
                let frame = match event {
                    Ok(record) => WsMessage::VideoRecorded {
                        id: record.id,
                        content_id: record.content_id,
                        title: record.title,
                        author: record.author,
                    },
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        WsMessage::Resync { missed }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                if let Ok(json) = serde_json::to_string(&frame) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}
