//! WebSocket handler
//!
//! Authenticates the handshake, then runs the read and write halves of
//! each connection until either side ends.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message},
        Query, State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::channels::{channel, ChannelError};
use crate::connection::Connection;
use crate::dispatch::TopicWatcher;
use crate::protocol::{ClientFrame, CloseCode, ServerFrame};
use crate::server::GatewayState;

/// Channel buffer size for outgoing frames
const FRAME_BUFFER_SIZE: usize = 256;

/// Subprotocol echoed back during the upgrade. Browser clients smuggling a
/// credential through Sec-WebSocket-Protocol must offer this tag alongside
/// the `token-` one, or they will drop the connection when no protocol is
/// selected in the response.
const SUBPROTOCOL: &str = "json";

/// WebSocket gateway handler
///
/// A present-but-invalid credential refuses the upgrade outright. A
/// missing credential proceeds as anonymous.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let query_token = params.get("token").map(String::as_str);
    let protocol_header = headers
        .get("sec-websocket-protocol")
        .and_then(|v| v.to_str().ok());

    let identity = match state.auth().authenticate(query_token, protocol_header).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::debug!(error = %err, "Handshake refused");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.protocols([SUBPROTOCOL])
        .on_upgrade(move |socket| handle_socket(state, socket, identity))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(
    state: GatewayState,
    socket: axum::extract::ws::WebSocket,
    identity: Identity,
) {
    let session_id = Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<ServerFrame>(FRAME_BUFFER_SIZE);
    let connection = Connection::new(session_id.clone(), identity, tx);
    state.registry().register(connection.clone());

    tracing::info!(
        session_id = %session_id,
        authenticated = connection.is_authenticated(),
        "WebSocket connection established"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Greet before anything else so the client learns its session id
    let welcome = ServerFrame::Welcome {
        session_id: session_id.clone(),
        user_id: connection.user_id(),
    };
    if let Ok(json) = welcome.to_json() {
        if ws_sink.send(Message::Text(json.into())).await.is_err() {
            tracing::warn!(session_id = %session_id, "Failed to send welcome frame");
            cleanup_connection(&state, &session_id).await;
            return;
        }
    }

    // Read half in its own task; the write half stays here so a coded
    // close frame can be the last thing on the wire
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task =
        tokio::spawn(async move { read_loop(&state_recv, &connection_recv, &mut ws_stream).await });

    loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                let Ok(json) = frame.to_json() else { continue };
                if ws_sink.send(Message::Text(json.into())).await.is_err() {
                    tracing::warn!(
                        session_id = %session_id,
                        "Failed to write frame to WebSocket"
                    );
                    break;
                }
            }
            result = &mut recv_task => {
                if let Ok(Some(close_code)) = result {
                    tracing::debug!(
                        session_id = %session_id,
                        close_code = %close_code,
                        "Closing connection"
                    );
                    let close = Message::Close(Some(CloseFrame {
                        code: close_code.as_u16(),
                        reason: close_code.description().into(),
                    }));
                    ws_sink.send(close).await.ok();
                }
                break;
            }
        }
    }

    recv_task.abort();
    let _ = ws_sink.close().await;

    cleanup_connection(&state, &session_id).await;
}

/// Consume client frames until the connection ends; a returned code means
/// the server is closing the connection for cause
async fn read_loop(
    state: &GatewayState,
    connection: &Arc<Connection>,
    ws_stream: &mut futures_util::stream::SplitStream<axum::extract::ws::WebSocket>,
) -> Option<CloseCode> {
    let session_id = connection.session_id();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(close_code) = handle_text_frame(state, connection, &text).await {
                    return Some(close_code);
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(session_id = %session_id, "Binary frames not supported");
                return Some(CloseCode::DecodeError);
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                tracing::info!(session_id = %session_id, "Client closed connection");
                return None;
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "WebSocket error");
                return Some(CloseCode::UnknownError);
            }
        }
    }
    None
}

/// Handle one text frame from the client
async fn handle_text_frame(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let frame = match ClientFrame::from_json(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to parse frame"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    let ctx = state.channel_context();

    match frame {
        ClientFrame::Subscribe { channel: kind } => {
            match channel(kind).on_subscribe(&ctx, connection).await {
                Ok(()) => {
                    connection
                        .send(ServerFrame::Subscribed { channel: kind })
                        .await
                        .ok();
                }
                Err(err @ ChannelError::AuthenticationRequired) => {
                    // Refusal is explicit, and the connection survives
                    connection
                        .send(ServerFrame::SubscribeRejected {
                            channel: kind,
                            reason: err.to_string(),
                        })
                        .await
                        .ok();
                }
                Err(err) => {
                    send_error(connection, &err).await;
                }
            }
        }
        ClientFrame::Unsubscribe { channel: kind } => {
            channel(kind).on_unsubscribe(&ctx, connection).await;
            connection
                .send(ServerFrame::Unsubscribed { channel: kind })
                .await
                .ok();
        }
        ClientFrame::Message {
            channel: kind,
            command,
        } => {
            if let Err(err) = channel(kind).handle_message(&ctx, connection, command).await {
                tracing::debug!(
                    session_id = %connection.session_id(),
                    channel = %kind,
                    error = %err,
                    "Channel command failed"
                );
                send_error(connection, &err).await;
            }
        }
    }

    Ok(())
}

async fn send_error(connection: &Connection, err: &ChannelError) {
    connection
        .send(ServerFrame::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        })
        .await
        .ok();
}

/// Clean up a connection on disconnect
async fn cleanup_connection(state: &GatewayState, session_id: &str) {
    tracing::info!(session_id = %session_id, "Cleaning up connection");

    let topics = state.registry().disconnect(session_id);

    // Release broker subscriptions nobody needs anymore
    for topic in topics {
        if let Err(err) = state.dispatcher().unwatch_if_unused(topic).await {
            tracing::warn!(
                topic = %topic.name(),
                error = %err,
                "Broker unwatch failed during cleanup"
            );
        }
    }
}
