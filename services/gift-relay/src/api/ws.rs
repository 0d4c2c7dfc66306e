use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State as AxumState,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use giftdraw_client::LiveFeed;
use giftdraw_types::{InboundMessage, ServerResponse, SessionEvent, SessionId, SessionParameters};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AppState, INVALID_MESSAGE, INVALID_PARAMETERS};

type OutboundSender = mpsc::Sender<Message>;

async fn send_json<T: Serialize>(tx: &OutboundSender, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(payload) => tx.send(Message::Text(payload)).await.is_ok(),
        Err(err) => {
            warn!(error = %err, "failed to encode outbound frame");
            true
        }
    }
}

/// Forward session events to the socket writer until either side closes.
fn spawn_forwarder(
    session: SessionId,
    mut events: broadcast::Receiver<SessionEvent>,
    tx: OutboundSender,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if !send_json(&tx, &event).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(session = %session, skipped, "socket lagged; session events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

pub(super) async fn session<F: LiveFeed>(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    AxumState(state): AxumState<AppState<F>>,
) -> Response {
    if !state.origin_allowed(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session<F: LiveFeed>(socket: WebSocket, state: AppState<F>) {
    let id = SessionId::new(Uuid::new_v4().to_string());
    let events = match state.coordinator.register(id.clone()) {
        Ok(events) => events,
        Err(err) => {
            warn!(session = %id, error = %err, "failed to register session");
            return;
        }
    };
    info!(session = %id, "session socket opened");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(state.config.outbound_capacity.max(1));
    let write_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    send_json(
        &tx,
        &SessionEvent::SessionStarted {
            session_id: id.clone(),
        },
    )
    .await;
    let forward_task = spawn_forwarder(id.clone(), events, tx.clone());

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => handle_text(&state, &id, &tx, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    forward_task.abort();
    write_task.abort();
    if let Err(err) = state.coordinator.unregister(&id).await {
        warn!(session = %id, error = %err, "failed to unregister session");
    }
    info!(session = %id, "session socket closed");
}

async fn handle_text<F: LiveFeed>(
    state: &AppState<F>,
    id: &SessionId,
    tx: &OutboundSender,
    text: &str,
) {
    let inbound = match serde_json::from_str::<InboundMessage>(text) {
        Ok(inbound) => inbound,
        Err(err) => {
            warn!(session = %id, error = %err, "invalid inbound message");
            let response = ServerResponse::Error {
                request_id: None,
                code: INVALID_MESSAGE.to_string(),
                message: err.to_string(),
            };
            send_json(tx, &response).await;
            return;
        }
    };

    let result = match inbound {
        InboundMessage::ConnectRequest { broadcaster_name } => {
            state.coordinator.connect(id, broadcaster_name).await
        }
        InboundMessage::DisconnectRequest => state.coordinator.disconnect(id).await,
        InboundMessage::UpdateParameters {
            request_id,
            parameters,
        } => {
            let parameters = match SessionParameters::from_json(parameters) {
                Ok(parameters) => parameters,
                Err(err) => {
                    warn!(session = %id, error = %err, "rejected parameter update");
                    let response = ServerResponse::Error {
                        request_id,
                        code: INVALID_PARAMETERS.to_string(),
                        message: err.to_string(),
                    };
                    send_json(tx, &response).await;
                    return;
                }
            };
            let result = state.coordinator.update_parameters(id, parameters).await;
            if let (Ok(()), Some(request_id)) = (&result, request_id) {
                send_json(tx, &ServerResponse::Ack { request_id }).await;
            }
            result
        }
    };

    if let Err(err) = result {
        warn!(session = %id, error = %err, "dropping request");
    }
}

pub(super) async fn observe<F: LiveFeed>(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Path(id): Path<String>,
    AxumState(state): AxumState<AppState<F>>,
) -> Response {
    if !state.origin_allowed(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let id = SessionId::new(id);
    let events = match state.coordinator.subscribe(&id) {
        Ok(events) => events,
        Err(err) => {
            debug!(error = %err, "observer for unknown session");
            return StatusCode::NOT_FOUND.into_response();
        }
    };
    ws.on_upgrade(move |socket| run_observer(socket, id, events))
}

async fn run_observer(
    socket: WebSocket,
    id: SessionId,
    mut events: broadcast::Receiver<SessionEvent>,
) {
    info!(session = %id, "observer attached");
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(payload) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(session = %id, skipped, "observer lagged; session events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
            message = receiver.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    info!(session = %id, "observer detached");
}
