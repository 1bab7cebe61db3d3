//! Duplex streaming surface: one WebSocket connection multiplexes any
//! number of per-agent subscriptions, each emitting
//! `start chunk* (complete|error)` in order.

use crate::rate_limit::client_key;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use conduit_dispatch::{DispatchConstraints, DispatchContext};
use conduit_types::stream::StreamEvent;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// Inbound WebSocket payloads, tagged by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum InboundMessage {
    Execute {
        agent_id: String,
        task: String,
        #[serde(default)]
        context: Value,
        #[serde(default)]
        constraints: DispatchConstraints,
    },
    Cancel {
        agent_id: String,
    },
}

/// `GET /stream` upgrade handler.
pub async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let client = client_key(&headers);
    ws.on_upgrade(move |socket| handle_socket(socket, state, client))
}

async fn handle_socket(socket: WebSocket, state: AppState, client: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<StreamEvent>(256);

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let subscriptions: Arc<Mutex<HashMap<String, CancellationToken>>> = Arc::new(Mutex::new(HashMap::new()));

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let Ok(inbound) = serde_json::from_str::<InboundMessage>(&text) else {
                    continue;
                };
                handle_inbound(inbound, &state, &client, &tx, &subscriptions).await;
            }
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    let mut subs = subscriptions.lock().await;
    for (_, token) in subs.drain() {
        token.cancel();
    }
    drop(tx);
    let _ = send_task.await;
}

async fn handle_inbound(
    inbound: InboundMessage,
    state: &AppState,
    client: &str,
    tx: &mpsc::Sender<StreamEvent>,
    subscriptions: &Arc<Mutex<HashMap<String, CancellationToken>>>,
) {
    match inbound {
        InboundMessage::Cancel { agent_id } => {
            if let Some(token) = subscriptions.lock().await.remove(&agent_id) {
                token.cancel();
            }
        }
        InboundMessage::Execute {
            agent_id,
            task,
            context,
            constraints,
        } => {
            if !state.rate_limiter.check(client) {
                let _ = tx
                    .send(StreamEvent::Error {
                        agent_id: agent_id.clone(),
                        message: "rate limit exceeded".into(),
                        timestamp: chrono::Utc::now(),
                    })
                    .await;
                return;
            }

            let cancel = CancellationToken::new();
            {
                let mut subs = subscriptions.lock().await;
                if let Some(previous) = subs.insert(agent_id.clone(), cancel.clone()) {
                    previous.cancel();
                }
            }

            let dispatcher = state.dispatcher.clone();
            let tx = tx.clone();
            let subscriptions = subscriptions.clone();
            tokio::spawn(async move {
                run_subscription(dispatcher, agent_id, task, context, constraints, tx, cancel, subscriptions).await;
            });
        }
    }
}

/// Runs one `start chunk* (complete|error)` subscription to completion.
/// The forwarding task that drains provider chunks is awaited in full
/// before the terminal event is sent, preserving ordering even though
/// chunk delivery and the dispatch future progress concurrently.
#[allow(clippy::too_many_arguments)]
async fn run_subscription(
    dispatcher: Arc<conduit_dispatch::AgentDispatcher>,
    agent_id: String,
    task: String,
    context: Value,
    constraints: DispatchConstraints,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
    subscriptions: Arc<Mutex<HashMap<String, CancellationToken>>>,
) {
    let _ = tx
        .send(StreamEvent::Start {
            agent_id: agent_id.clone(),
            task: task.clone(),
            timestamp: chrono::Utc::now(),
        })
        .await;

    let (chunk_tx, mut chunk_rx) = mpsc::channel::<String>(64);
    let forward_agent_id = agent_id.clone();
    let forward_tx = tx.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(content) = chunk_rx.recv().await {
            let _ = forward_tx
                .send(StreamEvent::Chunk {
                    agent_id: forward_agent_id.clone(),
                    content,
                    timestamp: chrono::Utc::now(),
                })
                .await;
        }
    });

    let kpis = dispatcher
        .catalog()
        .get(&agent_id)
        .map(|agent| agent.kpis.clone())
        .unwrap_or_default();

    let result = dispatcher
        .dispatch(
            &agent_id,
            &task,
            DispatchContext { values: context },
            constraints,
            Some(chunk_tx),
            cancel,
        )
        .await;

    let _ = forward_task.await;

    match result {
        Ok(outcome) => {
            let _ = tx
                .send(StreamEvent::Complete {
                    agent_id: agent_id.clone(),
                    response: outcome.output,
                    kpis,
                    timestamp: chrono::Utc::now(),
                })
                .await;
        }
        Err(err) => {
            let _ = tx
                .send(StreamEvent::Error {
                    agent_id: agent_id.clone(),
                    message: err.to_string(),
                    timestamp: chrono::Utc::now(),
                })
                .await;
        }
    }

    subscriptions.lock().await.remove(&agent_id);
}

pub fn router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new().route("/stream", get(stream))
}
