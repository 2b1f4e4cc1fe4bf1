use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use packman_classic::constants::FRAME_MS;
use packman_classic::engine::Session;
use packman_classic::logging;
use packman_classic::score_store::{high_score_response, FileScoreStore, ScoreStore};
use packman_classic::server_protocol::{parse_client_message, ParsedClientMessage};
use packman_classic::types::{GameSummary, RuntimeEvent};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Longest frame the clock will hand to the session after a stall.
const MAX_FRAME_DT_MS: f64 = 100.0;

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone)]
struct ClientContext {
    tx: mpsc::Sender<OutboundMessage>,
}

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    session: Session,
}

impl ServerState {
    fn new(session: Session) -> Self {
        Self {
            clients: HashMap::new(),
            session,
        }
    }
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let bind_host = std::env::var("BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let high_score_path = std::env::var("HIGH_SCORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data/high_score.json"));

    let score_store = FileScoreStore::new(high_score_path);
    logging::info(
        "score_store_opened",
        json!({
            "path": score_store.path().to_string_lossy(),
            "highScore": score_store.get(),
        }),
    );

    let session = match Session::new(Box::new(score_store)) {
        Ok(session) => session,
        Err(error) => {
            logging::error("maze_load_failed", json!({ "error": error.to_string() }));
            std::process::exit(1);
        }
    };

    let state = Arc::new(Mutex::new(ServerState::new(session)));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/high-score", get(high_score_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        logging::info(
            "static_root",
            json!({ "path": static_dir.to_string_lossy() }),
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        logging::warn(
            "static_root",
            json!({ "path": null, "message": "no renderer bundle found; set STATIC_DIR" }),
        );
        app
    };

    let bind_addr = format!("{bind_host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    logging::info("server_listening", json!({ "addr": bind_addr }));
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("web"), PathBuf::from("dist/client")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn high_score_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(high_score_response(guard.session.score_store()))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);

    {
        let mut guard = state.lock().await;
        guard
            .clients
            .insert(client_id.clone(), ClientContext { tx: tx.clone() });
        send_welcome(&mut guard, &client_id);
    }
    logging::info("client_connected", json!({ "clientId": client_id }));

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
            };
            if result.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &client_id, raw.as_str()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(&state, &client_id, &text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        guard.clients.remove(&client_id);
    }
    logging::info("client_disconnected", json!({ "clientId": client_id }));
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error_to_client(state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    if let ParsedClientMessage::Ping { t } = message {
        send_to_client(
            &mut guard,
            client_id,
            &json!({
                "type": "pong",
                "t": t,
            }),
            QueuePolicy::DisconnectOnFull,
        );
        return;
    }
    if let Some(intent) = message.into_intent() {
        guard.session.push_intent(intent);
    }
}

fn send_welcome(state: &mut ServerState, client_id: &str) {
    let snapshot = state.session.build_snapshot(false);
    send_to_client(
        state,
        client_id,
        &json!({
            "type": "welcome",
            "clientId": client_id,
            "snapshot": snapshot,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(FRAME_MS));
        let mut last = Instant::now();
        loop {
            interval.tick().await;
            let now = Instant::now();
            let dt_ms = clamp_frame_dt(now.duration_since(last));
            last = now;
            let mut guard = state.lock().await;
            tick_session(&mut guard, dt_ms);
        }
    });
}

fn clamp_frame_dt(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1_000.0).clamp(0.0, MAX_FRAME_DT_MS)
}

fn tick_session(state: &mut ServerState, dt_ms: f64) -> Option<GameSummary> {
    state.session.update(dt_ms);
    let snapshot = state.session.build_snapshot(true);
    let ended = snapshot.events.iter().any(|event| {
        matches!(event, RuntimeEvent::StateChanged { to, .. } if to.is_terminal())
    });

    broadcast(
        state,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
        QueuePolicy::DropOnFull,
    );

    if !ended {
        return None;
    }
    let summary = state.session.build_summary();
    logging::info(
        "session_over",
        json!({
            "state": summary.state,
            "score": summary.score,
            "highScore": summary.high_score,
            "ticks": summary.ticks,
        }),
    );
    broadcast(
        state,
        &json!({
            "type": "session_over",
            "summary": summary,
        }),
        QueuePolicy::DisconnectOnFull,
    );
    Some(summary)
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(client) = state.clients.get(client_id) {
        client
            .tx
            .try_send(OutboundMessage::Text(message.to_string()))
            .is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        state.clients.remove(client_id);
    }
}

fn broadcast(state: &mut ServerState, message: &Value, policy: QueuePolicy) {
    let payload = message.to_string();
    let mut failed_clients = Vec::new();
    for (client_id, client) in &state.clients {
        if client
            .tx
            .try_send(OutboundMessage::Text(payload.clone()))
            .is_err()
            && policy == QueuePolicy::DisconnectOnFull
        {
            failed_clients.push(client_id.clone());
        }
    }
    for client_id in failed_clients {
        state.clients.remove(&client_id);
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use packman_classic::score_store::MemoryScoreStore;
    use packman_classic::types::{Intent, SessionState};

    fn make_state() -> ServerState {
        let session =
            Session::new(Box::new(MemoryScoreStore::default())).expect("reference maze parses");
        ServerState::new(session)
    }

    fn attach_client(state: &mut ServerState, capacity: usize) -> mpsc::Receiver<OutboundMessage> {
        let (tx, rx) = mpsc::channel(capacity);
        state
            .clients
            .insert("client_test".to_string(), ClientContext { tx });
        rx
    }

    fn read_json(rx: &mut mpsc::Receiver<OutboundMessage>) -> Value {
        let OutboundMessage::Text(text) = rx.try_recv().expect("message queued");
        serde_json::from_str(&text).expect("valid json")
    }

    #[test]
    fn make_id_is_prefixed_and_unique() {
        let a = make_id("client");
        let b = make_id("client");
        assert!(a.starts_with("client_"));
        assert_ne!(a, b);
    }

    #[test]
    fn frame_dt_is_clamped() {
        assert_eq!(clamp_frame_dt(Duration::from_millis(16)), 16.0);
        assert_eq!(clamp_frame_dt(Duration::from_secs(5)), MAX_FRAME_DT_MS);
    }

    #[test]
    fn welcome_carries_a_snapshot() {
        let mut state = make_state();
        let mut rx = attach_client(&mut state, 8);
        send_welcome(&mut state, "client_test");
        let message = read_json(&mut rx);
        assert_eq!(message["type"], "welcome");
        assert_eq!(message["snapshot"]["state"], "start");
        assert_eq!(message["snapshot"]["tiles"].as_array().map(Vec::len), Some(31));
    }

    #[test]
    fn tick_broadcasts_state_and_applies_intents() {
        let mut state = make_state();
        let mut rx = attach_client(&mut state, 8);
        state.session.push_intent(Intent::Start);
        assert!(tick_session(&mut state, 16.0).is_none());
        assert_eq!(state.session.state(), SessionState::Playing);

        let message = read_json(&mut rx);
        assert_eq!(message["type"], "state");
        assert_eq!(message["snapshot"]["state"], "playing");
    }

    #[test]
    fn full_queue_drops_state_but_keeps_client() {
        let mut state = make_state();
        let _rx = attach_client(&mut state, 1);
        tick_session(&mut state, 16.0);
        tick_session(&mut state, 16.0);
        assert!(state.clients.contains_key("client_test"));
    }

    #[test]
    fn full_queue_disconnects_on_direct_messages() {
        let mut state = make_state();
        let _rx = attach_client(&mut state, 1);
        send_welcome(&mut state, "client_test");
        send_welcome(&mut state, "client_test");
        assert!(!state.clients.contains_key("client_test"));
    }
}
