//! MCP over server-sent events.
//!
//! A client opens `GET {mount}/sse` and first receives an `endpoint` event
//! naming the URL to post its messages to. Each
//! `POST {mount}/messages?session_id=...` is accepted with 202, and the
//! response arrives on that client's event stream as a `message` event.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::app::Result;
use crate::server::http::{listen, mounted, with_health};
use crate::server::McpServer;

type Sessions = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<Value>>>>;

#[derive(Clone)]
struct SseState {
    server: Arc<McpServer>,
    sessions: Sessions,
    next_session: Arc<AtomicU64>,
    messages_path: String,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: String,
}

/// Drops the session's sender once its event stream goes away.
struct SessionGuard {
    id: String,
    sessions: Sessions,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
        tracing::info!("SSE session {} closed", self.id);
    }
}

pub fn router(server: Arc<McpServer>, mount_path: Option<&str>) -> Router {
    let messages_path = mounted(mount_path, "messages");
    let state = SseState {
        server,
        sessions: Arc::default(),
        next_session: Arc::default(),
        messages_path: messages_path.clone(),
    };

    with_health(
        Router::new()
            .route(&mounted(mount_path, "sse"), get(connect))
            .route(&messages_path, post(message)),
    )
    .with_state(state)
}

async fn connect(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let id = format!(
        "{:016x}",
        state.next_session.fetch_add(1, Ordering::Relaxed)
    );
    let (sender, receiver) = mpsc::unbounded_channel();
    state
        .sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id.clone(), sender);
    tracing::info!("SSE session {} opened", id);

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?session_id={}", state.messages_path, id));
    let guard = SessionGuard {
        id,
        sessions: state.sessions.clone(),
    };

    let messages = stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
        let message = receiver.recv().await?;
        let event = Event::default().event("message").data(message.to_string());
        Some((Ok::<_, Infallible>(event), (receiver, guard)))
    });

    Sse::new(stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages))
        .keep_alive(KeepAlive::default())
}

async fn message(
    State(state): State<SseState>,
    Query(query): Query<SessionQuery>,
    Json(message): Json<Value>,
) -> Response {
    let sender = state
        .sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&query.session_id)
        .cloned();

    let Some(sender) = sender else {
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    let server = state.server.clone();
    tokio::spawn(async move {
        if let Some(response) = server.handle_message(message).await {
            if sender.send(response).is_err() {
                tracing::debug!("SSE session closed before its response was sent");
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}

pub async fn run(server: Arc<McpServer>, bind: &str, mount_path: Option<&str>) -> Result<()> {
    listen(router(server, mount_path), bind, &mounted(mount_path, "sse")).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetcher::testing::StaticFetcher;
    use crate::server::tests::server;

    async fn spawn_server() -> std::net::SocketAddr {
        let server = Arc::new(server(StaticFetcher::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(server, Some("/blog"))).await.unwrap();
        });
        addr
    }

    /// Next named event on the stream as `(event, data)`, skipping keep-alives.
    async fn next_event(events: &mut reqwest::Response, buffer: &mut String) -> (String, String) {
        loop {
            if let Some(end) = buffer.find("\n\n") {
                let block: String = buffer.drain(..end + 2).collect();
                let mut name = String::new();
                let mut data = String::new();
                for line in block.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        name = value.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim_start());
                    }
                }
                if !name.is_empty() {
                    return (name, data);
                }
                continue;
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), events.chunk())
                .await
                .expect("timed out waiting for an event")
                .unwrap()
                .expect("event stream ended");
            buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    #[tokio::test]
    async fn test_serves_json_rpc_over_sse() {
        let addr = spawn_server().await;
        let client = reqwest::Client::new();

        let mut events = client
            .get(format!("http://{}/blog/sse", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(events.status().as_u16(), 200);

        let mut buffer = String::new();
        let (name, endpoint) = next_event(&mut events, &mut buffer).await;
        assert_eq!(name, "endpoint");
        assert!(endpoint.starts_with("/blog/messages?session_id="));

        let post = |body: &'static str| {
            client
                .post(format!("http://{}{}", addr, endpoint))
                .header("content-type", "application/json")
                .body(body)
                .send()
        };

        let status = post(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .unwrap()
            .status();
        assert_eq!(status.as_u16(), 202);

        let status = post(r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#)
            .await
            .unwrap()
            .status();
        assert_eq!(status.as_u16(), 202);

        let (name, data) = next_event(&mut events, &mut buffer).await;
        assert_eq!(name, "message");
        let response: Value = serde_json::from_str(&data).unwrap();
        assert_eq!(response["id"], 7);
        assert!(response["result"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let addr = spawn_server().await;

        let status = reqwest::Client::new()
            .post(format!("http://{}/blog/messages?session_id=nope", addr))
            .header("content-type", "application/json")
            .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status.as_u16(), 404);
    }

    #[test]
    fn test_session_is_forgotten_when_stream_drops() {
        let sessions: Sessions = Arc::default();
        let (sender, _receiver) = mpsc::unbounded_channel();
        sessions.lock().unwrap().insert("a".into(), sender);

        drop(SessionGuard {
            id: "a".into(),
            sessions: sessions.clone(),
        });
        assert!(sessions.lock().unwrap().is_empty());
    }
}
