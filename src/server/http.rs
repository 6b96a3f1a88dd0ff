use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::info;

use crate::app::Result;
use crate::server::McpServer;

/// `endpoint` under an optional mount path.
pub fn mounted(mount_path: Option<&str>, endpoint: &str) -> String {
    let mount = mount_path.unwrap_or("").trim().trim_matches('/');
    if mount.is_empty() {
        format!("/{}", endpoint)
    } else {
        format!("/{}/{}", mount, endpoint)
    }
}

/// Path of the JSON-RPC endpoint under an optional mount path.
pub fn endpoint_path(mount_path: Option<&str>) -> String {
    mounted(mount_path, "mcp")
}

pub fn router(server: Arc<McpServer>, mount_path: Option<&str>) -> Router {
    with_health(Router::new().route(&endpoint_path(mount_path), post(handle))).with_state(server)
}

/// Adds `GET /health` and the 404 fallback shared by the HTTP transports.
pub(crate) fn with_health<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Endpoint not found") })
}

async fn handle(State(server): State<Arc<McpServer>>, Json(message): Json<Value>) -> Response {
    match server.handle_message(message).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub async fn run(server: Arc<McpServer>, bind: &str, mount_path: Option<&str>) -> Result<()> {
    listen(router(server, mount_path), bind, &endpoint_path(mount_path)).await
}

pub(crate) async fn listen(app: Router, bind: &str, endpoint: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("listening on http://{}{}", listener.local_addr()?, endpoint);

    axum::serve(listener, app).await?;
    Ok(())
}
