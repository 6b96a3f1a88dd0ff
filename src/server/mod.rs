//! Model Context Protocol server.
//!
//! Speaks the tool-calling subset of MCP over JSON-RPC 2.0: `initialize`,
//! `ping`, `tools/list` and `tools/call`. Notifications are accepted and
//! ignored. Tool failures come back as tool results with `isError` set; only
//! protocol problems become JSON-RPC errors.

pub mod http;
pub mod sse;
pub mod stdio;
pub mod tools;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::app::{AppContext, Result};
use crate::config::Transport;

pub use tools::Tool;

pub const SERVER_NAME: &str = "Blog RSS Server";
pub const PROTOCOL_VERSION: &str = "2025-03-26";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

pub struct McpServer {
    ctx: Arc<AppContext>,
}

impl McpServer {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Handle one message as read off the wire, which may not be UTF-8.
    pub async fn handle_bytes(&self, raw: &[u8]) -> Option<Value> {
        match std::str::from_utf8(raw) {
            Ok(line) => self.handle_line(line).await,
            Err(e) => Some(error_response(
                Value::Null,
                PARSE_ERROR,
                &format!("Parse error: {}", e),
            )),
        }
    }

    /// Handle one raw message. Returns the response to send back, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => Some(error_response(
                Value::Null,
                PARSE_ERROR,
                &format!("Parse error: {}", e),
            )),
        }
    }

    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let request: Request = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    INVALID_REQUEST,
                    &format!("Invalid request: {}", e),
                ))
            }
        };

        // requests without an id are notifications and get no answer
        let Some(id) = request.id else {
            tracing::debug!("Notification received: {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({
                "tools": Tool::ALL.iter().map(|t| t.definition()).collect::<Vec<_>>(),
            })),
            "tools/call" => self.call_tool(request.params).await,
            method => Err((METHOD_NOT_FOUND, format!("Method not found: {}", method))),
        };

        Some(match response {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => error_response(id, code, &message),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, (i64, String)> {
        let params: CallParams = params
            .ok_or_else(|| "missing params".to_string())
            .and_then(|p| serde_json::from_value(p).map_err(|e| e.to_string()))
            .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e)))?;

        let tool = Tool::from_name(&params.name)
            .ok_or_else(|| (INVALID_PARAMS, format!("Unknown tool: {}", params.name)))?;

        tracing::info!("Calling tool {}", tool.name());
        let outcome = tool
            .call(&self.ctx, params.arguments.unwrap_or_default())
            .await;

        Ok(tool_result(outcome))
    }
}

fn tool_result(outcome: Result<Value>) -> Value {
    match outcome {
        Ok(output) => {
            let text = output.to_string();
            let structured = if output.is_object() {
                output
            } else {
                json!({ "result": output })
            };
            json!({
                "content": [{ "type": "text", "text": text }],
                "structuredContent": structured,
                "isError": false,
            })
        }
        Err(e) => {
            tracing::error!("Tool call failed: {}", e);
            json!({
                "content": [{ "type": "text", "text": format!("{}: {}", e.kind(), e) }],
                "isError": true,
            })
        }
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Serve the tools over the configured transport until the client goes away.
pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let transport = ctx.config.server.transport;
    let mount_path = ctx.config.server.mount_path.clone();
    tracing::info!(
        "Starting MCP server using transport={} mount_path={:?}",
        transport,
        mount_path
    );

    let server = Arc::new(McpServer::new(ctx.clone()));

    match transport {
        Transport::Stdio => {
            stdio::run(&server, tokio::io::stdin(), tokio::io::stdout()).await
        }
        Transport::StreamableHttp => {
            http::run(server, &ctx.config.server.bind, mount_path.as_deref()).await
        }
        Transport::Sse => {
            sse::run(server, &ctx.config.server.bind, mount_path.as_deref()).await
        }
    }
}
