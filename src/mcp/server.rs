//! MCP JSON-RPC protocol handler over stdio.
//!
//! Reads newline-delimited JSON-RPC requests, routes protocol methods, and
//! runs every `tools/call` on its own task so a dispatch blocked inside an
//! external command never stalls the read loop. All responses funnel
//! through a single writer task; JSON-RPC ids give clients the correlation,
//! so out-of-order completion is fine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::{handlers, tools};
use crate::notify::Notifier;

/// MCP protocol revision implemented by this server.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported in the `initialize` handshake.
const SERVER_NAME: &str = "task-notify";

// ---------------------------------------------------------------------------
// JSON-RPC message types
// ---------------------------------------------------------------------------

/// Incoming JSON-RPC request or notification.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.into() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Per-process state shared by in-flight calls. Deliberately immutable:
/// configuration is re-read from the environment on every lookup and
/// results carry no cross-call identity, so concurrent dispatches need no
/// locking.
pub struct ServerState<N> {
    notifier: N,
}

impl<N: Notifier> ServerState<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }
}

/// Run the MCP server over stdin/stdout until stdin closes. Diagnostics go
/// to stderr via `tracing`; stdout carries only JSON-RPC lines.
pub async fn run_server<N: Notifier + 'static>(notifier: N) -> anyhow::Result<()> {
    serve(tokio::io::stdin(), tokio::io::stdout(), notifier).await
}

/// Drive the protocol over arbitrary reader/writer halves. Tests run this
/// against an in-memory duplex instead of real stdio.
pub async fn serve<R, W, N>(reader: R, writer: W, notifier: N) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    N: Notifier + 'static,
{
    let state = Arc::new(ServerState::new(notifier));
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Single writer task: response lines from concurrently finishing calls
    // must not interleave mid-line.
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                error!("Failed to write response: {}", e);
                break;
            }
            if let Err(e) = writer.flush().await {
                error!("Failed to flush output: {}", e);
                break;
            }
        }
    });

    info!("{} MCP server listening on stdio", SERVER_NAME);

    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                send_response(
                    &tx,
                    JsonRpcResponse::error(Value::Null, -32700, format!("Invalid JSON: {}", e)),
                );
                continue;
            }
        };

        if request.jsonrpc != "2.0" {
            if let Some(id) = request.id {
                send_response(&tx, JsonRpcResponse::error(id, -32600, "Invalid JSON-RPC version"));
            }
            continue;
        }

        dispatch_request(&state, &tx, request);
    }

    info!("stdin closed, shutting down");

    // Dropping the loop's sender leaves only in-flight calls holding the
    // channel; the writer drains their responses and then exits.
    drop(tx);
    let _ = writer_task.await;
    Ok(())
}

/// Route one message. Responses, if any, are pushed into the writer
/// channel. `tools/call` is spawned so the read loop keeps going.
fn dispatch_request<N: Notifier + 'static>(
    state: &Arc<ServerState<N>>,
    tx: &UnboundedSender<String>,
    request: JsonRpcRequest,
) {
    let JsonRpcRequest { id, method, params, .. } = request;

    match (method.as_str(), id) {
        ("initialize", Some(id)) => send_response(tx, handle_initialize(id)),
        ("ping", Some(id)) => send_response(tx, JsonRpcResponse::success(id, json!({}))),
        ("tools/list", Some(id)) => send_response(tx, handle_tools_list(id)),
        ("resources/list", Some(id)) => send_response(tx, handle_resources_list(id)),
        ("resources/read", Some(id)) => send_response(tx, handle_resources_read(id, &params)),
        ("tools/call", Some(id)) => {
            // A dispatch can sit inside afplay or osascript for a while;
            // keep it off the read loop.
            let state = state.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = handle_tools_call(&state, id, &params).await;
                send_response(&tx, response);
            });
        }
        ("initialized" | "notifications/initialized", _) => {
            info!("Client completed initialization");
        }
        ("notifications/cancelled", _) => {
            // No cancellation semantics: in-flight dispatches run to completion.
            debug!("Cancellation notice ignored");
        }
        (_, Some(id)) => {
            send_response(tx, JsonRpcResponse::error(id, -32601, format!("Unknown method: {}", method)));
        }
        (_, None) => {
            debug!("Ignoring notification '{}'", method);
        }
    }
}

/// Handle `initialize` -- advertise protocol revision, capabilities and
/// server identity.
fn handle_initialize(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

/// Handle `tools/list`.
fn handle_tools_list(id: Value) -> JsonRpcResponse {
    let defs: Vec<Value> = tools::tool_definitions()
        .into_iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema
            })
        })
        .collect();
    JsonRpcResponse::success(id, json!({ "tools": defs }))
}

/// Handle `resources/list`.
fn handle_resources_list(id: Value) -> JsonRpcResponse {
    let defs: Vec<Value> = tools::resource_definitions()
        .into_iter()
        .map(|r| {
            json!({
                "uri": r.uri,
                "name": r.name,
                "description": r.description,
                "mimeType": r.mime_type
            })
        })
        .collect();
    JsonRpcResponse::success(id, json!({ "resources": defs }))
}

/// Handle `resources/read` -- only the settings resource exists.
fn handle_resources_read(id: Value, params: &Value) -> JsonRpcResponse {
    let uri = params.get("uri").and_then(|v| v.as_str()).unwrap_or("");
    if uri != tools::SETTINGS_RESOURCE_URI {
        return JsonRpcResponse::error(id, -32002, format!("Unknown resource: {}", uri));
    }

    match handlers::settings_text() {
        Ok(text) => JsonRpcResponse::success(
            id,
            json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": text
                }]
            }),
        ),
        Err(e) => JsonRpcResponse::error(id, -32603, format!("Failed to serialize settings: {}", e)),
    }
}

/// Handle `tools/call` -- route to the tool implementation.
async fn handle_tools_call<N: Notifier>(
    state: &ServerState<N>,
    id: Value,
    params: &Value,
) -> JsonRpcResponse {
    let tool = match params.get("name").and_then(|v| v.as_str()) {
        Some(tool) => tool,
        None => return JsonRpcResponse::error(id, -32602, "Missing tool name in params"),
    };
    let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let result = match tool {
        tools::TASK_STATUS_TOOL => handlers::handle_task_status(&state.notifier, &args).await,
        _ => handlers::McpToolResult::error(format!("Unknown tool: {}", tool)),
    };

    match serde_json::to_value(&result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, format!("Failed to serialize tool result: {}", e)),
    }
}

/// Serialize a response and push it into the writer channel as one line.
fn send_response(tx: &UnboundedSender<String>, response: JsonRpcResponse) {
    match serde_json::to_string(&response) {
        Ok(json) => {
            if tx.send(format!("{}\n", json)).is_err() {
                warn!("Writer task gone, dropping response");
            }
        }
        Err(e) => error!("Failed to serialize response: {}", e),
    }
}
