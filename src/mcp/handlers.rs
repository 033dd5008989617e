//! Tool and resource handler implementations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::dispatch::{dispatch, StatusRequest};
use crate::notify::Notifier;

/// Result of a tool execution, in the MCP wire shape:
/// `{ "content": [{ "type": "text", "text": "..." }], "isError": false }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

/// A single content item in a tool result. Only text is produced here, but
/// the tag layout matches the protocol so other kinds can be added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl McpToolResult {
    /// Successful result carrying one text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error result carrying one text item.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: true,
        }
    }
}

/// `task_status` -- dispatch one notification and return the outcome as
/// JSON text.
pub async fn handle_task_status<N: Notifier>(notifier: &N, args: &Value) -> McpToolResult {
    let status = match args.get("status").and_then(|v| v.as_str()) {
        Some(status) => status.to_string(),
        None => return McpToolResult::error("Error: status is required"),
    };

    let req = StatusRequest {
        status,
        title: string_arg(args, "title"),
        message: string_arg(args, "message"),
        sound: string_arg(args, "sound"),
    };

    let result = dispatch(notifier, req).await;
    match serde_json::to_string_pretty(&result) {
        Ok(json) => McpToolResult::text(json),
        Err(e) => McpToolResult::error(format!("Error: failed to serialize result: {}", e)),
    }
}

/// Serialized settings snapshot served by the `config://` resource.
/// Recomputed on every read so environment changes show up immediately.
pub fn settings_text() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&config::snapshot())
}

fn string_arg(args: &Value, name: &str) -> Option<String> {
    args.get(name).and_then(|v| v.as_str()).map(|s| s.to_string())
}
