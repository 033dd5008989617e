//! task-notify-mcp: an MCP server that turns `task_status` tool calls into
//! macOS desktop notifications.
//!
//! Architecture:
//! - `config`   -- notification categories, defaults, env override resolver
//! - `dispatch` -- the `task_status` operation and its result boundary
//! - `notify`   -- notifier trait plus the `afplay`/`osascript` backend
//! - `mcp`      -- JSON-RPC 2.0 stdio transport, tool/resource definitions

pub mod config;
pub mod dispatch;
pub mod mcp;
pub mod notify;
