//! MCP (Model Context Protocol) surface.
//!
//! Architecture:
//! - `server.rs`   -- JSON-RPC 2.0 over stdio: read loop, routing, writer task
//! - `tools.rs`    -- static tool and resource definitions
//! - `handlers.rs` -- the `task_status` tool and the settings resource

pub mod handlers;
pub mod server;
pub mod tools;
