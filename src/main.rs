//! MCP server binary. Speaks JSON-RPC over stdio; all diagnostics go to
//! stderr so stdout stays clean for the protocol.
//!
//! Environment:
//! - `TASK_NOTIFY_<CATEGORY>_<SETTING>` -- override a notification default,
//!   e.g. `TASK_NOTIFY_ERROR_SOUND=Sosumi`
//! - `RUST_LOG` -- tracing filter, defaults to `info`

use task_notify_mcp::mcp::server::run_server;
use task_notify_mcp::notify::MacNotifier;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run_server(MacNotifier).await {
        eprintln!("task-notify-mcp error: {}", e);
        std::process::exit(1);
    }
}
