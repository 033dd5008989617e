//! Demo client: spawn the server binary, call `task_status` once, print
//! the result.
//!
//! Usage: `call_status [status] [message] [title] [sound]`
//!
//! With no arguments it sends `{"status": "success"}`, which the server
//! coerces to a `complete` notification. The server binary is found next
//! to this executable, or wherever `TASK_NOTIFY_SERVER` points.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{ChildStdin, ChildStdout, Command};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let status = args.next().unwrap_or_else(|| "success".to_string());
    let mut payload = json!({ "status": status });
    if let Some(message) = args.next() {
        payload["message"] = json!(message);
    }
    if let Some(title) = args.next() {
        payload["title"] = json!(title);
    }
    if let Some(sound) = args.next() {
        payload["sound"] = json!(sound);
    }

    let server = resolve_server_binary()?;
    let mut child = Command::new(&server)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {}", server.display()))?;

    let mut stdin = child.stdin.take().context("server stdin unavailable")?;
    let stdout = child.stdout.take().context("server stdout unavailable")?;
    let mut responses = BufReader::new(stdout).lines();

    // MCP handshake.
    send(
        &mut stdin,
        &json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "call_status", "version": env!("CARGO_PKG_VERSION") }
            }
        }),
    )
    .await?;
    let init = read_response(&mut responses, 1).await?;
    let name = init["result"]["serverInfo"]["name"].as_str().unwrap_or("unknown");
    info!("Connected to {}", name);

    send(&mut stdin, &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })).await?;

    // The one call this client exists for.
    send(
        &mut stdin,
        &json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "task_status", "arguments": payload }
        }),
    )
    .await?;
    let reply = read_response(&mut responses, 2).await?;

    if let Some(error) = reply.get("error") {
        bail!("tools/call failed: {}", error);
    }
    for item in reply["result"]["content"].as_array().into_iter().flatten() {
        if let Some(text) = item["text"].as_str() {
            println!("{}", text);
        }
    }

    // Closing stdin EOFs the server, which then exits on its own.
    drop(stdin);
    let exit = child.wait().await.context("failed waiting for server exit")?;
    if !exit.success() {
        bail!("server exited with {}", exit);
    }
    Ok(())
}

/// Send one JSON-RPC message as a single line.
async fn send(stdin: &mut ChildStdin, msg: &Value) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
}

/// Read lines until the response with the given id arrives; anything else
/// (server-initiated notifications) is skipped.
async fn read_response(responses: &mut Lines<BufReader<ChildStdout>>, id: i64) -> anyhow::Result<Value> {
    while let Some(line) = responses.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let msg: Value = serde_json::from_str(&line)
            .with_context(|| format!("invalid JSON from server: {}", line))?;
        if msg.get("id").and_then(|v| v.as_i64()) == Some(id) {
            return Ok(msg);
        }
    }
    bail!("server closed the pipe before answering request {}", id)
}

/// Locate the server binary: explicit override first, then next to this
/// executable (both bins land in the same target directory).
fn resolve_server_binary() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TASK_NOTIFY_SERVER") {
        return Ok(PathBuf::from(path));
    }

    let name = if cfg!(windows) { "task-notify-mcp.exe" } else { "task-notify-mcp" };
    let exe = std::env::current_exe().context("cannot locate current executable")?;
    if let Some(dir) = exe.parent() {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    bail!(
        "server binary '{}' not found next to {}; build it first or set TASK_NOTIFY_SERVER",
        name,
        exe.display()
    )
}
