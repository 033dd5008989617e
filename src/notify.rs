//! Desktop notification backend.
//!
//! The dispatcher talks to a [`Notifier`] trait so tests can substitute a
//! recording fake; the production implementation shells out to macOS:
//! - `afplay /System/Library/Sounds/<name>.aiff` for the optional sound
//! - `osascript -e 'display notification ...'` for the banner
//!
//! Both commands run with their output discarded. The returned boolean
//! means "both commands could be launched", not "the banner was shown";
//! exit statuses are ignored on purpose, fire-and-forget.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

/// Directory holding the built-in macOS alert sounds.
pub const SOUND_DIR: &str = "/System/Library/Sounds";

/// Extension appended to bare sound names.
pub const SOUND_EXT: &str = ".aiff";

/// Capability of posting one desktop notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a banner with `title` and `message`, playing `sound` first when
    /// given. Returns `false` when an OS command could not be launched;
    /// never errors.
    async fn notify(&self, title: &str, message: &str, sound: Option<&str>) -> bool;
}

/// Production backend for the macOS Notification Center.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacNotifier;

#[async_trait]
impl Notifier for MacNotifier {
    async fn notify(&self, title: &str, message: &str, sound: Option<&str>) -> bool {
        match send_notification(title, message, sound).await {
            Ok(()) => true,
            Err(e) => {
                error!("Notification backend error: {:#}", e);
                false
            }
        }
    }
}

async fn send_notification(title: &str, message: &str, sound: Option<&str>) -> anyhow::Result<()> {
    if let Some(name) = sound {
        let path = sound_path(name);
        // Playback is best-effort: a nonzero exit (bad name, muted output)
        // must not keep the banner from showing, so only the launch itself
        // is checked.
        let status = Command::new("afplay")
            .arg(&path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("failed to launch afplay for {}", path.display()))?;
        if !status.success() {
            debug!("afplay exited with {} for {}", status, path.display());
        }
    }

    let script = banner_script(title, message);
    let status = Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .context("failed to launch osascript")?;
    if !status.success() {
        debug!("osascript exited with {}", status);
    }

    Ok(())
}

/// File name for a sound: append [`SOUND_EXT`] unless already present, so
/// an override like `Basso.aiff` is not doubled.
fn sound_file_name(name: &str) -> String {
    if name.ends_with(SOUND_EXT) {
        name.to_string()
    } else {
        format!("{}{}", name, SOUND_EXT)
    }
}

/// Absolute path of a named system sound.
fn sound_path(name: &str) -> PathBuf {
    PathBuf::from(SOUND_DIR).join(sound_file_name(name))
}

/// Escape a string for interpolation into a double-quoted AppleScript
/// string literal.
fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The `display notification` one-liner handed to `osascript -e`.
fn banner_script(title: &str, message: &str) -> String {
    format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(message),
        applescript_escape(title)
    )
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
