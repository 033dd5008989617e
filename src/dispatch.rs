//! The `task_status` operation: status normalization, configuration
//! fill-in, backend invocation, and the catch-all result boundary.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{self, NotificationKind};
use crate::notify::Notifier;

/// Caller-supplied arguments for one dispatch. Only `status` is required;
/// absent fields are filled from configuration.
#[derive(Debug, Clone, Default)]
pub struct StatusRequest {
    pub status: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub sound: Option<String>,
}

/// Outcome of one dispatch. Success and failure share the shape; fields
/// that do not apply are omitted from the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<NotificationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix epoch seconds at the moment the result was built.
    pub timestamp: f64,
}

impl DispatchResult {
    /// Result for a dispatch that ran to completion. `success` reports
    /// whether the backend could launch its commands, nothing more.
    fn dispatched(success: bool, category: NotificationKind, title: String, message: String) -> Self {
        Self {
            success,
            category: Some(category),
            title: Some(title),
            message: Some(message),
            error: None,
            timestamp: unix_now(),
        }
    }

    /// Result for a dispatch aborted by an internal error.
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            category: None,
            title: None,
            message: None,
            error: Some(error.into()),
            timestamp: unix_now(),
        }
    }
}

/// Current wall-clock time as Unix epoch seconds.
fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Run one `task_status` dispatch. Never fails: any internal error is
/// converted into a `success=false` result at this boundary.
pub async fn dispatch<N: Notifier>(notifier: &N, req: StatusRequest) -> DispatchResult {
    match run(notifier, req).await {
        Ok(result) => result,
        Err(e) => {
            error!("Notification dispatch failed: {:#}", e);
            DispatchResult::failed(format!("{:#}", e))
        }
    }
}

async fn run<N: Notifier>(notifier: &N, req: StatusRequest) -> anyhow::Result<DispatchResult> {
    let kind = match NotificationKind::parse(&req.status) {
        Some(kind) => kind,
        None => {
            warn!("Unknown notification status '{}', treating as 'complete'", req.status);
            NotificationKind::Complete
        }
    };

    let title = match req.title {
        Some(title) => title,
        None => resolve_required(kind, "title")?,
    };
    let message = match req.message {
        Some(message) => message,
        None => resolve_required(kind, "message")?,
    };
    let sound = match req.sound {
        Some(sound) => sound,
        None => resolve_required(kind, "sound")?,
    };

    info!("Sending notification: {} - {}", kind, title);
    let success = notifier.notify(&title, &message, Some(&sound)).await;

    Ok(DispatchResult::dispatched(success, kind, title, message))
}

fn resolve_required(kind: NotificationKind, setting: &str) -> anyhow::Result<String> {
    config::resolve_setting(kind, setting)
        .with_context(|| format!("no configuration for setting '{}'", setting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::{clear_overrides, env_guard};
    use crate::notify::testing::RecordingNotifier;

    fn request(status: &str) -> StatusRequest {
        StatusRequest { status: status.to_string(), ..Default::default() }
    }

    #[tokio::test]
    async fn test_unknown_status_falls_back_to_complete() {
        let _env = env_guard();
        clear_overrides();
        let notifier = RecordingNotifier::succeeding();

        let result = dispatch(&notifier, request("success")).await;

        assert!(result.success);
        assert_eq!(result.category, Some(NotificationKind::Complete));
        assert_eq!(result.title.as_deref(), Some("Processing finished"));
        assert_eq!(result.message.as_deref(), Some("Processing is complete"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_status_is_case_insensitive() {
        let _env = env_guard();
        clear_overrides();
        let notifier = RecordingNotifier::succeeding();

        let result = dispatch(&notifier, request("ERROR")).await;

        assert_eq!(result.category, Some(NotificationKind::Error));
        let calls = notifier.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].sound.as_deref(), Some("Basso"));
    }

    #[tokio::test]
    async fn test_explicit_fields_override_defaults() {
        let _env = env_guard();
        clear_overrides();
        let notifier = RecordingNotifier::succeeding();

        let req = StatusRequest {
            status: "start".to_string(),
            title: Some("Batch Job".to_string()),
            message: Some("Job has started".to_string()),
            sound: None,
        };
        let result = dispatch(&notifier, req).await;

        assert_eq!(result.category, Some(NotificationKind::Start));
        assert_eq!(result.title.as_deref(), Some("Batch Job"));
        assert_eq!(result.message.as_deref(), Some("Job has started"));

        // The unset field still comes from configuration.
        let calls = notifier.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "Batch Job");
        assert_eq!(calls[0].message, "Job has started");
        assert_eq!(calls[0].sound.as_deref(), Some("Glass"));
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported_not_raised() {
        let _env = env_guard();
        clear_overrides();
        let notifier = RecordingNotifier::failing();

        let result = dispatch(&notifier, request("error")).await;

        assert!(!result.success);
        assert_eq!(result.category, Some(NotificationKind::Error));
        assert_eq!(result.title.as_deref(), Some("Processing error"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_timestamp_is_populated() {
        let _env = env_guard();
        clear_overrides();
        let notifier = RecordingNotifier::succeeding();

        let result = dispatch(&notifier, request("complete")).await;

        // Sanity bound: well past 2001-09-09 (epoch 1e9).
        assert!(result.timestamp > 1_000_000_000.0);
    }

    #[test]
    fn test_result_serialization_omits_absent_fields() {
        let ok = DispatchResult::dispatched(
            true,
            NotificationKind::Complete,
            "t".to_string(),
            "m".to_string(),
        );
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["category"], "complete");
        assert!(value.get("error").is_none());

        let failed = DispatchResult::failed("boom");
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("category").is_none());
        assert!(value.get("title").is_none());
    }
}
