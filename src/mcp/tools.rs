//! Static tool and resource definitions advertised by `tools/list` and
//! `resources/list`.

use serde_json::{json, Value};

/// Name of the single exposed tool.
pub const TASK_STATUS_TOOL: &str = "task_status";

/// URI of the read-only settings resource.
pub const SETTINGS_RESOURCE_URI: &str = "config://notification-settings";

/// One advertised tool.
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// One advertised resource.
pub struct ResourceDef {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

/// The fixed tool set: just `task_status`.
pub fn tool_definitions() -> Vec<ToolDef> {
    vec![ToolDef {
        name: TASK_STATUS_TOOL,
        description: "Post a desktop notification for a task status change. \
                      Status should be 'start', 'complete' or 'error'; anything \
                      else is treated as 'complete'.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "description": "Status to report: 'start', 'complete' or 'error'"
                },
                "title": {
                    "type": "string",
                    "description": "Custom notification title"
                },
                "message": {
                    "type": "string",
                    "description": "Custom notification message"
                },
                "sound": {
                    "type": "string",
                    "description": "System sound name, e.g. 'Glass'"
                }
            },
            "required": ["status"]
        }),
    }]
}

/// The fixed resource set: the resolved notification settings.
pub fn resource_definitions() -> Vec<ResourceDef> {
    vec![ResourceDef {
        uri: SETTINGS_RESOURCE_URI,
        name: "Notification settings",
        description: "Resolved title, message and sound for every status \
                      category, plus the available system sounds",
        mime_type: "application/json",
    }]
}
