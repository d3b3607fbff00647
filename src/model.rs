//! Wire types shared by the gateway, the live log channel and the panel
//!
//! Field names follow the service's JSON (camelCase where the service uses it).
//! Unknown fields are ignored so newer services stay readable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// One log record emitted by the service
///
/// Identity is positional: two entries with identical fields are still distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Epoch seconds (fractional)
    pub created: f64,
    /// Level name as sent by the service (`INFO`, `ERROR`, ...)
    pub level: String,
    pub message: String,
    /// Name of the service-side logger that produced the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn new(created: f64, level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            created,
            level: level.into(),
            message: message.into(),
            logger: None,
        }
    }

    /// `created` as local wall-clock time, `HH:MM:SS`
    #[must_use]
    pub fn local_time(&self) -> String {
        let secs = self.created.floor();
        let nanos = ((self.created - secs) * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs as i64, nanos).map_or_else(
            || "--:--:--".to_string(),
            |t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
        )
    }
}

/// Lifecycle state reported by `GET /api/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
    Stopping,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServiceState {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::Stopping => "Stopping",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of the service status
///
/// Never mutated locally; replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    #[serde(default)]
    pub state: ServiceState,
    /// `Version` from the service's YAML; a bare number there arrives as a JSON number
    #[serde(default, deserialize_with = "version_text")]
    pub config_version: Option<String>,
    #[serde(default)]
    pub media_executors: Vec<String>,
    #[serde(default)]
    pub config_path: Option<String>,
    /// Whether the service's worker loop is alive, independent of `state`
    #[serde(default)]
    pub running: bool,
}

impl ServiceStatus {
    #[must_use]
    pub fn with_state(state: ServiceState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
}

/// Any scalar as text; `null` as absent
fn version_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Response of `GET /api/config`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub content: String,
    /// Absolute path of the file on the service host
    #[serde(default)]
    pub path: Option<String>,
}

/// Body of `PUT /api/config`
#[derive(Debug, Clone, Serialize)]
pub struct SaveConfigRequest<'a> {
    pub content: &'a str,
    pub reload: bool,
}

/// Response of `GET /api/logs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

/// Control operations exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlOp {
    Start,
    Stop,
    Reload,
}

impl ControlOp {
    /// All operations in display order
    pub const ALL: [Self; 3] = [Self::Start, Self::Stop, Self::Reload];

    /// API path for this operation
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Start => "/api/start",
            Self::Stop => "/api/stop",
            Self::Reload => "/api/reload",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Reload => "Reload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_parses_service_payload() {
        let json = r#"{
            "state": "running",
            "configVersion": "1.4",
            "mediaExecutors": ["Emby"],
            "configPath": "/srv/poster/config.yaml",
            "running": true
        }"#;
        let status: ServiceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, ServiceState::Running);
        assert_eq!(status.config_version.as_deref(), Some("1.4"));
        assert_eq!(status.media_executors, vec!["Emby".to_string()]);
        assert_eq!(status.config_path.as_deref(), Some("/srv/poster/config.yaml"));
        assert!(status.running);
    }

    #[test]
    fn numeric_config_version_is_kept_as_text() {
        let status: ServiceStatus =
            serde_json::from_str(r#"{"state":"running","configVersion":1.0}"#).unwrap();
        assert_eq!(status.state, ServiceState::Running);
        assert_eq!(status.config_version.as_deref(), Some("1.0"));

        let status: ServiceStatus = serde_json::from_str(r#"{"configVersion":2}"#).unwrap();
        assert_eq!(status.config_version.as_deref(), Some("2"));

        let status: ServiceStatus = serde_json::from_str(r#"{"configVersion":null}"#).unwrap();
        assert_eq!(status.config_version, None);
    }

    #[test]
    fn unrecognized_state_is_unknown() {
        let status: ServiceStatus = serde_json::from_str(r#"{"state":"warming-up"}"#).unwrap();
        assert_eq!(status.state, ServiceState::Unknown);

        let status: ServiceStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status.state, ServiceState::Unknown);
    }

    #[test]
    fn log_entry_accepts_logger_field() {
        let entry: LogEntry = serde_json::from_str(
            r#"{"level":"INFO","message":"hello","created":1700000000.25,"logger":"app.manager"}"#,
        )
        .unwrap();
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.logger.as_deref(), Some("app.manager"));
        assert!((entry.created - 1_700_000_000.25).abs() < f64::EPSILON);
    }

    #[test]
    fn local_time_is_clock_formatted() {
        let time = LogEntry::new(1_700_000_000.5, "INFO", "x").local_time();
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
        assert_eq!(LogEntry::new(f64::MAX, "INFO", "x").local_time(), "--:--:--");
    }

    #[test]
    fn log_entry_requires_core_fields() {
        assert!(serde_json::from_str::<LogEntry>(r#"{"level":"INFO"}"#).is_err());
    }

    #[test]
    fn save_request_serializes_reload_flag() {
        let body = serde_json::to_value(SaveConfigRequest {
            content: "a: 1",
            reload: false,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"content": "a: 1", "reload": false}));
    }
}
