// Telemetry emission interface.
//
// The engine records access events; delivery to an actual telemetry
// backend is a collaborator's job, reached through the sink trait. The
// default sink writes structured log lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// One recorded data access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessEvent {
    pub event_id: Uuid,
    pub moniker: String,
    pub user_id: String,
    /// "api", "batch", "ui", ...
    pub source: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl AccessEvent {
    pub fn new(
        moniker: impl Into<String>,
        user_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            moniker: moniker.into(),
            user_id: user_id.into(),
            source: source.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            extra: BTreeMap::new(),
        }
    }
}

pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &AccessEvent);
}

/// Default sink: structured log lines under the `telemetry` target.
#[derive(Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn emit(&self, event: &AccessEvent) {
        info!(
            target: "telemetry",
            event_id = %event.event_id,
            moniker = %event.moniker,
            user_id = %event.user_id,
            source = %event.source,
            "access event"
        );
    }
}
