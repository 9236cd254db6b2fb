// Audit trail entries for catalog changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    /// ISO-8601 timestamp.
    pub timestamp: String,
    pub path: String,
    /// created, updated, status_changed, ownership_changed
    pub action: String,
    pub actor: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn status_changed(
        path: impl Into<String>,
        actor: impl Into<String>,
        old_status: impl Into<String>,
        new_status: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            path: path.into(),
            action: "status_changed".to_string(),
            actor: actor.into(),
            old_value: Some(old_status.into()),
            new_value: Some(new_status.into()),
            details: None,
        }
    }
}
