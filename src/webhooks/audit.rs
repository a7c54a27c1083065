use crate::psp::types::PspCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

/// One received notification, recorded verbatim for replay and
/// debugging regardless of what the reconciliation decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAuditEntry {
    pub psp: PspCode,
    pub event_type: String,
    pub payload: JsonValue,
    pub received_at: DateTime<Utc>,
}

#[async_trait]
pub trait WebhookAuditLog: Send + Sync {
    async fn append(&self, entry: WebhookAuditEntry);
}

#[derive(Default)]
pub struct InMemoryWebhookAuditLog {
    entries: RwLock<Vec<WebhookAuditEntry>>,
}

impl InMemoryWebhookAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<WebhookAuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl WebhookAuditLog for InMemoryWebhookAuditLog {
    async fn append(&self, entry: WebhookAuditEntry) {
        self.entries.write().await.push(entry);
    }
}
