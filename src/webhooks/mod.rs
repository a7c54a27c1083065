pub mod audit;
pub mod reconciler;

pub use audit::{InMemoryWebhookAuditLog, WebhookAuditEntry, WebhookAuditLog};
pub use reconciler::WebhookReconciler;
