use crate::payments::{PaymentStatus, PaymentStore};
use crate::psp::types::{ChargeNotification, ChargeStatus};
use crate::webhooks::audit::{WebhookAuditEntry, WebhookAuditLog};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Applies asynchronous charge-outcome notifications to payments under
/// the idempotent, conflict-resolving rules of the payment state
/// machine.
///
/// `reconcile` never fails: ingress always acknowledges to the
/// provider, conflicts are resolved by precedence and logged, and a
/// notification for an unknown reference is recorded for audit only
/// (the payment may not be persisted yet, or belongs elsewhere).
pub struct WebhookReconciler {
    payments: Arc<dyn PaymentStore>,
    audit: Arc<dyn WebhookAuditLog>,
    // Serializes processing per provider reference so concurrent
    // deliveries for the same charge apply deterministically.
    reference_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WebhookReconciler {
    pub fn new(payments: Arc<dyn PaymentStore>, audit: Arc<dyn WebhookAuditLog>) -> Self {
        Self {
            payments,
            audit,
            reference_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn reconcile(&self, notification: ChargeNotification) {
        self.record_event(&notification).await;

        let lock = self.lock_for(&notification.provider_charge_id).await;
        let _guard = lock.lock().await;

        match notification.status {
            ChargeStatus::Succeeded => self.apply_success(&notification).await,
            ChargeStatus::Failed => self.apply_failure(&notification).await,
        }
    }

    async fn apply_success(&self, notification: &ChargeNotification) {
        let Some(mut payment) = self
            .payments
            .find_by_provider_reference(&notification.provider_charge_id)
            .await
        else {
            warn!(
                psp = %notification.provider_code,
                psp_reference = %notification.provider_charge_id,
                "succeeded webhook for unknown payment, event recorded"
            );
            return;
        };

        match payment.status {
            PaymentStatus::Captured => {
                info!(
                    payment_id = %payment.id,
                    psp_reference = %notification.provider_charge_id,
                    "ignoring SUCCEEDED for already captured payment"
                );
            }
            PaymentStatus::Failed => {
                // A provider cannot resurrect a charge already
                // terminalized as failed; late success is untrusted.
                warn!(
                    payment_id = %payment.id,
                    psp_reference = %notification.provider_charge_id,
                    "received SUCCEEDED for failed payment, keeping FAILED"
                );
            }
            PaymentStatus::Refunded => {
                warn!(
                    payment_id = %payment.id,
                    psp_reference = %notification.provider_charge_id,
                    "received SUCCEEDED for refunded payment, keeping REFUNDED"
                );
            }
            PaymentStatus::Pending | PaymentStatus::Authorized => {
                info!(
                    payment_id = %payment.id,
                    from = %payment.status,
                    "marking payment captured via webhook"
                );
                payment.status = PaymentStatus::Captured;
                payment.updated_at = Utc::now();
                self.payments.save(payment).await;
            }
        }
    }

    async fn apply_failure(&self, notification: &ChargeNotification) {
        let Some(mut payment) = self
            .payments
            .find_by_provider_reference(&notification.provider_charge_id)
            .await
        else {
            warn!(
                psp = %notification.provider_code,
                psp_reference = %notification.provider_charge_id,
                "failed webhook for unknown payment, event recorded"
            );
            return;
        };

        match payment.status {
            PaymentStatus::Failed => {
                info!(
                    payment_id = %payment.id,
                    psp_reference = %notification.provider_charge_id,
                    "ignoring FAILED for already failed payment"
                );
            }
            PaymentStatus::Captured => {
                // Captured funds are not un-captured by a failure notice.
                warn!(
                    payment_id = %payment.id,
                    psp_reference = %notification.provider_charge_id,
                    "received FAILED for captured payment, keeping CAPTURED"
                );
            }
            PaymentStatus::Refunded => {
                warn!(
                    payment_id = %payment.id,
                    psp_reference = %notification.provider_charge_id,
                    "received FAILED for refunded payment, keeping REFUNDED"
                );
            }
            PaymentStatus::Pending | PaymentStatus::Authorized => {
                info!(
                    payment_id = %payment.id,
                    from = %payment.status,
                    failure_code = notification.failure_code.as_deref().unwrap_or(""),
                    "marking payment failed via webhook"
                );
                payment.status = PaymentStatus::Failed;
                payment.updated_at = Utc::now();
                self.payments.save(payment).await;
            }
        }
    }

    /// Audit append happens before the state transition so a replayable
    /// record exists even when the transition is skipped.
    async fn record_event(&self, notification: &ChargeNotification) {
        let event_type = match notification.status {
            ChargeStatus::Succeeded => "CHARGE_SUCCEEDED",
            ChargeStatus::Failed => "CHARGE_FAILED",
        };
        let payload =
            serde_json::to_value(notification).unwrap_or_else(|_| serde_json::json!({}));

        self.audit
            .append(WebhookAuditEntry {
                psp: notification.provider_code,
                event_type: event_type.to_string(),
                payload,
                received_at: Utc::now(),
            })
            .await;
    }

    async fn lock_for(&self, reference: &str) -> Arc<Mutex<()>> {
        let mut locks = self.reference_locks.lock().await;
        locks
            .entry(reference.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
