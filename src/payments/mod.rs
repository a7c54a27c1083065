use crate::psp::types::PspCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Payment lifecycle: `PENDING → {AUTHORIZED, CAPTURED, FAILED} → REFUNDED`.
///
/// The synchronous charge path creates payments directly in `Captured`
/// or `Failed`; only the webhook reconciler moves them afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Authorized,
    Captured,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn valid_transitions(&self) -> &'static [PaymentStatus] {
        match self {
            PaymentStatus::Pending => &[
                PaymentStatus::Authorized,
                PaymentStatus::Captured,
                PaymentStatus::Failed,
            ],
            PaymentStatus::Authorized => &[PaymentStatus::Captured, PaymentStatus::Failed],
            PaymentStatus::Captured => &[PaymentStatus::Refunded],
            PaymentStatus::Failed => &[PaymentStatus::Refunded],
            PaymentStatus::Refunded => &[],
        }
    }

    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Refunded)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Authorized => "AUTHORIZED",
            PaymentStatus::Captured => "CAPTURED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub merchant_id: i64,
    pub recipient_id: Option<i64>,
    pub psp: PspCode,
    pub psp_reference: String,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub fee_total: Decimal,
    pub net_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence port for payments; the schema behind it is an external
/// concern.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn save(&self, payment: Payment);

    async fn find_by_id(&self, id: Uuid) -> Option<Payment>;

    async fn find_by_provider_reference(&self, psp_reference: &str) -> Option<Payment>;
}

#[derive(Default)]
pub struct InMemoryPaymentStore {
    payments: RwLock<HashMap<Uuid, Payment>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn save(&self, payment: Payment) {
        self.payments.write().await.insert(payment.id, payment);
    }

    async fn find_by_id(&self, id: Uuid) -> Option<Payment> {
        self.payments.read().await.get(&id).cloned()
    }

    async fn find_by_provider_reference(&self, psp_reference: &str) -> Option<Payment> {
        self.payments
            .read()
            .await
            .values()
            .find(|p| p.psp_reference == psp_reference)
            .cloned()
    }
}
