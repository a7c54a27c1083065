use crate::error::AppError;
use crate::fees::{FeeBreakdown, FeeEngine};
use crate::payments::{Payment, PaymentStatus, PaymentStore};
use crate::psp::router::PspRouter;
use crate::psp::types::PspCode;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProcessChargeCommand {
    pub merchant_id: i64,
    pub recipient_id: Option<i64>,
    pub card_token: String,
    pub amount: Decimal,
    pub currency: String,
    pub psp_hint: Option<PspCode>,
}

#[derive(Debug, Clone)]
pub struct ProcessedCharge {
    pub payment: Payment,
    pub fee_breakdown: FeeBreakdown,
    pub psp_used: PspCode,
}

/// Synchronous charge path: derive fees, route the charge through the
/// PSP orchestrator, persist the resulting payment.
///
/// The payment is created exactly once per successful orchestration
/// call: directly in `Captured` on provider success, `Failed` on a
/// routed decline. When routing exhausts both providers the error
/// propagates and no payment is written.
pub struct ChargeService {
    fee_engine: Arc<FeeEngine>,
    router: Arc<PspRouter>,
    payments: Arc<dyn PaymentStore>,
}

impl ChargeService {
    pub fn new(
        fee_engine: Arc<FeeEngine>,
        router: Arc<PspRouter>,
        payments: Arc<dyn PaymentStore>,
    ) -> Self {
        Self {
            fee_engine,
            router,
            payments,
        }
    }

    pub async fn process(&self, command: ProcessChargeCommand) -> Result<ProcessedCharge, AppError> {
        let fee_breakdown = self
            .fee_engine
            .compute(
                command.merchant_id,
                command.recipient_id,
                command.amount,
                &command.currency,
            )
            .await?;

        let routed = self
            .router
            .route(
                &command.card_token,
                fee_breakdown.base_amount,
                &command.currency,
                command.psp_hint,
            )
            .await?;

        let status = if routed.result.is_succeeded() {
            PaymentStatus::Captured
        } else {
            PaymentStatus::Failed
        };

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            merchant_id: command.merchant_id,
            recipient_id: command.recipient_id,
            psp: routed.psp_used,
            psp_reference: routed.result.psp_charge_id().to_string(),
            status,
            amount: fee_breakdown.base_amount,
            fee_total: fee_breakdown.total_fees,
            net_amount: fee_breakdown.final_amount,
            currency: command.currency.clone(),
            created_at: now,
            updated_at: now,
        };
        self.payments.save(payment.clone()).await;

        info!(
            payment_id = %payment.id,
            psp = %routed.psp_used,
            status = %payment.status,
            amount = %payment.amount,
            currency = %payment.currency,
            "charge processed"
        );

        Ok(ProcessedCharge {
            payment,
            fee_breakdown,
            psp_used: routed.psp_used,
        })
    }
}
