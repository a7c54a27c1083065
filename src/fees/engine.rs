use crate::fees::{round2, FeeBreakdown, MerchantFeeConfigStore};
use crate::fx::{round6, FxError, FxRateProvider};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Error)]
pub enum FeeError {
    #[error("merchant fee config not found for merchant {merchant_id}")]
    MerchantConfigMissing { merchant_id: i64 },

    #[error(transparent)]
    Rate(#[from] FxError),
}

/// Payout-conversion settings. Conversion is informational: it is
/// logged for settlement visibility and never alters the returned
/// breakdown, which stays in the charge currency.
#[derive(Debug, Clone)]
pub struct FxSettings {
    pub enabled: bool,
    pub payout_currency: String,
    pub markup_pct: Decimal,
}

impl Default for FxSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            payout_currency: "MXN".to_string(),
            markup_pct: Decimal::ZERO,
        }
    }
}

pub struct FeeEngine {
    configs: Arc<dyn MerchantFeeConfigStore>,
    fx_rates: Arc<dyn FxRateProvider>,
    fx: FxSettings,
}

impl FeeEngine {
    pub fn new(
        configs: Arc<dyn MerchantFeeConfigStore>,
        fx_rates: Arc<dyn FxRateProvider>,
        fx: FxSettings,
    ) -> Self {
        Self {
            configs,
            fx_rates,
            fx,
        }
    }

    /// Derives the fee breakdown for one charge. Fixed step order, each
    /// monetary intermediate rounded to two decimals half-up before the
    /// next step consumes it.
    pub async fn compute(
        &self,
        merchant_id: i64,
        _recipient_id: Option<i64>,
        amount: Decimal,
        currency: &str,
    ) -> Result<FeeBreakdown, FeeError> {
        let config = self
            .configs
            .find_by_merchant(merchant_id)
            .await
            .ok_or(FeeError::MerchantConfigMissing { merchant_id })?;

        let base_amount = round2(amount);

        let processing_fee = round2(base_amount * config.percentage_fee.unwrap_or_default())
            + config.fixed_fee.unwrap_or_default();
        let fx_fee = round2(base_amount * config.fx_markup_pct.unwrap_or_default());

        // Reserved extension point: incentive rules are not evaluated
        // in the core path.
        let incentive_discount = Decimal::ZERO;

        let total_fees = processing_fee + fx_fee - incentive_discount;
        let final_amount = base_amount - total_fees;

        if self.fx.enabled && !currency.eq_ignore_ascii_case(&self.fx.payout_currency) {
            let quote = self.fx_rates.quote(currency, &self.fx.payout_currency).await?;
            let adjusted_rate = round6(quote.effective_rate * (Decimal::ONE + self.fx.markup_pct));
            let payout_amount = round2(final_amount * adjusted_rate);
            info!(
                merchant_id,
                net = %final_amount,
                currency,
                provider_rate = %quote.effective_rate,
                rate_with_markup = %adjusted_rate,
                payout = %payout_amount,
                payout_currency = %self.fx.payout_currency,
                "fx payout breakdown"
            );
        }

        Ok(FeeBreakdown {
            base_amount,
            processing_fee: round2(processing_fee),
            fx_fee: round2(fx_fee),
            incentive_discount: round2(incentive_discount),
            total_fees: round2(total_fees),
            final_amount: round2(final_amount),
            currency: currency.to_string(),
        })
    }
}
