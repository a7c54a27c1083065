use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub mod engine;

pub use engine::{FeeEngine, FeeError, FxSettings};

/// Monetary amounts carry two decimal places, rounded half-up.
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Deterministic fee decomposition for one charge, denominated in the
/// charge currency.
///
/// Invariants: `total_fees = processing_fee + fx_fee - incentive_discount`
/// and `final_amount = base_amount - total_fees`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub base_amount: Decimal,
    pub processing_fee: Decimal,
    pub fx_fee: Decimal,
    pub incentive_discount: Decimal,
    pub total_fees: Decimal,
    pub final_amount: Decimal,
    pub currency: String,
}

/// Per-merchant fee parameters. Absent fields are treated as zero;
/// an absent row is a configuration error for that merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantFeeConfig {
    pub merchant_id: i64,
    pub percentage_fee: Option<Decimal>,
    pub fixed_fee: Option<Decimal>,
    pub fx_markup_pct: Option<Decimal>,
}

#[async_trait]
pub trait MerchantFeeConfigStore: Send + Sync {
    async fn find_by_merchant(&self, merchant_id: i64) -> Option<MerchantFeeConfig>;
}

#[derive(Default)]
pub struct InMemoryMerchantFeeConfigStore {
    configs: RwLock<HashMap<i64, MerchantFeeConfig>>,
}

impl InMemoryMerchantFeeConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, config: MerchantFeeConfig) {
        self.configs.write().await.insert(config.merchant_id, config);
    }
}

#[async_trait]
impl MerchantFeeConfigStore for InMemoryMerchantFeeConfigStore {
    async fn find_by_merchant(&self, merchant_id: i64) -> Option<MerchantFeeConfig> {
        self.configs.read().await.get(&merchant_id).cloned()
    }
}
