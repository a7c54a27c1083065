use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cache;
pub mod random;

pub use cache::CachingFxRateProvider;
pub use random::RandomFxRateProvider;

/// Rates carry six decimal places throughout.
pub(crate) fn round6(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Error)]
pub enum FxError {
    #[error("no fx rate configured for pair {pair}")]
    RateUnavailable { pair: String },
}

pub type FxResult<T> = Result<T, FxError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FxQuote {
    pub base_currency: String,
    pub counter_currency: String,
    pub base_rate: Decimal,
    pub jitter_applied: Decimal,
    pub effective_rate: Decimal,
    pub quoted_at: DateTime<Utc>,
}

/// Produces one quote per call. Quotes are not cached here; wrap a
/// provider in `CachingFxRateProvider` when reuse is wanted.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    async fn quote(&self, base_currency: &str, counter_currency: &str) -> FxResult<FxQuote>;
}
