use crate::fx::{round6, FxError, FxQuote, FxRateProvider, FxResult};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;

/// Quote source backed by a configured base-rate table, with symmetric
/// uniform jitter bounded by a basis-point cap. Each call draws fresh
/// jitter.
pub struct RandomFxRateProvider {
    base_rates: HashMap<String, Decimal>,
    jitter_bps: u32,
}

impl RandomFxRateProvider {
    pub fn new(base_rates: HashMap<String, Decimal>, jitter_bps: u32) -> Self {
        Self {
            base_rates,
            jitter_bps,
        }
    }

    fn pair_key(base_currency: &str, counter_currency: &str) -> String {
        format!(
            "{}/{}",
            base_currency.to_uppercase(),
            counter_currency.to_uppercase()
        )
    }
}

#[async_trait]
impl FxRateProvider for RandomFxRateProvider {
    async fn quote(&self, base_currency: &str, counter_currency: &str) -> FxResult<FxQuote> {
        let base_currency = base_currency.to_uppercase();
        let counter_currency = counter_currency.to_uppercase();

        // Same-currency pairs short-circuit to 1.0 with zero jitter.
        if base_currency == counter_currency {
            return Ok(FxQuote {
                base_currency,
                counter_currency,
                base_rate: round6(Decimal::ONE),
                jitter_applied: Decimal::ZERO,
                effective_rate: round6(Decimal::ONE),
                quoted_at: Utc::now(),
            });
        }

        let pair = Self::pair_key(&base_currency, &counter_currency);
        let base_rate = *self
            .base_rates
            .get(&pair)
            .ok_or_else(|| FxError::RateUnavailable { pair: pair.clone() })?;

        let mut rng = rand::thread_rng();
        let magnitude_bps: i64 = if self.jitter_bps > 0 {
            rng.gen_range(0..=i64::from(self.jitter_bps))
        } else {
            0
        };
        let signed_bps = if rng.gen_bool(0.5) {
            magnitude_bps
        } else {
            -magnitude_bps
        };

        let jitter_factor = Decimal::new(signed_bps, 4);
        let jitter_applied = round6(jitter_factor * base_rate);
        let effective_rate = round6(base_rate + jitter_applied);

        info!(
            %pair,
            %base_rate,
            signed_bps,
            %jitter_applied,
            %effective_rate,
            "fx quote generated"
        );

        Ok(FxQuote {
            base_currency,
            counter_currency,
            base_rate: round6(base_rate),
            jitter_applied,
            effective_rate,
            quoted_at: Utc::now(),
        })
    }
}
