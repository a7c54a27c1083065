use crate::fx::{FxQuote, FxRateProvider, FxResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// TTL-caching decorator over any `FxRateProvider`. The wrapped
/// provider keeps its one-quote-per-call contract; reuse lives here.
pub struct CachingFxRateProvider {
    inner: Arc<dyn FxRateProvider>,
    ttl: Duration,
    cache: RwLock<HashMap<String, FxQuote>>,
}

impl CachingFxRateProvider {
    pub fn new(inner: Arc<dyn FxRateProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(base_currency: &str, counter_currency: &str) -> String {
        format!(
            "{}/{}",
            base_currency.to_uppercase(),
            counter_currency.to_uppercase()
        )
    }

    fn is_fresh(&self, quote: &FxQuote) -> bool {
        let age = Utc::now().signed_duration_since(quote.quoted_at);
        age.to_std().map(|age| age < self.ttl).unwrap_or(false)
    }
}

#[async_trait]
impl FxRateProvider for CachingFxRateProvider {
    async fn quote(&self, base_currency: &str, counter_currency: &str) -> FxResult<FxQuote> {
        let key = Self::cache_key(base_currency, counter_currency);

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&key) {
                if self.is_fresh(cached) {
                    debug!(pair = %key, "fx quote served from cache");
                    return Ok(cached.clone());
                }
            }
        }

        let quote = self.inner.quote(base_currency, counter_currency).await?;
        self.cache.write().await.insert(key, quote.clone());
        Ok(quote)
    }
}
