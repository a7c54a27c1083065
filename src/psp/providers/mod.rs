use crate::psp::types::CardToken;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod adyen;
pub mod stripe;

pub use adyen::AdyenClientMock;
pub use stripe::StripeClientMock;

/// Token vault shared with a single mock client. Injected at
/// construction so tests own the state instead of a process-wide map.
#[derive(Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<HashMap<String, CardToken>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, token: CardToken) {
        self.tokens.write().await.insert(token.token.clone(), token);
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.tokens.read().await.contains_key(token)
    }
}
