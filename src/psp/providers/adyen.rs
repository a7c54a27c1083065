use crate::psp::client::PspClient;
use crate::psp::error::{PspError, PspResult};
use crate::psp::providers::TokenStore;
use crate::psp::publisher::WebhookPublisher;
use crate::psp::types::{
    CardBrand, CardToken, ChargeNotification, ChargeRequest, ChargeResult, ChargeStatus, PspCode,
    TokenizationRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;
use uuid::Uuid;

/// Adyen mock. Same contract as the Stripe mock with its own token
/// namespace and simulation tokens (`sim_adyen_exception`,
/// `sim_adyen_failed`).
pub struct AdyenClientMock {
    tokens: TokenStore,
    charges: Arc<RwLock<HashMap<String, ChargeStatus>>>,
    publisher: Arc<dyn WebhookPublisher>,
}

impl AdyenClientMock {
    pub fn new(tokens: TokenStore, publisher: Arc<dyn WebhookPublisher>) -> Self {
        Self {
            tokens,
            charges: Arc::new(RwLock::new(HashMap::new())),
            publisher,
        }
    }

    pub async fn charge_status(&self, psp_charge_id: &str) -> Option<ChargeStatus> {
        self.charges.read().await.get(psp_charge_id).copied()
    }
}

#[async_trait]
impl PspClient for AdyenClientMock {
    fn code(&self) -> PspCode {
        PspCode::Adyen
    }

    async fn tokenize_card(&self, request: TokenizationRequest) -> PspResult<CardToken> {
        if request.card_number.len() < 16 {
            error!("card number is invalid");
            return Err(PspError::Tokenization {
                code: "INVALID_CARD_NUMBER".to_string(),
                message: "card number must be at least 16 digits".to_string(),
            });
        }

        let token = format!("ady_tok_{}", Uuid::new_v4());
        let last4 = request.card_number[request.card_number.len() - 4..].to_string();
        let card_token = CardToken {
            token,
            last4,
            brand: CardBrand::infer(&request.card_number),
            created_at: Utc::now(),
        };

        self.tokens.insert(card_token.clone()).await;
        Ok(card_token)
    }

    async fn charge(&self, request: ChargeRequest) -> PspResult<ChargeResult> {
        if request.card_token.eq_ignore_ascii_case("sim_adyen_exception") {
            return Err(PspError::Transport {
                provider: PspCode::Adyen,
                message: "simulated adyen outage".to_string(),
            });
        }

        if request.card_token.eq_ignore_ascii_case("sim_adyen_failed") {
            return Ok(ChargeResult::failure(
                "ch_simulated_adyen",
                "SIM_ADYEN_FAILED",
                "simulated adyen failure",
            ));
        }

        let psp_charge_id = format!("ady_ch_{}", Uuid::new_v4());

        if !self.tokens.contains(&request.card_token).await {
            self.charges
                .write()
                .await
                .insert(psp_charge_id.clone(), ChargeStatus::Failed);

            let failure_code = "INVALID_TOKEN";
            let failure_message = "card token not found in adyen mock";
            self.publisher.publish(ChargeNotification::failed(
                PspCode::Adyen,
                psp_charge_id.clone(),
                format!("pay_mock_{}", Uuid::new_v4()),
                failure_code,
                failure_message,
            ));

            return Ok(ChargeResult::failure(psp_charge_id, failure_code, failure_message));
        }

        self.charges
            .write()
            .await
            .insert(psp_charge_id.clone(), ChargeStatus::Succeeded);

        self.publisher.publish(ChargeNotification::succeeded(
            PspCode::Adyen,
            psp_charge_id.clone(),
            format!("pay_mock_{}", Uuid::new_v4()),
        ));

        Ok(ChargeResult::success(psp_charge_id, request.amount, request.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psp::publisher::NullWebhookPublisher;
    use rust_decimal_macros::dec;

    fn mock() -> AdyenClientMock {
        AdyenClientMock::new(TokenStore::new(), Arc::new(NullWebhookPublisher))
    }

    #[tokio::test]
    async fn tokenize_then_charge_round_trips() {
        let client = mock();
        let token = client
            .tokenize_card(TokenizationRequest {
                card_number: "5555555555554444".to_string(),
                exp_month: 6,
                exp_year: 2031,
                cvc: "321".to_string(),
            })
            .await
            .expect("tokenization should succeed");
        assert!(token.token.starts_with("ady_tok_"));
        assert_eq!(token.brand, CardBrand::Mastercard);

        let result = client
            .charge(ChargeRequest {
                card_token: token.token,
                amount: dec!(250.00),
                currency: "EUR".to_string(),
            })
            .await
            .expect("charge should not error");
        assert!(result.is_succeeded());
        assert!(result.psp_charge_id().starts_with("ady_ch_"));
    }

    #[tokio::test]
    async fn simulation_tokens_force_outage_and_decline() {
        let client = mock();

        let err = client
            .charge(ChargeRequest {
                card_token: "sim_adyen_exception".to_string(),
                amount: dec!(10.00),
                currency: "USD".to_string(),
            })
            .await
            .expect_err("outage token must raise");
        assert!(matches!(err, PspError::Transport { provider: PspCode::Adyen, .. }));

        let declined = client
            .charge(ChargeRequest {
                card_token: "sim_adyen_failed".to_string(),
                amount: dec!(10.00),
                currency: "USD".to_string(),
            })
            .await
            .expect("decline is not an error");
        assert_eq!(declined.status(), ChargeStatus::Failed);
    }
}
