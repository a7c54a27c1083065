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

/// Stripe mock. Deterministic for a given card token, with simulation
/// tokens that force an outage or a decline:
///
/// - `sim_stripe_exception` → transport error
/// - `sim_stripe_failed` → well-formed decline
/// - any token absent from the vault → `INVALID_TOKEN` decline
pub struct StripeClientMock {
    tokens: TokenStore,
    charges: Arc<RwLock<HashMap<String, ChargeStatus>>>,
    publisher: Arc<dyn WebhookPublisher>,
}

impl StripeClientMock {
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
impl PspClient for StripeClientMock {
    fn code(&self) -> PspCode {
        PspCode::Stripe
    }

    async fn tokenize_card(&self, request: TokenizationRequest) -> PspResult<CardToken> {
        if request.card_number.len() < 16 {
            error!("card number is invalid");
            return Err(PspError::Tokenization {
                code: "INVALID_CARD_NUMBER".to_string(),
                message: "card number must be at least 16 digits".to_string(),
            });
        }

        let token = format!("tok_stripe_mock_{}", Uuid::new_v4());
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
        if request.card_token.eq_ignore_ascii_case("sim_stripe_exception") {
            return Err(PspError::Transport {
                provider: PspCode::Stripe,
                message: "simulated stripe outage".to_string(),
            });
        }

        if request.card_token.eq_ignore_ascii_case("sim_stripe_failed") {
            return Ok(ChargeResult::failure(
                "ch_simulated_stripe",
                "SIM_STRIPE_FAILED",
                "simulated stripe failure",
            ));
        }

        let psp_charge_id = format!("ch_stripe_mock_{}", Uuid::new_v4());

        if !self.tokens.contains(&request.card_token).await {
            self.charges
                .write()
                .await
                .insert(psp_charge_id.clone(), ChargeStatus::Failed);

            let failure_code = "INVALID_TOKEN";
            let failure_message = "card token not found in stripe mock";
            self.publisher.publish(ChargeNotification::failed(
                PspCode::Stripe,
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
            PspCode::Stripe,
            psp_charge_id.clone(),
            format!("pay_mock_{}", Uuid::new_v4()),
        ));

        Ok(ChargeResult::success(psp_charge_id, request.amount, request.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psp::publisher::{ChannelWebhookPublisher, NullWebhookPublisher};
    use rust_decimal_macros::dec;

    fn mock() -> StripeClientMock {
        StripeClientMock::new(TokenStore::new(), Arc::new(NullWebhookPublisher))
    }

    fn charge_request(token: &str) -> ChargeRequest {
        ChargeRequest {
            card_token: token.to_string(),
            amount: dec!(100.00),
            currency: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn tokenize_rejects_short_card_numbers() {
        let err = mock()
            .tokenize_card(TokenizationRequest {
                card_number: "4242".to_string(),
                exp_month: 12,
                exp_year: 2030,
                cvc: "123".to_string(),
            })
            .await
            .expect_err("short card number must be rejected");
        assert!(matches!(err, PspError::Tokenization { .. }));
    }

    #[tokio::test]
    async fn tokenize_extracts_last4_and_brand() {
        let token = mock()
            .tokenize_card(TokenizationRequest {
                card_number: "4242424242424242".to_string(),
                exp_month: 12,
                exp_year: 2030,
                cvc: "123".to_string(),
            })
            .await
            .expect("tokenization should succeed");
        assert_eq!(token.last4, "4242");
        assert_eq!(token.brand, CardBrand::Visa);
        assert!(token.token.starts_with("tok_stripe_mock_"));
    }

    #[tokio::test]
    async fn charge_with_known_token_succeeds_and_publishes_webhook() {
        let (publisher, mut rx) = ChannelWebhookPublisher::new();
        let client = StripeClientMock::new(TokenStore::new(), Arc::new(publisher));
        let token = client
            .tokenize_card(TokenizationRequest {
                card_number: "4242424242424242".to_string(),
                exp_month: 12,
                exp_year: 2030,
                cvc: "123".to_string(),
            })
            .await
            .expect("tokenization should succeed");

        let result = client
            .charge(charge_request(&token.token))
            .await
            .expect("charge should not error");
        assert!(result.is_succeeded());
        assert_eq!(
            client.charge_status(result.psp_charge_id()).await,
            Some(ChargeStatus::Succeeded)
        );

        let notification = rx.recv().await.expect("webhook notification");
        assert_eq!(notification.status, ChargeStatus::Succeeded);
        assert_eq!(notification.provider_charge_id, result.psp_charge_id());
    }

    #[tokio::test]
    async fn charge_with_unknown_token_declines_with_invalid_token() {
        let (publisher, mut rx) = ChannelWebhookPublisher::new();
        let client = StripeClientMock::new(TokenStore::new(), Arc::new(publisher));

        let result = client
            .charge(charge_request("tok_never_vaulted"))
            .await
            .expect("decline is not an error");
        match result {
            ChargeResult::Failed { failure_code, .. } => assert_eq!(failure_code, "INVALID_TOKEN"),
            other => panic!("expected decline, got {other:?}"),
        }

        let notification = rx.recv().await.expect("webhook notification");
        assert_eq!(notification.status, ChargeStatus::Failed);
    }

    #[tokio::test]
    async fn simulation_tokens_force_outage_and_decline() {
        let client = mock();

        let err = client
            .charge(charge_request("sim_stripe_exception"))
            .await
            .expect_err("outage token must raise");
        assert!(matches!(err, PspError::Transport { provider: PspCode::Stripe, .. }));

        let declined = client
            .charge(charge_request("sim_stripe_failed"))
            .await
            .expect("decline is not an error");
        assert!(!declined.is_succeeded());
    }
}
