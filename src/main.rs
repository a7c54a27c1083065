use dotenv::dotenv;
use paylink_backend::config::AppConfig;
use paylink_backend::fees::{
    FeeEngine, FxSettings, InMemoryMerchantFeeConfigStore, MerchantFeeConfig,
};
use paylink_backend::fx::RandomFxRateProvider;
use paylink_backend::payments::{InMemoryPaymentStore, PaymentStore};
use paylink_backend::psp::providers::{AdyenClientMock, StripeClientMock, TokenStore};
use paylink_backend::psp::{
    ChannelWebhookPublisher, PspClient, PspRouter, RouterConfig, TokenizationRequest,
};
use paylink_backend::services::{ChargeService, ProcessChargeCommand};
use paylink_backend::webhooks::{InMemoryWebhookAuditLog, WebhookReconciler};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Boots the routing core against the mock PSPs and runs one charge
/// end-to-end, including the asynchronous webhook leg.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    config.validate()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        default_psp = %config.routing.default_psp,
        "starting paylink routing core"
    );

    let (publisher, mut notifications) = ChannelWebhookPublisher::new();
    let publisher = Arc::new(publisher);

    let stripe = Arc::new(StripeClientMock::new(TokenStore::new(), publisher.clone()));
    let adyen = Arc::new(AdyenClientMock::new(TokenStore::new(), publisher));

    let router = Arc::new(PspRouter::new(
        vec![stripe.clone() as Arc<dyn PspClient>, adyen],
        RouterConfig {
            default_primary: config.routing.default_psp,
            call_timeout: Duration::from_secs(config.routing.provider_call_timeout_secs),
        },
    )?);

    let fee_configs = Arc::new(InMemoryMerchantFeeConfigStore::new());
    fee_configs
        .insert(MerchantFeeConfig {
            merchant_id: 1,
            percentage_fee: Some(Decimal::from_str("0.03")?),
            fixed_fee: Some(Decimal::from_str("1.00")?),
            fx_markup_pct: Some(Decimal::from_str("0.01")?),
        })
        .await;

    let fx_rates = Arc::new(RandomFxRateProvider::new(
        config.fx.base_rates.clone(),
        config.fx.jitter_bps,
    ));
    let fee_engine = Arc::new(FeeEngine::new(
        fee_configs,
        fx_rates,
        FxSettings {
            enabled: config.fx.enabled,
            payout_currency: config.fx.payout_currency.clone(),
            markup_pct: config.fx.markup_pct,
        },
    ));

    let payments: Arc<InMemoryPaymentStore> = Arc::new(InMemoryPaymentStore::new());
    let audit = Arc::new(InMemoryWebhookAuditLog::new());
    let reconciler = Arc::new(WebhookReconciler::new(payments.clone(), audit.clone()));

    let drain = tokio::spawn({
        let reconciler = reconciler.clone();
        async move {
            while let Some(notification) = notifications.recv().await {
                reconciler.reconcile(notification).await;
            }
        }
    });

    let charge_service = ChargeService::new(fee_engine, router, payments.clone());

    let card_token = stripe
        .tokenize_card(TokenizationRequest {
            card_number: "4242424242424242".to_string(),
            exp_month: 12,
            exp_year: 2030,
            cvc: "123".to_string(),
        })
        .await?;
    info!(last4 = %card_token.last4, brand = ?card_token.brand, "card tokenized");

    let outcome = charge_service
        .process(ProcessChargeCommand {
            merchant_id: 1,
            recipient_id: None,
            card_token: card_token.token,
            amount: Decimal::from_str("100.00")?,
            currency: "USD".to_string(),
            psp_hint: None,
        })
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    info!(
        payment_id = %outcome.payment.id,
        psp = %outcome.psp_used,
        status = %outcome.payment.status,
        total_fees = %outcome.fee_breakdown.total_fees,
        net = %outcome.fee_breakdown.final_amount,
        "charge completed"
    );

    // Let the reconciler drain the notification emitted by the mock.
    tokio::time::sleep(Duration::from_millis(100)).await;
    drain.abort();

    let reconciled = payments
        .find_by_id(outcome.payment.id)
        .await
        .expect("payment persisted");
    info!(
        payment_id = %reconciled.id,
        status = %reconciled.status,
        audit_entries = audit.entries().await.len(),
        "final payment state"
    );

    Ok(())
}
