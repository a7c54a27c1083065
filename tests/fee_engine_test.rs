use paylink_backend::error::AppError;
use paylink_backend::fees::{
    FeeEngine, FxSettings, InMemoryMerchantFeeConfigStore, MerchantFeeConfig,
};
use paylink_backend::fx::RandomFxRateProvider;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

async fn engine_for(configs: Vec<MerchantFeeConfig>) -> FeeEngine {
    let store = InMemoryMerchantFeeConfigStore::new();
    for config in configs {
        store.insert(config).await;
    }

    let mut rates = HashMap::new();
    rates.insert("USD/MXN".to_string(), dec!(17.20));
    let fx_rates = Arc::new(RandomFxRateProvider::new(rates, 50));

    FeeEngine::new(Arc::new(store), fx_rates, FxSettings::default())
}

#[tokio::test]
async fn worked_example_matches_the_expected_breakdown() {
    let engine = engine_for(vec![MerchantFeeConfig {
        merchant_id: 1,
        percentage_fee: Some(dec!(0.03)),
        fixed_fee: Some(dec!(1.00)),
        fx_markup_pct: Some(dec!(0.01)),
    }])
    .await;

    let breakdown = engine
        .compute(1, Some(10), dec!(100.00), "USD")
        .await
        .expect("fee computation should succeed");

    assert_eq!(breakdown.processing_fee, dec!(4.00));
    assert_eq!(breakdown.fx_fee, dec!(1.00));
    assert_eq!(breakdown.total_fees, dec!(5.00));
    assert_eq!(breakdown.final_amount, dec!(95.00));
}

#[tokio::test]
async fn percentage_only_config_charges_exactly_the_rounded_percentage() {
    let engine = engine_for(vec![MerchantFeeConfig {
        merchant_id: 1,
        percentage_fee: Some(dec!(0.029)),
        fixed_fee: None,
        fx_markup_pct: None,
    }])
    .await;

    let breakdown = engine
        .compute(1, None, dec!(33.33), "USD")
        .await
        .expect("fee computation should succeed");

    // round2(33.33 × 0.029) = round2(0.96657) = 0.97
    assert_eq!(breakdown.processing_fee, dec!(0.97));
    assert_eq!(breakdown.fx_fee, dec!(0.00));
    assert_eq!(breakdown.total_fees, dec!(0.97));
}

#[tokio::test]
async fn breakdown_invariants_hold_for_random_configs_and_amounts() {
    let mut rng = rand::thread_rng();

    for i in 0..250 {
        let merchant_id = i64::from(i) + 1;
        let config = MerchantFeeConfig {
            merchant_id,
            percentage_fee: rng
                .gen_bool(0.8)
                .then(|| Decimal::new(rng.gen_range(0..=1000), 4)),
            fixed_fee: rng
                .gen_bool(0.5)
                .then(|| Decimal::new(rng.gen_range(0..=500), 2)),
            fx_markup_pct: rng
                .gen_bool(0.5)
                .then(|| Decimal::new(rng.gen_range(0..=500), 4)),
        };
        let amount = Decimal::new(rng.gen_range(1..=1_000_000), 2);

        let engine = engine_for(vec![config]).await;
        let breakdown = engine
            .compute(merchant_id, None, amount, "USD")
            .await
            .expect("fee computation should succeed");

        assert_eq!(
            breakdown.total_fees,
            breakdown.processing_fee + breakdown.fx_fee - breakdown.incentive_discount,
            "total_fees invariant broke for amount={amount}"
        );
        assert_eq!(
            breakdown.final_amount,
            breakdown.base_amount - breakdown.total_fees,
            "final_amount invariant broke for amount={amount}"
        );
        assert_eq!(breakdown.incentive_discount, Decimal::ZERO);
        assert_eq!(breakdown.base_amount, amount);
    }
}

#[tokio::test]
async fn missing_merchant_config_maps_to_a_configuration_error() {
    let engine = engine_for(vec![]).await;

    let err = engine
        .compute(42, None, dec!(10.00), "USD")
        .await
        .expect_err("unknown merchant must fail");

    let app_err = AppError::from(err);
    assert_eq!(app_err.status_code(), 500);
}
