use crate::psp::error::PspError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PspCode {
    Stripe,
    Adyen,
}

impl PspCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PspCode::Stripe => "stripe",
            PspCode::Adyen => "adyen",
        }
    }

    /// The fail-over counterpart in the two-provider setup.
    pub fn other(&self) -> PspCode {
        match self {
            PspCode::Stripe => PspCode::Adyen,
            PspCode::Adyen => PspCode::Stripe,
        }
    }
}

impl std::fmt::Display for PspCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PspCode {
    type Err = PspError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "stripe" => Ok(PspCode::Stripe),
            "adyen" => Ok(PspCode::Adyen),
            _ => Err(PspError::UnknownProvider {
                code: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Unknown,
}

impl CardBrand {
    /// Brand inference from the leading digit, as the mock vaults do.
    pub fn infer(card_number: &str) -> CardBrand {
        if card_number.starts_with('4') {
            CardBrand::Visa
        } else if card_number.starts_with('5') {
            CardBrand::Mastercard
        } else {
            CardBrand::Unknown
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizationRequest {
    pub card_number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardToken {
    pub token: String,
    pub last4: String,
    pub brand: CardBrand,
    pub created_at: DateTime<Utc>,
}

/// Immutable charge payload, constructed once per charge attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub card_token: String,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    Succeeded,
    Failed,
}

/// Provider charge outcome. A decline is a well-formed `Failed` value;
/// transport and outage failures surface as `PspError` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum ChargeResult {
    Succeeded {
        psp_charge_id: String,
        amount: Decimal,
        currency: String,
    },
    Failed {
        psp_charge_id: String,
        failure_code: String,
        failure_message: String,
    },
}

impl ChargeResult {
    pub fn success(psp_charge_id: impl Into<String>, amount: Decimal, currency: impl Into<String>) -> Self {
        ChargeResult::Succeeded {
            psp_charge_id: psp_charge_id.into(),
            amount,
            currency: currency.into(),
        }
    }

    pub fn failure(
        psp_charge_id: impl Into<String>,
        failure_code: impl Into<String>,
        failure_message: impl Into<String>,
    ) -> Self {
        ChargeResult::Failed {
            psp_charge_id: psp_charge_id.into(),
            failure_code: failure_code.into(),
            failure_message: failure_message.into(),
        }
    }

    pub fn status(&self) -> ChargeStatus {
        match self {
            ChargeResult::Succeeded { .. } => ChargeStatus::Succeeded,
            ChargeResult::Failed { .. } => ChargeStatus::Failed,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, ChargeResult::Succeeded { .. })
    }

    pub fn psp_charge_id(&self) -> &str {
        match self {
            ChargeResult::Succeeded { psp_charge_id, .. } => psp_charge_id,
            ChargeResult::Failed { psp_charge_id, .. } => psp_charge_id,
        }
    }
}

/// Outcome of one orchestration call: which provider actually took the
/// charge, plus its result. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct RoutedChargeResult {
    pub psp_used: PspCode,
    pub result: ChargeResult,
}

/// Asynchronous charge-outcome notification as delivered by webhook
/// ingress, keyed by the provider charge id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeNotification {
    pub provider_code: PspCode,
    pub provider_charge_id: String,
    pub payment_id: String,
    pub status: ChargeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl ChargeNotification {
    pub fn succeeded(
        provider_code: PspCode,
        provider_charge_id: impl Into<String>,
        payment_id: impl Into<String>,
    ) -> Self {
        Self {
            provider_code,
            provider_charge_id: provider_charge_id.into(),
            payment_id: payment_id.into(),
            status: ChargeStatus::Succeeded,
            failure_code: None,
            failure_message: None,
        }
    }

    pub fn failed(
        provider_code: PspCode,
        provider_charge_id: impl Into<String>,
        payment_id: impl Into<String>,
        failure_code: impl Into<String>,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            provider_code,
            provider_charge_id: provider_charge_id.into(),
            payment_id: payment_id.into(),
            status: ChargeStatus::Failed,
            failure_code: Some(failure_code.into()),
            failure_message: Some(failure_message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn psp_code_parsing_works() {
        assert!(matches!(PspCode::from_str("stripe"), Ok(PspCode::Stripe)));
        assert!(matches!(PspCode::from_str("ADYEN"), Ok(PspCode::Adyen)));
        assert!(PspCode::from_str("worldpay").is_err());
    }

    #[test]
    fn psp_code_other_flips_the_pair() {
        assert_eq!(PspCode::Stripe.other(), PspCode::Adyen);
        assert_eq!(PspCode::Adyen.other(), PspCode::Stripe);
    }

    #[test]
    fn card_brand_inference_uses_leading_digit() {
        assert_eq!(CardBrand::infer("4242424242424242"), CardBrand::Visa);
        assert_eq!(CardBrand::infer("5555555555554444"), CardBrand::Mastercard);
        assert_eq!(CardBrand::infer("378282246310005"), CardBrand::Unknown);
    }

    #[test]
    fn charge_result_serializes_with_status_tag() {
        let result = ChargeResult::success("ch_1", dec!(100.00), "USD");
        let json = serde_json::to_value(&result).expect("serialization should succeed");
        assert_eq!(json["status"], "SUCCEEDED");
        assert_eq!(json["pspChargeId"], "ch_1");

        let declined = ChargeResult::failure("ch_2", "DO_NOT_HONOR", "declined");
        let json = serde_json::to_value(&declined).expect("serialization should succeed");
        assert_eq!(json["status"], "FAILED");
        assert_eq!(json["failureCode"], "DO_NOT_HONOR");
    }

    #[test]
    fn charge_notification_deserializes_from_ingress_payload() {
        let payload = serde_json::json!({
            "providerCode": "stripe",
            "providerChargeId": "ch_stripe_mock_1",
            "paymentId": "pay_1",
            "status": "FAILED",
            "failureCode": "INVALID_TOKEN",
            "failureMessage": "card token not found"
        });
        let parsed: ChargeNotification =
            serde_json::from_value(payload).expect("deserialization should succeed");
        assert_eq!(parsed.provider_code, PspCode::Stripe);
        assert_eq!(parsed.status, ChargeStatus::Failed);
        assert_eq!(parsed.failure_code.as_deref(), Some("INVALID_TOKEN"));
    }
}
