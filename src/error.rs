//! Unified error surface for the charge path, with the HTTP status
//! mapping the excluded transport layer applies.

use crate::fees::FeeError;
use crate::fx::FxError;
use crate::psp::error::PspError;
use crate::psp::router::RouterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Routing(#[from] RouterError),

    #[error(transparent)]
    Fees(#[from] FeeError),

    #[error(transparent)]
    Fx(#[from] FxError),

    #[error(transparent)]
    Psp(#[from] PspError),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Routing(RouterError::RoutingFailed { .. }) => 502,
            AppError::Routing(RouterError::ClientNotConfigured { .. }) => 500,
            AppError::Fees(FeeError::MerchantConfigMissing { .. }) => 500,
            AppError::Fees(FeeError::Rate(_)) => 400,
            AppError::Fx(_) => 400,
            AppError::Psp(PspError::Tokenization { .. }) => 400,
            AppError::Psp(PspError::UnknownProvider { .. }) => 400,
            AppError::Psp(_) => 502,
        }
    }

    /// What the caller sees. Routing exhaustion stays opaque: the
    /// per-provider detail goes to the logs, not the client.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Routing(RouterError::RoutingFailed { .. }) => {
                "payment could not be processed, please try again later".to_string()
            }
            AppError::Routing(RouterError::ClientNotConfigured { .. }) => {
                "payment routing is misconfigured".to_string()
            }
            AppError::Fees(FeeError::MerchantConfigMissing { .. }) => {
                "merchant fee configuration is missing".to_string()
            }
            AppError::Fees(FeeError::Rate(err)) => err.to_string(),
            AppError::Fx(err) => err.to_string(),
            AppError::Psp(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psp::types::PspCode;

    #[test]
    fn status_codes_match_the_failure_classes() {
        let routing = AppError::Routing(RouterError::RoutingFailed {
            primary: PspCode::Stripe,
            secondary: PspCode::Adyen,
        });
        assert_eq!(routing.status_code(), 502);

        let config = AppError::Fees(FeeError::MerchantConfigMissing { merchant_id: 1 });
        assert_eq!(config.status_code(), 500);

        let fx = AppError::Fx(FxError::RateUnavailable {
            pair: "USD/JPY".to_string(),
        });
        assert_eq!(fx.status_code(), 400);
    }

    #[test]
    fn routing_failure_message_does_not_leak_provider_identities() {
        let routing = AppError::Routing(RouterError::RoutingFailed {
            primary: PspCode::Stripe,
            secondary: PspCode::Adyen,
        });
        let message = routing.user_message();
        assert!(!message.contains("stripe"));
        assert!(!message.contains("adyen"));
    }
}
