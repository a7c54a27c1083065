use crate::psp::client::PspClient;
use crate::psp::error::{PspError, PspResult};
use crate::psp::types::{ChargeRequest, ChargeResult, PspCode, RoutedChargeResult};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RouterError {
    /// Both providers exhausted. Carries the provider identities for
    /// diagnostics; callers surface an opaque retry message instead.
    #[error("both payment providers exhausted: primary={primary}, secondary={secondary}")]
    RoutingFailed { primary: PspCode, secondary: PspCode },

    #[error("psp client not configured for code: {code}")]
    ClientNotConfigured { code: PspCode },
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub default_primary: PspCode,
    pub call_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_primary: PspCode::Stripe,
            call_timeout: Duration::from_secs(10),
        }
    }
}

/// PSP orchestrator: one primary attempt, one fail-over hop, never more
/// than two provider round-trips per charge.
pub struct PspRouter {
    clients: HashMap<PspCode, Arc<dyn PspClient>>,
    config: RouterConfig,
}

impl PspRouter {
    pub fn new(clients: Vec<Arc<dyn PspClient>>, config: RouterConfig) -> Result<Self, RouterError> {
        let clients: HashMap<PspCode, Arc<dyn PspClient>> =
            clients.into_iter().map(|c| (c.code(), c)).collect();

        for code in [config.default_primary, config.default_primary.other()] {
            if !clients.contains_key(&code) {
                return Err(RouterError::ClientNotConfigured { code });
            }
        }

        Ok(Self { clients, config })
    }

    /// Routes one charge through the primary provider, failing over to
    /// the secondary on a decline, transport failure or timeout. Fails
    /// with `RoutingFailed` only once both providers are exhausted.
    pub async fn route(
        &self,
        card_token: &str,
        amount: Decimal,
        currency: &str,
        psp_hint: Option<PspCode>,
    ) -> Result<RoutedChargeResult, RouterError> {
        let (primary_code, secondary_code) = self.resolve_order(psp_hint);
        let primary = self.client(primary_code)?;
        let secondary = self.client(secondary_code)?;

        // Both attempts share only this immutable payload.
        let request = ChargeRequest {
            card_token: card_token.to_string(),
            amount,
            currency: currency.to_string(),
        };

        info!(psp = %primary_code, %amount, currency, "trying primary psp");
        match self.attempt(primary.as_ref(), &request).await {
            Ok(result @ ChargeResult::Succeeded { .. }) => {
                return Ok(RoutedChargeResult {
                    psp_used: primary_code,
                    result,
                });
            }
            Ok(ChargeResult::Failed {
                failure_code,
                failure_message,
                ..
            }) => {
                warn!(
                    psp = %primary_code,
                    failure_code = %failure_code,
                    failure_message = %failure_message,
                    "primary psp declined the charge"
                );
            }
            Err(err) => {
                warn!(psp = %primary_code, error = %err, "primary psp call failed");
            }
        }

        info!(psp = %secondary_code, %amount, currency, "trying secondary psp");
        match self.attempt(secondary.as_ref(), &request).await {
            Ok(result @ ChargeResult::Succeeded { .. }) => Ok(RoutedChargeResult {
                psp_used: secondary_code,
                result,
            }),
            Ok(ChargeResult::Failed {
                failure_code,
                failure_message,
                ..
            }) => {
                error!(
                    psp = %secondary_code,
                    failure_code = %failure_code,
                    failure_message = %failure_message,
                    "secondary psp also declined the charge"
                );
                Err(RouterError::RoutingFailed {
                    primary: primary_code,
                    secondary: secondary_code,
                })
            }
            Err(err) => {
                error!(psp = %secondary_code, error = %err, "secondary psp call also failed");
                Err(RouterError::RoutingFailed {
                    primary: primary_code,
                    secondary: secondary_code,
                })
            }
        }
    }

    /// A hint naming a configured provider becomes primary; anything
    /// else falls back to the configured default ordering.
    fn resolve_order(&self, psp_hint: Option<PspCode>) -> (PspCode, PspCode) {
        let primary = match psp_hint {
            Some(hinted) if self.clients.contains_key(&hinted) => hinted,
            _ => self.config.default_primary,
        };
        (primary, primary.other())
    }

    /// One bounded provider call. A timeout counts as a provider-call
    /// failure; an in-flight charge is awaited to the deadline, never
    /// aborted early by caller-side cancellation.
    async fn attempt(&self, client: &dyn PspClient, request: &ChargeRequest) -> PspResult<ChargeResult> {
        match timeout(self.config.call_timeout, client.charge(request.clone())).await {
            Ok(result) => result,
            Err(_) => Err(PspError::Timeout {
                provider: client.code(),
                timeout_secs: self.config.call_timeout.as_secs(),
            }),
        }
    }

    fn client(&self, code: PspCode) -> Result<&Arc<dyn PspClient>, RouterError> {
        self.clients
            .get(&code)
            .ok_or(RouterError::ClientNotConfigured { code })
    }
}
