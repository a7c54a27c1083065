use crate::psp::error::PspResult;
use crate::psp::types::{CardToken, ChargeRequest, ChargeResult, PspCode, TokenizationRequest};
use async_trait::async_trait;

/// Uniform PSP capability set: identify, tokenize, charge.
///
/// `charge` never reports a transport failure through its return value;
/// outages and timeouts surface as `Err(PspError)` so the orchestrator
/// can tell them apart from a well-formed decline.
#[async_trait]
pub trait PspClient: Send + Sync {
    fn code(&self) -> PspCode;

    async fn tokenize_card(&self, request: TokenizationRequest) -> PspResult<CardToken>;

    async fn charge(&self, request: ChargeRequest) -> PspResult<ChargeResult>;
}
