use crate::psp::types::PspCode;
use thiserror::Error;

pub type PspResult<T> = Result<T, PspError>;

/// Failures raised by a PSP client call. A provider *decline* is not an
/// error; it comes back as `ChargeResult::Failed`. These variants cover
/// transport problems, outages and tokenization rejections.
#[derive(Debug, Clone, Error)]
pub enum PspError {
    #[error("provider {provider} transport failure: {message}")]
    Transport { provider: PspCode, message: String },

    #[error("provider {provider} call timed out after {timeout_secs}s")]
    Timeout { provider: PspCode, timeout_secs: u64 },

    #[error("card tokenization failed: {code}: {message}")]
    Tokenization { code: String, message: String },

    #[error("unknown payment provider: {code}")]
    UnknownProvider { code: String },
}

impl PspError {
    pub fn is_transient(&self) -> bool {
        match self {
            PspError::Transport { .. } => true,
            PspError::Timeout { .. } => true,
            PspError::Tokenization { .. } => false,
            PspError::UnknownProvider { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_flags_are_set() {
        assert!(PspError::Transport {
            provider: PspCode::Stripe,
            message: "connection reset".to_string(),
        }
        .is_transient());
        assert!(!PspError::Tokenization {
            code: "INVALID_CARD_NUMBER".to_string(),
            message: "too short".to_string(),
        }
        .is_transient());
    }
}
