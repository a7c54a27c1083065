pub mod client;
pub mod error;
pub mod providers;
pub mod publisher;
pub mod router;
pub mod types;

pub use client::PspClient;
pub use error::{PspError, PspResult};
pub use publisher::{ChannelWebhookPublisher, NullWebhookPublisher, WebhookPublisher};
pub use router::{PspRouter, RouterConfig, RouterError};
pub use types::{
    CardBrand, CardToken, ChargeNotification, ChargeRequest, ChargeResult, ChargeStatus, PspCode,
    RoutedChargeResult, TokenizationRequest,
};
