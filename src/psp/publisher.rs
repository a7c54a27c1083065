use crate::psp::types::ChargeNotification;
use tokio::sync::mpsc;
use tracing::warn;

/// Outbound path for charge-outcome notifications emitted by PSP clients.
///
/// The mocks publish through this seam instead of calling back into the
/// reconciler, which keeps the client ↔ reconciler wiring acyclic.
pub trait WebhookPublisher: Send + Sync {
    fn publish(&self, notification: ChargeNotification);
}

/// Channel-backed publisher. The receiving half is drained by whoever
/// owns the reconciler (a worker task in the binary, the test itself in
/// integration tests).
pub struct ChannelWebhookPublisher {
    tx: mpsc::UnboundedSender<ChargeNotification>,
}

impl ChannelWebhookPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChargeNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl WebhookPublisher for ChannelWebhookPublisher {
    fn publish(&self, notification: ChargeNotification) {
        if self.tx.send(notification).is_err() {
            warn!("webhook notification dropped: receiver closed");
        }
    }
}

/// Discards every notification. For wiring where nobody consumes the
/// asynchronous path.
pub struct NullWebhookPublisher;

impl WebhookPublisher for NullWebhookPublisher {
    fn publish(&self, _notification: ChargeNotification) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psp::types::{ChargeStatus, PspCode};

    #[tokio::test]
    async fn channel_publisher_delivers_notifications_in_order() {
        let (publisher, mut rx) = ChannelWebhookPublisher::new();
        publisher.publish(ChargeNotification::succeeded(PspCode::Stripe, "ch_1", "pay_1"));
        publisher.publish(ChargeNotification::failed(
            PspCode::Adyen,
            "ch_2",
            "pay_2",
            "DO_NOT_HONOR",
            "declined",
        ));

        let first = rx.recv().await.expect("first notification");
        assert_eq!(first.provider_charge_id, "ch_1");
        assert_eq!(first.status, ChargeStatus::Succeeded);

        let second = rx.recv().await.expect("second notification");
        assert_eq!(second.provider_code, PspCode::Adyen);
        assert_eq!(second.failure_code.as_deref(), Some("DO_NOT_HONOR"));
    }

    #[test]
    fn publishing_after_receiver_drop_does_not_panic() {
        let (publisher, rx) = ChannelWebhookPublisher::new();
        drop(rx);
        publisher.publish(ChargeNotification::succeeded(PspCode::Stripe, "ch_1", "pay_1"));
    }
}
