//! Notification channels and best-effort dispatch

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::error::ChannelError;
use crate::telemetry::metrics::{record_alert_delivered, record_alert_failed};

/// Text delivery to an operator-facing channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str) -> Result<(), ChannelError>;
}

#[async_trait]
impl NotificationChannel for Box<dyn NotificationChannel> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        (**self).send(text).await
    }
}

/// Any non-2xx reply from a chat service is a failed delivery
pub fn check_status(status: StatusCode) -> Result<(), ChannelError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ChannelError::Status(status.as_u16()))
    }
}

/// Dry-run channel: every message goes to the log only
#[derive(Debug, Default)]
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        info!("[ALERT] {}", text);
        Ok(())
    }
}

/// Outcome of dispatching one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub index: usize,
    pub delivered: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.delivered).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }
}

/// Send every message in order. Failures are logged and counted, never propagated.
pub async fn dispatch_all<C>(channel: &C, messages: &[String]) -> DeliveryReport
where
    C: NotificationChannel + ?Sized,
{
    let mut report = DeliveryReport::default();

    for (index, text) in messages.iter().enumerate() {
        let outcome = match channel.send(text).await {
            Ok(()) => {
                info!("Alert {}/{} delivered via {}", index + 1, messages.len(), channel.name());
                record_alert_delivered();
                DeliveryOutcome { index, delivered: true, error: None }
            }
            Err(e) => {
                warn!(
                    "Alert {}/{} not delivered via {}: {}",
                    index + 1,
                    messages.len(),
                    channel.name(),
                    e
                );
                record_alert_failed();
                DeliveryOutcome { index, delivered: false, error: Some(e.to_string()) }
            }
        };
        report.outcomes.push(outcome);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::NO_CONTENT).is_ok());
        assert!(matches!(check_status(StatusCode::UNAUTHORIZED), Err(ChannelError::Status(401))));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(ChannelError::Status(429))
        ));
    }

    fn messages() -> Vec<String> {
        vec!["one".to_string(), "two".to_string(), "three".to_string()]
    }

    #[tokio::test]
    async fn test_first_failure_does_not_stop_dispatch() {
        let mut channel = MockNotificationChannel::new();
        let mut seq = Sequence::new();
        channel.expect_name().return_const("mock");
        channel
            .expect_send()
            .withf(|t| t == "one")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ChannelError::Status(503)));
        channel
            .expect_send()
            .withf(|t| t == "two")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        channel
            .expect_send()
            .withf(|t| t == "three")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let report = dispatch_all(&channel, &messages()).await;
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.outcomes[0].delivered);
        assert_eq!(report.outcomes[0].error.as_deref(), Some("notification endpoint returned HTTP 503"));
    }

    #[tokio::test]
    async fn test_all_failures_still_attempt_everything() {
        let mut channel = MockNotificationChannel::new();
        channel.expect_name().return_const("mock");
        channel
            .expect_send()
            .times(3)
            .returning(|_| Err(ChannelError::Config("no room".to_string())));

        let report = dispatch_all(&channel, &messages()).await;
        assert_eq!(report.failed(), 3);
    }

    #[tokio::test]
    async fn test_log_channel_always_delivers() {
        let report = dispatch_all(&LogChannel, &messages()).await;
        assert_eq!(report.delivered(), 3);
    }
}
