//! Alert composition and delivery

pub mod channel;
pub mod composer;
pub mod webex;
pub mod webhook;

pub use channel::{dispatch_all, DeliveryOutcome, DeliveryReport, LogChannel, NotificationChannel};
pub use composer::{interface_table, AlertComposer};
pub use webex::WebexChannel;
pub use webhook::WebhookChannel;

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::config::{ChannelKind, NotificationConfig};

/// Build the configured channel; `dry_run` forces the log channel.
pub fn build_channel(config: &NotificationConfig, dry_run: bool) -> Result<Box<dyn NotificationChannel>> {
    let timeout = Duration::from_millis(config.request_timeout_ms);
    let kind = if dry_run { ChannelKind::Log } else { config.channel };

    let channel: Box<dyn NotificationChannel> = match kind {
        ChannelKind::Webex => Box::new(
            WebexChannel::new(&config.webex, timeout).context("Failed to set up webex channel")?,
        ),
        ChannelKind::Webhook => {
            let url = config
                .webhook_url
                .as_deref()
                .context("notification.webhook_url must be set")?;
            Box::new(WebhookChannel::new(url, timeout).context("Failed to set up webhook channel")?)
        }
        ChannelKind::Log => Box::new(LogChannel),
    };

    info!("Notification channel: {}", channel.name());
    Ok(channel)
}
