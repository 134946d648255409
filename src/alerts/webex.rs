//! Webex Teams room channel
//!
//! Posts plain-text messages to one room. The room may be configured by id or
//! by title; a title is resolved through `GET /rooms` on first use and cached.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::channel::{check_status, NotificationChannel};
use crate::config::WebexConfig;
use crate::error::ChannelError;

#[derive(Debug, Deserialize)]
struct RoomList {
    #[serde(default)]
    items: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct Room {
    id: String,
    title: String,
}

pub struct WebexChannel {
    api_url: String,
    token: String,
    room_title: Option<String>,
    room_id: OnceCell<String>,
    client: reqwest::Client,
}

impl WebexChannel {
    pub fn new(config: &WebexConfig, timeout: Duration) -> Result<Self, ChannelError> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| ChannelError::Config("webex token not set".to_string()))?;

        let room_id = match &config.room_id {
            Some(id) => OnceCell::new_with(Some(id.clone())),
            None if config.room_title.is_some() => OnceCell::new(),
            None => {
                return Err(ChannelError::Config(
                    "webex room_id or room_title required".to_string(),
                ))
            }
        };

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            room_title: config.room_title.clone(),
            room_id,
            client,
        })
    }

    async fn room_id(&self) -> Result<&String, ChannelError> {
        self.room_id.get_or_try_init(|| self.lookup_room()).await
    }

    async fn lookup_room(&self) -> Result<String, ChannelError> {
        let title = self
            .room_title
            .as_deref()
            .ok_or_else(|| ChannelError::Config("webex room_title not set".to_string()))?;

        let response = self
            .client
            .get(format!("{}/rooms", self.api_url))
            .bearer_auth(&self.token)
            .query(&[("max", "1000")])
            .send()
            .await?;
        check_status(response.status())?;

        let rooms: RoomList = response.json().await?;
        let id = find_room(&rooms.items, title)
            .ok_or_else(|| ChannelError::Config(format!("no webex room titled '{}'", title)))?;
        info!("Resolved webex room '{}'", title);
        Ok(id)
    }
}

fn find_room(rooms: &[Room], title: &str) -> Option<String> {
    rooms.iter().find(|r| r.title == title).map(|r| r.id.clone())
}

#[async_trait]
impl NotificationChannel for WebexChannel {
    fn name(&self) -> &'static str {
        "webex"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let room_id = self.room_id().await?;
        let payload = serde_json::json!({
            "roomId": room_id,
            "text": text,
        });

        let response = self
            .client
            .post(format!("{}/messages", self.api_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        debug!("Webex message post -> {}", status);
        check_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WebexConfig {
        WebexConfig {
            token: Some("token".to_string()),
            ..WebexConfig::default()
        }
    }

    #[test]
    fn test_requires_room() {
        let result = WebexChannel::new(&config(), Duration::from_secs(5));
        assert!(matches!(result, Err(ChannelError::Config(_))));
    }

    #[tokio::test]
    async fn test_configured_room_id_skips_lookup() {
        let mut config = config();
        config.room_id = Some("Y2lzY29zcGFyazovL3VzL1JPT00v".to_string());
        let channel = WebexChannel::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(channel.room_id().await.unwrap(), "Y2lzY29zcGFyazovL3VzL1JPT00v");
    }

    #[test]
    fn test_find_room_by_exact_title() {
        let rooms: RoomList = serde_json::from_str(
            r#"{"items": [
                {"id": "a", "title": "Switch Alerts Archive"},
                {"id": "b", "title": "Switch Alerts"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(find_room(&rooms.items, "Switch Alerts").as_deref(), Some("b"));
        assert_eq!(find_room(&rooms.items, "Lab"), None);
    }
}
