//! Generic chat webhook channel (`{"text": ...}` payload)

use async_trait::async_trait;
use std::time::Duration;

use super::channel::{check_status, NotificationChannel};
use crate::error::ChannelError;

pub struct WebhookChannel {
    url: String,
    http_client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            url: url.into(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let payload = serde_json::json!({ "text": text });

        let response = self.http_client.post(&self.url).json(&payload).send().await?;
        check_status(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accepts one POST, replies with `status_line` and hands back the request body.
    async fn one_shot_server(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hooks/alerts", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            let body = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before full request");
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some((head, body)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if body.len() >= length {
                        break body.to_string();
                    }
                }
            };

            let reply = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = tx.send(body);
        });

        (url, rx)
    }

    #[tokio::test]
    async fn test_posts_text_payload() {
        let (url, body) = one_shot_server("200 OK").await;
        let channel = WebhookChannel::new(url, Duration::from_secs(5)).unwrap();

        channel.send("sw1 end of alert").await.unwrap();

        let payload: Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(payload, serde_json::json!({"text": "sw1 end of alert"}));
    }

    #[tokio::test]
    async fn test_error_status_is_channel_error() {
        let (url, _body) = one_shot_server("503 Service Unavailable").await;
        let channel = WebhookChannel::new(url, Duration::from_secs(5)).unwrap();

        let err = channel.send("sw1 end of alert").await.unwrap_err();
        assert!(matches!(err, ChannelError::Status(503)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hooks/alerts", listener.local_addr().unwrap());
        drop(listener);

        let channel = WebhookChannel::new(url, Duration::from_secs(5)).unwrap();
        assert!(matches!(channel.send("x").await, Err(ChannelError::Http(_))));
    }
}
