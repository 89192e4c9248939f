//! Telegram 通知
//!
//! 通过 Bot API `sendMessage` 发送纯文本。超长消息分片发送，片间固定间隔；
//! 单片失败只记日志，继续发送后续分片。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::TelegramSection;
use crate::core::AgentError;
use crate::integrations::{split_message, Notifier};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

pub struct TelegramNotifier {
    client: Client,
    url: String,
    chat_id: String,
    max_chars: usize,
    part_delay: Duration,
}

impl TelegramNotifier {
    pub fn new(
        api_base: &str,
        bot_token: &str,
        chat_id: &str,
        timeout_secs: u64,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("Telegram client: {}", e)))?;
        Ok(Self {
            client,
            url: format!(
                "{}/bot{}/sendMessage",
                api_base.trim_end_matches('/'),
                bot_token
            ),
            chat_id: chat_id.to_string(),
            max_chars: 4000,
            part_delay: Duration::from_secs(1),
        })
    }

    pub fn from_config(cfg: &TelegramSection) -> Result<Self, AgentError> {
        let token = cfg
            .bot_token
            .as_deref()
            .ok_or_else(|| AgentError::Config("TELEGRAM_BOT_TOKEN not set".into()))?;
        let chat_id = cfg
            .chat_id
            .as_deref()
            .ok_or_else(|| AgentError::Config("TELEGRAM_CHAT_ID not set".into()))?;
        Ok(Self::new(&cfg.api_base, token, chat_id, cfg.timeout_secs)?
            .with_chunking(cfg.max_message_chars, Duration::from_millis(cfg.part_delay_ms)))
    }

    pub fn with_chunking(mut self, max_chars: usize, part_delay: Duration) -> Self {
        self.max_chars = max_chars;
        self.part_delay = part_delay;
        self
    }

    async fn send_part(&self, text: &str) -> Result<(), String> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("{} {}", status, text));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<usize, AgentError> {
        let parts = split_message(text, self.max_chars);
        let total = parts.len();
        let mut delivered = 0;

        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.part_delay).await;
            }
            match self.send_part(part).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::error!("Telegram send part {}/{} failed: {}", i + 1, total, e),
            }
        }

        if delivered == 0 {
            return Err(AgentError::Notify(format!(
                "no part of {} delivered",
                total
            )));
        }
        tracing::info!("Telegram report sent ({} of {} parts)", delivered, total);
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::new(&server.uri(), "T0KEN", "42", 5)
            .unwrap()
            .with_chunking(4000, Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_send_single_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT0KEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({"chat_id": "42", "text": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(notifier(&server).send("hi").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_send_long_message_in_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT0KEN/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(3)
            .mount(&server)
            .await;

        let n = notifier(&server);
        assert_eq!(n.send(&"x".repeat(9000)).await.unwrap(), 3);

        let requests = server.received_requests().await.unwrap();
        let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(first["text"].as_str().unwrap().starts_with("[Part 1/3]"));
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&server)
            .await;

        let err = notifier(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Notify(_)));
    }

    #[tokio::test]
    async fn test_channel_username_is_sent_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT0KEN/sendMessage"))
            .and(body_partial_json(
                serde_json::json!({"chat_id": "@noobbot_reports"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = TelegramSection {
            bot_token: Some("T0KEN".into()),
            chat_id: Some("@noobbot_reports".into()),
            api_base: server.uri(),
            part_delay_ms: 0,
            ..TelegramSection::default()
        };
        let n = TelegramNotifier::from_config(&cfg).unwrap();
        assert_eq!(n.send("report").await.unwrap(), 1);
    }
}
