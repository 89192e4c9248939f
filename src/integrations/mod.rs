//! 外部集成：运维通知通道（Telegram）

pub mod telegram;

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::AgentError;

pub use telegram::TelegramNotifier;

/// 通知通道：发送周期摘要，超长时分片；返回成功送达的分片数
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<usize, AgentError>;
}

/// 按字符上限切分消息；多于一片时每片加 `[Part i/n]` 前缀
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let chunks: Vec<String> = text
        .chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect();
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Part {}/{}]\n\n{}", i + 1, total, chunk))
        .collect()
}

/// 记录所有消息的通知通道（测试 / 本地调试）
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    max_chars: Option<usize>,
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 与真实通道一样分片
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<usize, AgentError> {
        let parts = match self.max_chars {
            Some(max) => split_message(text, max),
            None => vec![text.to_string()],
        };
        let count = parts.len();
        self.sent
            .lock()
            .map_err(|e| AgentError::Notify(e.to_string()))?
            .extend(parts);
        Ok(count)
    }
}
