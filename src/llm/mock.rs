//! Mock LLM 与 Mock Oracle（用于测试，无需 API）

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{DecisionOracle, LlmClient, Message};

/// Mock 客户端：固定返回同一结果，并记录最后一次收到的消息
#[derive(Debug)]
pub struct MockLlmClient {
    reply: Result<String, String>,
    last: Mutex<Vec<Message>>,
}

impl MockLlmClient {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            last: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: impl Into<String>) -> Self {
        Self {
            reply: Err(err.into()),
            last: Mutex::new(Vec::new()),
        }
    }

    pub fn last_messages(&self) -> Vec<Message> {
        self.last.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let Ok(mut last) = self.last.lock() {
            *last = messages.to_vec();
        }
        self.reply.clone()
    }
}

/// 按顺序返回预置回答的 Oracle；回答用完后返回 None。记录每次收到的 prompt。
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 每次都返回同一回答
    pub fn always(reply: &str, times: usize) -> Self {
        Self::new(std::iter::repeat(Some(reply.to_string())).take(times))
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    async fn ask(&self, _system: &str, prompt: &str) -> Option<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .flatten()
    }
}
