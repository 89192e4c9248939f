//! DecisionOracle：把 LLM 当作不透明的决策来源
//!
//! 返回 None 表示本次调用暂时失败（错误、超时或空文本），调用方降级为「不行动」，不重试。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::llm::{GenerationParams, LlmClient, Message};

#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn ask(&self, system: &str, prompt: &str) -> Option<String>;

    /// 带生成参数的询问；默认忽略参数
    async fn ask_with(
        &self,
        system: &str,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Option<String> {
        self.ask(system, prompt).await
    }
}

/// 基于 LlmClient 的 Oracle：每次调用施加超时，失败只记日志
pub struct LlmOracle {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl LlmOracle {
    pub fn new(llm: Arc<dyn LlmClient>, timeout_secs: u64) -> Self {
        Self {
            llm,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl DecisionOracle for LlmOracle {
    async fn ask(&self, system: &str, prompt: &str) -> Option<String> {
        self.ask_with(system, prompt, &GenerationParams::default())
            .await
    }

    async fn ask_with(
        &self,
        system: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Option<String> {
        let messages = [Message::system(system), Message::user(prompt)];
        match timeout(self.timeout, self.llm.complete_with(&messages, params)).await {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::warn!("Oracle returned empty text");
                    None
                } else {
                    let (_, _, total_tokens) = self.llm.token_usage();
                    tracing::debug!(
                        chars = text.chars().count(),
                        total_tokens,
                        "Oracle responded"
                    );
                    Some(text.to_string())
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Oracle call failed: {}", e);
                None
            }
            Err(_) => {
                tracing::error!("Oracle call timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[tokio::test]
    async fn test_oracle_passes_text_through() {
        let oracle = LlmOracle::new(Arc::new(MockLlmClient::replying("  [] \n")), 5);
        assert_eq!(oracle.ask("sys", "prompt").await.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_oracle_error_is_absent() {
        let oracle = LlmOracle::new(Arc::new(MockLlmClient::failing("429 Too Many Requests")), 5);
        assert!(oracle.ask("sys", "prompt").await.is_none());
    }

    #[tokio::test]
    async fn test_oracle_empty_is_absent() {
        let oracle = LlmOracle::new(Arc::new(MockLlmClient::replying("   ")), 5);
        assert!(oracle.ask("sys", "prompt").await.is_none());
    }

    #[tokio::test]
    async fn test_oracle_sends_system_then_user() {
        let llm = Arc::new(MockLlmClient::replying("ok"));
        let oracle = LlmOracle::new(llm.clone(), 5);
        oracle.ask("persona", "question").await;
        let seen = llm.last_messages();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].content, "persona");
        assert_eq!(seen[1].content, "question");
    }
}
