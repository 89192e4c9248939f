//! Groq API 客户端（OpenAI 兼容格式）
//!
//! - Base URL: https://api.groq.com/openai/v1
//! - 默认模型: llama-3.3-70b-versatile

use crate::config::LlmSection;
use crate::llm::OpenAiClient;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// 创建 Groq 客户端
///
/// - base_url / model 未配置时使用 Groq 默认值
/// - API Key 优先取配置，其次环境变量 `GROQ_API_KEY`
pub fn create_groq_client(cfg: &LlmSection) -> OpenAiClient {
    let api_key = cfg
        .api_key
        .clone()
        .or_else(|| std::env::var("GROQ_API_KEY").ok());
    let base_url = cfg.base_url.as_deref().unwrap_or(GROQ_BASE_URL);
    let model = cfg.model.as_deref().unwrap_or(GROQ_DEFAULT_MODEL);

    OpenAiClient::new(base_url, model, api_key.as_deref())
}
