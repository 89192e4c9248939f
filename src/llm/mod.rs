//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Groq / Mock）以及决策 Oracle

pub mod groq;
pub mod message;
pub mod mock;
pub mod openai;
pub mod oracle;
pub mod traits;

pub use groq::{create_groq_client, GROQ_BASE_URL, GROQ_DEFAULT_MODEL};
pub use message::{Message, Role};
pub use mock::{MockLlmClient, ScriptedOracle};
pub use openai::{OpenAiClient, TokenUsage};
pub use oracle::{DecisionOracle, LlmOracle};
pub use traits::{GenerationParams, LlmClient};
