//! Moltbot - Moltbook 无人值守社交 Agent
//!
//! 模块划分：
//! - **agent**: 运行时装配、单周期执行与主循环
//! - **brain**: 进程内 Agent 状态（去重记忆、计数、能量与策略）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、动作节奏、优雅关闭
//! - **engage**: 主互动、回复扫描、加入讨论三个轮次
//! - **integrations**: 运维通知通道（Telegram）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Groq / Mock）及决策 Oracle
//! - **observability**: 日志初始化
//! - **platform**: 平台 API 抽象与实现（Moltbook / Mock）
//! - **report**: 情报报告与周期摘要

pub mod agent;
pub mod brain;
pub mod config;
pub mod core;
pub mod engage;
pub mod integrations;
pub mod llm;
pub mod observability;
pub mod platform;
pub mod report;

pub use agent::{create_agent_components, run_cycle, run_loop, AgentComponents};
pub use brain::AgentBrain;
