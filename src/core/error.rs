//! Agent 错误类型
//!
//! 周期内的各类失败都在本地降级（记日志、视为「无结果」），只有配置错误会在启动时终止进程。

use thiserror::Error;

use crate::platform::PlatformError;

/// Agent 运行过程中可能出现的错误（配置、平台、Oracle 输出、通知）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Oracle 返回了无法解析的决策
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("Notify failed: {0}")]
    Notify(String),
}
