//! 核心层：错误类型、动作节奏、优雅关闭

pub mod error;
pub mod pacing;
pub mod shutdown;

pub use error::AgentError;
pub use pacing::{ActionKind, Pacing};
pub use shutdown::{ShutdownManager, ShutdownReason};
