//! 平台层：动态源、评论源、动作执行器的抽象与实现（Moltbook HTTP / Mock）
//!
//! 核心只依赖这里的 trait；具体的 HTTP 细节留在 `moltbook` 里。

pub mod mock;
pub mod moltbook;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockPlatform;
pub use moltbook::MoltbookClient;

/// 平台调用失败（传输、超时、非预期状态码、响应格式）
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PlatformError::Timeout
        } else if e.is_decode() {
            PlatformError::Malformed(e.to_string())
        } else {
            PlatformError::Transport(e.to_string())
        }
    }
}

/// Agent 在平台上的身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub id: Option<String>,
}

/// 动态中的一条内容（单周期内只读快照）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    /// 分区（Moltbook 的 submolt）
    pub category: String,
    pub upvotes: i64,
    pub comment_count: i64,
}

impl FeedItem {
    /// 讨论活跃度：2 × 评论数 + 点赞数
    pub fn activity_score(&self) -> i64 {
        self.comment_count * 2 + self.upvotes
    }
}

/// 帖子下的一条评论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub parent_id: Option<String>,
    pub author: String,
    pub text: String,
}

/// 动作执行结果：成功 / 被限流 / 失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 成功；发帖时可能带回新内容 id
    Success { created_id: Option<String> },
    RateLimited,
    Failed(String),
}

impl ActionOutcome {
    pub fn ok() -> Self {
        ActionOutcome::Success { created_id: None }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success { .. })
    }
}

/// 动态源：拉取最新内容、查询自身身份
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// 拉取最新的最多 `limit` 条内容；空列表表示本周期无事可做
    async fn fetch(&self, limit: usize) -> Result<Vec<FeedItem>, PlatformError>;

    async fn whoami(&self) -> Result<Identity, PlatformError>;
}

/// 评论源
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn list(&self, item_id: &str) -> Result<Vec<Comment>, PlatformError>;
}

/// 动作执行器：评论（可带 parent）、点赞、发帖
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn comment(&self, item_id: &str, text: &str, parent_id: Option<&str>) -> ActionOutcome;

    async fn upvote(&self, item_id: &str) -> ActionOutcome;

    async fn post(&self, category: &str, title: &str, body: &str) -> ActionOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_score_weights_comments() {
        let item = FeedItem {
            id: "p1".into(),
            title: "t".into(),
            body: String::new(),
            author: "a".into(),
            category: "general".into(),
            upvotes: 3,
            comment_count: 4,
        };
        assert_eq!(item.activity_score(), 11);
    }

    #[test]
    fn test_outcome_success() {
        assert!(ActionOutcome::ok().is_success());
        assert!(!ActionOutcome::RateLimited.is_success());
        assert!(!ActionOutcome::Failed("x".into()).is_success());
    }
}
