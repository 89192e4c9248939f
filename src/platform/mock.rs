//! Mock 平台（用于测试，无需网络）
//!
//! 预置动态、评论与身份；记录所有动作调用，便于断言「执行器是否被调用」。

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::platform::{
    ActionExecutor, ActionOutcome, Comment, CommentSource, FeedItem, FeedSource, Identity,
    PlatformError,
};

/// 被记录下来的一次动作调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCall {
    Comment {
        item_id: String,
        text: String,
        parent_id: Option<String>,
    },
    Upvote {
        item_id: String,
    },
    Post {
        category: String,
        title: String,
        body: String,
    },
}

/// Mock 平台：动态源 + 评论源 + 执行器
pub struct MockPlatform {
    identity: Option<Identity>,
    feed: Vec<FeedItem>,
    comments: HashMap<String, Vec<Comment>>,
    outcome: ActionOutcome,
    calls: Mutex<Vec<ActionCall>>,
}

impl MockPlatform {
    pub fn new(feed: Vec<FeedItem>) -> Self {
        Self {
            identity: Some(Identity {
                name: "me".to_string(),
                id: Some("agent-me".to_string()),
            }),
            feed,
            comments: HashMap::new(),
            outcome: ActionOutcome::ok(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_comments(mut self, item_id: &str, comments: Vec<Comment>) -> Self {
        self.comments.insert(item_id.to_string(), comments);
        self
    }

    /// 所有动作统一返回该结果
    pub fn with_outcome(mut self, outcome: ActionOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn calls(&self) -> Vec<ActionCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ActionCall) -> ActionOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        self.outcome.clone()
    }
}

/// 构造测试用的动态条目
pub fn item(id: &str, author: &str, category: &str, upvotes: i64, comment_count: i64) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        title: format!("Post {}", id),
        body: format!("Body of {}", id),
        author: author.to_string(),
        category: category.to_string(),
        upvotes,
        comment_count,
    }
}

/// 构造测试用的评论
pub fn comment(id: &str, parent_id: Option<&str>, author: &str, text: &str) -> Comment {
    Comment {
        id: id.to_string(),
        parent_id: parent_id.map(String::from),
        author: author.to_string(),
        text: text.to_string(),
    }
}

#[async_trait]
impl FeedSource for MockPlatform {
    async fn fetch(&self, limit: usize) -> Result<Vec<FeedItem>, PlatformError> {
        Ok(self.feed.iter().take(limit).cloned().collect())
    }

    async fn whoami(&self) -> Result<Identity, PlatformError> {
        self.identity
            .clone()
            .ok_or_else(|| PlatformError::Transport("identity unavailable".to_string()))
    }
}

#[async_trait]
impl CommentSource for MockPlatform {
    async fn list(&self, item_id: &str) -> Result<Vec<Comment>, PlatformError> {
        Ok(self.comments.get(item_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ActionExecutor for MockPlatform {
    async fn comment(&self, item_id: &str, text: &str, parent_id: Option<&str>) -> ActionOutcome {
        self.record(ActionCall::Comment {
            item_id: item_id.to_string(),
            text: text.to_string(),
            parent_id: parent_id.map(String::from),
        })
    }

    async fn upvote(&self, item_id: &str) -> ActionOutcome {
        self.record(ActionCall::Upvote {
            item_id: item_id.to_string(),
        })
    }

    async fn post(&self, category: &str, title: &str, body: &str) -> ActionOutcome {
        self.record(ActionCall::Post {
            category: category.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        })
    }
}
