//! 动作节奏：每次成功动作后的固定休眠
//!
//! 这是刻意的节流而非背压；策略可注入，测试中用 `Pacing::none()` 关闭。

use std::time::Duration;

use crate::config::PacingSection;

/// 平台动作种类（也用于计数器与节奏）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Comment,
    Upvote,
    Post,
    /// 回复自己帖子下的评论
    Reply,
    /// 加入他人的讨论串
    Join,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Comment => "comment",
            ActionKind::Upvote => "upvote",
            ActionKind::Post => "post",
            ActionKind::Reply => "reply",
            ActionKind::Join => "join",
        }
    }
}

/// 动作种类 -> 休眠时长
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    comment: Duration,
    upvote: Duration,
    post: Duration,
    reply: Duration,
    join: Duration,
}

impl Pacing {
    pub fn from_config(cfg: &PacingSection) -> Self {
        Self {
            comment: Duration::from_secs(cfg.comment_secs),
            upvote: Duration::from_secs(cfg.upvote_secs),
            post: Duration::from_secs(cfg.post_secs),
            reply: Duration::from_secs(cfg.reply_secs),
            join: Duration::from_secs(cfg.join_secs),
        }
    }

    /// 不休眠（测试用）
    pub fn none() -> Self {
        Self {
            comment: Duration::ZERO,
            upvote: Duration::ZERO,
            post: Duration::ZERO,
            reply: Duration::ZERO,
            join: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, kind: ActionKind) -> Duration {
        match kind {
            ActionKind::Comment => self.comment,
            ActionKind::Upvote => self.upvote,
            ActionKind::Post => self.post,
            ActionKind::Reply => self.reply,
            ActionKind::Join => self.join,
        }
    }

    /// 成功执行一次动作后调用
    pub async fn pause(&self, kind: ActionKind) {
        let delay = self.delay_for(kind);
        if !delay.is_zero() {
            tracing::debug!("Pacing {} for {:?}", kind.as_str(), delay);
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config(&PacingSection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_is_paced_longest() {
        let pacing = Pacing::default();
        assert!(pacing.delay_for(ActionKind::Post) > pacing.delay_for(ActionKind::Comment));
        assert!(pacing.delay_for(ActionKind::Comment) > pacing.delay_for(ActionKind::Upvote));
    }

    #[tokio::test]
    async fn test_none_does_not_sleep() {
        let start = std::time::Instant::now();
        Pacing::none().pause(ActionKind::Post).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
