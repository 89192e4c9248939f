//! 回复扫描：检查自己最近的帖子，对他人尚未得到回复的评论逐条询问 Oracle
//!
//! 每条评论最多回复一次；每周期回复数有上限（能量低时更小），达到上限后不再评估任何评论。

use crate::agent::AgentComponents;
use crate::brain::AgentBrain;
use crate::core::ActionKind;
use crate::engage::{audit_outcome, ensure_identity, is_skip, prompts, truncate_chars};
use crate::platform::{Comment, FeedItem, Identity};

/// 评论正文至少要超过该长度才值得回复
const MIN_COMMENT_TEXT: usize = 5;

/// 本周期的回复上限
pub fn reply_cap(c: &AgentComponents, energy: i32) -> usize {
    if energy > c.limits.high_energy_threshold {
        c.limits.max_replies_high_energy
    } else {
        c.limits.max_replies_low_energy
    }
}

/// 该评论下是否已有自己的直接回复
fn already_answered(thread: &[Comment], comment_id: &str, me: &str) -> bool {
    thread
        .iter()
        .any(|c| c.parent_id.as_deref() == Some(comment_id) && c.author == me)
}

/// 拉取自己最近的帖子，并记入 own_content_ids
async fn fetch_own_posts(
    c: &AgentComponents,
    brain: &mut AgentBrain,
    me: &Identity,
) -> Vec<FeedItem> {
    let limit = c.limits.own_post_limit;
    let feed = match c.feed.fetch(limit * 2).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!("Get my posts failed: {}", e);
            return Vec::new();
        }
    };
    let own: Vec<FeedItem> = feed
        .into_iter()
        .filter(|p| p.author == me.name)
        .take(limit)
        .collect();
    for post in &own {
        brain.add_own_content(post.id.clone());
    }
    own
}

/// 执行回复轮次，返回本轮完成的回复描述
pub async fn reply_to_comments(c: &AgentComponents, brain: &mut AgentBrain) -> Vec<String> {
    let Some(me) = ensure_identity(c, brain).await else {
        tracing::warn!("Identity unknown, skipping reply pass");
        return Vec::new();
    };

    let own_posts = fetch_own_posts(c, brain, &me).await;
    let max_replies = reply_cap(c, brain.energy());
    let mut actions = Vec::new();

    'posts: for post in &own_posts {
        if actions.len() >= max_replies {
            break;
        }
        let thread = match c.comments.list(&post.id).await {
            Ok(thread) => thread,
            Err(e) => {
                tracing::warn!("Get comments on {} failed: {}", post.id, e);
                continue;
            }
        };

        for comment in &thread {
            if actions.len() >= max_replies {
                break 'posts;
            }
            if comment.author == me.name || brain.has_replied(&comment.id) {
                continue;
            }
            if already_answered(&thread, &comment.id, &me.name) {
                continue;
            }
            let text = comment.text.trim();
            if text.chars().count() <= MIN_COMMENT_TEXT {
                continue;
            }

            let prompt = prompts::reply_prompt(&post.title, &comment.author, text);
            let Some(reply) = c
                .oracle
                .ask_with(&c.system_prompt, &prompt, &prompts::REPLY_PARAMS)
                .await
            else {
                continue;
            };
            let reply = reply.trim();
            if is_skip(reply) || reply.chars().count() < c.limits.min_reply_chars {
                tracing::debug!("Chose not to reply to {}", comment.id);
                continue;
            }

            let outcome = c
                .executor
                .comment(&post.id, reply, Some(comment.id.as_str()))
                .await;
            if audit_outcome(ActionKind::Reply, &comment.id, &outcome) {
                brain.record_reply(&comment.id);
                let done = format!(
                    "↩️ Replied to {} on '{}'",
                    comment.author,
                    truncate_chars(&post.title, 40)
                );
                tracing::info!("{}", done);
                actions.push(done);
                c.pacing.pause(ActionKind::Reply).await;
            }
        }
    }

    actions
}
