//! 加入讨论：从动态中挑选评论最活跃的他人帖子，判断是否值得参与
//!
//! 身份未知时跳过整个轮次；自己已参与过的讨论串不再加入。

use crate::agent::AgentComponents;
use crate::brain::AgentBrain;
use crate::config::EngagementSection;
use crate::core::ActionKind;
use crate::engage::{audit_outcome, ensure_identity, is_skip, prompts, truncate_chars};
use crate::platform::FeedItem;

/// 候选讨论串：扫描窗口内、未互动过、非自己发布、评论数达到门槛，按活跃度降序（稳定排序）
pub fn rank_threads<'a>(
    brain: &AgentBrain,
    feed: &'a [FeedItem],
    me: &str,
    limits: &EngagementSection,
) -> Vec<&'a FeedItem> {
    let mut threads: Vec<&FeedItem> = feed
        .iter()
        .take(limits.thread_scan_window)
        .filter(|item| brain.should_engage(&item.id))
        .filter(|item| item.author != me)
        .filter(|item| item.comment_count >= limits.min_thread_comments as i64)
        .collect();
    threads.sort_by_key(|item| std::cmp::Reverse(item.activity_score()));
    threads
}

fn threads_to_check(limits: &EngagementSection, energy: i32) -> usize {
    if energy > limits.high_energy_threshold {
        limits.threads_to_check_high_energy
    } else {
        limits.threads_to_check_low_energy
    }
}

/// 执行加入讨论轮次，返回本轮完成的动作描述
pub async fn join_threads(
    c: &AgentComponents,
    brain: &mut AgentBrain,
    feed: &[FeedItem],
) -> Vec<String> {
    let Some(me) = ensure_identity(c, brain).await else {
        tracing::warn!("Identity unknown, skipping thread pass");
        return Vec::new();
    };

    let limit = threads_to_check(&c.limits, brain.energy());
    let ranked: Vec<FeedItem> = rank_threads(brain, feed, &me.name, &c.limits)
        .into_iter()
        .take(limit)
        .cloned()
        .collect();
    tracing::debug!("Checking {} discussion threads", ranked.len());

    let mut actions = Vec::new();
    for item in &ranked {
        if actions.len() >= c.limits.max_thread_joins {
            break;
        }
        let comments = match c.comments.list(&item.id).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!("Get comments on {} failed: {}", item.id, e);
                continue;
            }
        };
        if comments.len() < c.limits.min_thread_comments {
            continue;
        }
        if comments.iter().any(|cm| cm.author == me.name) {
            tracing::debug!("Already in thread {}, skipping", item.id);
            continue;
        }

        let prompt = prompts::join_prompt(
            item,
            &comments,
            c.limits.thread_transcript_comments,
            c.limits.thread_comment_chars,
        );
        let Some(reply) = c
            .oracle
            .ask_with(&c.system_prompt, &prompt, &prompts::JOIN_PARAMS)
            .await
        else {
            continue;
        };
        let reply = reply.trim();
        if is_skip(reply) || reply.chars().count() < c.limits.min_join_chars {
            tracing::debug!("Chose not to join {}", item.id);
            continue;
        }

        let parent = comments.first().map(|cm| cm.id.as_str());
        let outcome = c.executor.comment(&item.id, reply, parent).await;
        if audit_outcome(ActionKind::Join, &item.id, &outcome) {
            brain.mark_engaged(
                Some(item.id.as_str()),
                ActionKind::Join,
                Some(item.category.as_str()),
            );
            let done = format!(
                "💭 Joined discussion: '{}'",
                truncate_chars(&item.title, 40)
            );
            tracing::info!("{}", done);
            actions.push(done);
            c.pacing.pause(ActionKind::Join).await;
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::item;

    #[test]
    fn test_rank_threads_filters_and_orders() {
        let feed = vec![
            item("quiet", "alice", "ai", 50, 1),
            item("mine", "me", "ai", 10, 30),
            item("warm", "bob", "ai", 1, 5),
            item("hot", "carol", "crypto", 4, 20),
            item("done", "dave", "ai", 0, 40),
        ];
        let mut brain = AgentBrain::new();
        brain.mark_engaged(Some("done"), ActionKind::Comment, None);

        let limits = EngagementSection::default();
        let ranked: Vec<&str> = rank_threads(&brain, &feed, "me", &limits)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ranked, vec!["hot", "warm"]);
    }

    #[test]
    fn test_rank_threads_respects_scan_window() {
        let mut feed: Vec<FeedItem> = (0..50)
            .map(|i| item(&format!("p{}", i), "x", "ai", 0, 2))
            .collect();
        feed[45].comment_count = 100;
        let brain = AgentBrain::new();
        let limits = EngagementSection::default();
        let ranked = rank_threads(&brain, &feed, "me", &limits);
        assert_eq!(ranked.len(), 40);
        assert!(ranked.iter().all(|i| i.id != "p45"));
    }

    #[test]
    fn test_threads_to_check_by_energy() {
        let limits = EngagementSection::default();
        assert_eq!(threads_to_check(&limits, 100), 15);
        assert_eq!(threads_to_check(&limits, 80), 8);
    }
}
