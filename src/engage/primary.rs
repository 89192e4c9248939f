//! 主互动轮次：按能量决定分析窗口，一次 Oracle 调用得到动作列表，逐条校验后执行
//!
//! Oracle 每轮最多调用一次；回答无法解析时本轮不行动，不重试。

use crate::agent::AgentComponents;
use crate::brain::{analysis_budget, AgentBrain};
use crate::core::ActionKind;
use crate::engage::decision::{parse_decisions, Decision};
use crate::engage::{audit_outcome, ensure_identity, prompts, truncate_chars};
use crate::platform::{ActionOutcome, FeedItem};

const TITLE_PREVIEW: usize = 50;

/// 执行主互动轮次，返回本轮实际完成的动作描述
pub async fn autonomous_engage(
    c: &AgentComponents,
    brain: &mut AgentBrain,
    feed: &[FeedItem],
) -> Vec<String> {
    let budget = analysis_budget(c.limits.base_analysis_budget, brain.energy(), feed.len());
    tracing::info!(
        "[BRAIN] Energy: {}%, Strategy: {}, Analyzing: {} posts",
        brain.energy(),
        brain.strategy(),
        budget
    );

    let window = &feed[..budget];
    // 自己发布的内容只记录，不参与互动
    if ensure_identity(c, brain).await.is_some() {
        let own: Vec<String> = window
            .iter()
            .filter(|item| brain.is_me(&item.author))
            .map(|item| item.id.clone())
            .collect();
        for id in own {
            brain.add_own_content(id);
        }
    }
    let candidates: Vec<(usize, &FeedItem)> = window
        .iter()
        .enumerate()
        .filter(|(_, item)| brain.should_engage(&item.id))
        .collect();
    if candidates.is_empty() {
        tracing::info!("[BRAIN] No new posts to engage with");
        return Vec::new();
    }

    let prompt = prompts::decision_prompt(
        &brain.stats(),
        &brain.preferred_categories(),
        &candidates,
        c.limits.body_excerpt_chars,
    );

    let Some(raw) = c
        .oracle
        .ask_with(&c.system_prompt, &prompt, &prompts::DECISION_PARAMS)
        .await
    else {
        tracing::warn!("No AI response for engagement decisions, skipping pass");
        return Vec::new();
    };

    let decisions = match parse_decisions(&raw) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("{}", e);
            tracing::debug!("Response: {}", truncate_chars(&raw, 300));
            return Vec::new();
        }
    };
    tracing::info!("[BRAIN] AI decided on {} actions", decisions.len());

    let mut actions = Vec::new();
    for decision in decisions {
        if let Some(done) = execute(c, brain, window, decision).await {
            tracing::info!("{}", done);
            actions.push(done);
        }
    }
    actions
}

/// 下标必须落在本轮分析窗口内
fn lookup(window: &[FeedItem], index: i64) -> Option<&FeedItem> {
    usize::try_from(index).ok().and_then(|i| window.get(i))
}

/// 校验并执行单条决策；未执行或失败返回 None
async fn execute(
    c: &AgentComponents,
    brain: &mut AgentBrain,
    window: &[FeedItem],
    decision: Decision,
) -> Option<String> {
    match decision {
        Decision::Comment {
            post_index,
            comment,
        } => {
            let item = target(brain, window, post_index)?;
            let text = comment.trim();
            if text.chars().count() < c.limits.min_comment_chars {
                tracing::debug!("Comment for [{}] too short, dropped", post_index);
                return None;
            }
            let outcome = c.executor.comment(&item.id, text, None).await;
            if !audit_outcome(ActionKind::Comment, &item.id, &outcome) {
                return None;
            }
            brain.mark_engaged(
                Some(item.id.as_str()),
                ActionKind::Comment,
                Some(item.category.as_str()),
            );
            c.pacing.pause(ActionKind::Comment).await;
            Some(format!(
                "💬 Commented on '{}'",
                truncate_chars(&item.title, TITLE_PREVIEW)
            ))
        }
        Decision::Upvote { post_index } => {
            let item = target(brain, window, post_index)?;
            let outcome = c.executor.upvote(&item.id).await;
            if !audit_outcome(ActionKind::Upvote, &item.id, &outcome) {
                return None;
            }
            brain.mark_engaged(
                Some(item.id.as_str()),
                ActionKind::Upvote,
                Some(item.category.as_str()),
            );
            c.pacing.pause(ActionKind::Upvote).await;
            Some(format!(
                "⬆️ Upvoted '{}'",
                truncate_chars(&item.title, TITLE_PREVIEW)
            ))
        }
        Decision::Post {
            submolt,
            title,
            content,
        } => {
            let title = title.trim();
            let content = content.trim();
            let category = match submolt.trim() {
                "" => "general",
                s => s,
            };
            if title.is_empty() || content.chars().count() < c.limits.min_post_chars {
                tracing::debug!("Post decision failed validation, dropped");
                return None;
            }
            let outcome = c.executor.post(category, title, content).await;
            if !audit_outcome(ActionKind::Post, category, &outcome) {
                return None;
            }
            let id = match outcome {
                ActionOutcome::Success {
                    created_id: Some(id),
                } => {
                    brain.add_own_content(id.clone());
                    id
                }
                _ => format!("own:{}", title),
            };
            brain.mark_engaged(Some(id.as_str()), ActionKind::Post, Some(category));
            c.pacing.pause(ActionKind::Post).await;
            Some(format!(
                "📝 Posted '{}' in m/{}",
                truncate_chars(title, TITLE_PREVIEW),
                category
            ))
        }
    }
}

/// 定位下标对应的条目，且该条目本进程内尚未互动过
fn target<'a>(brain: &AgentBrain, window: &'a [FeedItem], post_index: i64) -> Option<&'a FeedItem> {
    let Some(item) = lookup(window, post_index) else {
        tracing::debug!("post_index {} out of range, dropped", post_index);
        return None;
    };
    if !brain.should_engage(&item.id) {
        tracing::debug!("Already engaged with {}, dropped", item.id);
        return None;
    }
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::item;

    #[test]
    fn test_lookup_bounds() {
        let window = vec![item("a", "x", "ai", 0, 0), item("b", "x", "ai", 0, 0)];
        assert_eq!(lookup(&window, 1).map(|i| i.id.as_str()), Some("b"));
        assert!(lookup(&window, 2).is_none());
        assert!(lookup(&window, -1).is_none());
    }

    #[test]
    fn test_target_rejects_engaged() {
        let window = vec![item("a", "x", "ai", 0, 0)];
        let mut brain = AgentBrain::new();
        assert!(target(&brain, &window, 0).is_some());
        brain.mark_engaged(Some("a"), ActionKind::Upvote, None);
        assert!(target(&brain, &window, 0).is_none());
    }
}
