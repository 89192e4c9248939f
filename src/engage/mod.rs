//! 互动轮次：主互动（一次 Oracle 调用决定一批动作）、回复扫描、加入讨论
//!
//! 每个轮次都接收 `&mut AgentBrain`，按顺序执行；外部失败只降级为「本轮不行动」。

pub mod decision;
pub mod primary;
pub mod prompts;
pub mod replies;
pub mod threads;

pub use decision::{parse_decisions, strip_code_fences, Decision};
pub use primary::autonomous_engage;
pub use replies::reply_to_comments;
pub use threads::{join_threads, rank_threads};

use crate::agent::AgentComponents;
use crate::brain::AgentBrain;
use crate::core::ActionKind;
use crate::platform::{ActionOutcome, Identity};

/// 按字符截断（不切断 UTF-8）
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// 回答是否表示放弃
pub fn is_skip(reply: &str) -> bool {
    reply.to_uppercase().contains(prompts::SKIP_SENTINEL)
}

/// 输出一条动作审计日志（JSON），返回是否成功
pub(crate) fn audit_outcome(kind: ActionKind, target: &str, outcome: &ActionOutcome) -> bool {
    let ok = outcome.is_success();
    let result = match outcome {
        ActionOutcome::Success { .. } => "ok",
        ActionOutcome::RateLimited => "rate_limited",
        ActionOutcome::Failed(_) => "error",
    };
    let audit = serde_json::json!({
        "event": "action_audit",
        "action": kind.as_str(),
        "target": target,
        "ok": ok,
        "outcome": result,
    });
    tracing::info!(audit = %audit.to_string(), "action");

    match outcome {
        ActionOutcome::Success { .. } => {}
        ActionOutcome::RateLimited => {
            tracing::warn!("{} on {} rate limited, skipping", kind.as_str(), target)
        }
        ActionOutcome::Failed(reason) => {
            tracing::error!("{} on {} failed: {}", kind.as_str(), target, reason)
        }
    }
    ok
}

/// 取得身份；未知时向平台查询一次并写入 brain
pub async fn ensure_identity(c: &AgentComponents, brain: &mut AgentBrain) -> Option<Identity> {
    if let Some(me) = brain.identity() {
        return Some(me.clone());
    }
    match c.feed.whoami().await {
        Ok(me) => {
            brain.set_identity(me.clone());
            Some(me)
        }
        Err(e) => {
            tracing::warn!("Could not resolve agent identity: {}", e);
            None
        }
    }
}
