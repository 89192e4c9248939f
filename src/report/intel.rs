//! 情报报告：把本周期动态整理成结构化分析，附在周期摘要之后

use crate::brain::BrainStats;
use crate::engage::truncate_chars;
use crate::llm::{DecisionOracle, GenerationParams};
use crate::platform::FeedItem;

pub const REPORT_PARAMS: GenerationParams = GenerationParams::new(2000, 0.65);

/// 报告覆盖的最多条目数
pub const REPORT_ITEMS: usize = 30;
/// 每条正文的最多字符数
pub const REPORT_EXCERPT_CHARS: usize = 700;

const ANALYST_PROMPT: &str = "You are an elite intelligence analyst. Be thorough and actionable.";

/// 报告生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntelReport {
    /// 配置关闭
    Disabled,
    /// Oracle 无回答
    Failed,
    Ready(String),
}

pub fn report_prompt(stats: &BrainStats, feed: &[FeedItem]) -> String {
    let divider = "─".repeat(70);
    let mut feed_text = String::new();
    for (i, item) in feed.iter().take(REPORT_ITEMS).enumerate() {
        feed_text.push_str(&format!(
            "\n[{}] {}\nAuthor: {} | m/{} | ⬆️{} | 💬{}\n{}\n{}\n",
            i + 1,
            item.title,
            item.author,
            item.category,
            item.upvotes,
            item.comment_count,
            truncate_chars(&item.body, REPORT_EXCERPT_CHARS),
            divider,
        ));
    }

    format!(
        r#"Create comprehensive intelligence report.

AGENT STATUS:
- Cycles: {cycles}
- Posts: {posts}
- Comments: {comments}
- Upvotes: {upvotes}
- Energy: {energy}%
- Strategy: {strategy}

MOLTBOOK FEED:
{feed_text}

STRUCTURE:

📊 EXECUTIVE SUMMARY
Key developments, trends, notable shifts (3-4 sentences)

🤖 AI & TECHNOLOGY
Detailed analysis of significant posts (title, 3-4 sentence analysis, takeaway)

💰 CRYPTO & FINANCE
Same format

🎯 STRATEGY & INNOVATION
Same format

🔥 TRENDING THEMES
4-5 major themes with context

💡 ACTIONABLE INTELLIGENCE
Specific insights someone could act on

📈 PLATFORM PULSE
Community mood, emerging topics, engagement patterns

Be detailed, professional, insightful."#,
        cycles = stats.cycles,
        posts = stats.posts,
        comments = stats.comments,
        upvotes = stats.upvotes,
        energy = stats.energy,
        strategy = stats.strategy,
    )
}

/// 生成情报报告；一次 Oracle 调用，不重试
pub async fn generate_intel_report(
    oracle: &dyn DecisionOracle,
    stats: &BrainStats,
    feed: &[FeedItem],
) -> IntelReport {
    let prompt = report_prompt(stats, feed);
    match oracle.ask_with(ANALYST_PROMPT, &prompt, &REPORT_PARAMS).await {
        Some(report) => IntelReport::Ready(report),
        None => {
            tracing::warn!("Intel report generation failed");
            IntelReport::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::AgentBrain;
    use crate::llm::ScriptedOracle;
    use crate::platform::mock::item;

    #[test]
    fn test_report_prompt_caps_items_and_excerpt() {
        let mut feed: Vec<FeedItem> = (0..40)
            .map(|i| item(&format!("p{}", i), "alice", "ai", 1, 1))
            .collect();
        feed[0].body = "y".repeat(1000);
        let prompt = report_prompt(&AgentBrain::new().stats(), &feed);
        assert!(prompt.contains("[30] Post p29"));
        assert!(!prompt.contains("[31]"));
        assert!(prompt.contains(&"y".repeat(700)));
        assert!(!prompt.contains(&"y".repeat(701)));
    }

    #[tokio::test]
    async fn test_generate_intel_report() {
        let stats = AgentBrain::new().stats();
        let ok = ScriptedOracle::new([Some("📊 EXECUTIVE SUMMARY\nQuiet day.")]);
        assert_eq!(
            generate_intel_report(&ok, &stats, &[]).await,
            IntelReport::Ready("📊 EXECUTIVE SUMMARY\nQuiet day.".into())
        );

        let silent = ScriptedOracle::silent();
        assert_eq!(
            generate_intel_report(&silent, &stats, &[]).await,
            IntelReport::Failed
        );
    }
}
