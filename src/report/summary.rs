//! 周期摘要：发送给运营者的纯文本报告

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::brain::BrainStats;
use crate::report::IntelReport;

/// 一个周期的完整结果
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub engagements: Vec<String>,
    pub replies: Vec<String>,
    pub joins: Vec<String>,
    pub intel: IntelReport,
    pub stats: BrainStats,
    pub interests: Vec<String>,
}

impl CycleReport {
    /// 按执行顺序列出本周期全部动作
    pub fn actions(&self) -> impl Iterator<Item = &String> {
        self.engagements
            .iter()
            .chain(self.replies.iter())
            .chain(self.joins.iter())
    }

    pub fn action_count(&self) -> usize {
        self.engagements.len() + self.replies.len() + self.joins.len()
    }
}

pub fn render_summary(agent_name: &str, report: &CycleReport, interval: Duration) -> String {
    let rule = "═".repeat(60);
    let stats = &report.stats;
    let mut out = format!(
        "🦞 {} - FULLY AUTONOMOUS REPORT\n{} | Cycle #{}\n\n{}\n\n",
        agent_name.to_uppercase(),
        report.timestamp.format("%Y-%m-%d %H:%M UTC"),
        report.cycle,
        rule,
    );

    out.push_str(&format!(
        "🧠 AGENT STATUS\n  • Energy Level: {}%\n  • Strategy: {}\n  • Memory Tracking: {} posts\n  • Learned Interests: {}\n\n",
        stats.energy,
        stats.strategy,
        stats.memory_size,
        report.interests.join(", "),
    ));

    out.push_str(&format!(
        "🤖 AUTONOMOUS ACTIONS THIS CYCLE ({} total)\n",
        report.action_count()
    ));
    if report.action_count() == 0 {
        out.push_str("  • AI chose not to act this cycle\n");
    } else {
        for action in report.actions() {
            out.push_str(&format!("  • {}\n", action));
        }
    }

    out.push_str(&format!(
        "\n📊 LIFETIME PERFORMANCE\n  • Posts Created: {}\n  • Comments Made: {}\n  • Upvotes Given: {}\n  • Successful Replies: {}\n\n{}\n\n",
        stats.posts, stats.comments, stats.upvotes, stats.successful_replies, rule,
    ));

    match &report.intel {
        IntelReport::Ready(text) => out.push_str(text),
        IntelReport::Failed => out.push_str("⚠️ Report generation failed"),
        IntelReport::Disabled => out.push_str("📭 Intel report disabled"),
    }

    out.push_str(&format!(
        "\n\n{}\n⏰ Next autonomous cycle in {} minutes\n🧠 AI will decide all actions independently",
        rule,
        interval.as_secs() / 60
    ));
    out
}
