//! 无人值守 Agent 运行时
//!
//! create_agent_components 按配置装配平台客户端、Oracle 与通知通道；
//! run_cycle 顺序执行一个完整周期（拉取 → 主互动 → 回复 → 加入讨论 → 报告 → 通知）；
//! run_loop 在周期之间休眠，单个周期的 panic 只触发冷却，不会终止进程。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;

use crate::brain::AgentBrain;
use crate::config::{AppConfig, EngagementSection};
use crate::core::{AgentError, Pacing, ShutdownManager};
use crate::engage::{autonomous_engage, ensure_identity, join_threads, prompts, reply_to_comments};
use crate::integrations::{Notifier, TelegramNotifier};
use crate::llm::{create_groq_client, DecisionOracle, LlmOracle};
use crate::platform::{ActionExecutor, CommentSource, FeedSource, MoltbookClient};
use crate::report::{generate_intel_report, render_summary, CycleReport, IntelReport};

/// 预构建的 Agent 组件：平台、Oracle、通知通道与各项参数，整个进程共享
pub struct AgentComponents {
    pub feed: Arc<dyn FeedSource>,
    pub comments: Arc<dyn CommentSource>,
    pub executor: Arc<dyn ActionExecutor>,
    pub oracle: Arc<dyn DecisionOracle>,
    pub notifier: Arc<dyn Notifier>,
    pub pacing: Pacing,
    pub limits: EngagementSection,
    pub system_prompt: String,
    pub agent_name: String,
    pub intel_report: bool,
    pub interval: Duration,
    pub failure_cooldown: Duration,
}

impl AgentComponents {
    /// 用同一个平台实现充当动态源、评论源和执行器
    pub fn from_parts<P>(
        platform: Arc<P>,
        oracle: Arc<dyn DecisionOracle>,
        notifier: Arc<dyn Notifier>,
        cfg: &AppConfig,
    ) -> Self
    where
        P: FeedSource + CommentSource + ActionExecutor + 'static,
    {
        let system_prompt = cfg
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| prompts::system_prompt(&cfg.agent.name));
        Self {
            feed: platform.clone(),
            comments: platform.clone(),
            executor: platform,
            oracle,
            notifier,
            pacing: Pacing::from_config(&cfg.pacing),
            limits: cfg.engagement.clone(),
            system_prompt,
            agent_name: cfg.agent.name.clone(),
            intel_report: cfg.agent.intel_report,
            interval: cfg.interval(),
            failure_cooldown: cfg.failure_cooldown(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

/// 创建 Agent 组件：Moltbook 客户端、Groq Oracle、Telegram 通知
pub fn create_agent_components(cfg: &AppConfig) -> Result<AgentComponents, AgentError> {
    let platform = Arc::new(MoltbookClient::from_config(&cfg.moltbook)?);
    let llm = Arc::new(create_groq_client(&cfg.llm));
    tracing::info!("LLM model: {}", llm.model());
    let oracle: Arc<dyn DecisionOracle> =
        Arc::new(LlmOracle::new(llm, cfg.llm.request_timeout_secs));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::from_config(&cfg.telegram)?);
    Ok(AgentComponents::from_parts(platform, oracle, notifier, cfg))
}

/// 执行一个完整周期。外部失败都在各轮次内降级，周期总会产出报告并尝试通知。
pub async fn run_cycle(c: &AgentComponents, brain: &mut AgentBrain) -> CycleReport {
    let cycle = brain.begin_cycle();
    let timestamp = Utc::now();
    brain.adjust_energy();
    tracing::info!(
        "[CYCLE {}] {} | energy {}%, strategy {}",
        cycle,
        timestamp.format("%Y-%m-%d %H:%M UTC"),
        brain.energy(),
        brain.strategy()
    );

    tracing::info!("[1/6] Fetching feed...");
    let feed = match c.feed.fetch(c.limits.feed_limit).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!("Feed fetch failed: {}", e);
            Vec::new()
        }
    };
    tracing::info!("Found {} posts", feed.len());

    tracing::info!("[2/6] Deciding autonomous engagement...");
    let engagements = autonomous_engage(c, brain, &feed).await;
    tracing::info!("Chose {} actions", engagements.len());

    tracing::info!("[3/6] Scanning comments on own posts...");
    let replies = reply_to_comments(c, brain).await;
    tracing::info!("Replied to {} comments", replies.len());

    tracing::info!("[4/6] Scanning for valuable discussions...");
    let joins = join_threads(c, brain, &feed).await;
    tracing::info!("Joined {} discussions", joins.len());

    let intel = if c.intel_report {
        tracing::info!("[5/6] Generating intelligence report...");
        generate_intel_report(c.oracle.as_ref(), &brain.stats(), &feed).await
    } else {
        IntelReport::Disabled
    };

    let report = CycleReport {
        cycle,
        timestamp,
        engagements,
        replies,
        joins,
        intel,
        stats: brain.stats(),
        interests: brain.preferred_categories(),
    };

    tracing::info!("[6/6] Sending cycle report...");
    let text = render_summary(&c.agent_name, &report, c.interval);
    if let Err(e) = c.notifier.send(&text).await {
        tracing::error!("Cycle report not delivered: {}", e);
    }

    tracing::info!(
        "[CYCLE {}] Complete: {} actions",
        cycle,
        report.action_count()
    );
    report
}

/// 启动时解析一次身份；失败则留到各轮次按需再查
pub async fn bootstrap_identity(c: &AgentComponents, brain: &mut AgentBrain) {
    match ensure_identity(c, brain).await {
        Some(me) => tracing::info!(
            "Agent: {} (ID: {})",
            me.name,
            me.id.as_deref().unwrap_or("unknown")
        ),
        None => tracing::warn!("Identity not resolved at startup, will retry lazily"),
    }
}

/// 主循环：周期之间休眠 interval，周期 panic 后冷却 failure_cooldown；收到关闭信号即退出
pub async fn run_loop(c: &AgentComponents, mut brain: AgentBrain, shutdown: Arc<ShutdownManager>) {
    let token = shutdown.token();
    bootstrap_identity(c, &mut brain).await;

    loop {
        let outcome = tokio::select! {
            _ = token.cancelled() => break,
            r = AssertUnwindSafe(run_cycle(c, &mut brain)).catch_unwind() => r,
        };

        let pause = match outcome {
            Ok(_) => c.interval,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Cycle failed: {}; cooling down", reason);
                c.failure_cooldown
            }
        };

        tracing::info!("Sleeping {}s until next cycle", pause.as_secs());
        if !shutdown.sleep(pause).await {
            break;
        }
    }

    let stats = brain.stats();
    tracing::info!(
        "[SHUTDOWN] Autonomous operation stopped ({:?}) after {} cycles ({} posts, {} comments, {} upvotes)",
        shutdown.reason(),
        stats.cycles,
        stats.posts,
        stats.comments,
        stats.upvotes
    );
}
