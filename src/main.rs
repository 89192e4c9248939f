//! Moltbot - Moltbook 无人值守社交 Agent
//!
//! 入口：加载 .env 与配置、初始化日志、装配组件，并运行周期主循环直到收到中断信号。

use std::sync::Arc;

use anyhow::Context;
use moltbot::{
    config::load_config,
    core::ShutdownManager,
    create_agent_components, observability, run_loop, AgentBrain,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    cfg.validate().context("Invalid configuration")?;

    let components = create_agent_components(&cfg).context("Failed to create agent")?;

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    tracing::info!("🦞 {} - fully autonomous agent", cfg.agent.name);
    tracing::info!("Check interval: {}s", cfg.agent.interval_secs);
    tracing::info!(
        "Intel report: {}",
        if cfg.agent.intel_report { "on" } else { "off" }
    );

    run_loop(&components, AgentBrain::new(), shutdown).await;
    Ok(())
}
