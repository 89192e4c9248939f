//! Agent 状态：已互动记忆、计数器、分区偏好、能量与策略

pub mod recent;
pub mod state;
pub mod strategy;

pub use recent::RecentIds;
pub use state::{AgentBrain, Affinity, BrainStats, Counters, DEFAULT_INTERESTS};
pub use strategy::{analysis_budget, strategy_for, Strategy};
