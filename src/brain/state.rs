//! AgentBrain：进程生命周期内的 Agent 状态
//!
//! 由主循环创建并独占，以 `&mut` 显式传入每一轮处理；不跨进程持久化。

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::brain::recent::RecentIds;
use crate::brain::strategy::{
    strategy_for, Strategy, ENERGY_BOOST_REPLIES, ENERGY_DECAY_EVERY, ENERGY_MAX, ENERGY_MIN,
    ENERGY_NOMINAL, ENERGY_STEP,
};
use crate::core::ActionKind;
use crate::platform::Identity;

/// 没有任何学习数据时的默认兴趣
pub const DEFAULT_INTERESTS: [&str; 3] = ["ai", "technology", "crypto"];
const TOP_INTERESTS: usize = 5;

/// 生命周期累计计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub posts: u64,
    pub comments: u64,
    pub upvotes: u64,
    pub successful_replies: u64,
    pub cycle_count: u64,
}

/// 某个分区的学习记录
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affinity {
    pub posts: u64,
    pub engagement: u64,
}

impl Affinity {
    fn score(&self) -> f64 {
        self.engagement as f64 / self.posts.max(1) as f64
    }
}

/// 报告与 prompt 使用的状态快照
#[derive(Debug, Clone)]
pub struct BrainStats {
    pub cycles: u64,
    pub posts: u64,
    pub comments: u64,
    pub upvotes: u64,
    pub successful_replies: u64,
    pub energy: i32,
    pub strategy: Strategy,
    pub memory_size: usize,
}

#[derive(Debug, Clone)]
pub struct AgentBrain {
    identity: Option<Identity>,
    engaged: RecentIds,
    own_content: HashSet<String>,
    replied_comments: HashSet<String>,
    counters: Counters,
    /// 按首次出现顺序保存，排序时作为稳定的次序
    affinity: Vec<(String, Affinity)>,
    energy: i32,
    strategy: Strategy,
    /// 自上次周期性检查以来的成功回复数
    recent_replies: u64,
    last_action_at: HashMap<ActionKind, DateTime<Utc>>,
}

impl Default for AgentBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBrain {
    pub fn new() -> Self {
        Self {
            identity: None,
            engaged: RecentIds::default(),
            own_content: HashSet::new(),
            replied_comments: HashSet::new(),
            counters: Counters::default(),
            affinity: Vec::new(),
            energy: ENERGY_NOMINAL,
            strategy: Strategy::Balanced,
            recent_replies: 0,
            last_action_at: HashMap::new(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// 只在首次设置时生效，之后只读
    pub fn set_identity(&mut self, identity: Identity) {
        if self.identity.is_none() {
            tracing::info!("Agent identity: {} ({:?})", identity.name, identity.id);
            self.identity = Some(identity);
        }
    }

    /// 是否是自己（按显示名比较）
    pub fn is_me(&self, author: &str) -> bool {
        self.identity.as_ref().map_or(false, |me| me.name == author)
    }

    pub fn should_engage(&self, id: &str) -> bool {
        !self.engaged.contains(id) && !self.own_content.contains(id)
    }

    /// 记录一次互动：写入 engaged_ids（id 为空时跳过）、累加计数、更新分区学习数据
    pub fn mark_engaged(&mut self, id: Option<&str>, kind: ActionKind, category: Option<&str>) {
        if let Some(id) = id {
            let evicted = self.engaged.insert(id);
            if evicted > 0 {
                tracing::debug!("Engaged-id memory pruned {} oldest entries", evicted);
            }
        }

        match kind {
            ActionKind::Post => self.counters.posts += 1,
            ActionKind::Comment | ActionKind::Join | ActionKind::Reply => {
                self.counters.comments += 1
            }
            ActionKind::Upvote => self.counters.upvotes += 1,
        }
        self.last_action_at.insert(kind, Utc::now());

        if let Some(category) = category.filter(|c| !c.is_empty()) {
            let entry = match self.affinity.iter().position(|(c, _)| c == category) {
                Some(i) => &mut self.affinity[i].1,
                None => {
                    self.affinity.push((category.to_string(), Affinity::default()));
                    let last = self.affinity.len() - 1;
                    &mut self.affinity[last].1
                }
            };
            entry.engagement += 1;
            if kind == ActionKind::Post {
                entry.posts += 1;
            }
        }
    }

    pub fn add_own_content(&mut self, id: impl Into<String>) {
        self.own_content.insert(id.into());
    }

    pub fn has_replied(&self, comment_id: &str) -> bool {
        self.replied_comments.contains(comment_id)
    }

    /// 记录一次成功回复：回复也算作一条评论
    pub fn record_reply(&mut self, comment_id: &str) {
        self.replied_comments.insert(comment_id.to_string());
        self.counters.successful_replies += 1;
        self.recent_replies += 1;
        self.mark_engaged(None, ActionKind::Reply, None);
    }

    /// 周期开始：计数 +1，重新决定策略
    pub fn begin_cycle(&mut self) -> u64 {
        self.counters.cycle_count += 1;
        self.strategy = self.decide_strategy();
        self.counters.cycle_count
    }

    pub fn preferred_categories(&self) -> Vec<String> {
        if self.affinity.is_empty() {
            return DEFAULT_INTERESTS.iter().map(|s| s.to_string()).collect();
        }
        let mut ranked: Vec<&(String, Affinity)> = self.affinity.iter().collect();
        // sort_by 是稳定排序：同分时保持插入顺序
        ranked.sort_by(|a, b| b.1.score().total_cmp(&a.1.score()));
        ranked
            .into_iter()
            .take(TOP_INTERESTS)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// 根据近期成功情况调整能量；返回调整后的值
    pub fn adjust_energy(&mut self) -> i32 {
        if self.recent_replies > ENERGY_BOOST_REPLIES {
            self.energy = (self.energy + ENERGY_STEP).min(ENERGY_MAX);
        }

        let cycle = self.counters.cycle_count;
        if cycle > 0 && cycle % ENERGY_DECAY_EVERY == 0 {
            if self.recent_replies == 0 {
                self.energy = (self.energy - ENERGY_STEP).max(ENERGY_MIN);
            }
            self.recent_replies = 0;
        }
        self.energy
    }

    pub fn decide_strategy(&self) -> Strategy {
        strategy_for(self.counters.successful_replies, self.counters.comments)
    }

    pub fn energy(&self) -> i32 {
        self.energy
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn affinity(&self, category: &str) -> Option<Affinity> {
        self.affinity
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, a)| *a)
    }

    pub fn last_action_at(&self, kind: ActionKind) -> Option<DateTime<Utc>> {
        self.last_action_at.get(&kind).copied()
    }

    pub fn memory_size(&self) -> usize {
        self.engaged.len()
    }

    pub fn stats(&self) -> BrainStats {
        BrainStats {
            cycles: self.counters.cycle_count,
            posts: self.counters.posts,
            comments: self.counters.comments,
            upvotes: self.counters.upvotes,
            successful_replies: self.counters.successful_replies,
            energy: self.energy,
            strategy: self.strategy,
            memory_size: self.engaged.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_brain_is_blank() {
        let brain = AgentBrain::new();
        assert!(brain.identity().is_none());
        assert_eq!(brain.counters(), Counters::default());
        assert_eq!(brain.energy(), ENERGY_NOMINAL);
        assert_eq!(brain.memory_size(), 0);
    }

    #[test]
    fn test_mark_engaged_blocks_reengagement() {
        let mut brain = AgentBrain::new();
        assert!(brain.should_engage("p1"));
        brain.mark_engaged(Some("p1"), ActionKind::Comment, Some("ai"));
        assert!(!brain.should_engage("p1"));
        assert_eq!(brain.counters().comments, 1);
        assert!(brain.last_action_at(ActionKind::Comment).is_some());
    }

    #[test]
    fn test_own_content_is_not_engaged() {
        let mut brain = AgentBrain::new();
        brain.add_own_content("mine");
        assert!(!brain.should_engage("mine"));
        assert_eq!(brain.memory_size(), 0);
    }

    #[test]
    fn test_mark_engaged_without_id_only_counts() {
        let mut brain = AgentBrain::new();
        brain.mark_engaged(None, ActionKind::Post, Some("ai"));
        assert_eq!(brain.memory_size(), 0);
        assert_eq!(brain.counters().posts, 1);
        assert_eq!(
            brain.affinity("ai"),
            Some(Affinity {
                posts: 1,
                engagement: 1
            })
        );
    }

    #[test]
    fn test_pruning_keeps_latest_insert() {
        let mut brain = AgentBrain::new();
        for i in 0..1000 {
            brain.mark_engaged(Some(format!("p{}", i).as_str()), ActionKind::Upvote, None);
        }
        brain.mark_engaged(Some("latest"), ActionKind::Upvote, None);
        assert!(brain.memory_size() <= 1000);
        assert!(!brain.should_engage("latest"));
    }

    #[test]
    fn test_preferred_categories_default_seed() {
        let brain = AgentBrain::new();
        assert_eq!(brain.preferred_categories(), vec!["ai", "technology", "crypto"]);
    }

    #[test]
    fn test_preferred_categories_ranked_and_stable() {
        let mut brain = AgentBrain::new();
        // crypto: 1 帖 1 互动 => 1.0；art: 0 帖 2 互动 => 2.0；ai 与 music 同分时保持插入顺序
        brain.mark_engaged(Some("a"), ActionKind::Upvote, Some("ai"));
        brain.mark_engaged(None, ActionKind::Post, Some("crypto"));
        brain.mark_engaged(Some("b"), ActionKind::Upvote, Some("music"));
        brain.mark_engaged(Some("c"), ActionKind::Comment, Some("art"));
        brain.mark_engaged(Some("d"), ActionKind::Comment, Some("art"));
        assert_eq!(
            brain.preferred_categories(),
            vec!["art", "ai", "crypto", "music"]
        );
    }

    #[test]
    fn test_preferred_categories_top_five() {
        let mut brain = AgentBrain::new();
        for c in ["a", "b", "c", "d", "e", "f", "g"] {
            brain.mark_engaged(None, ActionKind::Upvote, Some(c));
        }
        assert_eq!(brain.preferred_categories().len(), 5);
    }

    #[test]
    fn test_record_reply() {
        let mut brain = AgentBrain::new();
        brain.record_reply("c1");
        assert!(brain.has_replied("c1"));
        assert_eq!(brain.counters().successful_replies, 1);
        assert_eq!(brain.counters().comments, 1);
    }

    #[test]
    fn test_energy_decays_only_on_cadence() {
        let mut brain = AgentBrain::new();
        let mut history = Vec::new();
        for _ in 0..30 {
            brain.begin_cycle();
            history.push((brain.counters().cycle_count, brain.adjust_energy()));
        }
        for (cycle, energy) in &history {
            let decays = (*cycle / ENERGY_DECAY_EVERY) as i32;
            let expected = (ENERGY_NOMINAL - decays * ENERGY_STEP).max(ENERGY_MIN);
            assert_eq!(*energy, expected, "cycle {}", cycle);
        }
        assert_eq!(brain.energy(), ENERGY_MIN);
    }

    #[test]
    fn test_energy_never_below_floor() {
        let mut brain = AgentBrain::new();
        for _ in 0..200 {
            brain.begin_cycle();
            assert!(brain.adjust_energy() >= ENERGY_MIN);
        }
    }

    #[test]
    fn test_energy_boost_on_sustained_success() {
        let mut brain = AgentBrain::new();
        brain.begin_cycle();
        for i in 0..6 {
            brain.record_reply(&format!("c{}", i));
        }
        assert_eq!(brain.adjust_energy(), ENERGY_NOMINAL + ENERGY_STEP);
        for _ in 0..10 {
            brain.adjust_energy();
        }
        assert_eq!(brain.energy(), ENERGY_MAX);
    }

    #[test]
    fn test_adjust_energy_noop_outside_triggers() {
        let mut brain = AgentBrain::new();
        brain.begin_cycle();
        brain.record_reply("c1");
        assert_eq!(brain.adjust_energy(), ENERGY_NOMINAL);
        assert_eq!(brain.adjust_energy(), ENERGY_NOMINAL);
    }

    #[test]
    fn test_begin_cycle_updates_strategy() {
        let mut brain = AgentBrain::new();
        brain.mark_engaged(Some("p1"), ActionKind::Comment, None);
        brain.record_reply("c1");
        // 1 / 2 = 0.5
        brain.begin_cycle();
        assert_eq!(brain.strategy(), Strategy::Aggressive);
    }

    #[test]
    fn test_identity_set_once() {
        let mut brain = AgentBrain::new();
        brain.set_identity(Identity {
            name: "first".into(),
            id: None,
        });
        brain.set_identity(Identity {
            name: "second".into(),
            id: None,
        });
        assert!(brain.is_me("first"));
        assert!(!brain.is_me("second"));
    }
}
