//! 有界、按插入顺序的 id 集合
//!
//! 超过上限时批量淘汰最早插入的一批，只保留最近的 `keep` 个（粗粒度，非 LRU：重复插入不刷新位置）。

use std::collections::{HashSet, VecDeque};

/// 已互动 id 的默认上限与淘汰后保留量
pub const DEFAULT_CEILING: usize = 1000;
pub const DEFAULT_KEEP: usize = 800;

#[derive(Debug, Clone)]
pub struct RecentIds {
    order: VecDeque<String>,
    members: HashSet<String>,
    ceiling: usize,
    keep: usize,
}

impl RecentIds {
    pub fn new(ceiling: usize, keep: usize) -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
            ceiling,
            keep: keep.min(ceiling),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// 插入 id；返回本次淘汰的条数
    pub fn insert(&mut self, id: impl Into<String>) -> usize {
        let id = id.into();
        if !self.members.insert(id.clone()) {
            return 0;
        }
        self.order.push_back(id);
        self.prune()
    }

    fn prune(&mut self) -> usize {
        if self.order.len() <= self.ceiling {
            return 0;
        }
        let evict = self.order.len() - self.keep;
        for old in self.order.drain(..evict) {
            self.members.remove(&old);
        }
        evict
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for RecentIds {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING, DEFAULT_KEEP)
    }
}
