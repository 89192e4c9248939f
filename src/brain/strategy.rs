//! 策略与能量：由历史成功率推导的粗粒度标签，以及按能量缩放的分析预算

use std::fmt;

/// 能量范围与步长
pub const ENERGY_MIN: i32 = 50;
pub const ENERGY_MAX: i32 = 150;
pub const ENERGY_NOMINAL: i32 = 100;
pub const ENERGY_STEP: i32 = 10;
/// 每 N 个周期检查一次是否需要衰减
pub const ENERGY_DECAY_EVERY: u64 = 5;
/// 近期成功回复超过该值时提升能量
pub const ENERGY_BOOST_REPLIES: u64 = 5;

/// 行动策略（仅作参考，不改变硬上限）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Aggressive,
    Balanced,
    QualityFocused,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Aggressive => "aggressive",
            Strategy::Balanced => "balanced",
            Strategy::QualityFocused => "quality_focused",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 成功率 = 成功回复 / max(评论总数, 1)；阈值为严格大于
pub fn strategy_for(successful_replies: u64, total_comments: u64) -> Strategy {
    let ratio = successful_replies as f64 / total_comments.max(1) as f64;
    if ratio > 0.30 {
        Strategy::Aggressive
    } else if ratio > 0.15 {
        Strategy::Balanced
    } else {
        Strategy::QualityFocused
    }
}

/// 本周期要分析的动态条数：base × energy / 100，向下取整，且不超过动态长度
pub fn analysis_budget(base: usize, energy: i32, feed_len: usize) -> usize {
    let scaled = (base as i64 * energy.max(0) as i64) / ENERGY_NOMINAL as i64;
    (scaled.max(0) as usize).min(feed_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_thresholds() {
        assert_eq!(strategy_for(0, 0), Strategy::QualityFocused);
        assert_eq!(strategy_for(4, 10), Strategy::Aggressive);
        assert_eq!(strategy_for(2, 10), Strategy::Balanced);
        assert_eq!(strategy_for(1, 10), Strategy::QualityFocused);
    }

    #[test]
    fn test_strategy_boundaries_resolve_downward() {
        // 恰好 0.30 / 0.15 落在较低一档
        assert_eq!(strategy_for(3, 10), Strategy::Balanced);
        assert_eq!(strategy_for(31, 100), Strategy::Aggressive);
        assert_eq!(strategy_for(3, 20), Strategy::QualityFocused);
        assert_eq!(strategy_for(16, 100), Strategy::Balanced);
    }

    #[test]
    fn test_strategy_is_pure() {
        for _ in 0..3 {
            assert_eq!(strategy_for(7, 20), strategy_for(7, 20));
        }
    }

    #[test]
    fn test_analysis_budget_scales_with_energy() {
        assert_eq!(analysis_budget(30, 100, 100), 30);
        assert_eq!(analysis_budget(30, 150, 100), 45);
        assert_eq!(analysis_budget(30, 50, 100), 15);
        assert_eq!(analysis_budget(30, 55, 100), 16);
        assert_eq!(analysis_budget(30, 100, 3), 3);
        assert_eq!(analysis_budget(30, 100, 0), 0);
    }
}
