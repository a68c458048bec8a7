// ==========================================
// 多供应商参数融合引擎 - 融合类型统计
// ==========================================
// 职责: 按融合类型计数, 输出数量与占比快照
// 并发: 共享统计器使用原子计数; 并行批处理的各 worker 先写本地累加器,
//       分块结束时一次性合并
// 红线: 纯计数, 不含业务逻辑
// ==========================================

use crate::domain::FusionType;
use crate::engine::units::round_to;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

const SLOTS: usize = FusionType::ALL.len();

/// 单个融合类型的统计条目
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub count: u64,
    /// 占已记录总数的百分比（保留 2 位小数）
    pub percent: f64,
}

/// 统计快照（按融合类型声明顺序）
pub type StatsSnapshot = BTreeMap<FusionType, StatEntry>;

// ==========================================
// StatsAccumulator - 本地累加器（单线程）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    counts: [u64; SLOTS],
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fusion_type: FusionType) {
        self.counts[fusion_type.index()] += 1;
    }

    pub fn count(&self, fusion_type: FusionType) -> u64 {
        self.counts[fusion_type.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

// ==========================================
// FusionStatistics - 共享统计器
// ==========================================
#[derive(Debug, Default)]
pub struct FusionStatistics {
    counts: [AtomicU64; SLOTS],
}

impl FusionStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次融合结果
    pub fn record(&self, fusion_type: FusionType) {
        self.counts[fusion_type.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// 合并本地累加器
    pub fn absorb(&self, local: &StatsAccumulator) {
        for (slot, count) in self.counts.iter().zip(local.counts.iter()) {
            if *count > 0 {
                slot.fetch_add(*count, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self, fusion_type: FusionType) -> u64 {
        self.counts[fusion_type.index()].load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// 统计快照
    ///
    /// # 返回
    /// 全部 12 种融合类型的数量与占比; 总数为 0 时占比均为 0
    pub fn snapshot(&self) -> StatsSnapshot {
        let counts: Vec<u64> = self
            .counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect();
        let total: u64 = counts.iter().sum();

        FusionType::ALL
            .iter()
            .zip(counts)
            .map(|(fusion_type, count)| {
                let percent = if total == 0 {
                    0.0
                } else {
                    round_to(count as f64 / total as f64 * 100.0, 2)
                };
                (*fusion_type, StatEntry { count, percent })
            })
            .collect()
    }

    /// 清零
    pub fn reset(&self) {
        for slot in &self.counts {
            slot.store(0, Ordering::Relaxed);
        }
    }
}
