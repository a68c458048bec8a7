// ==========================================
// 多供应商参数融合引擎 - 批处理流水线
// ==========================================
// 职责: 整合参数预处理 → 融合 → 达标判定 → 统计
// 并发: 行之间相互独立; 并行模式按行分块交给阻塞线程池,
//       每块使用本地计数器, 结束时一次性合并到共享统计器
// 红线: 单行异常不得中断整批; 输出顺序与输入顺序一致
// ==========================================

use crate::config::FusionConfig;
use crate::domain::{ComplianceStatus, FusionResult, ParameterRow};
use crate::engine::compliance::ComplianceEvaluator;
use crate::engine::fusion::FusionEngine;
use crate::engine::statistics::{FusionStatistics, StatsAccumulator, StatsSnapshot};
use crate::error::FusionResultT;
use crate::importer::{CellPreprocessor, IntegratedCellPreprocessor};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 单行处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    pub row_index: usize,
    pub parameter_name: String,
    /// 整合参数预处理后的供应商值
    pub preprocessed_values: Vec<Option<String>>,
    pub result: FusionResult,
    /// 每个供应商的达标状态（需人工审核的行为 None）
    pub compliance: Vec<Option<ComplianceStatus>>,
}

/// 批处理报告
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<RowOutcome>,
    /// 批处理结束时的统计快照
    pub statistics: StatsSnapshot,
}

impl BatchReport {
    /// 合并汇总: 每行一条 "【参数名称】融合值"
    pub fn merged_summary(&self) -> String {
        self.outcomes
            .iter()
            .map(|o| format!("【{}】{}", o.parameter_name, o.result.value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 需人工审核的行数
    pub fn review_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.needs_review()).count()
    }
}

// ==========================================
// FusionPipeline - 批处理流水线
// ==========================================
#[derive(Debug, Clone)]
pub struct FusionPipeline {
    engine: Arc<FusionEngine>,
    preprocessor: Arc<IntegratedCellPreprocessor>,
    compliance: Arc<ComplianceEvaluator>,
    statistics: Arc<FusionStatistics>,
}

impl FusionPipeline {
    /// 构造函数
    ///
    /// # 参数
    /// - engine: 融合引擎（预处理器与达标判定器共享其词典和规则）
    pub fn new(engine: FusionEngine) -> Self {
        let engine = Arc::new(engine);
        Self {
            preprocessor: Arc::new(IntegratedCellPreprocessor::new(engine.dictionaries_arc())),
            compliance: Arc::new(ComplianceEvaluator::new(engine.clone())),
            statistics: Arc::new(FusionStatistics::new()),
            engine,
        }
    }

    pub fn from_config(config: FusionConfig) -> Self {
        Self::new(FusionEngine::from_config(config))
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    pub fn statistics(&self) -> &FusionStatistics {
        &self.statistics
    }

    pub fn reset_statistics(&self) {
        self.statistics.reset();
    }

    // ==========================================
    // 单行处理
    // ==========================================

    /// 处理单行（不写统计）
    pub fn evaluate_row(&self, row_index: usize, row: &ParameterRow) -> RowOutcome {
        let preprocessed = self.preprocessor.preprocess_row(&row.vendor_values, &row.name);
        let result = self.engine.fuse(&row.name, &preprocessed);
        let compliance = self.compliance.evaluate(&row.name, &preprocessed, &result);

        if result.needs_review() {
            warn!(row_index, parameter_name = %row.name, value = %result.value, "需人工审核");
        }

        RowOutcome {
            row_index,
            parameter_name: row.name.clone(),
            preprocessed_values: preprocessed,
            result,
            compliance,
        }
    }

    /// 处理单行并记录统计
    pub fn process_row(&self, row_index: usize, row: &ParameterRow) -> RowOutcome {
        let outcome = self.evaluate_row(row_index, row);
        self.statistics.record(outcome.result.fusion_type);
        outcome
    }

    // ==========================================
    // 批处理
    // ==========================================

    /// 顺序处理整批
    pub fn process_batch(&self, rows: &[ParameterRow]) -> BatchReport {
        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(batch_id = %batch_id, rows = rows.len(), "开始融合批处理");

        let outcomes: Vec<RowOutcome> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.process_row(idx, row))
            .collect();

        self.finish(batch_id, started_at, outcomes)
    }

    /// 并行处理整批
    ///
    /// 按 worker_count 将行切分为连续分块, 每块在阻塞线程池中处理
    ///
    /// # 返回
    /// - Ok(BatchReport): 行顺序与输入一致
    /// - Err(FusionError::WorkerJoin): worker 线程异常退出
    pub async fn process_batch_concurrent(
        &self,
        rows: Vec<ParameterRow>,
    ) -> FusionResultT<BatchReport> {
        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let workers = self.engine.config().worker_count.max(1);
        let chunk_size = rows.len().div_ceil(workers).max(1);
        info!(
            batch_id = %batch_id,
            rows = rows.len(),
            workers,
            chunk_size,
            "开始并行融合批处理"
        );

        let mut chunks: Vec<(usize, Vec<ParameterRow>)> = Vec::new();
        let mut iter = rows.into_iter().peekable();
        let mut offset = 0;
        while iter.peek().is_some() {
            let chunk: Vec<ParameterRow> = iter.by_ref().take(chunk_size).collect();
            let len = chunk.len();
            chunks.push((offset, chunk));
            offset += len;
        }

        let tasks = chunks.into_iter().map(|(offset, chunk)| {
            let pipeline = self.clone();
            tokio::task::spawn_blocking(move || {
                let mut local = StatsAccumulator::new();
                let outcomes: Vec<RowOutcome> = chunk
                    .iter()
                    .enumerate()
                    .map(|(idx, row)| {
                        let outcome = pipeline.evaluate_row(offset + idx, row);
                        local.record(outcome.result.fusion_type);
                        outcome
                    })
                    .collect();
                (outcomes, local)
            })
        });

        let mut outcomes = Vec::with_capacity(offset);
        for joined in join_all(tasks).await {
            let (chunk_outcomes, local) = joined?;
            self.statistics.absorb(&local);
            outcomes.extend(chunk_outcomes);
        }

        Ok(self.finish(batch_id, started_at, outcomes))
    }

    fn finish(
        &self,
        batch_id: String,
        started_at: DateTime<Utc>,
        outcomes: Vec<RowOutcome>,
    ) -> BatchReport {
        let statistics = self.statistics.snapshot();
        let finished_at = Utc::now();

        let counts: Vec<String> = statistics
            .iter()
            .filter(|(_, entry)| entry.count > 0)
            .map(|(t, entry)| format!("{}={}", t.as_str(), entry.count))
            .collect();
        info!(
            batch_id = %batch_id,
            rows = outcomes.len(),
            review = outcomes.iter().filter(|o| o.result.needs_review()).count(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            counts = %counts.join(","),
            "融合批处理完成"
        );

        BatchReport {
            batch_id,
            started_at,
            finished_at,
            outcomes,
            statistics,
        }
    }
}

impl Default for FusionPipeline {
    fn default() -> Self {
        Self::new(FusionEngine::default())
    }
}
