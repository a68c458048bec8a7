// ==========================================
// 多供应商参数融合引擎 - 引擎层
// ==========================================
// 职责: 单位换算、数值提取、文本相似度、融合调度、达标判定、统计
// 红线: 引擎层不做文件读写; 融合核心不向调用方返回错误
// ==========================================

pub mod compliance;
pub mod fusion;
pub mod multi_value;
pub mod numeric;
pub mod numeric_merge;
pub mod pipeline;
pub mod statistics;
pub mod text;
pub mod units;

// 重导出核心引擎
pub use compliance::{semantically_equivalent, ComplianceEvaluator};
pub use fusion::{canonicalize_operators, FusionEngine};
pub use multi_value::{format_multi_value, parse_multi_value, MultiValueMap};
pub use numeric::NumericExtractor;
pub use numeric_merge::NumericMerger;
pub use pipeline::{BatchReport, FusionPipeline, RowOutcome};
pub use statistics::{FusionStatistics, StatEntry, StatsAccumulator, StatsSnapshot};
pub use text::TextScorer;
pub use units::{UnitCategory, UnitTable};
