// ==========================================
// 多供应商参数融合引擎 - 领域层
// ==========================================
// 职责: 数据模型定义, 不包含业务规则
// ==========================================

pub mod row;
pub mod types;

// 重导出核心类型
pub use row::{FusionResult, NumericToken, ParameterRow};
pub use types::{ComplianceStatus, FusionType, MergeMode, RuleKind};
