// ==========================================
// 多供应商参数融合引擎 - 核心库
// ==========================================
// 输入: 参数名称 + 各供应商原始值（已由调用方从表格中取出）
// 输出: 融合值 + 融合类型, 以及每个供应商的达标状态
// 系统定位: 决策辅助 (需人工审核的行由人工最终确认)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据模型
pub mod domain;

// 配置层 - 阈值 / 词典 / 参数规则
pub mod config;

// 导入层 - 单元格清洗与整合参数拆分
pub mod importer;

// 引擎层 - 融合规则
pub mod engine;

// 日志系统
pub mod logging;

// 错误类型
pub mod error;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ComplianceStatus, FusionResult, FusionType, MergeMode, NumericToken, ParameterRow, RuleKind,
};

// 配置
pub use config::{Dictionaries, FusionConfig, ParameterRule, RuleRegistry};

// 引擎
pub use engine::{
    BatchReport, ComplianceEvaluator, FusionEngine, FusionPipeline, FusionStatistics, RowOutcome,
    UnitTable,
};

// 错误
pub use error::{FusionError, FusionResultT};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "多供应商参数融合引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.is_empty());
    }
}
