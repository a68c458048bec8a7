// ==========================================
// 多供应商参数融合引擎 - 配置层
// ==========================================
// 职责: 融合阈值、词典、参数规则登记表
// 红线: 加载后只读, 以 Arc 注入各组件
// ==========================================

pub mod dictionaries;
pub mod fusion_config;
pub mod param_rules;

// 重导出核心配置
pub use dictionaries::{CategoryAlias, CategoryKeywords, Dictionaries, SynonymSet, VerbalComparator};
pub use fusion_config::{FusionConfig, CONFIG_PATH_ENV};
pub use param_rules::{NamedRule, ParameterRule, RuleRegistry};
