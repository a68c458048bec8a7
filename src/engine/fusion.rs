// ==========================================
// 多供应商参数融合引擎 - 融合策略调度器
// ==========================================
// 职责: 单行供应商值 → (融合值, 融合类型)
// 顺序: 清洗 → 精确匹配 → 多值 → 误差 → 数值 → 高相似度 →
//       中等相似度 → 语义 → 冲突兜底（需人工审核）
// 红线:
// - 首个产出结果的策略终止调度链
// - 输出统一比较符号（> < >= <= 及全角 → ≥ ≤）
// - 任何输入都必须得到结果, 不向调用方返回错误
// ==========================================

mod core;
mod strategies;


pub use self::core::{canonicalize_operators, FusionEngine};
