// ==========================================
// 多供应商参数融合引擎 - 行级数据对象
// ==========================================
// 职责: 参数行 / 数值标记 / 融合结果
// 生命周期: 单个数据集处理期间创建并消费
// ==========================================

use crate::domain::types::FusionType;
use serde::{Deserialize, Serialize};

// ==========================================
// ParameterRow - 参数行（读入后不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    /// 技术参数名称（A 列）
    pub name: String,
    /// 各供应商原始值（按列顺序, None 表示空单元格）
    pub vendor_values: Vec<Option<String>>,
}

impl ParameterRow {
    pub fn new(name: impl Into<String>, vendor_values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            vendor_values,
        }
    }

    /// 从字符串切片构建（空串视为空单元格）
    pub fn from_strs(name: &str, values: &[&str]) -> Self {
        let vendor_values = values
            .iter()
            .map(|v| {
                if v.trim().is_empty() {
                    None
                } else {
                    Some(v.to_string())
                }
            })
            .collect();
        Self::new(name, vendor_values)
    }

    pub fn vendor_count(&self) -> usize {
        self.vendor_values.len()
    }
}

// ==========================================
// NumericToken - 数值标记（提取后不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericToken {
    pub value: f64,
    /// 单位（可能为空）
    pub unit: String,
    /// 原文片段
    pub original_span: String,
    /// 单位是否来自括号
    pub is_parenthesized: bool,
}

impl NumericToken {
    pub fn has_unit(&self) -> bool {
        !self.unit.is_empty()
    }
}

// ==========================================
// FusionResult - 融合结果（每行唯一）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub value: String,
    pub fusion_type: FusionType,
}

impl FusionResult {
    pub fn new(value: impl Into<String>, fusion_type: FusionType) -> Self {
        Self {
            value: value.into(),
            fusion_type,
        }
    }

    /// 是否需要人工审核
    pub fn needs_review(&self) -> bool {
        self.fusion_type == FusionType::ManualReview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_strs_blank_is_none() {
        let row = ParameterRow::from_strs("重量", &["5kg", "  ", ""]);
        assert_eq!(row.vendor_count(), 3);
        assert_eq!(row.vendor_values[0].as_deref(), Some("5kg"));
        assert_eq!(row.vendor_values[1], None);
        assert_eq!(row.vendor_values[2], None);
    }

    #[test]
    fn test_needs_review() {
        assert!(FusionResult::new("a", FusionType::ManualReview).needs_review());
        assert!(!FusionResult::new("a", FusionType::ExactMatch).needs_review());
    }
}
