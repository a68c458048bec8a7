// ==========================================
// 多供应商参数融合引擎 - 领域类型定义
// ==========================================
// 职责: 融合类型 / 达标状态 / 规则类型 / 多值合并模式
// 红线: 融合类型为封闭枚举, 每行有且只有一个融合结果
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 融合类型 (Fusion Type)
// ==========================================
// 声明顺序即统计输出顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionType {
    ExactMatch,       // 精确匹配
    HighSimilarity,   // 高相似度融合
    MediumSimilarity, // 中等相似度融合
    SemanticMatch,    // 语义匹配
    NumericRange,     // 数字范围融合
    UnitConversion,   // 单位转换融合
    ToleranceFusion,  // 误差融合
    MultiValue,       // 多值融合
    SingleSupplier,   // 单供应商
    ConflictResolved, // 冲突解决（保留类型, 冲突兜底统一标记为人工审核）
    ManualReview,     // 需人工审核
    InsufficientData, // 数据不足
}

impl FusionType {
    /// 全部融合类型（统计器按此顺序建槽）
    pub const ALL: [FusionType; 12] = [
        FusionType::ExactMatch,
        FusionType::HighSimilarity,
        FusionType::MediumSimilarity,
        FusionType::SemanticMatch,
        FusionType::NumericRange,
        FusionType::UnitConversion,
        FusionType::ToleranceFusion,
        FusionType::MultiValue,
        FusionType::SingleSupplier,
        FusionType::ConflictResolved,
        FusionType::ManualReview,
        FusionType::InsufficientData,
    ];

    /// 统计槽位下标
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FusionType::ExactMatch => "exact_match",
            FusionType::HighSimilarity => "high_similarity",
            FusionType::MediumSimilarity => "medium_similarity",
            FusionType::SemanticMatch => "semantic_match",
            FusionType::NumericRange => "numeric_range",
            FusionType::UnitConversion => "unit_conversion",
            FusionType::ToleranceFusion => "tolerance_fusion",
            FusionType::MultiValue => "multi_value",
            FusionType::SingleSupplier => "single_supplier",
            FusionType::ConflictResolved => "conflict_resolved",
            FusionType::ManualReview => "manual_review",
            FusionType::InsufficientData => "insufficient_data",
        }
    }

    /// 中文标签（输出表格中的“融合类型”列）
    pub fn label_cn(&self) -> &'static str {
        match self {
            FusionType::ExactMatch => "精确匹配",
            FusionType::HighSimilarity => "高相似度融合",
            FusionType::MediumSimilarity => "中等相似度融合",
            FusionType::SemanticMatch => "语义匹配",
            FusionType::NumericRange => "数字范围融合",
            FusionType::UnitConversion => "单位转换融合",
            FusionType::ToleranceFusion => "误差融合",
            FusionType::MultiValue => "多值融合",
            FusionType::SingleSupplier => "单供应商",
            FusionType::ConflictResolved => "冲突解决",
            FusionType::ManualReview => "需人工审核",
            FusionType::InsufficientData => "数据不足",
        }
    }

    /// 是否属于文本相似度 / 语义类融合
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FusionType::HighSimilarity | FusionType::MediumSimilarity | FusionType::SemanticMatch
        )
    }

    /// 是否属于数值类融合
    pub fn is_numeric(&self) -> bool {
        matches!(self, FusionType::NumericRange | FusionType::UnitConversion)
    }
}

impl fmt::Display for FusionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label_cn())
    }
}

impl std::str::FromStr for FusionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        FusionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == key.to_lowercase() || t.label_cn() == key)
            .ok_or_else(|| format!("未知融合类型: {}", key))
    }
}

// ==========================================
// 供应商达标状态 (Compliance Status)
// ==========================================
// 不达标不单独标记（Unmarked）, 没有“失败”状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant, // 达标
    NoData,    // 无数据
    Unmarked,  // 不标记
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Compliant => write!(f, "COMPLIANT"),
            ComplianceStatus::NoData => write!(f, "NO_DATA"),
            ComplianceStatus::Unmarked => write!(f, "UNMARKED"),
        }
    }
}

// ==========================================
// 参数规则类型 (Rule Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Numeric,    // 数字类
    Dimension,  // 尺寸类（保持整体）
    Text,       // 文本类
    MultiValue, // 多值类
    Auto,       // 未登记参数
}

impl Default for RuleKind {
    fn default() -> Self {
        RuleKind::Auto
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Numeric => write!(f, "numeric"),
            RuleKind::Dimension => write!(f, "dimension"),
            RuleKind::Text => write!(f, "text"),
            RuleKind::MultiValue => write!(f, "multi_value"),
            RuleKind::Auto => write!(f, "auto"),
        }
    }
}

// ==========================================
// 多值合并模式 (Merge Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    Max,   // 每个键取最大数量
    Union, // 键集合并
}

impl Default for MergeMode {
    fn default() -> Self {
        MergeMode::Max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fusion_type_index_matches_all_order() {
        for (idx, t) in FusionType::ALL.iter().enumerate() {
            assert_eq!(t.index(), idx);
        }
    }

    #[test]
    fn test_fusion_type_from_str() {
        assert_eq!("exact_match".parse::<FusionType>(), Ok(FusionType::ExactMatch));
        assert_eq!("需人工审核".parse::<FusionType>(), Ok(FusionType::ManualReview));
        assert!("unknown".parse::<FusionType>().is_err());
    }

    #[test]
    fn test_fusion_type_serde() {
        let json = serde_json::to_string(&FusionType::UnitConversion).unwrap();
        assert_eq!(json, "\"unit_conversion\"");
        let status = serde_json::to_string(&ComplianceStatus::NoData).unwrap();
        assert_eq!(status, "\"NO_DATA\"");
    }
}
