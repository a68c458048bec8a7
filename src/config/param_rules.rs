// ==========================================
// 多供应商参数融合引擎 - 参数规则解析器
// ==========================================
// 职责: 参数名称 → 融合规则（数字/尺寸/文本/多值/自动）
// 查找顺序: 精确匹配 → 双向包含匹配（按登记顺序）→ Auto 默认规则
// 红线: 查找必须确定且完备（总能返回规则）
// ==========================================

use crate::domain::types::{MergeMode, RuleKind};
use serde::{Deserialize, Serialize};

fn default_tolerance() -> f64 {
    0.05
}

fn default_similarity_threshold() -> f64 {
    0.8
}

fn default_separator() -> String {
    "×".to_string()
}

// ==========================================
// ParameterRule - 参数融合规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRule {
    pub kind: RuleKind,

    /// 相对误差容忍度
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// 文本相似度阈值（0-1）
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// 多值分隔符
    #[serde(default = "default_separator")]
    pub separator: String,

    /// 多值合法键（为空表示不限制）
    #[serde(default)]
    pub keys: Vec<String>,

    #[serde(default)]
    pub merge_mode: MergeMode,

    /// 首选输出单位
    #[serde(default)]
    pub unit: Option<String>,
}

impl Default for ParameterRule {
    fn default() -> Self {
        Self {
            kind: RuleKind::Auto,
            tolerance: default_tolerance(),
            similarity_threshold: default_similarity_threshold(),
            separator: default_separator(),
            keys: Vec::new(),
            merge_mode: MergeMode::Max,
            unit: None,
        }
    }
}

impl ParameterRule {
    pub fn numeric(unit: &str, tolerance: f64) -> Self {
        Self {
            kind: RuleKind::Numeric,
            tolerance,
            unit: Some(unit.to_string()),
            ..Self::default()
        }
    }

    pub fn dimension(unit: &str) -> Self {
        Self {
            kind: RuleKind::Dimension,
            unit: Some(unit.to_string()),
            ..Self::default()
        }
    }

    pub fn text(similarity_threshold: f64) -> Self {
        Self {
            kind: RuleKind::Text,
            similarity_threshold,
            ..Self::default()
        }
    }

    pub fn multi_value(separator: &str, keys: &[&str], merge_mode: MergeMode) -> Self {
        Self {
            kind: RuleKind::MultiValue,
            separator: separator.to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            merge_mode,
            ..Self::default()
        }
    }
}

/// 具名规则（配置文件中的规则条目）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRule {
    pub name: String,
    #[serde(flatten)]
    pub rule: ParameterRule,
}

// ==========================================
// RuleRegistry - 规则登记表
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    // 登记顺序即模糊匹配顺序
    rules: Vec<(String, ParameterRule)>,
    fallback: ParameterRule,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        let rules = vec![
            // 数字类参数
            ("电池容量", ParameterRule::numeric("mAh", 0.05)),
            ("波长", ParameterRule::numeric("nm", 0.02)),
            ("功率", ParameterRule::numeric("W", 0.1)),
            ("电压", ParameterRule::numeric("V", 0.05)),
            ("频率", ParameterRule::numeric("Hz", 0.05)),
            ("容量", ParameterRule::numeric("L", 0.05)),
            ("重量", ParameterRule::numeric("kg", 0.1)),
            // 尺寸类参数（保持整体）
            ("尺寸", ParameterRule::dimension("mm")),
            ("外形尺寸", ParameterRule::dimension("mm")),
            // 文本类参数
            ("探头类型", ParameterRule::text(0.8)),
            ("显示屏", ParameterRule::text(0.7)),
            ("材质", ParameterRule::text(0.75)),
            ("型号", ParameterRule::text(0.9)),
            // 多值类参数
            (
                "接口",
                ParameterRule::multi_value("×", &["USB", "HDMI", "VGA", "网口"], MergeMode::Max),
            ),
            ("附加功能", ParameterRule::multi_value("/", &[], MergeMode::Union)),
            (
                "探头",
                ParameterRule::multi_value("/", &["A", "B", "M", "CFM"], MergeMode::Union),
            ),
        ];

        Self {
            rules: rules
                .into_iter()
                .map(|(name, rule)| (name.to_string(), rule))
                .collect(),
            fallback: ParameterRule::default(),
        }
    }
}

impl RuleRegistry {
    /// 空登记表（只有 Auto 默认规则）
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: ParameterRule::default(),
        }
    }

    /// 追加或覆盖规则（同名覆盖并保留原位置）
    pub fn with_rules(mut self, extra: impl IntoIterator<Item = NamedRule>) -> Self {
        for named in extra {
            match self.rules.iter_mut().find(|(name, _)| *name == named.name) {
                Some(slot) => slot.1 = named.rule,
                None => self.rules.push((named.name, named.rule)),
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 解析参数规则
    ///
    /// # 返回
    /// 命中的规则; 均未命中时返回 Auto 默认规则
    pub fn resolve(&self, parameter_name: &str) -> &ParameterRule {
        let name = parameter_name.trim();

        if let Some((_, rule)) = self.rules.iter().find(|(key, _)| key == name) {
            return rule;
        }

        if !name.is_empty() {
            if let Some((_, rule)) = self
                .rules
                .iter()
                .find(|(key, _)| name.contains(key.as_str()) || key.contains(name))
            {
                return rule;
            }
        }

        &self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact() {
        let registry = RuleRegistry::default();
        let rule = registry.resolve("探头类型");
        assert_eq!(rule.kind, RuleKind::Text);
        assert_eq!(rule.similarity_threshold, 0.8);
    }

    #[test]
    fn test_resolve_fuzzy_both_directions() {
        let registry = RuleRegistry::default();
        // 参数名称包含规则键
        assert_eq!(registry.resolve("设备重量").kind, RuleKind::Numeric);
        assert_eq!(registry.resolve("设备重量").unit.as_deref(), Some("kg"));
        // 规则键包含参数名称
        assert_eq!(registry.resolve("附加").kind, RuleKind::MultiValue);
    }

    #[test]
    fn test_resolve_registration_order() {
        let registry = RuleRegistry::default();
        // “电池容量”先于“容量”登记
        assert_eq!(registry.resolve("锂电池容量").unit.as_deref(), Some("mAh"));
        assert_eq!(registry.resolve("水箱容量").unit.as_deref(), Some("L"));
    }

    #[test]
    fn test_resolve_unknown_is_auto() {
        let registry = RuleRegistry::default();
        assert_eq!(registry.resolve("响应时间").kind, RuleKind::Auto);
        assert_eq!(registry.resolve("").kind, RuleKind::Auto);
    }

    #[test]
    fn test_resolve_deterministic() {
        let registry = RuleRegistry::default();
        let a = registry.resolve("主机接口").clone();
        let b = registry.resolve("主机接口").clone();
        assert_eq!(a, b);
        assert_eq!(a.merge_mode, MergeMode::Max);
    }

    #[test]
    fn test_with_rules_override_and_append() {
        let registry = RuleRegistry::default().with_rules(vec![
            NamedRule {
                name: "重量".to_string(),
                rule: ParameterRule::numeric("g", 0.2),
            },
            NamedRule {
                name: "噪声".to_string(),
                rule: ParameterRule::numeric("dB", 0.1),
            },
        ]);
        assert_eq!(registry.resolve("重量").unit.as_deref(), Some("g"));
        assert_eq!(registry.resolve("工作噪声").unit.as_deref(), Some("dB"));
    }

    #[test]
    fn test_named_rule_json() {
        let raw = r#"{"name": "亮度", "kind": "numeric", "unit": "cd"}"#;
        let named: NamedRule = serde_json::from_str(raw).unwrap();
        assert_eq!(named.rule.kind, RuleKind::Numeric);
        assert_eq!(named.rule.tolerance, 0.05);
        assert_eq!(named.rule.separator, "×");
    }
}
