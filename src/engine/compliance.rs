// ==========================================
// 多供应商参数融合引擎 - 供应商达标判定
// ==========================================
// 职责: 融合完成后, 判定每个供应商值是否支持融合结果
// 顺序: 无数据 → 包含融合值 → 误差 → 文本 → 数值 → 多值 → 精确相等
// 红线:
// - 需人工审核的行不判定（每个供应商均为 None）
// - 不达标只标记为 Unmarked, 不存在“失败”状态
// - 不返回错误
// ==========================================

use crate::config::{ParameterRule, SynonymSet};
use crate::domain::{ComplianceStatus, FusionResult, FusionType, NumericToken, RuleKind};
use crate::engine::fusion::FusionEngine;
use crate::engine::multi_value::{covers, parse_multi_value};
use crate::engine::numeric::extract_tolerance;
use crate::importer::CellCleaner;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static OPERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([≥≤><=＞＜]+)\s*(-?\d+(?:\.\d+)?)").expect("比较符正则非法")
});

/// 比较运算
#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    AtLeast,
    AtMost,
    Greater,
    Less,
    Equal,
}

impl Comparison {
    fn parse(op: &str) -> Option<Self> {
        if op.contains('≥') || op.contains(">=") || op.contains("＞=") {
            Some(Comparison::AtLeast)
        } else if op.contains('≤') || op.contains("<=") || op.contains("＜=") {
            Some(Comparison::AtMost)
        } else if op.contains('>') || op.contains('＞') {
            Some(Comparison::Greater)
        } else if op.contains('<') || op.contains('＜') {
            Some(Comparison::Less)
        } else if op.contains('=') {
            Some(Comparison::Equal)
        } else {
            None
        }
    }
}

// ==========================================
// ComplianceEvaluator - 达标判定器
// ==========================================
#[derive(Debug, Clone)]
pub struct ComplianceEvaluator {
    engine: Arc<FusionEngine>,
}

impl ComplianceEvaluator {
    /// 构造函数（与融合引擎共享配置、词典与规则）
    pub fn new(engine: Arc<FusionEngine>) -> Self {
        Self { engine }
    }

    /// 判定一行中每个供应商的达标状态
    ///
    /// # 参数
    /// - parameter_name: 参数名称
    /// - vendor_values: 各供应商值（与融合输入同序）
    /// - fused: 该行融合结果
    ///
    /// # 返回
    /// 与 vendor_values 等长; 需人工审核的行全部为 None
    pub fn evaluate(
        &self,
        parameter_name: &str,
        vendor_values: &[Option<String>],
        fused: &FusionResult,
    ) -> Vec<Option<ComplianceStatus>> {
        if fused.needs_review() {
            return vec![None; vendor_values.len()];
        }

        let rule = self.engine.rules().resolve(parameter_name);
        vendor_values
            .iter()
            .map(|v| Some(self.evaluate_value(v.as_deref(), fused, rule)))
            .collect()
    }

    /// 判定单个供应商值
    pub fn evaluate_value(
        &self,
        vendor_value: Option<&str>,
        fused: &FusionResult,
        rule: &ParameterRule,
    ) -> ComplianceStatus {
        let Some(vendor) = self.engine.cleaner().normalize_null(vendor_value) else {
            return ComplianceStatus::NoData;
        };
        let fused_value = fused.value.trim();

        if vendor.to_lowercase().contains(&fused_value.to_lowercase()) {
            return ComplianceStatus::Compliant;
        }

        if fused.fusion_type == FusionType::ToleranceFusion {
            return self.evaluate_tolerance(&vendor, fused_value);
        }

        if rule.kind == RuleKind::Text || fused.fusion_type.is_textual() {
            return self.evaluate_text(&vendor, fused_value);
        }

        if rule.kind == RuleKind::Numeric || fused.fusion_type.is_numeric() {
            return self.evaluate_numeric(&vendor, fused_value, rule);
        }

        if rule.kind == RuleKind::MultiValue {
            return self.evaluate_multi_value(&vendor, fused_value, rule);
        }

        if vendor.to_lowercase() == fused_value.to_lowercase() {
            ComplianceStatus::Compliant
        } else {
            ComplianceStatus::Unmarked
        }
    }

    // ==========================================
    // 分类判定
    // ==========================================

    /// 误差类: 供应商误差幅值不超过融合值
    fn evaluate_tolerance(&self, vendor: &str, fused_value: &str) -> ComplianceStatus {
        match (extract_tolerance(vendor), extract_tolerance(fused_value)) {
            (Some((have, _)), Some((limit, _))) if have <= limit => ComplianceStatus::Compliant,
            _ => ComplianceStatus::Unmarked,
        }
    }

    /// 文本类: 语义等价词, 否则词集合相似度
    fn evaluate_text(&self, vendor: &str, fused_value: &str) -> ComplianceStatus {
        if semantically_equivalent(&self.engine.dictionaries().equivalents, vendor, fused_value) {
            return ComplianceStatus::Compliant;
        }

        let threshold = self.engine.config().compliance_similarity_threshold * 100.0;
        if self.engine.scorer().token_set_similarity(vendor, fused_value) >= threshold {
            ComplianceStatus::Compliant
        } else {
            ComplianceStatus::Unmarked
        }
    }

    /// 数值类: 比较符号 → 范围 → 相对误差
    fn evaluate_numeric(
        &self,
        vendor: &str,
        fused_value: &str,
        rule: &ParameterRule,
    ) -> ComplianceStatus {
        let extractor = self.engine.extractor();
        let fused_tokens = extractor.extract(fused_value);
        let vendor_tokens = extractor.extract(vendor);
        let (Some(fused_first), Some(vendor_first)) = (fused_tokens.first(), vendor_tokens.first())
        else {
            return ComplianceStatus::Unmarked;
        };

        let tolerance = if rule.kind == RuleKind::Numeric {
            rule.tolerance
        } else {
            self.engine.config().numeric_tolerance
        };
        // 范围值 "2000-3000W" 的单位只挂在末尾数字上
        let target_unit = fused_tokens
            .iter()
            .find(|t| t.has_unit())
            .map(|t| t.unit.as_str())
            .unwrap_or_default();
        let actual = self.to_unit(vendor_first, target_unit);

        if let Some(caps) = OPERATOR_RE.captures(fused_value) {
            let op = caps.get(1).and_then(|m| Comparison::parse(m.as_str()));
            let threshold = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
            if let (Some(op), Some(threshold)) = (op, threshold) {
                let ok = match op {
                    Comparison::AtLeast => actual >= threshold,
                    Comparison::AtMost => actual <= threshold,
                    Comparison::Greater => actual > threshold,
                    Comparison::Less => actual < threshold,
                    Comparison::Equal => relative_error(actual, threshold) <= tolerance,
                };
                return status(ok);
            }
        }

        if fused_value.contains('-') && fused_tokens.len() >= 2 {
            let min = fused_tokens.iter().map(|t| t.value).fold(f64::INFINITY, f64::min);
            let max = fused_tokens
                .iter()
                .map(|t| t.value)
                .fold(f64::NEG_INFINITY, f64::max);
            return status(min <= actual && actual <= max);
        }

        status(relative_error(actual, fused_first.value) <= tolerance)
    }

    /// 多值类: 供应商覆盖融合映射中每个键的数量
    fn evaluate_multi_value(
        &self,
        vendor: &str,
        fused_value: &str,
        rule: &ParameterRule,
    ) -> ComplianceStatus {
        let vendor_map = parse_multi_value(vendor, &rule.separator);
        let fused_map = parse_multi_value(fused_value, &rule.separator);
        if vendor_map.is_empty() || fused_map.is_empty() {
            return ComplianceStatus::Unmarked;
        }
        status(covers(&vendor_map, &fused_map))
    }

    /// 供应商数值换算到融合值单位（无法换算时保持原值）
    fn to_unit(&self, token: &NumericToken, unit: &str) -> f64 {
        if !token.has_unit() || unit.is_empty() {
            return token.value;
        }
        self.engine
            .extractor()
            .units()
            .convert(token.value, &token.unit, unit)
            .unwrap_or(token.value)
    }
}

fn status(ok: bool) -> ComplianceStatus {
    if ok {
        ComplianceStatus::Compliant
    } else {
        ComplianceStatus::Unmarked
    }
}

/// 相对误差（参考值为 0 时取绝对误差）
fn relative_error(actual: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        (actual - reference).abs()
    } else {
        ((actual - reference) / reference).abs()
    }
}

/// 语义等价: 同一等价组内的两个不同词分别出现在两段文本中
pub fn semantically_equivalent(equivalents: &[SynonymSet], a: &str, b: &str) -> bool {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    if a_lower == b_lower {
        return true;
    }

    equivalents.iter().any(|set| {
        let terms: Vec<String> = set.all_terms().iter().map(|t| t.to_lowercase()).collect();
        terms.iter().any(|x| {
            terms.iter().any(|y| {
                x != y
                    && ((a_lower.contains(x.as_str()) && b_lower.contains(y.as_str()))
                        || (b_lower.contains(x.as_str()) && a_lower.contains(y.as_str())))
            })
        })
    })
}
