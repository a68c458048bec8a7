// ==========================================
// 多供应商参数融合引擎 - 数值融合
// ==========================================
// 流程:
// 1. 相关性过滤（无关词 + 参数关键词 + 相似度兜底）
// 2. 提取数值标记
// 3. 单位兼容性闸门（存在不可互换的单位即放弃）
// 4. 换算到输出单位
// 5. 噪声过滤（最小值远低于中位数）
// 6. 范围/阈值判别
// 7. 前缀选择 + 输出（UnitConversion / NumericRange）
// 红线: 任何一步无结果都返回 None, 由调度器进入下一策略
// ==========================================

use crate::config::{Dictionaries, FusionConfig, ParameterRule};
use crate::domain::{FusionResult, FusionType, NumericToken, RuleKind};
use crate::engine::numeric::{format_number, NumericExtractor};
use crate::engine::text::{extract_keywords, TextScorer};
use crate::engine::units::round_to;
use std::collections::BTreeSet;
use tracing::trace;

/// 单条供应商值的提取结果
struct ValueTokens<'v> {
    text: &'v str,
    tokens: Vec<NumericToken>,
    range_like: bool,
}

// ==========================================
// NumericMerger - 数值融合器
// ==========================================
pub struct NumericMerger<'a> {
    pub extractor: &'a NumericExtractor,
    pub scorer: &'a TextScorer,
    pub config: &'a FusionConfig,
    pub dictionaries: &'a Dictionaries,
}

impl<'a> NumericMerger<'a> {
    /// 数值融合
    ///
    /// # 参数
    /// - values: 清洗后的供应商值（均含数字）
    /// - parameter_name: 参数名称
    /// - rule: 参数规则（提供首选单位）
    ///
    /// # 返回
    /// - Some(FusionResult): UnitConversion 或 NumericRange
    /// - None: 无相关数据 / 无数值 / 单位不兼容
    pub fn merge(
        &self,
        values: &[String],
        parameter_name: &str,
        rule: &ParameterRule,
    ) -> Option<FusionResult> {
        // ===== 1. 相关性过滤 =====
        let relevant: Vec<&str> = values
            .iter()
            .map(|v| v.as_str())
            .filter(|v| self.is_relevant(v, parameter_name))
            .collect();
        if relevant.is_empty() {
            return None;
        }

        // ===== 2. 提取数值 =====
        let extracted: Vec<ValueTokens> = relevant
            .iter()
            .map(|text| ValueTokens {
                text: *text,
                tokens: self.extractor.extract(text),
                range_like: self.extractor.is_range_like(text),
            })
            .filter(|v| !v.tokens.is_empty())
            .collect();
        if extracted.is_empty() {
            return None;
        }

        // ===== 3. 单位兼容性闸门 =====
        let units: Vec<&str> = extracted
            .iter()
            .flat_map(|v| v.tokens.iter())
            .filter(|t| t.has_unit())
            .map(|t| t.unit.as_str())
            .collect();
        if !self.units_compatible(&units) {
            trace!(parameter_name, ?units, "单位不兼容, 放弃数值融合");
            return None;
        }

        // ===== 4. 输出单位与换算 =====
        let output_unit = self.output_unit(&units, rule);
        let range_like_count = extracted.iter().filter(|v| v.range_like).count();
        let range_majority = range_like_count >= 2 && range_like_count * 2 >= extracted.len();

        let mut numbers: Vec<f64> = extracted
            .iter()
            .filter(|v| !range_majority || v.range_like)
            .flat_map(|v| v.tokens.iter())
            .map(|t| self.to_unit(t, &output_unit))
            .collect();

        // ===== 5. 噪声过滤 =====
        numbers = self.drop_noise(numbers);

        // ===== 6. 范围/阈值判别 =====
        if !range_majority {
            numbers = self.collapse_threshold(numbers);
        }

        // ===== 7. 前缀 + 输出 =====
        let prefix = self
            .common_prefix(&extracted)
            .unwrap_or_else(|| parameter_name.to_string());

        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let distinct: BTreeSet<i64> = numbers
            .iter()
            .map(|v| (round_to(*v, 6) * 1e6).round() as i64)
            .collect();

        if distinct.len() == 1 {
            Some(FusionResult::new(
                format!("{}{}{}", prefix, format_number(min), output_unit),
                FusionType::UnitConversion,
            ))
        } else {
            Some(FusionResult::new(
                format!(
                    "{}{}-{}{}",
                    prefix,
                    format_number(min),
                    format_number(max),
                    output_unit
                ),
                FusionType::NumericRange,
            ))
        }
    }

    /// 相关性判断
    ///
    /// 仅当同时满足以下条件才视为无关:
    /// 含参数名称未包含的无关词、不含参数关键词、相似度低于兜底阈值
    fn is_relevant(&self, text: &str, parameter_name: &str) -> bool {
        if parameter_name.trim().is_empty() {
            return true;
        }

        let text_lower = text.to_lowercase();
        let name_lower = parameter_name.to_lowercase();

        let has_irrelevant = self
            .dictionaries
            .irrelevant_keywords
            .iter()
            .any(|kw| text_lower.contains(kw.as_str()) && !name_lower.contains(kw.as_str()));
        if !has_irrelevant {
            return true;
        }

        let has_param_keyword = extract_keywords(parameter_name)
            .iter()
            .any(|kw| text_lower.contains(kw.as_str()));
        if has_param_keyword {
            return true;
        }

        self.scorer.similarity(parameter_name, text) / 100.0 >= self.config.relevance_threshold
    }

    /// 所有非空单位两两可换算（忽略大小写）
    fn units_compatible(&self, units: &[&str]) -> bool {
        let mut distinct: Vec<&str> = Vec::new();
        for unit in units {
            if !distinct.iter().any(|u| u.to_lowercase() == unit.to_lowercase()) {
                distinct.push(*unit);
            }
        }

        let table = self.extractor.units();
        distinct.iter().enumerate().all(|(i, a)| {
            distinct[i + 1..]
                .iter()
                .all(|b| table.compatible(a, b))
        })
    }

    /// 输出单位: 规则首选单位（全部可换算时）, 否则首个单位
    fn output_unit(&self, units: &[&str], rule: &ParameterRule) -> String {
        let Some(first) = units.first() else {
            return String::new();
        };

        if matches!(rule.kind, RuleKind::Numeric | RuleKind::Dimension) {
            if let Some(preferred) = rule.unit.as_deref() {
                let table = self.extractor.units();
                if units.iter().all(|u| table.compatible(u, preferred)) {
                    return preferred.to_string();
                }
            }
        }

        first.to_string()
    }

    fn to_unit(&self, token: &NumericToken, unit: &str) -> f64 {
        if !token.has_unit() || unit.is_empty() || token.unit.to_lowercase() == unit.to_lowercase() {
            return token.value;
        }
        self.extractor
            .units()
            .convert(token.value, &token.unit, unit)
            .unwrap_or(token.value)
    }

    /// 噪声过滤: 不同取值过多且最小值低于中位数的一定比例时, 去掉低值
    fn drop_noise(&self, numbers: Vec<f64>) -> Vec<f64> {
        let distinct: BTreeSet<i64> = numbers
            .iter()
            .map(|v| (round_to(*v, 1) * 10.0).round() as i64)
            .collect();
        if distinct.len() <= self.config.noise_min_distinct {
            return numbers;
        }

        let mut sorted = numbers.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = sorted[sorted.len() / 2];
        let cut = median * self.config.noise_median_ratio;

        if sorted[0] < cut {
            trace!(median, cut, "过滤噪声数值");
            numbers.into_iter().filter(|v| *v >= cut).collect()
        } else {
            numbers
        }
    }

    /// 跨度很小且存在重复取值时视为单一阈值, 只保留最大值
    fn collapse_threshold(&self, numbers: Vec<f64>) -> Vec<f64> {
        if numbers.len() < 2 {
            return numbers;
        }

        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        if max - min > max.abs() * self.config.threshold_spread_ratio {
            return numbers;
        }

        let distinct: BTreeSet<i64> = numbers
            .iter()
            .map(|v| (round_to(*v, 1) * 10.0).round() as i64)
            .collect();
        if distinct.len() == numbers.len() {
            return numbers;
        }

        vec![max]
    }

    /// 最常见的数字前缀（口语比较词规范为符号）; 并列时先出现者优先
    fn common_prefix(&self, extracted: &[ValueTokens]) -> Option<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();

        for value in extracted {
            let Some(prefix) = self.prefix_of(value.text) else {
                continue;
            };
            match counts.iter_mut().find(|(p, _)| *p == prefix) {
                Some(slot) => slot.1 += 1,
                None => counts.push((prefix, 1)),
            }
        }

        let best = counts.iter().map(|(_, c)| *c).max()?;
        counts
            .into_iter()
            .find(|(_, c)| *c == best)
            .map(|(p, _)| p)
    }

    fn prefix_of(&self, text: &str) -> Option<String> {
        let first_digit = text.find(|c: char| c.is_ascii_digit())?;
        let raw = text[..first_digit].trim_end_matches(&['-', '+'][..]);
        let trimmed = raw
            .trim_end_matches(|c: char| c.is_whitespace() || c == ':' || c == '：')
            .trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = self.dictionaries.normalize_verbal_comparators(trimmed);
        let normalized = normalized.trim();
        if normalized.is_empty() {
            None
        } else {
            Some(normalized.to_string())
        }
    }
}
