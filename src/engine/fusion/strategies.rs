use super::core::FusionEngine;
use crate::config::ParameterRule;
use crate::domain::{FusionResult, FusionType, RuleKind};
use crate::engine::multi_value::{format_multi_value, merge, parse_with_rule};
use crate::engine::numeric::{
    extract_tolerance, format_number, has_model_keyword, is_dimension_spec, is_error_tolerance,
    is_numeric,
};
use crate::engine::numeric_merge::NumericMerger;
use crate::engine::text::{extract_keywords, has_keyword, remove_punctuation};

/// 单行融合上下文（只读）
pub(super) struct FusionContext<'a> {
    pub engine: &'a FusionEngine,
    pub parameter_name: &'a str,
    /// 清洗后的有效值（至少 2 个）
    pub values: &'a [String],
    pub rule: &'a ParameterRule,
}

/// 融合策略: 不适用时返回 None, 交给下一个策略
pub(super) type Strategy = fn(&FusionContext<'_>) -> Option<FusionResult>;

/// 策略调度链（按顺序尝试）
pub(super) const STRATEGY_CHAIN: [(&str, Strategy); 7] = [
    ("exact_match", exact_match),
    ("multi_value", multi_value),
    ("tolerance", tolerance),
    ("numeric", numeric),
    ("high_similarity", high_similarity),
    ("medium_similarity", medium_similarity),
    ("semantic", semantic),
];

// ==========================================
// 精确匹配
// ==========================================
// 标准化 + 去标点后出现 ≥ 2 次, 返回首次出现的原文
fn exact_match(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    let scorer = ctx.engine.scorer();
    let forms: Vec<String> = ctx
        .values
        .iter()
        .map(|v| remove_punctuation(&scorer.normalize(v)))
        .collect();

    let mut best: Option<(usize, usize)> = None; // (首次下标, 次数)
    for (idx, form) in forms.iter().enumerate() {
        if form.is_empty() || forms[..idx].contains(form) {
            continue;
        }
        let count = forms.iter().filter(|f| *f == form).count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((idx, count));
        }
    }

    match best {
        Some((idx, count)) if count >= 2 => Some(FusionResult::new(
            ctx.values[idx].clone(),
            FusionType::ExactMatch,
        )),
        _ => None,
    }
}

// ==========================================
// 多值融合（仅多值类规则）
// ==========================================
fn multi_value(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    if ctx.rule.kind != RuleKind::MultiValue {
        return None;
    }

    let maps: Vec<_> = ctx
        .values
        .iter()
        .map(|v| parse_with_rule(v, ctx.rule))
        .filter(|m| !m.is_empty())
        .collect();
    if maps.len() < 2 {
        return None;
    }

    let merged = merge(&maps, ctx.rule.merge_mode);
    let text = format_multi_value(&merged, ctx.rule.merge_mode);
    if text.is_empty() {
        return None;
    }
    Some(FusionResult::new(text, FusionType::MultiValue))
}

// ==========================================
// 误差融合（参数名称指向误差/容差时）
// ==========================================
// 输出 ≤±{最大幅值}{单位}
fn tolerance(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    if !ctx.engine.config().unit_conversion
        || !ctx.engine.dictionaries().is_tolerance_parameter(ctx.parameter_name)
        || !ctx.values.iter().any(|v| is_error_tolerance(v))
    {
        return None;
    }

    let (max, unit) = ctx
        .values
        .iter()
        .filter_map(|v| extract_tolerance(v))
        .fold(None::<(f64, String)>, |best, (value, unit)| match best {
            Some((max, _)) if value <= max => best,
            _ => Some((value, unit)),
        })?;

    Some(FusionResult::new(
        format!("≤±{}{}", format_number(max), unit),
        FusionType::ToleranceFusion,
    ))
}

// ==========================================
// 数值融合
// ==========================================
// 前置条件: 全部含数字, 且无型号关键词、尺寸规格、误差表达
fn numeric(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    if !ctx.engine.config().unit_conversion {
        return None;
    }

    let eligible = ctx.values.iter().all(|v| is_numeric(v))
        && !ctx.values.iter().any(|v| has_model_keyword(v))
        && !ctx.values.iter().any(|v| is_dimension_spec(v))
        && !ctx.values.iter().any(|v| is_error_tolerance(v));
    if !eligible {
        return None;
    }

    let merger = NumericMerger {
        extractor: ctx.engine.extractor(),
        scorer: ctx.engine.scorer(),
        config: ctx.engine.config(),
        dictionaries: ctx.engine.dictionaries(),
    };
    merger.merge(ctx.values, ctx.parameter_name, ctx.rule)
}

// ==========================================
// 相似度融合
// ==========================================
fn high_similarity(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    let threshold = if ctx.rule.kind == RuleKind::Text {
        ctx.rule.similarity_threshold
    } else {
        ctx.engine.config().similarity_threshold
    };
    similarity(ctx, threshold, FusionType::HighSimilarity)
}

fn medium_similarity(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    similarity(
        ctx,
        ctx.engine.config().medium_similarity_threshold,
        FusionType::MediumSimilarity,
    )
}

fn similarity(
    ctx: &FusionContext<'_>,
    threshold: f64,
    fusion_type: FusionType,
) -> Option<FusionResult> {
    ctx.engine
        .scorer()
        .cluster_representative(ctx.values, threshold)
        .map(|idx| FusionResult::new(ctx.values[idx].clone(), fusion_type))
}

// ==========================================
// 语义匹配
// ==========================================
// 1. 参数名称命中同义词组, 且 ≥ 2 个值包含组内任一词 → 出现最多者
// 2. 否则: 某个值的关键词出现在参数名称中 → 该值
fn semantic(ctx: &FusionContext<'_>) -> Option<FusionResult> {
    if !ctx.engine.config().semantic_matching {
        return None;
    }

    let set = ctx.engine.dictionaries().synonym_set_for(ctx.parameter_name)?;
    let terms: Vec<String> = set.all_terms().iter().map(|t| t.to_lowercase()).collect();

    let matched: Vec<&String> = ctx
        .values
        .iter()
        .filter(|v| {
            let lower = v.to_lowercase();
            terms.iter().any(|t| lower.contains(t.as_str()))
        })
        .collect();

    if matched.len() >= 2 {
        let mut best: Option<(&String, usize)> = None;
        for value in &matched {
            let count = matched.iter().filter(|m| *m == value).count();
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((*value, count));
            }
        }
        return best.map(|(value, _)| FusionResult::new(value.clone(), FusionType::SemanticMatch));
    }

    ctx.values
        .iter()
        .find(|v| has_keyword(ctx.parameter_name, &extract_keywords(v)))
        .map(|v| FusionResult::new(v.clone(), FusionType::SemanticMatch))
}

// ==========================================
// 冲突兜底
// ==========================================
// 原值出现 ≥ 2 次取多数, 否则取第一个; 一律标记为需人工审核
pub(super) fn resolve_conflict(values: &[String]) -> FusionResult {
    let mut best: Option<(&String, usize)> = None;
    for value in values {
        let count = values.iter().filter(|v| *v == value).count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }

    let chosen = match best {
        Some((value, count)) if count >= 2 => value.clone(),
        _ => values.first().cloned().unwrap_or_default(),
    };
    FusionResult::new(chosen, FusionType::ManualReview)
}
