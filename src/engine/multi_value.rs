// ==========================================
// 多供应商参数融合引擎 - 多值参数
// ==========================================
// 职责: 多值文本 → 键/数量映射; Union / Max 合并; 输出格式化
// 格式:
// - 斜杠列表 "A/B/M": 每个键计 1
// - 数量对 "USB×3 HDMI×2": 键 → 数量
// ==========================================

use crate::config::ParameterRule;
use crate::domain::MergeMode;
use once_cell::sync::Lazy;
use regex::Regex;

static KEY_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z\x{4e00}-\x{9fa5}]+)\s*[×xX*]?\s*(\d+)").expect("多值正则非法")
});

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d×]+").expect("数字正则非法"));

/// 键 → 数量（保持首次出现顺序）
pub type MultiValueMap = Vec<(String, u32)>;

/// 解析多值文本
///
/// # 参数
/// - text: 供应商原始值
/// - separator: 规则分隔符（"/" 时按斜杠列表解析）
pub fn parse_multi_value(text: &str, separator: &str) -> MultiValueMap {
    let mut map: MultiValueMap = Vec::new();

    if separator == "/" || text.contains('/') {
        for part in text.split('/') {
            let key = DIGITS_RE.replace_all(part, "").trim().to_uppercase();
            if !key.is_empty() {
                upsert(&mut map, key, 1);
            }
        }
        return map;
    }

    for caps in KEY_COUNT_RE.captures_iter(text) {
        let (Some(key), Some(count)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Ok(count) = count.as_str().parse::<u32>() else {
            continue;
        };
        upsert(&mut map, key.as_str().to_uppercase(), count);
    }

    map
}

fn upsert(map: &mut MultiValueMap, key: String, count: u32) {
    match map.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = count,
        None => map.push((key, count)),
    }
}

/// 按规则解析并过滤合法键
pub fn parse_with_rule(text: &str, rule: &ParameterRule) -> MultiValueMap {
    let map = parse_multi_value(text, &rule.separator);
    if rule.keys.is_empty() {
        return map;
    }

    map.into_iter()
        .filter(|(key, _)| rule.keys.iter().any(|k| k.to_uppercase() == *key))
        .collect()
}

/// 合并多个映射
///
/// Union: 键集合并（数量取最大）; Max: 每个键取观测到的最大数量
pub fn merge(maps: &[MultiValueMap], mode: MergeMode) -> MultiValueMap {
    let mut merged: MultiValueMap = Vec::new();
    for map in maps {
        for (key, count) in map {
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = slot.1.max(*count),
                None => merged.push((key.clone(), *count)),
            }
        }
    }

    if mode == MergeMode::Union {
        for slot in merged.iter_mut() {
            slot.1 = slot.1.max(1);
        }
    }
    merged
}

/// 格式化合并结果
pub fn format_multi_value(map: &MultiValueMap, mode: MergeMode) -> String {
    match mode {
        MergeMode::Union => map
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        MergeMode::Max => map
            .iter()
            .map(|(k, c)| format!("{}×{}", k, c))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// 供应商映射是否覆盖融合映射（每个键数量 ≥ 要求）
pub fn covers(vendor: &MultiValueMap, required: &MultiValueMap) -> bool {
    required.iter().all(|(key, need)| {
        vendor
            .iter()
            .find(|(k, _)| k == key)
            .is_some_and(|(_, have)| have >= need)
    })
}
