// ==========================================
// 多供应商参数融合引擎 - 文本标准化与相似度
// ==========================================
// 职责: 标准化 / 去标点 / 多指标相似度 / 贪心聚类 / 关键词
// 相似度: 字符级比率、词序无关比率、词集合比率, 取最大值
// 聚类: 单遍贪心, 依赖输入顺序（先出现的分组优先）
// ==========================================

use crate::config::Dictionaries;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use strsim::normalized_levenshtein;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("空白正则非法"));

// ==========================================
// TextScorer - 文本标准化与相似度计算
// ==========================================
#[derive(Debug, Clone)]
pub struct TextScorer {
    dictionaries: Arc<Dictionaries>,
    remove_modifiers: bool,
}

impl TextScorer {
    pub fn new(dictionaries: Arc<Dictionaries>, remove_modifiers: bool) -> Self {
        Self {
            dictionaries,
            remove_modifiers,
        }
    }

    /// 标准化: 去首尾空白 / 转小写 / 合并空白 / 可选去修饰词
    ///
    /// 无数据占位词标准化为空串
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() || self.dictionaries.is_no_data(text) {
            return String::new();
        }

        let lowered = text.trim().to_lowercase();
        let mut normalized = WHITESPACE_RE.replace_all(&lowered, " ").into_owned();

        if self.remove_modifiers {
            for word in &self.dictionaries.modifier_words {
                normalized = normalized.replace(word.as_str(), "");
            }
        }

        normalized.trim().to_string()
    }

    /// 相似度（0-100）, 取三种指标的最大值
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = self.normalize(a);
        let b = self.normalize(b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        ratio(&a, &b)
            .max(token_sort_ratio(&a, &b))
            .max(token_set_ratio(&a, &b))
    }

    /// 词集合相似度（0-100）
    pub fn token_set_similarity(&self, a: &str, b: &str) -> f64 {
        token_set_ratio(&self.normalize(a), &self.normalize(b))
    }

    /// 贪心聚类, 返回最大分组代表元素（首个成员）的下标
    ///
    /// # 参数
    /// - values: 待聚类文本
    /// - threshold: 相似度阈值（0-1）
    ///
    /// # 返回
    /// - Some(index): 最大分组（至少 2 个成员）中最靠前的元素
    /// - None: 不存在成员数 ≥ 2 的分组
    pub fn cluster_representative(&self, values: &[String], threshold: f64) -> Option<usize> {
        let threshold_percent = threshold * 100.0;
        let mut claimed = vec![false; values.len()];
        let mut largest: Option<Vec<usize>> = None;

        for i in 0..values.len() {
            if claimed[i] {
                continue;
            }

            let mut group = vec![i];
            for j in (i + 1)..values.len() {
                if claimed[j] {
                    continue;
                }
                if self.similarity(&values[i], &values[j]) >= threshold_percent {
                    group.push(j);
                    claimed[j] = true;
                }
            }

            if group.len() >= 2 {
                claimed[i] = true;
                // 同等大小保留先出现的分组
                if largest.as_ref().map_or(true, |g| group.len() > g.len()) {
                    largest = Some(group);
                }
            }
        }

        largest.map(|group| group[0])
    }
}

/// 去除标点（保留字母、数字、下划线、汉字）
pub fn remove_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// 字符级相似度（0-100）
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (normalized_levenshtein(a, b) * 100.0).round()
}

/// 分词前处理: 非字母数字替换为空格, 小写
fn tokens(text: &str) -> Vec<String> {
    let processed: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    processed
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// 词序无关相似度: 分词排序后比较
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let mut ta = tokens(a);
    let mut tb = tokens(b);
    ta.sort();
    tb.sort();
    ratio(&ta.join(" "), &tb.join(" "))
}

/// 词集合相似度: 交集与各自差集拼接后两两比较取最大
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let sa: BTreeSet<String> = tokens(a).into_iter().collect();
    let sb: BTreeSet<String> = tokens(b).into_iter().collect();
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }

    let join = |set: Vec<&String>| {
        set.into_iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };
    let intersection = join(sa.intersection(&sb).collect());
    let diff_ab = join(sa.difference(&sb).collect());
    let diff_ba = join(sb.difference(&sa).collect());

    let combined_ab = format!("{} {}", intersection, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", intersection, diff_ba).trim().to_string();

    ratio(&intersection, &combined_ab)
        .max(ratio(&intersection, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// 提取关键词: 汉字串按二元组切分, 拉丁词取长度 ≥ 2 者（小写, 去重保序）
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut push = |kw: String| {
        if !keywords.contains(&kw) {
            keywords.push(kw);
        }
    };

    let mut cjk_run: Vec<char> = Vec::new();
    let mut latin_run = String::new();

    let flush_cjk = |run: &mut Vec<char>, push: &mut dyn FnMut(String)| {
        if run.len() >= 2 {
            for pair in run.windows(2) {
                push(pair.iter().collect());
            }
        }
        run.clear();
    };
    let flush_latin = |run: &mut String, push: &mut dyn FnMut(String)| {
        if run.chars().count() >= 2 {
            push(run.to_lowercase());
        }
        run.clear();
    };

    for c in text.chars() {
        if is_cjk(c) {
            flush_latin(&mut latin_run, &mut push);
            cjk_run.push(c);
        } else if c.is_ascii_alphabetic() {
            flush_cjk(&mut cjk_run, &mut push);
            latin_run.push(c);
        } else {
            flush_cjk(&mut cjk_run, &mut push);
            flush_latin(&mut latin_run, &mut push);
        }
    }
    flush_cjk(&mut cjk_run, &mut push);
    flush_latin(&mut latin_run, &mut push);

    keywords
}

/// 文本是否包含任一关键词（大小写不敏感）
pub fn has_keyword(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> TextScorer {
        TextScorer::new(Arc::new(Dictionaries::default()), false)
    }

    #[test]
    fn test_normalize() {
        let s = scorer();
        assert_eq!(s.normalize("  Hello   World "), "hello world");
        assert_eq!(s.normalize("-"), "");
        assert_eq!(s.normalize(""), "");
    }

    #[test]
    fn test_normalize_remove_modifiers() {
        let s = TextScorer::new(Arc::new(Dictionaries::default()), true);
        assert_eq!(s.normalize("约5kg左右"), "5kg");
    }

    #[test]
    fn test_remove_punctuation() {
        assert_eq!(remove_punctuation("±5% (max)"), "5max");
        assert_eq!(remove_punctuation("彩色，触摸屏"), "彩色触摸屏");
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("", "abc"), 0.0);
        assert!(ratio("abcd", "abxy") < 100.0);
    }

    #[test]
    fn test_token_sort_ignores_order() {
        assert_eq!(token_sort_ratio("red blue", "blue red"), 100.0);
    }

    #[test]
    fn test_token_set_subset_is_full_match() {
        assert_eq!(token_set_ratio("高精度", "高精度 ±0.1mm"), 100.0);
        assert_eq!(token_set_ratio("", "x"), 0.0);
    }

    #[test]
    fn test_similarity_takes_max() {
        let s = scorer();
        let sim = s.similarity("USB HDMI", "hdmi usb");
        assert_eq!(sim, 100.0);
        assert_eq!(s.similarity("abc", "-"), 0.0);
    }

    #[test]
    fn test_cluster_representative_largest_group() {
        let s = scorer();
        let values: Vec<String> = ["分辨率1920×1080", "分辨率1920×1080像素", "分辨率1920×1024"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(s.cluster_representative(&values, 0.8), Some(0));
    }

    #[test]
    fn test_cluster_prefers_later_larger_group() {
        let s = scorer();
        let values: Vec<String> = ["xyz", "apple pie", "apple pies", "apple pie!"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(s.cluster_representative(&values, 0.8), Some(1));
    }

    #[test]
    fn test_cluster_none_when_all_distinct() {
        let s = scorer();
        let values: Vec<String> = ["快速", "慢速", "中等"].iter().map(|v| v.to_string()).collect();
        assert_eq!(s.cluster_representative(&values, 0.6), None);
    }

    #[test]
    fn test_extract_keywords() {
        let kws = extract_keywords("高精度 Probe");
        assert_eq!(kws, vec!["高精", "精度", "probe"]);
        assert!(has_keyword("测量精度", &kws));
        assert!(!has_keyword("响应时间", &kws));
    }
}
