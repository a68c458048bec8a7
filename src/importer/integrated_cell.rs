// ==========================================
// 多供应商参数融合引擎 - 整合参数预处理
// ==========================================
// 职责: 识别一个单元格内打包的多个子参数（如整机配置清单）,
//       拆分后只保留与当前参数行相关的片段
// 判定: 分隔符（, ， 、 ; ；）至少 2 个即视为整合参数
// 红线: 不返回错误; 找不到相关片段时原样返回
// ==========================================

use crate::config::Dictionaries;
use crate::importer::cell_trait::CellPreprocessor;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[，,；;、\n]").expect("分隔符正则非法"));

static COMPARISON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([≥≤><=\-~]+)\s*(.*)$").expect("比较符正则非法"));

static SPEC_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)*)\s*([a-zA-Z°℃μ/]+)?").expect("规格数字正则非法")
});

/// 未识别类别
pub const UNKNOWN_CATEGORY: &str = "其他";

const INTEGRATED_SEPARATORS: [char; 5] = [',', '，', '、', ';', '；'];

/// 拆分后的子参数片段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSegment {
    pub category: String,
    pub original: String,
    /// 前导比较符号（如 "≥"）
    pub comparison: String,
    pub content: String,
}

/// 片段规格: 数值 / 单位 / 文字描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSpecs {
    pub category: String,
    pub content: String,
    pub description: String,
    pub numbers: Vec<f64>,
    pub units: Vec<String>,
}

// ==========================================
// ParameterParser - 整合参数解析器
// ==========================================
#[derive(Debug, Clone)]
pub struct ParameterParser {
    dictionaries: Arc<Dictionaries>,
}

impl ParameterParser {
    pub fn new(dictionaries: Arc<Dictionaries>) -> Self {
        Self { dictionaries }
    }

    /// 拆分整合参数字符串
    ///
    /// # 参数
    /// - text: 如 "≥Windows10操作系统，≥酷睿i5 CPU、≥8G 内存"
    ///
    /// # 返回
    /// 按原顺序排列的片段（空片段被丢弃）
    pub fn parse(&self, text: &str) -> Vec<ParsedSegment> {
        SEPARATOR_RE
            .split(text.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|segment| {
                let (comparison, content) = match COMPARISON_RE.captures(segment) {
                    Some(caps) => (
                        caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
                        caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
                    ),
                    None => (String::new(), segment.to_string()),
                };
                if content.is_empty() {
                    return None;
                }

                Some(ParsedSegment {
                    category: self.identify_category(&content),
                    original: segment.to_string(),
                    comparison,
                    content,
                })
            })
            .collect()
    }

    /// 按关键词识别片段类别（按词典顺序, 先命中先得）
    pub fn identify_category(&self, content: &str) -> String {
        let lower = content.to_lowercase();
        self.dictionaries
            .category_keywords
            .iter()
            .find(|c| c.keywords.iter().any(|kw| lower.contains(&kw.to_lowercase())))
            .map(|c| c.category.clone())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }

    /// 按类别分组（保持类别首次出现顺序）
    pub fn group_by_category(&self, segments: &[ParsedSegment]) -> Vec<(String, Vec<ParsedSegment>)> {
        let mut grouped: Vec<(String, Vec<ParsedSegment>)> = Vec::new();
        for segment in segments {
            match grouped.iter_mut().find(|(c, _)| *c == segment.category) {
                Some((_, items)) => items.push(segment.clone()),
                None => grouped.push((segment.category.clone(), vec![segment.clone()])),
            }
        }
        grouped
    }

    /// 格式化为带序号的可读文本
    pub fn format_segments(&self, segments: &[ParsedSegment]) -> String {
        if segments.is_empty() {
            return "无法解析参数".to_string();
        }

        segments
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                if s.comparison.is_empty() {
                    format!("{}. 【{}】 {}", idx + 1, s.category, s.content)
                } else {
                    format!("{}. 【{}】 {} {}", idx + 1, s.category, s.comparison, s.content)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 提取片段中的数值、单位与文字描述
    pub fn extract_specs(&self, segment: &ParsedSegment) -> SegmentSpecs {
        let mut numbers = Vec::new();
        let mut units = Vec::new();

        for caps in SPEC_NUMBER_RE.captures_iter(&segment.content) {
            let Some(number) = caps.get(1) else { continue };
            let Ok(value) = number.as_str().replace(',', "").parse::<f64>() else {
                continue;
            };
            numbers.push(value);
            if let Some(unit) = caps.get(2) {
                units.push(unit.as_str().to_string());
            }
        }

        let mut description = SPEC_NUMBER_RE.replace_all(&segment.content, "").into_owned();
        if let Some(category) = self
            .dictionaries
            .category_keywords
            .iter()
            .find(|c| c.category == segment.category)
        {
            for keyword in &category.keywords {
                if let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(keyword))) {
                    description = re.replace_all(&description, "").into_owned();
                }
            }
        }

        SegmentSpecs {
            category: segment.category.clone(),
            content: segment.content.clone(),
            description: description.split_whitespace().collect::<Vec<_>>().join(" "),
            numbers,
            units,
        }
    }
}

// ==========================================
// IntegratedCellPreprocessor - 整合参数预处理器
// ==========================================
#[derive(Debug, Clone)]
pub struct IntegratedCellPreprocessor {
    parser: ParameterParser,
    dictionaries: Arc<Dictionaries>,
}

impl IntegratedCellPreprocessor {
    pub fn new(dictionaries: Arc<Dictionaries>) -> Self {
        Self {
            parser: ParameterParser::new(dictionaries.clone()),
            dictionaries,
        }
    }

    pub fn parser(&self) -> &ParameterParser {
        &self.parser
    }

    /// 是否为整合参数（分隔符 ≥ 2）
    pub fn is_integrated(&self, text: &str) -> bool {
        text.chars()
            .filter(|c| INTEGRATED_SEPARATORS.contains(c))
            .count()
            >= 2
    }

    /// 从分组中取与参数名称相关的片段内容
    ///
    /// 先按类别名精确匹配, 再按类别名双向包含匹配
    fn relevant_content(
        &self,
        grouped: &[(String, Vec<ParsedSegment>)],
        parameter_name: &str,
    ) -> Option<String> {
        if parameter_name.trim().is_empty() {
            return None;
        }

        let targets = self.dictionaries.categories_for(parameter_name.trim());

        for target in &targets {
            if let Some((_, items)) = grouped.iter().find(|(c, _)| c == target) {
                if let Some(first) = items.first() {
                    return Some(first.content.clone());
                }
            }
        }

        for target in &targets {
            let target_lower = target.to_lowercase();
            for (category, items) in grouped {
                if category == UNKNOWN_CATEGORY {
                    continue;
                }
                let category_lower = category.to_lowercase();
                if target_lower.contains(&category_lower) || category_lower.contains(&target_lower) {
                    if let Some(first) = items.first() {
                        return Some(first.content.clone());
                    }
                }
            }
        }

        None
    }
}

impl CellPreprocessor for IntegratedCellPreprocessor {
    fn preprocess(&self, value: &str, parameter_name: &str) -> String {
        if value.trim().is_empty() || !self.is_integrated(value) {
            return value.to_string();
        }

        let segments = self.parser.parse(value);
        let grouped = self.parser.group_by_category(&segments);

        match self.relevant_content(&grouped, parameter_name) {
            Some(content) => {
                debug!(parameter_name, segments = segments.len(), content = %content, "整合参数拆分命中");
                content
            }
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "≥Windows10操作系统，≥酷睿i5 CPU、≥8G 内存，≥250GB SSD+4T 硬盘，≥24 英寸高分辨率TFT";

    fn preprocessor() -> IntegratedCellPreprocessor {
        IntegratedCellPreprocessor::new(Arc::new(Dictionaries::default()))
    }

    #[test]
    fn test_is_integrated() {
        let p = preprocessor();
        assert!(p.is_integrated(SAMPLE));
        assert!(p.is_integrated("A、B、C"));
        assert!(!p.is_integrated("彩色，触摸"));
        assert!(!p.is_integrated("5kg"));
    }

    #[test]
    fn test_parse_segments() {
        let p = preprocessor();
        let segments = p.parser().parse(SAMPLE);
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0].category, "操作系统");
        assert_eq!(segments[0].comparison, "≥");
        assert_eq!(segments[1].category, "CPU");
        assert_eq!(segments[1].content, "酷睿i5 CPU");
        assert_eq!(segments[2].category, "内存");
        assert_eq!(segments[3].category, "存储");
        assert_eq!(segments[4].category, "显示器");
    }

    #[test]
    fn test_preprocess_extracts_relevant_segment() {
        let p = preprocessor();
        assert_eq!(p.preprocess(SAMPLE, "CPU"), "酷睿i5 CPU");
        assert_eq!(p.preprocess(SAMPLE, "内存"), "8G 内存");
        // 硬盘 → 存储 类别
        assert_eq!(p.preprocess(SAMPLE, "硬盘"), "250GB SSD+4T 硬盘");
    }

    #[test]
    fn test_preprocess_fuzzy_category() {
        let p = preprocessor();
        assert_eq!(p.preprocess(SAMPLE, "内存容量"), "8G 内存");
    }

    #[test]
    fn test_preprocess_no_match_returns_original() {
        let p = preprocessor();
        assert_eq!(p.preprocess(SAMPLE, "重量"), SAMPLE);
        assert_eq!(p.preprocess("5kg", "CPU"), "5kg");
        assert_eq!(p.preprocess("", "CPU"), "");
    }

    #[test]
    fn test_preprocess_row_keeps_empty_cells() {
        let p = preprocessor();
        let row = vec![Some(SAMPLE.to_string()), None];
        assert_eq!(
            p.preprocess_row(&row, "内存"),
            vec![Some("8G 内存".to_string()), None]
        );
    }

    #[test]
    fn test_group_and_format() {
        let p = preprocessor();
        let segments = p.parser().parse("≥8G 内存、16GB DDR4、Intel i7");
        let grouped = p.parser().group_by_category(&segments);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "内存");
        assert_eq!(grouped[0].1.len(), 2);

        let text = p.parser().format_segments(&segments);
        assert!(text.starts_with("1. 【内存】 ≥ 8G 内存"));
        assert_eq!(p.parser().format_segments(&[]), "无法解析参数");
    }

    #[test]
    fn test_extract_specs() {
        let p = preprocessor();
        let segments = p.parser().parse("≥250GB SSD，x，y");
        let specs = p.parser().extract_specs(&segments[0]);
        assert_eq!(specs.category, "存储");
        assert_eq!(specs.numbers, vec![250.0]);
        assert_eq!(specs.units, vec!["GB".to_string()]);
        assert_eq!(specs.description, "");
    }
}
