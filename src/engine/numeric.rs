// ==========================================
// 多供应商参数融合引擎 - 数值/单位提取器
// ==========================================
// 职责: 自由文本 → NumericToken 序列; 范围/尺寸/型号/误差分类谓词
// 红线:
// - 范围连字符（"0.5-13000"）不得识别为负号
// - 负号/正号仅在前一字符为空白或比较符号（≥ ≤ > < =）时生效
// - 括号单位优先绑定到其标注的数字
// - 解析失败静默跳过, 不返回错误
// ==========================================

use crate::config::Dictionaries;
use crate::domain::NumericToken;
use crate::engine::units::{round_to, UnitTable};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;
use tracing::trace;

// 单位字符集: 拉丁字母/度/温度/微/斜杠/百分号, 或连续汉字
const UNIT_PATTERN: &str = r"[a-zA-Z°℃℉μΩ³²/%]+|[\x{4e00}-\x{9fff}]+";

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\d+(?:,\d+)*(?:\.\d*)?)\s*({})?", UNIT_PATTERN))
        .expect("数字正则非法")
});

// (100-200)mL / （300）毫升
static PAREN_NUMBERS_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"[(（]\s*([\d\s.,\-~～]+?)\s*[)）]\s*({})",
        UNIT_PATTERN
    ))
    .expect("括号数字正则非法")
});

// 300(mL) / 100-200（mL）
static NUMBERS_PAREN_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(\d+[,\d]*(?:\.\d+)?(?:\s*[-~～]\s*\d+[,\d]*(?:\.\d+)?)?)\s*[(（]\s*({})\s*[)）]",
        UNIT_PATTERN
    ))
    .expect("括号单位正则非法")
});

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*[-~～至到]\s*\d+").expect("范围正则非法"));

static HYPHEN_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+-\d+").expect("连字符范围正则非法"));

static DIMENSION_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\d+\s*(?:mm|cm|in|"|'|英寸)\s*[×xX*]\s*\d+"#).expect("尺寸正则非法")
});

static DIMENSION_PIXEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\s*\*\s*\d+\s*(?:像素|pixel|px)").expect("像素正则非法")
});

static DIMENSION_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*[×xX*]\s*\d+").expect("尺寸正则非法"));

static MODEL_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^a-z])(?:i[3579]|intel|amd|ryzen|xeon|pentium|rtx|gtx|tesla|radeon|rx|arc)(?:[^a-z]|$)",
    )
    .expect("型号正则非法")
});

static GENERATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"第?\s*\d+\s*代").expect("代数正则非法"));

static TOLERANCE_SIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)±\s*\d+(?:\.\d+)?\s*(?:%|db|℃|°c)").expect("误差正则非法")
});

static TOLERANCE_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)误差|容差|tolerance|error").expect("误差词正则非法"));

static TOLERANCE_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+(?:\.\d+)?\s*(?:%|db|℃|°c)").expect("误差单位正则非法")
});

// 误差值提取: ±N / ≤±N / 误差…N
static TOLERANCE_VALUE_RES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)[±+\-/]+\s*(\d+\.?\d*)\s*(%|db|℃|°c)?").expect("误差值正则非法"),
        Regex::new(r"(?i)[≤<]\s*[±+\-/]*\s*(\d+\.?\d*)\s*(%|db|℃|°c)?").expect("误差值正则非法"),
        Regex::new(r"(?i)误差[^±\d]*±*\s*(\d+\.?\d*)\s*(%|db|℃|°c)?").expect("误差值正则非法"),
    ]
});

static SCIENTIFIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?[eE][+-]?\d+").expect("科学计数正则非法")
});

/// 括号单位绑定: 数字所在字节区间 → 单位
#[derive(Debug)]
struct ParenBinding {
    span: Range<usize>,
    unit: String,
}

// ==========================================
// NumericExtractor - 数值/单位提取器
// ==========================================
#[derive(Debug, Clone)]
pub struct NumericExtractor {
    units: Arc<UnitTable>,
    dictionaries: Arc<Dictionaries>,
}

impl NumericExtractor {
    pub fn new(units: Arc<UnitTable>, dictionaries: Arc<Dictionaries>) -> Self {
        Self {
            units,
            dictionaries,
        }
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    /// 提取文本中的全部数值标记
    ///
    /// # 参数
    /// - text: 原始文本
    ///
    /// # 返回
    /// 按出现顺序排列的数值标记（无法解析的片段被跳过）
    pub fn extract(&self, text: &str) -> Vec<NumericToken> {
        let bindings = paren_bindings(text);
        let mut tokens = Vec::new();

        for caps in NUMBER_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(number) = caps.get(1) else { continue };

            // 非千分位的逗号串（"5,6kg"）拆成多个数字, 单位只属于最后一个
            let pieces = number_pieces(number.as_str());
            let last = pieces.len() - 1;

            for (idx, piece) in pieces.into_iter().enumerate() {
                let start = number.start() + piece.start;
                let digits = &text[start..number.start() + piece.end];
                let is_last = idx == last;

                let cleaned = digits.replace(',', "");
                let Ok(magnitude) = cleaned.trim_end_matches('.').parse::<f64>() else {
                    trace!(span = digits, "数字片段无法解析, 跳过");
                    continue;
                };

                let sign = sign_before(text, start);
                let value = match sign {
                    Some('-') => -magnitude,
                    _ => magnitude,
                };

                let binding = bindings.iter().find(|b| b.span.contains(&start));

                let (unit, is_parenthesized) = match binding {
                    Some(b) => (b.unit.clone(), true),
                    None if is_last => (
                        caps.get(2)
                            .map(|m| self.resolve_unit_run(m.as_str()))
                            .unwrap_or_default(),
                        false,
                    ),
                    None => (String::new(), false),
                };

                let span_start = match sign {
                    Some(c) => start - c.len_utf8(),
                    None => start,
                };
                let span_end = if is_last {
                    whole.end()
                } else {
                    start + digits.len()
                };
                let original_span = text[span_start..span_end].trim().to_string();

                tokens.push(NumericToken {
                    value,
                    unit,
                    original_span,
                    is_parenthesized,
                });
            }
        }

        trace!(text, count = tokens.len(), "数值提取完成");
        tokens
    }

    /// 汉字单位串取最长的已登记前缀（“公斤左右” → “公斤”）
    fn resolve_unit_run(&self, run: &str) -> String {
        let run = run.trim();
        // 范围连接词不是单位
        if run.starts_with('至') || run.starts_with('到') {
            return String::new();
        }
        if run.chars().next().is_some_and(is_cjk) {
            if let Some(prefix) = self.units.longest_known_prefix(run) {
                return prefix.to_string();
            }
        }
        run.to_string()
    }

    /// 是否为范围值（范围关键词或 N-N / N~N 模式）
    pub fn is_range_like(&self, text: &str) -> bool {
        self.dictionaries
            .range_keywords
            .iter()
            .any(|kw| text.contains(kw.as_str()))
            || RANGE_RE.is_match(text)
    }

    /// 提取数值范围（前两个数值, 自动保证 min ≤ max）
    pub fn extract_range(&self, text: &str) -> Option<(f64, f64, String)> {
        let tokens = self.extract(text);
        if tokens.len() < 2 {
            return None;
        }

        let (a, b) = (tokens[0].value, tokens[1].value);
        let unit = if tokens[0].has_unit() {
            tokens[0].unit.clone()
        } else {
            tokens[1].unit.clone()
        };
        Some((a.min(b), a.max(b), unit))
    }
}

/// 解析括号单位绑定
fn paren_bindings(text: &str) -> Vec<ParenBinding> {
    let mut bindings = Vec::new();

    for caps in PAREN_NUMBERS_UNIT_RE.captures_iter(text) {
        if let (Some(numbers), Some(unit)) = (caps.get(1), caps.get(2)) {
            bindings.push(ParenBinding {
                span: numbers.range(),
                unit: unit.as_str().trim().to_string(),
            });
        }
    }

    for caps in NUMBERS_PAREN_UNIT_RE.captures_iter(text) {
        if let (Some(numbers), Some(unit)) = (caps.get(1), caps.get(2)) {
            bindings.push(ParenBinding {
                span: numbers.range(),
                unit: unit.as_str().trim().to_string(),
            });
        }
    }

    bindings
}

/// 数字串按逗号切分: 合法千分位（"13,000.5"）整体保留, 否则每段一个数字
fn number_pieces(number: &str) -> Vec<Range<usize>> {
    let int_end = number.find('.').unwrap_or(number.len());
    let mut groups = number[..int_end].split(',');
    let is_thousands =
        groups.next().is_some_and(|g| g.len() <= 3) && groups.all(|g| g.len() == 3);
    if is_thousands || !number.contains(',') {
        return vec![0..number.len()];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c) in number.char_indices() {
        if c == ',' {
            pieces.push(start..i);
            start = i + 1;
        }
    }
    pieces.push(start..number.len());
    pieces
}

/// 判断数字前的 '-' / '+' 是否为符号
///
/// 仅当符号前一字符为空白或比较符号时成立; 位于串首不视为符号
fn sign_before(text: &str, number_start: usize) -> Option<char> {
    let mut preceding = text[..number_start].chars().rev();
    let sign = preceding.next().filter(|c| *c == '-' || *c == '+')?;
    let context = preceding.next()?;
    if context.is_whitespace() || matches!(context, '≥' | '≤' | '>' | '<' | '=') {
        Some(sign)
    } else {
        None
    }
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

// ==========================================
// 分类谓词（纯函数, 独立可测）
// ==========================================

/// 是否含数字
pub fn is_numeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// 是否为尺寸规格（NxN / N"xN / N*N 像素）, 排除真实范围
pub fn is_dimension_spec(text: &str) -> bool {
    if DIMENSION_UNIT_RE.is_match(text) || DIMENSION_PIXEL_RE.is_match(text) {
        return true;
    }
    DIMENSION_BARE_RE.is_match(text) && !HYPHEN_RANGE_RE.is_match(text)
}

/// 是否含 CPU/GPU 型号关键词或代数序号
pub fn has_model_keyword(text: &str) -> bool {
    MODEL_KEYWORD_RE.is_match(text) || GENERATION_RE.is_match(text)
}

/// 是否为误差/容差表达
pub fn is_error_tolerance(text: &str) -> bool {
    TOLERANCE_SIGN_RE.is_match(text)
        || (TOLERANCE_WORD_RE.is_match(text) && TOLERANCE_UNIT_RE.is_match(text))
}

/// 提取文本中最大的误差幅值及其单位（缺省单位 %）
pub fn extract_tolerance(text: &str) -> Option<(f64, String)> {
    let mut best: Option<(f64, String)> = None;

    for re in TOLERANCE_VALUE_RES.iter() {
        for caps in re.captures_iter(text) {
            let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
                continue;
            };
            let unit = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "%".to_string());
            if best.as_ref().map_or(true, |(max, _)| value > *max) {
                best = Some((value, unit));
            }
        }
    }

    best
}

/// 解析科学计数法（"1.5E-3" → 0.0015）
pub fn parse_scientific(text: &str) -> Option<f64> {
    SCIENTIFIC_RE.find(text)?.as_str().parse().ok()
}

/// 数值的最短十进制表示（5.0 → "5", 0.50 → "0.5"）
pub fn format_number(value: f64) -> String {
    let rounded = round_to(value, 6);
    if rounded == 0.0 {
        // 避免输出 "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}
