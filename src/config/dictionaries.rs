// ==========================================
// 多供应商参数融合引擎 - 词典配置
// ==========================================
// 职责: 同义词 / 无数据占位词 / 修饰词 / 范围关键词 /
//       无关词 / 语义等价词 / 整合参数类别关键词
// 红线: 构建后只读, 以 Arc 注入各组件, 运行期不修改
// ==========================================

use crate::error::FusionResultT;
use serde::{Deserialize, Serialize};

/// 同义词组（键 + 同义词列表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymSet {
    pub key: String,
    pub synonyms: Vec<String>,
}

impl SynonymSet {
    pub fn new(key: &str, synonyms: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 键与同义词的完整等价集合
    pub fn all_terms(&self) -> Vec<&str> {
        std::iter::once(self.key.as_str())
            .chain(self.synonyms.iter().map(|s| s.as_str()))
            .collect()
    }
}

/// 整合参数中的类别关键词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: String,
    pub keywords: Vec<String>,
}

/// 参数名称 → 整合参数类别
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAlias {
    pub parameter: String,
    pub categories: Vec<String>,
}

/// 口语化比较词 → 比较符号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbalComparator {
    pub phrase: String,
    pub symbol: String,
}

// ==========================================
// Dictionaries - 词典集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dictionaries {
    /// 无数据占位词（整格等于其一即视为空）
    pub no_data_words: Vec<String>,
    /// 修饰词（标准化时可选去除）
    pub modifier_words: Vec<String>,
    /// 范围关键词
    pub range_keywords: Vec<String>,
    /// 数值融合相关性过滤的无关词
    pub irrelevant_keywords: Vec<String>,
    /// 参数名称中表示“误差/容差”的词
    pub tolerance_name_keywords: Vec<String>,
    /// 语义融合同义词组
    pub synonyms: Vec<SynonymSet>,
    /// 达标判定语义等价词（双向）
    pub equivalents: Vec<SynonymSet>,
    /// 整合参数类别关键词（按顺序匹配, 先命中先得）
    pub category_keywords: Vec<CategoryKeywords>,
    /// 参数名称到整合参数类别的映射
    pub category_aliases: Vec<CategoryAlias>,
    /// 口语化比较词
    pub verbal_comparators: Vec<VerbalComparator>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Dictionaries {
    fn default() -> Self {
        Self {
            no_data_words: strings(&[
                "-", "--", "—", "/", "N/A", "n/a", "NA", "null", "None", "nan", "无数据",
                "暂无", "未提供", "不详",
            ]),
            modifier_words: strings(&["大约", "约为", "约", "左右", "可达", "具备", "具有", "支持"]),
            range_keywords: strings(&["范围", "之间", "区间", "可调"]),
            irrelevant_keywords: strings(&["工作时间", "断电", "操作", "响应", "刷新", "频率"]),
            tolerance_name_keywords: strings(&["误差", "容差", "error", "tolerance"]),
            synonyms: vec![
                SynonymSet::new("显示屏", &["显示器", "屏幕", "液晶屏", "LCD", "display"]),
                SynonymSet::new("彩色", &["彩屏", "全彩", "color"]),
                SynonymSet::new("触摸", &["触控", "触摸屏", "touch"]),
                SynonymSet::new("无线", &["wireless", "WiFi", "Wi-Fi", "蓝牙"]),
                SynonymSet::new("精度", &["准确度", "精确度", "accuracy"]),
                SynonymSet::new("探头", &["换能器", "probe", "transducer"]),
                SynonymSet::new("报警", &["告警", "警报", "alarm"]),
                SynonymSet::new("接口", &["端口", "port", "interface"]),
                SynonymSet::new("电源", &["供电", "power supply"]),
                SynonymSet::new("材质", &["材料", "material"]),
            ],
            equivalents: vec![
                SynonymSet::new("二维", &["2D", "two-dimensional", "二维空间"]),
                SynonymSet::new("三维", &["3D", "three-dimensional", "三维空间"]),
                SynonymSet::new("彩色", &["彩屏", "color", "全彩"]),
                SynonymSet::new("黑白", &["单色", "monochrome", "black and white", "灰度"]),
                SynonymSet::new("触摸", &["触摸屏", "touch", "touchscreen", "触控"]),
                SynonymSet::new("非触摸", &["普通屏", "non-touch", "非触控"]),
                SynonymSet::new("无线", &["wireless", "WiFi", "Wi-Fi", "蓝牙"]),
                SynonymSet::new("有线", &["wired", "有线连接"]),
                SynonymSet::new("毫米", &["mm", "millimeter"]),
                SynonymSet::new("厘米", &["cm", "centimeter"]),
                SynonymSet::new("千克", &["kg", "kilogram", "公斤"]),
                SynonymSet::new("毫升", &["mL", "milliliter"]),
            ],
            category_keywords: vec![
                category("操作系统", &["操作系统", "系统版本", "系统", "OS", "Windows", "Linux"]),
                category(
                    "CPU",
                    &["CPU", "处理器", "中央处理器", "酷睿", "英特尔", "Intel", "AMD", "锐龙", "Ryzen"],
                ),
                category("内存", &["内存", "RAM", "DDR"]),
                category("存储", &["存储", "硬盘", "固态硬盘", "SSD", "HDD", "磁盘", "M.2", "NVMe"]),
                category(
                    "显示器",
                    &["显示器", "显示屏", "屏幕", "英寸", "分辨率", "液晶屏", "TFT", "IPS"],
                ),
                category("显卡", &["显卡", "GPU", "独立显卡", "集成显卡", "RTX", "GTX"]),
                category("网络", &["网络", "网口", "RJ45", "以太网"]),
                category("接口", &["接口", "USB", "HDMI", "DisplayPort", "Thunderbolt"]),
                category("电源", &["电源", "功率", "kW", "瓦"]),
                category("冷却", &["散热", "冷却", "风冷", "液冷"]),
            ],
            category_aliases: vec![
                alias("CPU", &["CPU"]),
                alias("处理器", &["CPU"]),
                alias("内存", &["内存"]),
                alias("硬盘", &["存储"]),
                alias("存储", &["存储"]),
                alias("显示器", &["显示器"]),
                alias("显示屏", &["显示器"]),
                alias("显卡", &["显卡"]),
                alias("操作系统", &["操作系统"]),
                alias("电源", &["电源"]),
                alias("散热", &["冷却"]),
            ],
            verbal_comparators: vec![
                comparator("大于等于", "≥"),
                comparator("小于等于", "≤"),
                comparator("不低于", "≥"),
                comparator("不少于", "≥"),
                comparator("不小于", "≥"),
                comparator("至少", "≥"),
                comparator("不高于", "≤"),
                comparator("不超过", "≤"),
                comparator("不大于", "≤"),
                comparator("不多于", "≤"),
                comparator("至多", "≤"),
                comparator("not less than", "≥"),
                comparator("at least", "≥"),
                comparator("not more than", "≤"),
                comparator("no more than", "≤"),
                comparator("at most", "≤"),
            ],
        }
    }
}

fn category(name: &str, keywords: &[&str]) -> CategoryKeywords {
    CategoryKeywords {
        category: name.to_string(),
        keywords: strings(keywords),
    }
}

fn alias(parameter: &str, categories: &[&str]) -> CategoryAlias {
    CategoryAlias {
        parameter: parameter.to_string(),
        categories: strings(categories),
    }
}

fn comparator(phrase: &str, symbol: &str) -> VerbalComparator {
    VerbalComparator {
        phrase: phrase.to_string(),
        symbol: symbol.to_string(),
    }
}

impl Dictionaries {
    /// 从 JSON 加载词典（缺省字段使用内置词典）
    pub fn from_json_str(raw: &str) -> FusionResultT<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 整格是否为无数据占位词
    pub fn is_no_data(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.no_data_words
            .iter()
            .any(|w| w.eq_ignore_ascii_case(trimmed))
    }

    /// 参数名称是否指向误差/容差类参数
    pub fn is_tolerance_parameter(&self, parameter_name: &str) -> bool {
        let lower = parameter_name.to_lowercase();
        self.tolerance_name_keywords
            .iter()
            .any(|kw| lower.contains(&kw.to_lowercase()))
    }

    /// 查找参数名称对应的同义词组
    ///
    /// 键包含于参数名称, 或参数名称本身是某个同义词
    pub fn synonym_set_for(&self, parameter_name: &str) -> Option<&SynonymSet> {
        self.synonyms.iter().find(|set| {
            parameter_name.contains(set.key.as_str())
                || set.synonyms.iter().any(|s| s == parameter_name)
        })
    }

    /// 参数名称对应的整合参数类别（未登记时返回参数名称本身）
    pub fn categories_for(&self, parameter_name: &str) -> Vec<String> {
        self.category_aliases
            .iter()
            .find(|a| a.parameter == parameter_name)
            .map(|a| a.categories.clone())
            .unwrap_or_else(|| vec![parameter_name.to_string()])
    }

    /// 口语化比较词替换为比较符号
    pub fn normalize_verbal_comparators(&self, text: &str) -> String {
        let mut result = text.to_string();
        for vc in &self.verbal_comparators {
            if vc.phrase.is_ascii() {
                // 英文短语大小写不敏感
                let lower = result.to_lowercase();
                if let Some(pos) = lower.find(&vc.phrase) {
                    if lower.len() == result.len() {
                        result.replace_range(pos..pos + vc.phrase.len(), &vc.symbol);
                    }
                }
            } else {
                result = result.replace(&vc.phrase, &vc.symbol);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_no_data() {
        let dict = Dictionaries::default();
        assert!(dict.is_no_data("-"));
        assert!(dict.is_no_data(" N/A "));
        assert!(dict.is_no_data("暂无"));
        assert!(!dict.is_no_data("5kg"));
    }

    #[test]
    fn test_synonym_set_for() {
        let dict = Dictionaries::default();
        assert_eq!(dict.synonym_set_for("测量精度").map(|s| s.key.as_str()), Some("精度"));
        assert_eq!(dict.synonym_set_for("显示器").map(|s| s.key.as_str()), Some("显示屏"));
        assert!(dict.synonym_set_for("响应时间").is_none());
    }

    #[test]
    fn test_categories_for_falls_back_to_name() {
        let dict = Dictionaries::default();
        assert_eq!(dict.categories_for("硬盘"), vec!["存储".to_string()]);
        assert_eq!(dict.categories_for("显卡型号"), vec!["显卡型号".to_string()]);
    }

    #[test]
    fn test_normalize_verbal_comparators() {
        let dict = Dictionaries::default();
        assert_eq!(dict.normalize_verbal_comparators("不低于"), "≥");
        assert_eq!(dict.normalize_verbal_comparators("Not less than "), "≥ ");
        assert_eq!(dict.normalize_verbal_comparators("容量"), "容量");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dict = Dictionaries::from_json_str(r#"{"no_data_words": ["空"]}"#).unwrap();
        assert!(dict.is_no_data("空"));
        assert!(!dict.is_no_data("-"));
        assert!(!dict.synonyms.is_empty());
    }

    #[test]
    fn test_tolerance_parameter() {
        let dict = Dictionaries::default();
        assert!(dict.is_tolerance_parameter("测量误差"));
        assert!(dict.is_tolerance_parameter("Measurement Error"));
        assert!(!dict.is_tolerance_parameter("重量"));
    }
}
