// ==========================================
// 多供应商参数融合引擎 - 单位表与单位换算
// ==========================================
// 职责: 单位类别识别 / 同类单位换算 / 基准单位标准化
// 规则:
// - 先区分大小写查找, 再不区分大小写查找（G=GB 与 g=克 并存）
// - 不同类别（含电学子类型）之间不可换算
// - 温度按摄氏/华氏仿射公式换算, 其余按系数换算并保留 4 位小数
// ==========================================

use once_cell::sync::Lazy;
use std::sync::Arc;

// ==========================================
// UnitCategory - 单位类别
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCategory {
    pub name: &'static str,
    /// 子类型（电学类: 电压/电流/电阻/电池容量）
    pub sub_type: Option<&'static str>,
    pub base_unit: &'static str,
    /// 单位 → 相对基准单位的系数
    pub conversions: Vec<(&'static str, f64)>,
    /// 仿射换算（温度）
    pub is_affine: bool,
}

impl UnitCategory {
    fn linear(name: &'static str, base_unit: &'static str, conversions: &[(&'static str, f64)]) -> Self {
        Self {
            name,
            sub_type: None,
            base_unit,
            conversions: conversions.to_vec(),
            is_affine: false,
        }
    }

    fn electrical(
        sub_type: &'static str,
        base_unit: &'static str,
        conversions: &[(&'static str, f64)],
    ) -> Self {
        Self {
            sub_type: Some(sub_type),
            ..Self::linear("电学类", base_unit, conversions)
        }
    }

    /// 类别全名（含子类型）
    pub fn full_name(&self) -> String {
        match self.sub_type {
            Some(sub) => format!("{}_{}", self.name, sub),
            None => self.name.to_string(),
        }
    }

    /// 两个类别是否可互相换算
    pub fn same_as(&self, other: &UnitCategory) -> bool {
        self.name == other.name && self.sub_type == other.sub_type
    }

    fn factor_exact(&self, unit: &str) -> Option<f64> {
        self.conversions
            .iter()
            .find(|(u, _)| *u == unit)
            .map(|(_, f)| *f)
    }

    fn factor_ignore_case(&self, unit: &str) -> Option<f64> {
        let lower = unit.to_lowercase();
        self.conversions
            .iter()
            .find(|(u, _)| u.to_lowercase() == lower)
            .map(|(_, f)| *f)
    }

    /// 单位系数（先精确后忽略大小写）
    pub fn factor(&self, unit: &str) -> Option<f64> {
        self.factor_exact(unit)
            .or_else(|| self.factor_ignore_case(unit))
    }
}

static STANDARD_TABLE: Lazy<Arc<UnitTable>> = Lazy::new(|| Arc::new(UnitTable::build()));

// ==========================================
// UnitTable - 单位登记表（进程内只读）
// ==========================================
#[derive(Debug, Clone)]
pub struct UnitTable {
    categories: Vec<UnitCategory>,
}

impl UnitTable {
    /// 共享的标准单位表（首次访问时构建）
    pub fn shared() -> Arc<UnitTable> {
        STANDARD_TABLE.clone()
    }

    fn build() -> Self {
        let categories = vec![
            UnitCategory::linear(
                "长度类",
                "m",
                &[
                    ("m", 1.0),
                    ("mm", 0.001),
                    ("cm", 0.01),
                    ("dm", 0.1),
                    ("km", 1000.0),
                    ("μm", 1e-6),
                    ("um", 1e-6),
                    ("nm", 1e-9),
                    ("米", 1.0),
                    ("毫米", 0.001),
                    ("厘米", 0.01),
                    ("分米", 0.1),
                    ("千米", 1000.0),
                    ("公里", 1000.0),
                    ("微米", 1e-6),
                    ("纳米", 1e-9),
                ],
            ),
            UnitCategory::linear(
                "重量类",
                "kg",
                &[
                    ("kg", 1.0),
                    ("g", 0.001),
                    ("mg", 1e-6),
                    ("μg", 1e-9),
                    ("t", 1000.0),
                    ("千克", 1.0),
                    ("公斤", 1.0),
                    ("克", 0.001),
                    ("毫克", 1e-6),
                    ("吨", 1000.0),
                    ("斤", 0.5),
                ],
            ),
            UnitCategory::linear(
                "体积类",
                "L",
                &[
                    ("L", 1.0),
                    ("mL", 0.001),
                    ("μL", 1e-6),
                    ("m³", 1000.0),
                    ("cm³", 0.001),
                    ("cc", 0.001),
                    ("升", 1.0),
                    ("毫升", 0.001),
                    ("微升", 1e-6),
                ],
            ),
            UnitCategory::linear(
                "时间类",
                "s",
                &[
                    ("s", 1.0),
                    ("ms", 0.001),
                    ("μs", 1e-6),
                    ("min", 60.0),
                    ("h", 3600.0),
                    ("秒", 1.0),
                    ("毫秒", 0.001),
                    ("分钟", 60.0),
                    ("小时", 3600.0),
                    ("天", 86400.0),
                ],
            ),
            UnitCategory::linear(
                "频率类",
                "Hz",
                &[
                    ("Hz", 1.0),
                    ("kHz", 1e3),
                    ("MHz", 1e6),
                    ("GHz", 1e9),
                    ("赫兹", 1.0),
                ],
            ),
            UnitCategory::linear(
                "功率类",
                "W",
                &[
                    ("W", 1.0),
                    ("kW", 1e3),
                    ("mW", 1e-3),
                    ("MW", 1e6),
                    ("瓦", 1.0),
                    ("千瓦", 1e3),
                ],
            ),
            UnitCategory::electrical(
                "电压",
                "V",
                &[("V", 1.0), ("mV", 0.001), ("kV", 1000.0), ("伏", 1.0), ("伏特", 1.0)],
            ),
            UnitCategory::electrical(
                "电流",
                "A",
                &[("A", 1.0), ("mA", 0.001), ("μA", 1e-6), ("安", 1.0), ("安培", 1.0)],
            ),
            UnitCategory::electrical(
                "电阻",
                "Ω",
                &[("Ω", 1.0), ("kΩ", 1e3), ("MΩ", 1e6), ("欧", 1.0), ("欧姆", 1.0)],
            ),
            UnitCategory::electrical("电池容量", "mAh", &[("mAh", 1.0), ("Ah", 1000.0)]),
            UnitCategory {
                name: "温度类",
                sub_type: None,
                base_unit: "℃",
                conversions: vec![
                    ("℃", 1.0),
                    ("°C", 1.0),
                    ("摄氏度", 1.0),
                    ("°F", 1.0),
                    ("℉", 1.0),
                    ("华氏度", 1.0),
                ],
                is_affine: true,
            },
            UnitCategory::linear(
                "压力类",
                "Pa",
                &[
                    ("Pa", 1.0),
                    ("hPa", 100.0),
                    ("kPa", 1e3),
                    ("MPa", 1e6),
                    ("bar", 1e5),
                    ("mbar", 100.0),
                    ("mmHg", 133.322),
                    ("帕", 1.0),
                    ("千帕", 1e3),
                ],
            ),
            UnitCategory::linear(
                "存储类",
                "B",
                &[
                    ("B", 1.0),
                    ("KB", 1024.0),
                    ("MB", 1024.0 * 1024.0),
                    ("GB", 1024.0 * 1024.0 * 1024.0),
                    ("TB", 1024.0 * 1024.0 * 1024.0 * 1024.0),
                    ("G", 1024.0 * 1024.0 * 1024.0),
                    ("T", 1024.0 * 1024.0 * 1024.0 * 1024.0),
                ],
            ),
            UnitCategory::linear(
                "速度类",
                "m/s",
                &[
                    ("m/s", 1.0),
                    ("km/h", 1.0 / 3.6),
                    ("cm/s", 0.01),
                    ("mm/s", 0.001),
                    ("米/秒", 1.0),
                ],
            ),
        ];

        Self { categories }
    }

    pub fn categories(&self) -> &[UnitCategory] {
        &self.categories
    }

    /// 识别单位类别
    ///
    /// # 返回
    /// - Some(&UnitCategory): 单位所属类别
    /// - None: 未登记单位
    pub fn identify_category(&self, unit: &str) -> Option<&UnitCategory> {
        let unit = unit.trim();
        if unit.is_empty() {
            return None;
        }

        self.categories
            .iter()
            .find(|c| c.factor_exact(unit).is_some())
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.factor_ignore_case(unit).is_some())
            })
    }

    pub fn is_known(&self, unit: &str) -> bool {
        self.identify_category(unit).is_some()
    }

    /// 单位换算
    ///
    /// # 返回
    /// - Some(f64): 换算结果
    /// - None: 任一单位未登记, 或两者不属于同一类别
    pub fn convert(&self, value: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
        let from = self.identify_category(from_unit)?;
        let to = self.identify_category(to_unit)?;
        if !from.same_as(to) {
            return None;
        }

        if from.is_affine {
            return Some(convert_temperature(value, from_unit, to_unit));
        }

        let from_factor = from.factor(from_unit)?;
        let to_factor = to.factor(to_unit)?;
        Some(round_to(value * from_factor / to_factor, 4))
    }

    /// 两个单位是否可换算（同类）
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b) || self.convert(1.0, a, b).is_some()
    }

    /// 换算为类别基准单位
    ///
    /// 未登记单位原样返回
    pub fn normalize(&self, value: f64, unit: &str) -> (f64, String) {
        match self.identify_category(unit) {
            Some(category) => match self.convert(value, unit, category.base_unit) {
                Some(base_value) => (base_value, category.base_unit.to_string()),
                None => (value, unit.to_string()),
            },
            None => (value, unit.to_string()),
        }
    }

    /// 取中文单位串中最长的已登记前缀（如 “公斤左右” → “公斤”）
    pub fn longest_known_prefix<'a>(&self, run: &'a str) -> Option<&'a str> {
        let boundaries: Vec<usize> = run
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect();
        boundaries
            .into_iter()
            .rev()
            .map(|end| &run[..end])
            .find(|prefix| self.is_known(prefix))
    }
}

fn is_celsius(unit: &str) -> bool {
    matches!(unit.trim(), "℃" | "摄氏度") || unit.trim().eq_ignore_ascii_case("°C")
}

/// 温度换算（摄氏/华氏仿射公式, 保留 2 位小数）
fn convert_temperature(value: f64, from_unit: &str, to_unit: &str) -> f64 {
    match (is_celsius(from_unit), is_celsius(to_unit)) {
        (true, false) => round_to(value * 9.0 / 5.0 + 32.0, 2),
        (false, true) => round_to((value - 32.0) * 5.0 / 9.0, 2),
        _ => value,
    }
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_category_case_sensitivity() {
        let table = UnitTable::shared();
        assert_eq!(table.identify_category("g").map(|c| c.name), Some("重量类"));
        assert_eq!(table.identify_category("G").map(|c| c.name), Some("存储类"));
        assert_eq!(table.identify_category("KG").map(|c| c.name), Some("重量类"));
        assert_eq!(table.identify_category("ghz").map(|c| c.name), Some("频率类"));
        assert!(table.identify_category("dB").is_none());
        assert!(table.identify_category("").is_none());
    }

    #[test]
    fn test_identify_electrical_sub_type() {
        let table = UnitTable::shared();
        let cat = table.identify_category("mV").unwrap();
        assert_eq!(cat.full_name(), "电学类_电压");
        let cat = table.identify_category("mAh").unwrap();
        assert_eq!(cat.sub_type, Some("电池容量"));
    }

    #[test]
    fn test_convert_linear() {
        let table = UnitTable::shared();
        assert_eq!(table.convert(5.0, "kg", "g"), Some(5000.0));
        assert_eq!(table.convert(5000.0, "g", "kg"), Some(5.0));
        assert_eq!(table.convert(5.0, "公斤", "kg"), Some(5.0));
        assert_eq!(table.convert(3000.0, "W", "kW"), Some(3.0));
        assert_eq!(table.convert(1.0, "w", "kW"), Some(0.001));
    }

    #[test]
    fn test_convert_rounds_to_four_decimals() {
        let table = UnitTable::shared();
        assert_eq!(table.convert(1.0, "mm", "km"), Some(0.0));
        assert_eq!(table.convert(1.0, "cm", "m"), Some(0.01));
    }

    #[test]
    fn test_convert_cross_category_fails() {
        let table = UnitTable::shared();
        assert_eq!(table.convert(1.0, "Hz", "s"), None);
        assert_eq!(table.convert(1.0, "V", "A"), None);
        assert_eq!(table.convert(1.0, "kg", "unknown"), None);
    }

    #[test]
    fn test_convert_temperature_affine() {
        let table = UnitTable::shared();
        assert_eq!(table.convert(100.0, "℃", "°F"), Some(212.0));
        assert_eq!(table.convert(32.0, "华氏度", "摄氏度"), Some(0.0));
        assert_eq!(table.convert(37.0, "°C", "℃"), Some(37.0));
    }

    #[test]
    fn test_normalize_to_base() {
        let table = UnitTable::shared();
        assert_eq!(table.normalize(2.0, "kW"), (2000.0, "W".to_string()));
        assert_eq!(table.normalize(2.0, "dB"), (2.0, "dB".to_string()));
    }

    #[test]
    fn test_longest_known_prefix() {
        let table = UnitTable::shared();
        assert_eq!(table.longest_known_prefix("公斤左右"), Some("公斤"));
        assert_eq!(table.longest_known_prefix("毫升每次"), Some("毫升"));
        assert_eq!(table.longest_known_prefix("以上"), None);
    }

    #[test]
    fn test_compatible() {
        let table = UnitTable::shared();
        assert!(table.compatible("dB", "db"));
        assert!(table.compatible("W", "kW"));
        assert!(!table.compatible("Hz", "s"));
    }
}
