// ==========================================
// 多供应商参数融合引擎 - 融合配置
// ==========================================
// 职责: 阈值 / 功能开关 / 额外参数规则
// 来源: 内置默认值 → JSON 文件（环境变量 SPEC_FUSION_CONFIG 指定路径）
// ==========================================

use crate::config::param_rules::NamedRule;
use crate::error::{FusionError, FusionResultT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "SPEC_FUSION_CONFIG";

// ==========================================
// FusionConfig - 融合配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    // ===== 相似度阈值（0-1）=====
    pub similarity_threshold: f64,
    pub medium_similarity_threshold: f64,
    pub compliance_similarity_threshold: f64,
    /// 数值融合相关性兜底阈值
    pub relevance_threshold: f64,

    // ===== 数字处理 =====
    pub numeric_tolerance: f64,
    /// 噪声阈值（中位数的比例）
    pub noise_median_ratio: f64,
    /// 不同取值数超过该值才进行噪声过滤
    pub noise_min_distinct: usize,
    /// 跨度不超过最大值的该比例时视为单一阈值
    pub threshold_spread_ratio: f64,

    // ===== 功能开关 =====
    pub unit_conversion: bool,
    pub semantic_matching: bool,
    pub remove_modifiers: bool,

    // ===== 输出 =====
    pub insufficient_data_marker: String,

    // ===== 并发 =====
    pub worker_count: usize,

    /// 额外/覆盖参数规则
    pub param_rules: Vec<NamedRule>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            medium_similarity_threshold: 0.6,
            compliance_similarity_threshold: 0.6,
            relevance_threshold: 0.3,
            numeric_tolerance: 0.05,
            noise_median_ratio: 0.5,
            noise_min_distinct: 3,
            threshold_spread_ratio: 0.1,
            unit_conversion: true,
            semantic_matching: true,
            remove_modifiers: false,
            insufficient_data_marker: "无有效数据".to_string(),
            worker_count: 4,
            param_rules: Vec::new(),
        }
    }
}

impl FusionConfig {
    /// 从 JSON 字符串加载（缺省字段取默认值）并校验
    pub fn from_json_str(raw: &str) -> FusionResultT<Self> {
        let config: FusionConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> FusionResultT<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| FusionError::ConfigRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "读取融合配置文件");
        Self::from_json_str(&raw)
    }

    /// 按环境变量加载; 未设置时使用默认配置
    pub fn load() -> FusionResultT<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "使用外部融合配置");
                Self::from_file(path.trim())
            }
            _ => {
                debug!("未指定融合配置文件, 使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 校验配置取值
    pub fn validate(&self) -> FusionResultT<()> {
        let ratios = [
            ("similarity_threshold", self.similarity_threshold),
            ("medium_similarity_threshold", self.medium_similarity_threshold),
            ("compliance_similarity_threshold", self.compliance_similarity_threshold),
            ("relevance_threshold", self.relevance_threshold),
            ("noise_median_ratio", self.noise_median_ratio),
            ("threshold_spread_ratio", self.threshold_spread_ratio),
        ];
        for (key, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(value_error(key, value, "取值必须位于 [0, 1]"));
            }
        }

        if self.numeric_tolerance < 0.0 || !self.numeric_tolerance.is_finite() {
            return Err(value_error(
                "numeric_tolerance",
                self.numeric_tolerance,
                "容忍度不能为负数",
            ));
        }

        if self.worker_count == 0 {
            return Err(FusionError::ConfigValue {
                key: "worker_count".to_string(),
                value: "0".to_string(),
                message: "并发数至少为 1".to_string(),
            });
        }

        Ok(())
    }
}

fn value_error(key: &str, value: f64, message: &str) -> FusionError {
    FusionError::ConfigValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = FusionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.insufficient_data_marker, "无有效数据");
    }

    #[test]
    fn test_partial_json() {
        let config = FusionConfig::from_json_str(r#"{"similarity_threshold": 0.9}"#).unwrap();
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.medium_similarity_threshold, 0.6);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = FusionConfig::from_json_str(r#"{"medium_similarity_threshold": 60}"#)
            .unwrap_err();
        match err {
            FusionError::ConfigValue { key, .. } => assert_eq!(key, "medium_similarity_threshold"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(FusionConfig::from_json_str(r#"{"worker_count": 0}"#).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = FusionConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, FusionError::ConfigParse(_)));
    }

    #[test]
    fn test_from_file_with_rules() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"numeric_tolerance": 0.1, "param_rules": [{{"name": "亮度", "kind": "numeric", "unit": "cd"}}]}}"#
        )
        .unwrap();

        let config = FusionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.numeric_tolerance, 0.1);
        assert_eq!(config.param_rules.len(), 1);
        assert_eq!(config.param_rules[0].name, "亮度");
    }

    #[test]
    fn test_from_missing_file() {
        let err = FusionConfig::from_file("/nonexistent/spec_fusion.json").unwrap_err();
        assert!(matches!(err, FusionError::ConfigRead { .. }));
    }
}
