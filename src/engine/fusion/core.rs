use super::strategies::{resolve_conflict, FusionContext, STRATEGY_CHAIN};
use crate::config::{Dictionaries, FusionConfig, RuleRegistry};
use crate::domain::{FusionResult, FusionType};
use crate::engine::numeric::NumericExtractor;
use crate::engine::text::TextScorer;
use crate::engine::units::UnitTable;
use crate::importer::DataCleaner;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// FusionEngine - 融合策略调度器
// ==========================================
#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: Arc<FusionConfig>,
    dictionaries: Arc<Dictionaries>,
    rules: Arc<RuleRegistry>,
    cleaner: DataCleaner,
    extractor: NumericExtractor,
    scorer: TextScorer,
}

impl FusionEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - config: 融合配置
    /// - dictionaries: 词典（只读共享）
    /// - rules: 参数规则登记表（只读共享）
    pub fn new(
        config: Arc<FusionConfig>,
        dictionaries: Arc<Dictionaries>,
        rules: Arc<RuleRegistry>,
    ) -> Self {
        Self {
            cleaner: DataCleaner::new(dictionaries.clone()),
            extractor: NumericExtractor::new(UnitTable::shared(), dictionaries.clone()),
            scorer: TextScorer::new(dictionaries.clone(), config.remove_modifiers),
            config,
            dictionaries,
            rules,
        }
    }

    /// 按配置构建（内置词典 + 内置规则 + 配置中的额外规则）
    pub fn from_config(config: FusionConfig) -> Self {
        let rules = RuleRegistry::default().with_rules(config.param_rules.clone());
        Self::new(
            Arc::new(config),
            Arc::new(Dictionaries::default()),
            Arc::new(rules),
        )
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn dictionaries(&self) -> &Dictionaries {
        &self.dictionaries
    }

    pub fn dictionaries_arc(&self) -> Arc<Dictionaries> {
        self.dictionaries.clone()
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn cleaner(&self) -> &DataCleaner {
        &self.cleaner
    }

    pub fn extractor(&self) -> &NumericExtractor {
        &self.extractor
    }

    pub fn scorer(&self) -> &TextScorer {
        &self.scorer
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 融合单行供应商值
    ///
    /// # 参数
    /// - parameter_name: 参数名称
    /// - vendor_values: 各供应商原始值（None 表示空单元格）
    ///
    /// # 返回
    /// 唯一的融合结果
    pub fn fuse(&self, parameter_name: &str, vendor_values: &[Option<String>]) -> FusionResult {
        let values = self.cleaner.clean_values(vendor_values);

        match values.len() {
            0 => {
                debug!(parameter_name, "无有效供应商数据");
                return FusionResult::new(
                    self.config.insufficient_data_marker.clone(),
                    FusionType::InsufficientData,
                );
            }
            1 => {
                return FusionResult::new(
                    canonicalize_operators(&values[0]),
                    FusionType::SingleSupplier,
                );
            }
            _ => {}
        }

        let ctx = FusionContext {
            engine: self,
            parameter_name,
            values: &values,
            rule: self.rules.resolve(parameter_name),
        };

        for (stage, strategy) in STRATEGY_CHAIN.iter() {
            debug!(parameter_name, stage, "尝试融合策略");
            if let Some(result) = strategy(&ctx) {
                debug!(
                    parameter_name,
                    stage,
                    fusion_type = result.fusion_type.as_str(),
                    "融合策略命中"
                );
                return FusionResult::new(
                    canonicalize_operators(&result.value),
                    result.fusion_type,
                );
            }
        }

        let fallback = resolve_conflict(&values);
        debug!(parameter_name, value = %fallback.value, "全部策略未命中, 转人工审核");
        FusionResult::new(canonicalize_operators(&fallback.value), fallback.fusion_type)
    }

    /// 融合参数行
    pub fn fuse_row(&self, row: &crate::domain::ParameterRow) -> FusionResult {
        self.fuse(&row.name, &row.vendor_values)
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::from_config(FusionConfig::default())
    }
}

/// 统一比较符号: 全角/半角的 > < >= <= 改写为 ≥ ≤
pub fn canonicalize_operators(text: &str) -> String {
    text.replace("＞=", "≥")
        .replace("＜=", "≤")
        .replace('＞', "≥")
        .replace('＜', "≤")
        .replace(">=", "≥")
        .replace("<=", "≤")
        .replace('>', "≥")
        .replace('<', "≤")
}
