// ==========================================
// 融合引擎集成测试
// ==========================================
// 职责: 通过公开 API 验证融合调度链的端到端行为
// 场景: 数据不足 / 单供应商 / 精确匹配 / 单位换算 / 范围 / 误差 /
//       单位不兼容回落 / 语义 / 人工审核 / 配置加载
// ==========================================

use spec_fusion::config::NamedRule;
use spec_fusion::{
    FusionConfig, FusionEngine, FusionError, FusionResult, FusionType, ParameterRow,
    ParameterRule,
};
use std::io::Write;

// ==========================================
// 测试辅助函数
// ==========================================

fn fuse(engine: &FusionEngine, name: &str, values: &[&str]) -> FusionResult {
    engine.fuse_row(&ParameterRow::from_strs(name, values))
}

// ==========================================
// 行级性质
// ==========================================

#[test]
fn test_single_non_empty_value_is_single_supplier() {
    spec_fusion::logging::init_test();
    let engine = FusionEngine::default();

    for value in ["220V", "<=15dB", "彩色触摸屏", "USB×2"] {
        let result = fuse(&engine, "任意参数", &["", value, "-"]);
        assert_eq!(result.fusion_type, FusionType::SingleSupplier);
        assert_eq!(result.value, spec_fusion::engine::canonicalize_operators(value));
    }
}

#[test]
fn test_all_empty_is_insufficient_data() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "重量", &["", "N/A", "—", "无数据"]);
    assert_eq!(result.fusion_type, FusionType::InsufficientData);
}

#[test]
fn test_repeated_value_is_exact_match() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "颜色", &["黑色", "白色", "黑色"]);
    assert_eq!(result.fusion_type, FusionType::ExactMatch);
    assert_eq!(result.value, "黑色");
}

#[test]
fn test_refusing_fused_value_is_idempotent() {
    let engine = FusionEngine::default();
    let fused = fuse(&engine, "scan speed", &["5m/s", "10m/s", "8m/s"]);
    let again = fuse(&engine, "scan speed", &[fused.value.as_str()]);
    assert_eq!(again.fusion_type, FusionType::SingleSupplier);
    assert_eq!(again.value, fused.value);
}

// ==========================================
// 数值类
// ==========================================

#[test]
fn test_unit_equivalence() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "设备重量", &["5kg", "5000g", "5公斤"]);
    assert_eq!(result.fusion_type, FusionType::UnitConversion);
    assert_eq!(result.value, "设备重量5kg");
}

#[test]
fn test_range_scenario() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "scan speed", &["5m/s", "10m/s", "8m/s"]);
    assert_eq!(result.fusion_type, FusionType::NumericRange);
    assert_eq!(result.value, "scan speed5-10m/s");
}

#[test]
fn test_tolerance_scenario() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "测量误差", &["±5%", "±10%", "误差不超过8%"]);
    assert_eq!(result.fusion_type, FusionType::ToleranceFusion);
    assert_eq!(result.value, "≤±10%");
}

#[test]
fn test_incompatible_units_never_numeric() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "工作频率", &["50Hz", "0.02s", "60Hz"]);
    assert_ne!(result.fusion_type, FusionType::NumericRange);
    assert_ne!(result.fusion_type, FusionType::UnitConversion);
}

#[test]
fn test_model_keyword_skips_numeric() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "处理器", &["Intel i5-12400", "Intel i7-12700", "AMD 5600"]);
    assert!(!result.fusion_type.is_numeric());
}

// ==========================================
// 文本类
// ==========================================

#[test]
fn test_semantic_match() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "测量精度", &["高精度", "精度±0.1mm", "准确度高"]);
    assert_eq!(result.fusion_type, FusionType::SemanticMatch);
    assert_eq!(result.value, "高精度");
}

#[test]
fn test_unresolvable_row_needs_review() {
    let engine = FusionEngine::default();
    let result = fuse(&engine, "响应时间", &["快速", "慢速", "中等"]);
    assert_eq!(result.fusion_type, FusionType::ManualReview);
    assert_eq!(result.value, "快速");
}

#[test]
fn test_multi_value_row() {
    let engine = FusionEngine::default();
    let result = fuse(
        &engine,
        "主机接口",
        &["USB×3 HDMI×1", "USB×2 HDMI×2 VGA×1", "USB×4"],
    );
    assert_eq!(result.fusion_type, FusionType::MultiValue);
    assert_eq!(result.value, "USB×4 HDMI×2 VGA×1");
}

// ==========================================
// 配置
// ==========================================

#[test]
fn test_config_from_file_with_extra_rule() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "medium_similarity_threshold": 0.5,
            "param_rules": [
                {{ "name": "响应时间", "kind": "text", "similarity_threshold": 0.4 }}
            ]
        }}"#
    )
    .unwrap();

    let config = FusionConfig::from_file(file.path()).unwrap();
    assert_eq!(config.medium_similarity_threshold, 0.5);
    assert_eq!(config.similarity_threshold, 0.8);
    assert_eq!(config.param_rules.len(), 1);

    let engine = FusionEngine::from_config(config);
    let result = fuse(&engine, "响应时间", &["快速", "慢速", "中等"]);
    assert_eq!(result.fusion_type, FusionType::HighSimilarity);
}

#[test]
fn test_config_validation_errors() {
    let err = FusionConfig::from_json_str(r#"{ "similarity_threshold": 1.5 }"#).unwrap_err();
    assert!(matches!(err, FusionError::ConfigValue { ref key, .. } if key == "similarity_threshold"));

    let err = FusionConfig::from_json_str(r#"{ "worker_count": 0 }"#).unwrap_err();
    assert!(matches!(err, FusionError::ConfigValue { .. }));

    let err = FusionConfig::from_json_str("not json").unwrap_err();
    assert!(matches!(err, FusionError::ConfigParse(_)));

    let err = FusionConfig::from_file("/nonexistent/spec-fusion.json").unwrap_err();
    assert!(matches!(err, FusionError::ConfigRead { .. }));
}

#[test]
fn test_named_rule_overrides_builtin() {
    let mut config = FusionConfig::default();
    config.param_rules.push(NamedRule {
        name: "重量".to_string(),
        rule: ParameterRule::numeric("g", 0.1),
    });
    let engine = FusionEngine::from_config(config);

    // 覆盖后的首选单位为 g
    let result = fuse(&engine, "设备重量", &["5kg", "5000g", "5公斤"]);
    assert_eq!(result.fusion_type, FusionType::UnitConversion);
    assert_eq!(result.value, "设备重量5000g");
}

#[test]
fn test_text_rule_with_numeric_values_still_fuses_numerically() {
    let mut config = FusionConfig::default();
    config.param_rules.push(NamedRule {
        name: "重量".to_string(),
        rule: ParameterRule::text(0.9),
    });
    let engine = FusionEngine::from_config(config);

    // 文本类规则不影响数值融合的适用条件, 输出单位取首个单位
    let result = fuse(&engine, "设备重量", &["5kg", "5000g", "5公斤"]);
    assert_eq!(result.fusion_type, FusionType::UnitConversion);
    assert_eq!(result.value, "设备重量5kg");
}
