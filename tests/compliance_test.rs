// ==========================================
// 供应商达标判定集成测试
// ==========================================
// 职责: 融合 → 达标判定的协作
// 场景: 与融合值相同 / 空值 / 数值阈值 / 范围 / 多值覆盖 / 人工审核行
// ==========================================

use spec_fusion::{
    ComplianceEvaluator, ComplianceStatus, FusionEngine, FusionType, ParameterRow,
};
use std::sync::Arc;

fn setup() -> (Arc<FusionEngine>, ComplianceEvaluator) {
    let engine = Arc::new(FusionEngine::default());
    let evaluator = ComplianceEvaluator::new(engine.clone());
    (engine, evaluator)
}

/// 融合并判定一行
fn fuse_and_evaluate(name: &str, values: &[&str]) -> (FusionType, Vec<Option<ComplianceStatus>>) {
    let (engine, evaluator) = setup();
    let row = ParameterRow::from_strs(name, values);
    let fused = engine.fuse_row(&row);
    let statuses = evaluator.evaluate(&row.name, &row.vendor_values, &fused);
    (fused.fusion_type, statuses)
}

#[test]
fn test_vendor_equal_to_fused_is_compliant() {
    let (engine, evaluator) = setup();
    let row = ParameterRow::from_strs("显示方式", &["LCD彩色显示屏", "lcd彩色显示屏", "OLED"]);
    let fused = engine.fuse_row(&row);
    let statuses = evaluator.evaluate(&row.name, &row.vendor_values, &fused);

    assert_eq!(fused.fusion_type, FusionType::ExactMatch);
    assert_eq!(statuses[0], Some(ComplianceStatus::Compliant));
    assert_eq!(statuses[1], Some(ComplianceStatus::Compliant));
    assert_eq!(statuses.len(), 3);
}

#[test]
fn test_empty_vendor_is_no_data() {
    let (fusion_type, statuses) = fuse_and_evaluate("工作电压", &["220V", "", "-"]);
    assert_eq!(fusion_type, FusionType::SingleSupplier);
    assert_eq!(
        statuses,
        vec![
            Some(ComplianceStatus::Compliant),
            Some(ComplianceStatus::NoData),
            Some(ComplianceStatus::NoData)
        ]
    );
}

#[test]
fn test_unit_conversion_row_all_compliant() {
    let (fusion_type, statuses) = fuse_and_evaluate("设备重量", &["5kg", "5000g", "5公斤"]);
    assert_eq!(fusion_type, FusionType::UnitConversion);
    assert!(statuses
        .iter()
        .all(|s| *s == Some(ComplianceStatus::Compliant)));
}

#[test]
fn test_range_row_members_compliant() {
    let (fusion_type, statuses) = fuse_and_evaluate("scan speed", &["5m/s", "10m/s", "8m/s"]);
    assert_eq!(fusion_type, FusionType::NumericRange);
    assert!(statuses
        .iter()
        .all(|s| *s == Some(ComplianceStatus::Compliant)));
}

#[test]
fn test_mixed_unit_range_row_members_compliant() {
    let (engine, evaluator) = setup();
    let row = ParameterRow::from_strs("额定功率", &["2000W", "3000W", "2.5kW"]);
    let fused = engine.fuse_row(&row);
    assert_eq!(fused.fusion_type, FusionType::NumericRange);
    assert_eq!(fused.value, "额定功率2000-3000W");

    let statuses = evaluator.evaluate(&row.name, &row.vendor_values, &fused);
    assert!(statuses
        .iter()
        .all(|s| *s == Some(ComplianceStatus::Compliant)));
}

#[test]
fn test_mixed_unit_threshold_compliance() {
    let (engine, evaluator) = setup();
    let row = ParameterRow::from_strs("电池容量", &[">=5000mAh", "≥5Ah"]);
    let fused = engine.fuse_row(&row);
    assert_eq!(fused.value, "≥5000mAh");

    let statuses = evaluator.evaluate(&row.name, &row.vendor_values, &fused);
    assert!(statuses
        .iter()
        .all(|s| *s == Some(ComplianceStatus::Compliant)));
}

#[test]
fn test_threshold_row() {
    let (fusion_type, statuses) =
        fuse_and_evaluate("电池容量", &[">=5000mAh", "≥5Ah", "4000mAh", ""]);
    // 4000mAh 参与融合后结果为范围, 单独验证阈值判定
    assert!(fusion_type.is_numeric());
    assert_eq!(statuses[3], Some(ComplianceStatus::NoData));

    let (engine, evaluator) = setup();
    let fused = spec_fusion::FusionResult::new("≥5000mAh", FusionType::UnitConversion);
    let rule = engine.rules().resolve("电池容量");
    assert_eq!(
        evaluator.evaluate_value(Some("5200mAh"), &fused, rule),
        ComplianceStatus::Compliant
    );
    assert_eq!(
        evaluator.evaluate_value(Some("4000mAh"), &fused, rule),
        ComplianceStatus::Unmarked
    );
}

#[test]
fn test_multi_value_row() {
    let (fusion_type, statuses) = fuse_and_evaluate(
        "主机接口",
        &["USB×3 HDMI×1", "USB×2 HDMI×2 VGA×1", "USB×4 HDMI×2 VGA×1"],
    );
    assert_eq!(fusion_type, FusionType::MultiValue);
    assert_eq!(statuses[0], Some(ComplianceStatus::Unmarked));
    assert_eq!(statuses[1], Some(ComplianceStatus::Unmarked));
    assert_eq!(statuses[2], Some(ComplianceStatus::Compliant));
}

#[test]
fn test_manual_review_row_not_evaluated() {
    let (fusion_type, statuses) = fuse_and_evaluate("响应时间", &["快速", "慢速", "中等"]);
    assert_eq!(fusion_type, FusionType::ManualReview);
    assert_eq!(statuses, vec![None, None, None]);
}
