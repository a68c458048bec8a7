// ==========================================
// 多供应商参数融合引擎 - 演示入口
// ==========================================
// 加载配置（SPEC_FUSION_CONFIG 指定路径, 未设置时使用默认值）,
// 融合内置样例参数表并输出 JSON 报告
// ==========================================

use anyhow::Context;
use spec_fusion::{logging, FusionConfig, FusionPipeline, ParameterRow};

fn sample_rows() -> Vec<ParameterRow> {
    vec![
        ParameterRow::from_strs("设备重量", &["5kg", "5000g", "5公斤"]),
        ParameterRow::from_strs("scan speed", &["5m/s", "10m/s", "8m/s"]),
        ParameterRow::from_strs("电池容量", &[">=5000mAh", "≥5Ah", ""]),
        ParameterRow::from_strs("测量误差", &["±5%", "±10%", "误差不超过8%"]),
        ParameterRow::from_strs("工作频率", &["50Hz", "0.02s", "60Hz"]),
        ParameterRow::from_strs(
            "主机接口",
            &["USB×3 HDMI×1", "USB×2 HDMI×2 VGA×1", "USB×4"],
        ),
        ParameterRow::from_strs("测量精度", &["高精度", "精度±0.1mm", "准确度高"]),
        ParameterRow::from_strs(
            "内存",
            &["≥Windows10操作系统，≥酷睿i5 CPU、≥8G 内存", "8G 内存", "-"],
        ),
        ParameterRow::from_strs("工作电压", &["220V", "-", ""]),
        ParameterRow::from_strs("响应时间", &["快速", "慢速", "中等"]),
        ParameterRow::from_strs("备注", &["", "暂无", ""]),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", spec_fusion::APP_NAME, spec_fusion::VERSION);
    tracing::info!("==================================================");

    let config = FusionConfig::load().context("加载融合配置失败")?;
    let pipeline = FusionPipeline::from_config(config);

    let report = pipeline
        .process_batch_concurrent(sample_rows())
        .await
        .context("并行融合失败")?;

    println!("{}", report.merged_summary());
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("报告序列化失败")?
    );

    Ok(())
}
