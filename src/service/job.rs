use crate::config::AppConfig;
use crate::error::JobError;
use crate::models::BatchStats;
use crate::service::extractor::{ExtractionStats, OrderExtractor};
use crate::service::pipeline::OrderPipeline;
use crate::storage::{save_orders_json, scan_images, write_table_csv};
use crate::vision::VisionModel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// 一次完整运行的结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobReport {
    pub extraction: ExtractionStats,
    pub normalization: Option<BatchStats>,
    pub json_path: Option<String>,
    pub table_path: Option<String>,
}

/// 扫描图片 -> 模型提取 -> 保存原始 JSON -> 标准化 -> 导出表格
///
/// 单张图片或单个订单的失败只记录日志；文件级 I/O 失败直接返回错误。
pub async fn run_extraction_job(
    config: &AppConfig,
    model: Arc<dyn VisionModel>,
    pipeline: Arc<OrderPipeline>,
) -> Result<JobReport, JobError> {
    let ctx = config.run_context();
    let output = Path::new(&config.paths.output_folder);

    let images = scan_images(Path::new(&config.paths.image_folder), &config.scan, &ctx)?;
    let extractor = OrderExtractor::new(model, config.vision.prompt.clone(), config.vision.max_concurrency);
    let outcome = extractor.extract_all(images).await;

    let mut report = JobReport {
        extraction: outcome.stats,
        ..Default::default()
    };
    if outcome.orders.is_empty() {
        tracing::warn!("⚠️ 没有提取到有效数据");
        return Ok(report);
    }

    let json_path = output.join(ctx.raw_json_file_name());
    save_orders_json(&json_path, &outcome.orders)?;
    report.json_path = Some(json_path.display().to_string());

    let batch = pipeline.run_batch_blocking(outcome.orders).await?;
    report.normalization = Some(batch.stats);
    if batch.table.is_empty() {
        tracing::warn!("没有有效数据需要导出");
        return Ok(report);
    }

    let table_path = output.join(ctx.table_file_name(&config.normalize.output_prefix));
    write_table_csv(&table_path, &batch.table)?;
    report.table_path = Some(table_path.display().to_string());

    Ok(report)
}
