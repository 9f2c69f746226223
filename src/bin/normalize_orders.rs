//! 离线标准化：读取已保存的订单 JSON，导出 CSV 表格
//!
//! 用法: normalize-orders [input.json]
//! 缺省输入为 {output_folder}/{模型短名}_{日期}.json

use order_extract_rust::storage::{load_orders_json, write_table_csv};
use order_extract_rust::{AppConfig, OrderPipeline};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    let ctx = config.run_context();
    let output_folder = PathBuf::from(&config.paths.output_folder);

    let input_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| output_folder.join(ctx.raw_json_file_name()));

    let orders = load_orders_json(&input_path).inspect_err(|e| error!("文件加载失败: {}", e))?;
    info!("已加载 {} 个订单: {}", orders.len(), input_path.display());

    let pipeline = OrderPipeline::from_config(&config.normalize)?;
    let outcome = pipeline.run_batch(&orders);

    if outcome.table.is_empty() {
        warn!("没有有效数据需要导出");
        return Ok(());
    }

    let output_path = output_folder.join(ctx.table_file_name(&config.normalize.output_prefix));
    write_table_csv(&output_path, &outcome.table).inspect_err(|e| error!("表格导出失败: {}", e))?;

    Ok(())
}
