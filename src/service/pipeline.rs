use crate::config::NormalizeConfig;
use crate::error::{value_kind, MappingError, PipelineError};
use crate::models::{BatchStats, FlatRecord, MappingTables, NormalizedTable};
use crate::service::columns::normalize_columns;
use crate::service::expander::expand_order;
use crate::service::flattener::{flatten, FlattenOptions};
use crate::service::translator::translate_keys;
use rayon::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinError;

/// 批次处理结果
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub table: NormalizedTable,
    pub stats: BatchStats,
}

/// 订单标准化流水线：字段翻译 -> 展平 -> 商品展开 -> 列标准化
pub struct OrderPipeline {
    tables: MappingTables,
    flatten_options: FlattenOptions,
    expand_line_items: bool,
}

impl OrderPipeline {
    pub fn new(tables: MappingTables, flatten_options: FlattenOptions, expand_line_items: bool) -> Self {
        Self {
            tables,
            flatten_options,
            expand_line_items,
        }
    }

    pub fn from_config(config: &NormalizeConfig) -> Result<Self, MappingError> {
        let tables = match &config.mapping_dir {
            Some(dir) => MappingTables::from_dir(Path::new(dir), config.num_products)?,
            None => MappingTables::builtin(config.num_products)?,
        };
        let flatten_options = FlattenOptions {
            scalar_arrays: config.scalar_arrays,
            ..Default::default()
        };
        Ok(Self::new(tables, flatten_options, config.expand_line_items))
    }

    pub fn tables(&self) -> &MappingTables {
        &self.tables
    }

    /// 单个订单：翻译、展平、展开商品
    pub fn process_order(&self, order: &Value) -> Result<Vec<FlatRecord>, PipelineError> {
        if !order.is_object() {
            return Err(PipelineError::NotAnObject {
                kind: value_kind(order),
            });
        }

        let translated = translate_keys(order, &self.tables.fields);
        if self.expand_line_items {
            Ok(expand_order(&translated, &self.flatten_options))
        } else {
            Ok(vec![flatten(&translated, "", &self.flatten_options)])
        }
    }

    /// 整批处理：订单间并行，单个订单失败只跳过该订单，最后统一做列标准化
    pub fn run_batch(&self, orders: &[Value]) -> BatchOutcome {
        let results: Vec<Result<Vec<FlatRecord>, PipelineError>> =
            orders.par_iter().map(|order| self.process_order(order)).collect();

        let mut records = Vec::new();
        let mut skipped = 0;
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(rows) => records.extend(rows),
                Err(e) => {
                    tracing::error!("订单处理失败 #{}: {}", idx, e);
                    skipped += 1;
                }
            }
        }

        let table = normalize_columns(records, &self.tables);
        let stats = BatchStats {
            total_orders: orders.len(),
            processed_orders: orders.len() - skipped,
            skipped_orders: skipped,
            output_rows: table.row_count(),
            output_columns: table.columns.len(),
        };

        tracing::info!(
            "标准化完成: 订单 {}/{}, 跳过 {}, 输出 {} 行 {} 列",
            stats.processed_orders,
            stats.total_orders,
            stats.skipped_orders,
            stats.output_rows,
            stats.output_columns
        );

        BatchOutcome { table, stats }
    }

    /// 异步上下文中调用：rayon 计算放到阻塞线程池，不占用 tokio 工作线程
    pub async fn run_batch_blocking(self: Arc<Self>, orders: Vec<Value>) -> Result<BatchOutcome, JoinError> {
        tokio::task::spawn_blocking(move || self.run_batch(&orders)).await
    }
}
